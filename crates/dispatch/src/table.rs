// VecMux - MSP430 Interrupt Dispatch Layer
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! The dispatch table and the install/uninstall API.

use core::cell::UnsafeCell;

use crate::exit::{ExitHook, ExitSlot};
use crate::regs::Regs;
use crate::vectors::VectorId;

/// An installable interrupt handler.
///
/// This is the dispatcher's handler capability: one `invoke` operation, no
/// opaque context pointer to cast. A `&'static dyn Isr` is two words, the
/// same footprint as the classic callback-plus-object pair, and `&self` is
/// the bound context. Implementations must be safe to call from interrupt
/// context: no blocking, no allocation, and whatever state they touch must
/// tolerate asynchronous invocation.
///
/// The installed reference must outlive the installation; `'static` makes
/// that a compile-time obligation rather than a comment.
pub trait Isr: Sync {
    fn on_interrupt(&self, exit: &ExitHook<'_>);
}

/// Adapter installing a plain function as a handler.
pub struct FnIsr(pub fn(&ExitHook<'_>));

impl Isr for FnIsr {
    fn on_interrupt(&self, exit: &ExitHook<'_>) {
        (self.0)(exit)
    }
}

/// Handler every slot holds until a driver claims it.
///
/// Does nothing, and is safe to run at any time, including before global
/// interrupts are first enabled.
pub struct DefaultHandler;

impl Isr for DefaultHandler {
    fn on_interrupt(&self, _exit: &ExitHook<'_>) {}
}

struct Slot {
    isr: UnsafeCell<&'static dyn Isr>,
    claimed: UnsafeCell<bool>,
}

// Safety: the two-word `isr` cell is written only inside a critical section
// (install/uninstall) and read only from trampoline context, where the
// triggering interrupt keeps further interrupts masked; the pair is never
// observed half-written. `claimed` is a single byte on every supported
// target.
unsafe impl Sync for Slot {}

impl Slot {
    const DEFAULT: Slot = Slot {
        isr: UnsafeCell::new(&DefaultHandler),
        claimed: UnsafeCell::new(false),
    };
}

/// One handler slot per logical interrupt source.
///
/// Every slot always holds an invocable handler -- unclaimed slots hold
/// [`DefaultHandler`] rather than any null/unset state -- so trampolines
/// invoke unconditionally. The table is const-constructible; the intended
/// startup sequence is construct-with-defaults, install what the drivers
/// need, then enable global interrupts.
pub struct DispatchTable {
    slots: [Slot; VectorId::COUNT],
    exit: ExitSlot,
}

impl DispatchTable {
    pub const fn new() -> Self {
        Self {
            slots: [Slot::DEFAULT; VectorId::COUNT],
            exit: ExitSlot::new(),
        }
    }

    /// Install `isr` for `id`, replacing whatever the slot held.
    ///
    /// Cannot fail: the ID space is closed at build time, so there is no
    /// invalid-vector case to report. The replacement is atomic with
    /// respect to interrupts -- a trampoline sees either the old pair or
    /// the new one, never a mix.
    pub fn install(&self, id: VectorId, isr: &'static dyn Isr) {
        critical_section::with(|_| unsafe {
            *self.slots[id as usize].isr.get() = isr;
            *self.slots[id as usize].claimed.get() = true;
        });
    }

    /// Put the default handler back. Idempotent.
    pub fn uninstall(&self, id: VectorId) {
        critical_section::with(|_| unsafe {
            *self.slots[id as usize].isr.get() = &DefaultHandler;
            *self.slots[id as usize].claimed.get() = false;
        });
    }

    /// Whether a non-default handler is currently installed for `id`.
    pub fn is_claimed(&self, id: VectorId) -> bool {
        unsafe { *self.slots[id as usize].claimed.get() }
    }

    /// Run the handler for `id` the way a trampoline does: reset the
    /// pending exit request, invoke, then apply what the handler asked for.
    pub(crate) fn dispatch(&self, id: VectorId, regs: &mut impl Regs) {
        let isr = unsafe { *self.slots[id as usize].isr.get() };
        self.exit.reset();
        isr.on_interrupt(&ExitHook::new(&self.exit));
        self.exit.apply(regs);
    }

    /// Dispatch for a vector whose logical IDs are compiled out of the
    /// enumeration: the slot cannot exist, so the default handler runs
    /// directly.
    pub(crate) fn dispatch_default(&self, regs: &mut impl Regs) {
        self.exit.reset();
        DefaultHandler.on_interrupt(&ExitHook::new(&self.exit));
        self.exit.apply(regs);
    }
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit::SrBits;
    use crate::regs::{IntPort, TimerId};
    use std::sync::atomic::{AtomicU32, Ordering};

    struct NullRegs;

    impl Regs for NullRegs {
        fn port_flags(&mut self, _port: IntPort) -> u8 {
            0
        }
        fn port_ack(&mut self, _port: IntPort, _bit: u8) {}
        fn timer_iv(&mut self, _timer: TimerId) -> u16 {
            0
        }
        fn sr_modify(&mut self, _clear: SrBits, _set: SrBits) {}
    }

    struct Probe {
        hits: AtomicU32,
    }

    impl Probe {
        const fn new() -> Self {
            Self {
                hits: AtomicU32::new(0),
            }
        }
    }

    impl Isr for Probe {
        fn on_interrupt(&self, _exit: &ExitHook<'_>) {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_fresh_table_is_all_default() {
        let table = DispatchTable::new();
        assert!(!table.is_claimed(VectorId::Rtc));
        assert!(!table.is_claimed(VectorId::P1_3));
        // Dispatching an unclaimed slot is a harmless no-op.
        table.dispatch(VectorId::Dma, &mut NullRegs);
    }

    #[test]
    fn test_install_dispatch_uninstall() {
        static PROBE: Probe = Probe::new();
        let table = DispatchTable::new();

        table.install(VectorId::UsciA0, &PROBE);
        assert!(table.is_claimed(VectorId::UsciA0));
        table.dispatch(VectorId::UsciA0, &mut NullRegs);
        assert_eq!(PROBE.hits.load(Ordering::Relaxed), 1);

        table.uninstall(VectorId::UsciA0);
        assert!(!table.is_claimed(VectorId::UsciA0));
        table.dispatch(VectorId::UsciA0, &mut NullRegs);
        // The old handler is gone, not still wired in.
        assert_eq!(PROBE.hits.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_fn_isr_adapts_plain_functions() {
        static HITS: AtomicU32 = AtomicU32::new(0);
        fn bump(_exit: &ExitHook<'_>) {
            HITS.fetch_add(1, Ordering::Relaxed);
        }
        static HANDLER: FnIsr = FnIsr(bump);

        let table = DispatchTable::new();
        table.install(VectorId::CompB, &HANDLER);
        table.dispatch(VectorId::CompB, &mut NullRegs);
        assert_eq!(HITS.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_uninstall_is_idempotent() {
        let table = DispatchTable::new();
        table.uninstall(VectorId::Adc10);
        table.uninstall(VectorId::Adc10);
        assert!(!table.is_claimed(VectorId::Adc10));
    }

    #[test]
    fn test_reinstall_replaces_entirely() {
        static FIRST: Probe = Probe::new();
        static SECOND: Probe = Probe::new();
        let table = DispatchTable::new();

        table.install(VectorId::Ta1Cc0, &FIRST);
        table.install(VectorId::Ta1Cc0, &SECOND);
        table.dispatch(VectorId::Ta1Cc0, &mut NullRegs);

        assert_eq!(FIRST.hits.load(Ordering::Relaxed), 0);
        assert_eq!(SECOND.hits.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_one_slot_per_source() {
        static PROBE: Probe = Probe::new();
        let table = DispatchTable::new();

        table.install(VectorId::P1_0, &PROBE);
        table.dispatch(VectorId::P1_1, &mut NullRegs);
        assert_eq!(PROBE.hits.load(Ordering::Relaxed), 0);
    }

    #[cfg(feature = "sr-on-exit")]
    #[test]
    fn test_pending_exit_request_is_reset_between_invocations() {
        struct Requester;
        impl Isr for Requester {
            fn on_interrupt(&self, exit: &ExitHook<'_>) {
                exit.clear_sr(SrBits::LPM3);
            }
        }

        struct SrLog {
            applied: Vec<(SrBits, SrBits)>,
        }
        impl Regs for SrLog {
            fn port_flags(&mut self, _port: IntPort) -> u8 {
                0
            }
            fn port_ack(&mut self, _port: IntPort, _bit: u8) {}
            fn timer_iv(&mut self, _timer: TimerId) -> u16 {
                0
            }
            fn sr_modify(&mut self, clear: SrBits, set: SrBits) {
                self.applied.push((clear, set));
            }
        }

        static WAKER: Requester = Requester;
        static QUIET: Probe = Probe::new();
        let table = DispatchTable::new();
        let mut regs = SrLog { applied: vec![] };

        table.install(VectorId::Rtc, &WAKER);
        table.install(VectorId::Dma, &QUIET);

        table.dispatch(VectorId::Rtc, &mut regs);
        assert_eq!(regs.applied, vec![(SrBits::LPM3, SrBits::empty())]);

        // A different vector's invocation starts with an empty request.
        table.dispatch(VectorId::Dma, &mut regs);
        assert_eq!(regs.applied.len(), 1);
    }
}
