// VecMux - MSP430 Interrupt Dispatch Layer
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Deferred status-register requests.
//!
//! Waking the CPU from a low-power mode cannot be done by ordinary code
//! running after a handler returns: the LPM bits live in the status register
//! word the interrupt-return instruction restores. A handler therefore asks
//! the trampoline, through the [`ExitHook`] it is handed, to fold `clear` /
//! `set` masks into that restore. Requests accumulate (OR) within one
//! handler invocation, are applied as a single combined modification when
//! the handler returns, and never survive into the next invocation.
//!
//! The whole protocol is gated by the `sr-on-exit` feature; without it the
//! hook is a zero-sized token and the trampoline epilogue compiles away,
//! which is the right trade where latency matters more than in-handler
//! wakeups.

#[cfg(feature = "sr-on-exit")]
use core::cell::UnsafeCell;

use bitflags::bitflags;

use crate::regs::Regs;

bitflags! {
    /// MSP430 status-register bits a handler may request changes to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SrBits: u16 {
        const C = 0x0001;
        const Z = 0x0002;
        const N = 0x0004;
        const GIE = 0x0008;
        const CPUOFF = 0x0010;
        const OSCOFF = 0x0020;
        const SCG0 = 0x0040;
        const SCG1 = 0x0080;
        const V = 0x0100;

        // Low-power mode masks; clearing one on exit wakes the CPU.
        const LPM0 = Self::CPUOFF.bits();
        const LPM1 = Self::SCG0.bits() | Self::CPUOFF.bits();
        const LPM2 = Self::SCG1.bits() | Self::CPUOFF.bits();
        const LPM3 = Self::SCG1.bits() | Self::SCG0.bits() | Self::CPUOFF.bits();
        const LPM4 = Self::SCG1.bits()
            | Self::SCG0.bits()
            | Self::OSCOFF.bits()
            | Self::CPUOFF.bits();
    }
}

/// Per-table accumulator for the pending exit request.
///
/// Owned by the dispatch table, reset before every handler invocation and
/// consumed right after it. Only the currently running trampoline touches
/// it: interrupts do not nest on this family, so there is never more than
/// one invocation in flight per table.
#[cfg(feature = "sr-on-exit")]
pub(crate) struct ExitSlot {
    clear: UnsafeCell<u16>,
    set: UnsafeCell<u16>,
}

#[cfg(feature = "sr-on-exit")]
// Safety: accessed only from the single in-flight handler invocation; see
// the struct docs.
unsafe impl Sync for ExitSlot {}

#[cfg(feature = "sr-on-exit")]
impl ExitSlot {
    pub(crate) const fn new() -> Self {
        Self {
            clear: UnsafeCell::new(0),
            set: UnsafeCell::new(0),
        }
    }

    pub(crate) fn reset(&self) {
        unsafe {
            *self.clear.get() = 0;
            *self.set.get() = 0;
        }
    }

    /// Apply and consume the pending request, if any.
    pub(crate) fn apply(&self, regs: &mut impl Regs) {
        let (clear, set) = unsafe { (*self.clear.get(), *self.set.get()) };
        if clear != 0 || set != 0 {
            self.reset();
            regs.sr_modify(
                SrBits::from_bits_truncate(clear),
                SrBits::from_bits_truncate(set),
            );
        }
    }
}

#[cfg(not(feature = "sr-on-exit"))]
pub(crate) struct ExitSlot;

#[cfg(not(feature = "sr-on-exit"))]
impl ExitSlot {
    pub(crate) const fn new() -> Self {
        Self
    }

    pub(crate) fn reset(&self) {}

    pub(crate) fn apply(&self, _regs: &mut impl Regs) {}
}

/// Capability handed to every handler invocation.
///
/// With the `sr-on-exit` feature it exposes the deferred status-register
/// request operations; without it it is an empty token, so handler
/// signatures stay identical across configurations.
pub struct ExitHook<'a> {
    #[cfg(feature = "sr-on-exit")]
    slot: &'a ExitSlot,
    #[cfg(not(feature = "sr-on-exit"))]
    _slot: core::marker::PhantomData<&'a ()>,
}

impl<'a> ExitHook<'a> {
    #[cfg(feature = "sr-on-exit")]
    pub(crate) fn new(slot: &'a ExitSlot) -> Self {
        Self { slot }
    }

    #[cfg(not(feature = "sr-on-exit"))]
    pub(crate) fn new(_slot: &'a ExitSlot) -> Self {
        Self {
            _slot: core::marker::PhantomData,
        }
    }

    /// Request that `bits` be cleared in the status register on interrupt
    /// return. The typical use is `clear_sr(SrBits::LPM3)` to wake the CPU.
    #[cfg(feature = "sr-on-exit")]
    pub fn clear_sr(&self, bits: SrBits) {
        unsafe { *self.slot.clear.get() |= bits.bits() }
    }

    /// Request that `bits` be set in the status register on interrupt
    /// return.
    #[cfg(feature = "sr-on-exit")]
    pub fn set_sr(&self, bits: SrBits) {
        unsafe { *self.slot.set.get() |= bits.bits() }
    }
}

#[cfg(all(test, feature = "sr-on-exit"))]
mod tests {
    use super::*;

    struct NullRegs {
        applied: Vec<(SrBits, SrBits)>,
    }

    impl Regs for NullRegs {
        fn port_flags(&mut self, _port: crate::IntPort) -> u8 {
            0
        }
        fn port_ack(&mut self, _port: crate::IntPort, _bit: u8) {}
        fn timer_iv(&mut self, _timer: crate::TimerId) -> u16 {
            0
        }
        fn sr_modify(&mut self, clear: SrBits, set: SrBits) {
            self.applied.push((clear, set));
        }
    }

    #[test]
    fn test_requests_accumulate_and_apply_once() {
        let slot = ExitSlot::new();
        let mut regs = NullRegs { applied: vec![] };

        slot.reset();
        let hook = ExitHook::new(&slot);
        hook.set_sr(SrBits::GIE);
        hook.clear_sr(SrBits::LPM0);
        hook.clear_sr(SrBits::SCG1);
        slot.apply(&mut regs);

        assert_eq!(
            regs.applied,
            vec![(SrBits::LPM0 | SrBits::SCG1, SrBits::GIE)]
        );

        // Consumed: a second apply is a no-op.
        slot.apply(&mut regs);
        assert_eq!(regs.applied.len(), 1);
    }

    #[test]
    fn test_empty_request_touches_nothing() {
        let slot = ExitSlot::new();
        let mut regs = NullRegs { applied: vec![] };
        slot.reset();
        slot.apply(&mut regs);
        assert!(regs.applied.is_empty());
    }

    #[test]
    fn test_lpm_masks_match_the_architecture() {
        assert_eq!(SrBits::LPM4.bits(), 0x00F0);
        assert_eq!(SrBits::LPM3.bits(), 0x00D0);
        assert_eq!(SrBits::LPM0.bits(), 0x0010);
    }
}
