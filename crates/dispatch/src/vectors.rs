// VecMux - MSP430 Interrupt Dispatch Layer
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! The logical vector space.
//!
//! One declarative table below is the single source of truth for which
//! interrupt sources exist in a build, in what order, and under which
//! feature predicates. The enumeration it generates is dense and zero-based,
//! so `id as usize` indexes the dispatch table directly, and its size tracks
//! the feature selection automatically.

use crate::regs::TimerId;

/// Expands the declarative vector table into the [`VectorId`] enumeration.
///
/// Each row is `[Id, ...] if <cfg predicate>`; rows appear in hardware
/// declaration order. A trailing hidden sentinel gives the table size
/// without repeating any predicate.
macro_rules! vector_space {
    ( $( [ $( $id:ident ),+ $(,)? ] if $pred:meta ),+ $(,)? ) => {
        /// Logical interrupt sources enabled in this build.
        ///
        /// A logical source is one independently dispatchable
        /// interrupt-causing condition; several sources may share one
        /// physical vector (the trampoline disambiguates). Numbering is
        /// dense from zero in declaration order.
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[allow(non_camel_case_types)]
        pub enum VectorId {
            $( $( #[cfg($pred)] $id, )+ )+
            /// Not a real source; sentinel that sizes the dispatch table.
            #[doc(hidden)]
            __Count,
        }

        impl VectorId {
            /// Number of logical sources participating in dispatch.
            pub const COUNT: usize = VectorId::__Count as usize;
        }
    };
}

vector_space! {
    // RTC_VECTOR
    [Rtc] if all(not(feature = "disable-rtc-vector"), not(feature = "disable-rtc-dispatch")),
    // PORT2_VECTOR; P2.1-P2.7 exist on the larger packages only
    [P2_7, P2_6, P2_5, P2_4, P2_3, P2_2, P2_1]
        if all(feature = "ext-port2", not(feature = "disable-port2-vector"), not(feature = "disable-port2-dispatch")),
    [P2_0] if all(not(feature = "disable-port2-vector"), not(feature = "disable-port2-dispatch")),
    // TIMER2_A1_VECTOR
    [Ta2Ifg, Ta2Cc2, Ta2Cc1]
        if all(not(feature = "disable-ta2-1-vector"), not(feature = "disable-ta2-1-dispatch")),
    // TIMER2_A0_VECTOR
    [Ta2Cc0] if all(not(feature = "disable-ta2-0-vector"), not(feature = "disable-ta2-0-dispatch")),
    // USCI_B1_VECTOR
    [UsciB1] if all(not(feature = "disable-usci-b1-vector"), not(feature = "disable-usci-b1-dispatch")),
    // USCI_A1_VECTOR
    [UsciA1] if all(not(feature = "disable-usci-a1-vector"), not(feature = "disable-usci-a1-dispatch")),
    // PORT1_VECTOR
    [P1_7, P1_6, P1_5, P1_4, P1_3, P1_2, P1_1, P1_0]
        if all(not(feature = "disable-port1-vector"), not(feature = "disable-port1-dispatch")),
    // TIMER1_A1_VECTOR
    [Ta1Ifg, Ta1Cc2, Ta1Cc1]
        if all(not(feature = "disable-ta1-1-vector"), not(feature = "disable-ta1-1-dispatch")),
    // TIMER1_A0_VECTOR
    [Ta1Cc0] if all(not(feature = "disable-ta1-0-vector"), not(feature = "disable-ta1-0-dispatch")),
    // DMA_VECTOR
    [Dma] if all(not(feature = "disable-dma-vector"), not(feature = "disable-dma-dispatch")),
    // USB_UBM_VECTOR
    [UsbUbm] if all(not(feature = "disable-usb-vector"), not(feature = "disable-usb-dispatch")),
    // TIMER0_A1_VECTOR
    [Ta0Ifg, Ta0Cc4, Ta0Cc3, Ta0Cc2, Ta0Cc1]
        if all(not(feature = "disable-ta0-1-vector"), not(feature = "disable-ta0-1-dispatch")),
    // TIMER0_A0_VECTOR; owned by the clock library unless explicitly enabled
    [Ta0Cc0] if feature = "enable-ta0-cc0",
    // ADC10_VECTOR
    [Adc10] if all(not(feature = "disable-adc10-vector"), not(feature = "disable-adc10-dispatch")),
    // USCI_B0_VECTOR
    [UsciB0] if all(not(feature = "disable-usci-b0-vector"), not(feature = "disable-usci-b0-dispatch")),
    // USCI_A0_VECTOR
    [UsciA0] if all(not(feature = "disable-usci-a0-vector"), not(feature = "disable-usci-a0-dispatch")),
    // WDT_VECTOR; owned by the clock library unless explicitly enabled
    [Wdt] if feature = "enable-wdt",
    // TIMER0_B1_VECTOR
    [Tb0Ifg, Tb0Cc6, Tb0Cc5, Tb0Cc4, Tb0Cc3, Tb0Cc2, Tb0Cc1]
        if all(not(feature = "disable-tb0-1-vector"), not(feature = "disable-tb0-1-dispatch")),
    // TIMER0_B0_VECTOR
    [Tb0Cc0] if all(not(feature = "disable-tb0-0-vector"), not(feature = "disable-tb0-0-dispatch")),
    // COMP_B_VECTOR
    [CompB] if all(not(feature = "disable-comp-b-vector"), not(feature = "disable-comp-b-dispatch")),
    // UNMI_VECTOR
    [Unmi] if all(not(feature = "disable-unmi-vector"), not(feature = "disable-unmi-dispatch")),
    // SYSNMI_VECTOR
    [SysNmi] if all(not(feature = "disable-sysnmi-vector"), not(feature = "disable-sysnmi-dispatch")),
    // RESET_VECTOR; a reset handler exists outside the dispatcher already
    [Reset] if feature = "enable-reset",
}

/// Device I/O ports. Only P1 and P2 are interrupt-capable on this family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortId {
    P1,
    P2,
    P3,
    P4,
    P5,
    P6,
    PJ,
}

/// A device pin, identified by port and bit position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pin {
    pub port: PortId,
    pub bit: u8,
}

impl Pin {
    pub const fn new(port: PortId, bit: u8) -> Self {
        debug_assert!(bit < 8);
        Self { port, bit }
    }
}

impl VectorId {
    /// Logical source for a pin's edge interrupt.
    ///
    /// `None` for pins without interrupt capability and for sources compiled
    /// out by feature selection; claiming such a pin is a build
    /// configuration error the caller surfaces, not a runtime fault the
    /// dispatcher can produce.
    pub const fn for_pin(pin: Pin) -> Option<VectorId> {
        #[allow(unreachable_patterns)]
        match (pin.port, pin.bit) {
            #[cfg(all(not(feature = "disable-port1-vector"), not(feature = "disable-port1-dispatch")))]
            (PortId::P1, 0) => Some(VectorId::P1_0),
            #[cfg(all(not(feature = "disable-port1-vector"), not(feature = "disable-port1-dispatch")))]
            (PortId::P1, 1) => Some(VectorId::P1_1),
            #[cfg(all(not(feature = "disable-port1-vector"), not(feature = "disable-port1-dispatch")))]
            (PortId::P1, 2) => Some(VectorId::P1_2),
            #[cfg(all(not(feature = "disable-port1-vector"), not(feature = "disable-port1-dispatch")))]
            (PortId::P1, 3) => Some(VectorId::P1_3),
            #[cfg(all(not(feature = "disable-port1-vector"), not(feature = "disable-port1-dispatch")))]
            (PortId::P1, 4) => Some(VectorId::P1_4),
            #[cfg(all(not(feature = "disable-port1-vector"), not(feature = "disable-port1-dispatch")))]
            (PortId::P1, 5) => Some(VectorId::P1_5),
            #[cfg(all(not(feature = "disable-port1-vector"), not(feature = "disable-port1-dispatch")))]
            (PortId::P1, 6) => Some(VectorId::P1_6),
            #[cfg(all(not(feature = "disable-port1-vector"), not(feature = "disable-port1-dispatch")))]
            (PortId::P1, 7) => Some(VectorId::P1_7),
            #[cfg(all(not(feature = "disable-port2-vector"), not(feature = "disable-port2-dispatch")))]
            (PortId::P2, 0) => Some(VectorId::P2_0),
            #[cfg(all(feature = "ext-port2", not(feature = "disable-port2-vector"), not(feature = "disable-port2-dispatch")))]
            (PortId::P2, 1) => Some(VectorId::P2_1),
            #[cfg(all(feature = "ext-port2", not(feature = "disable-port2-vector"), not(feature = "disable-port2-dispatch")))]
            (PortId::P2, 2) => Some(VectorId::P2_2),
            #[cfg(all(feature = "ext-port2", not(feature = "disable-port2-vector"), not(feature = "disable-port2-dispatch")))]
            (PortId::P2, 3) => Some(VectorId::P2_3),
            #[cfg(all(feature = "ext-port2", not(feature = "disable-port2-vector"), not(feature = "disable-port2-dispatch")))]
            (PortId::P2, 4) => Some(VectorId::P2_4),
            #[cfg(all(feature = "ext-port2", not(feature = "disable-port2-vector"), not(feature = "disable-port2-dispatch")))]
            (PortId::P2, 5) => Some(VectorId::P2_5),
            #[cfg(all(feature = "ext-port2", not(feature = "disable-port2-vector"), not(feature = "disable-port2-dispatch")))]
            (PortId::P2, 6) => Some(VectorId::P2_6),
            #[cfg(all(feature = "ext-port2", not(feature = "disable-port2-vector"), not(feature = "disable-port2-dispatch")))]
            (PortId::P2, 7) => Some(VectorId::P2_7),
            _ => None,
        }
    }

    /// Logical source for a timer's CCR0 (dedicated-vector) interrupt.
    ///
    /// TA0's CCR0 belongs to the clock library and maps only when
    /// `enable-ta0-cc0` is set.
    pub const fn for_timer(timer: TimerId) -> Option<VectorId> {
        #[allow(unreachable_patterns)]
        match timer {
            #[cfg(feature = "enable-ta0-cc0")]
            TimerId::Ta0 => Some(VectorId::Ta0Cc0),
            #[cfg(all(not(feature = "disable-ta1-0-vector"), not(feature = "disable-ta1-0-dispatch")))]
            TimerId::Ta1 => Some(VectorId::Ta1Cc0),
            #[cfg(all(not(feature = "disable-ta2-0-vector"), not(feature = "disable-ta2-0-dispatch")))]
            TimerId::Ta2 => Some(VectorId::Ta2Cc0),
            #[cfg(all(not(feature = "disable-tb0-0-vector"), not(feature = "disable-tb0-0-dispatch")))]
            TimerId::Tb0 => Some(VectorId::Tb0Cc0),
            _ => None,
        }
    }

    /// Logical source for an arbitrary capture/compare block of a timer.
    ///
    /// CCR0 resolves through the dedicated vector; CCR1 and up live behind
    /// the timer's multiplexed vector.
    pub const fn for_timer_cc(timer: TimerId, cc: u8) -> Option<VectorId> {
        if cc == 0 {
            return Self::for_timer(timer);
        }
        #[allow(unreachable_patterns)]
        match (timer, cc) {
            #[cfg(all(not(feature = "disable-ta0-1-vector"), not(feature = "disable-ta0-1-dispatch")))]
            (TimerId::Ta0, 1) => Some(VectorId::Ta0Cc1),
            #[cfg(all(not(feature = "disable-ta0-1-vector"), not(feature = "disable-ta0-1-dispatch")))]
            (TimerId::Ta0, 2) => Some(VectorId::Ta0Cc2),
            #[cfg(all(not(feature = "disable-ta0-1-vector"), not(feature = "disable-ta0-1-dispatch")))]
            (TimerId::Ta0, 3) => Some(VectorId::Ta0Cc3),
            #[cfg(all(not(feature = "disable-ta0-1-vector"), not(feature = "disable-ta0-1-dispatch")))]
            (TimerId::Ta0, 4) => Some(VectorId::Ta0Cc4),
            #[cfg(all(not(feature = "disable-ta1-1-vector"), not(feature = "disable-ta1-1-dispatch")))]
            (TimerId::Ta1, 1) => Some(VectorId::Ta1Cc1),
            #[cfg(all(not(feature = "disable-ta1-1-vector"), not(feature = "disable-ta1-1-dispatch")))]
            (TimerId::Ta1, 2) => Some(VectorId::Ta1Cc2),
            #[cfg(all(not(feature = "disable-ta2-1-vector"), not(feature = "disable-ta2-1-dispatch")))]
            (TimerId::Ta2, 1) => Some(VectorId::Ta2Cc1),
            #[cfg(all(not(feature = "disable-ta2-1-vector"), not(feature = "disable-ta2-1-dispatch")))]
            (TimerId::Ta2, 2) => Some(VectorId::Ta2Cc2),
            #[cfg(all(not(feature = "disable-tb0-1-vector"), not(feature = "disable-tb0-1-dispatch")))]
            (TimerId::Tb0, 1) => Some(VectorId::Tb0Cc1),
            #[cfg(all(not(feature = "disable-tb0-1-vector"), not(feature = "disable-tb0-1-dispatch")))]
            (TimerId::Tb0, 2) => Some(VectorId::Tb0Cc2),
            #[cfg(all(not(feature = "disable-tb0-1-vector"), not(feature = "disable-tb0-1-dispatch")))]
            (TimerId::Tb0, 3) => Some(VectorId::Tb0Cc3),
            #[cfg(all(not(feature = "disable-tb0-1-vector"), not(feature = "disable-tb0-1-dispatch")))]
            (TimerId::Tb0, 4) => Some(VectorId::Tb0Cc4),
            #[cfg(all(not(feature = "disable-tb0-1-vector"), not(feature = "disable-tb0-1-dispatch")))]
            (TimerId::Tb0, 5) => Some(VectorId::Tb0Cc5),
            #[cfg(all(not(feature = "disable-tb0-1-vector"), not(feature = "disable-tb0-1-dispatch")))]
            (TimerId::Tb0, 6) => Some(VectorId::Tb0Cc6),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumeration_is_dense_from_zero() {
        assert_eq!(VectorId::Rtc as usize, 0);
        // With default features P2.0 follows RTC directly (no ext pins).
        assert_eq!(VectorId::P2_0 as usize, 1);
        assert_eq!(VectorId::Ta2Ifg as usize, 2);
        assert!(VectorId::COUNT > VectorId::SysNmi as usize);
    }

    #[test]
    fn test_count_matches_default_feature_selection() {
        // 1 RTC + 1 P2.0 + 3 TA2_1 + 1 TA2_0 + 2 USCI1 + 8 P1 + 3 TA1_1
        // + 1 TA1_0 + 1 DMA + 1 USB + 5 TA0_1 + 1 ADC10 + 2 USCI0
        // + 7 TB0_1 + 1 TB0_0 + 1 COMP_B + 1 UNMI + 1 SYSNMI = 41
        assert_eq!(VectorId::COUNT, 41);
    }

    #[test]
    fn test_pin_lookup() {
        assert_eq!(
            VectorId::for_pin(Pin::new(PortId::P1, 3)),
            Some(VectorId::P1_3)
        );
        assert_eq!(
            VectorId::for_pin(Pin::new(PortId::P2, 0)),
            Some(VectorId::P2_0)
        );
        // Not interrupt-capable.
        assert_eq!(VectorId::for_pin(Pin::new(PortId::P4, 2)), None);
        // Needs ext-port2.
        #[cfg(not(feature = "ext-port2"))]
        assert_eq!(VectorId::for_pin(Pin::new(PortId::P2, 5)), None);
    }

    #[test]
    fn test_timer_lookup() {
        assert_eq!(VectorId::for_timer(TimerId::Ta1), Some(VectorId::Ta1Cc0));
        // TA0 CCR0 belongs to the clock library by default.
        #[cfg(not(feature = "enable-ta0-cc0"))]
        assert_eq!(VectorId::for_timer(TimerId::Ta0), None);
        assert_eq!(
            VectorId::for_timer_cc(TimerId::Tb0, 6),
            Some(VectorId::Tb0Cc6)
        );
        assert_eq!(VectorId::for_timer_cc(TimerId::Ta1, 0), Some(VectorId::Ta1Cc0));
        assert_eq!(VectorId::for_timer_cc(TimerId::Ta1, 5), None);
    }
}
