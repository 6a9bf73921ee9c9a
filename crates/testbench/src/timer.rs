// VecMux - MSP430 Interrupt Dispatch Layer
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Model of a Timer_A/Timer_B interrupt unit.
//!
//! Only the interrupt plumbing is modeled, not counting. CCR0 has its own
//! dedicated vector whose flag clears when taken; CCR1 and up plus the
//! overflow flag report through the `TAxIV`/`TB0IV` register, where a read
//! returns the highest-priority pending encoding and clears that one flag.

use serde::Serialize;

/// Encoding of the overflow source in the IV register.
pub const IV_OVERFLOW: u16 = 0x0E;

#[derive(Debug, Clone, Default, Serialize)]
pub struct TimerUnit {
    /// CCIFG flags for CCR0..=CCR6. Index 0 is the dedicated vector.
    pub cc: [bool; 7],
    /// TAIFG/TBIFG overflow flag.
    pub overflow: bool,
}

impl TimerUnit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise_cc(&mut self, cc: u8) {
        assert!(cc <= 6, "capture/compare index {cc} out of range");
        self.cc[cc as usize] = true;
    }

    pub fn raise_overflow(&mut self) {
        self.overflow = true;
    }

    /// Whether the dedicated CCR0 vector is pending.
    pub fn cc0_pending(&self) -> bool {
        self.cc[0]
    }

    /// Take the dedicated CCR0 vector; the hardware clears CCIFG0 itself.
    pub fn take_cc0(&mut self) {
        self.cc[0] = false;
    }

    /// Whether anything reports through the IV register.
    pub fn iv_pending(&self) -> bool {
        self.overflow || self.cc[1..].iter().any(|&f| f)
    }

    /// Read the IV register: highest-priority pending source, lowest CC
    /// number first and overflow last. The read clears the reported flag.
    pub fn iv_read(&mut self) -> u16 {
        for n in 1..7 {
            if self.cc[n] {
                self.cc[n] = false;
                return 0x02 * n as u16;
            }
        }
        if self.overflow {
            self.overflow = false;
            return IV_OVERFLOW;
        }
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iv_reports_highest_priority_first() {
        let mut timer = TimerUnit::new();
        timer.raise_cc(3);
        timer.raise_cc(1);
        timer.raise_overflow();

        assert_eq!(timer.iv_read(), 0x02);
        assert_eq!(timer.iv_read(), 0x06);
        assert_eq!(timer.iv_read(), IV_OVERFLOW);
        assert_eq!(timer.iv_read(), 0);
    }

    #[test]
    fn test_iv_read_clears_one_flag_per_read() {
        let mut timer = TimerUnit::new();
        timer.raise_cc(2);
        assert!(timer.iv_pending());
        assert_eq!(timer.iv_read(), 0x04);
        assert!(!timer.iv_pending());
    }

    #[test]
    #[should_panic(expected = "capture/compare index")]
    fn test_raise_cc_rejects_out_of_range_index() {
        let mut timer = TimerUnit::new();
        timer.raise_cc(7);
    }

    #[test]
    fn test_cc0_does_not_report_through_iv() {
        let mut timer = TimerUnit::new();
        timer.raise_cc(0);
        assert!(timer.cc0_pending());
        assert!(!timer.iv_pending());
        assert_eq!(timer.iv_read(), 0);
        timer.take_cc0();
        assert!(!timer.cc0_pending());
    }
}
