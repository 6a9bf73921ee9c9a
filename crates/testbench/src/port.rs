// VecMux - MSP430 Interrupt Dispatch Layer
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Model of an interrupt-capable I/O port (P1/P2 on the F5510).
//!
//! Only the interrupt-facing registers are modeled: input levels, edge
//! select, interrupt enable, and the flag register. An edge latches its
//! `ifg` bit whether or not the corresponding `ie` bit is set; enabling a
//! pin later exposes any flag latched in the meantime, matching hardware.

use serde::Serialize;

use crate::signals::Level;

#[derive(Debug, Clone, Default, Serialize)]
pub struct IoPort {
    /// Current input levels (PxIN).
    pub input: u8,
    /// Edge select (PxIES); a set bit selects the falling edge.
    pub ies: u8,
    /// Interrupt enable (PxIE).
    pub ie: u8,
    /// Latched edge flags (PxIFG).
    pub ifg: u8,
}

impl IoPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the interrupt edge for one pin.
    pub fn select_edge(&mut self, bit: u8, falling: bool) {
        if falling {
            self.ies |= 1 << bit;
        } else {
            self.ies &= !(1 << bit);
        }
    }

    /// Enable or disable one pin's interrupt.
    pub fn set_enabled(&mut self, bit: u8, enabled: bool) {
        if enabled {
            self.ie |= 1 << bit;
        } else {
            self.ie &= !(1 << bit);
        }
    }

    /// Drive a new level onto a pin, latching the flag if the transition
    /// matches the pin's selected edge.
    pub fn drive(&mut self, bit: u8, level: Level) {
        let mask = 1u8 << bit;
        let was_high = self.input & mask != 0;
        let now_high = bool::from(level);
        match level {
            Level::High => self.input |= mask,
            Level::Low => self.input &= !mask,
        }

        let falling_selected = self.ies & mask != 0;
        let edge = if falling_selected {
            was_high && !now_high
        } else {
            !was_high && now_high
        };
        if edge {
            self.ifg |= mask;
            tracing::debug!(bit, falling = falling_selected, "edge latched");
        }
    }

    /// Pending, enabled flags (`PxIFG & PxIE`).
    pub fn flags(&self) -> u8 {
        self.ifg & self.ie
    }

    /// Clear one flag bit.
    pub fn ack(&mut self, bit: u8) {
        self.ifg &= !(1 << bit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rising_edge_latches_flag() {
        let mut port = IoPort::new();
        port.set_enabled(2, true);
        port.drive(2, Level::High);
        assert_eq!(port.ifg, 0b0000_0100);
    }

    #[test]
    fn test_falling_edge_respects_edge_select() {
        let mut port = IoPort::new();
        port.select_edge(3, true);
        port.drive(3, Level::High);
        // Rising transition on a falling-select pin: no flag.
        assert_eq!(port.ifg, 0);
        port.drive(3, Level::Low);
        assert_eq!(port.ifg, 0b0000_1000);
    }

    #[test]
    fn test_level_without_transition_does_not_latch() {
        let mut port = IoPort::new();
        port.drive(1, Level::Low);
        assert_eq!(port.ifg, 0);
    }

    #[test]
    fn test_flag_latches_while_disabled() {
        let mut port = IoPort::new();
        port.drive(5, Level::High);
        assert_eq!(port.flags(), 0);
        assert_eq!(port.ifg, 0b0010_0000);
        // Enabling afterwards exposes the already-latched flag.
        port.set_enabled(5, true);
        assert_eq!(port.flags(), 0b0010_0000);
    }

    #[test]
    fn test_ack_clears_only_the_named_flag() {
        let mut port = IoPort::new();
        port.drive(0, Level::High);
        port.drive(4, Level::High);
        port.ack(0);
        assert_eq!(port.ifg, 0b0001_0000);
    }
}
