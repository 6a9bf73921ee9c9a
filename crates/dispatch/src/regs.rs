// VecMux - MSP430 Interrupt Dispatch Layer
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Register access the trampolines need, and nothing more.
//!
//! Peripheral configuration (directions, pulls, edge select, clock setup)
//! stays with the driver libraries; the dispatcher only reads pending
//! flags, acknowledges them, and folds deferred status-register requests
//! into the interrupt return. Keeping this surface a trait is what lets the
//! same trampoline bodies run against the real F5510 registers on target
//! and against the testbench's register models on the host.

use crate::exit::SrBits;

/// Interrupt-capable I/O ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntPort {
    P1,
    P2,
}

/// Timer instances with interrupt-vector registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerId {
    Ta0,
    Ta1,
    Ta2,
    Tb0,
}

/// Hardware access used by the trampolines.
pub trait Regs {
    /// Snapshot of a port's pending, enabled edge flags (`PxIFG & PxIE`).
    fn port_flags(&mut self, port: IntPort) -> u8;

    /// Acknowledge one pin's edge flag (clear the `PxIFG` bit).
    fn port_ack(&mut self, port: IntPort, bit: u8);

    /// Read a timer's interrupt-vector register (`TAxIV` / `TB0IV`).
    ///
    /// The read reports the highest-priority pending sub-source (0x02 for
    /// CC1 upward, 0x0E for overflow) and clears its flag; 0 means nothing
    /// is pending. CC0 has its own vector and never shows up here.
    fn timer_iv(&mut self, timer: TimerId) -> u16;

    /// Fold a deferred status-register request into the interrupt return:
    /// `clear` bits are removed from the restored SR, then `set` bits added.
    fn sr_modify(&mut self, clear: SrBits, set: SrBits);
}
