// VecMux - MSP430 Interrupt Dispatch Layer
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Host-side harness for exercising the dispatch layer.
//!
//! The dispatcher's trampolines are plain functions over a register-access
//! trait, so the same bodies that run against F5510 hardware on target run
//! here against small register models: interrupt-capable I/O ports with
//! edge-select latching and timers with a read-clears-highest interrupt
//! vector register. [`Bench`] wires the models to a [`DispatchTable`] and
//! plays the hardware's part: stimuli latch flags, `service` takes pending
//! vectors in hardware priority order, and an event trace records the
//! acknowledge/invoke ordering the trampolines promise.
//!
//! [`DispatchTable`]: vecmux_dispatch::DispatchTable

pub mod bench;
pub mod port;
pub mod signals;
pub mod timer;
pub mod trace;

pub use bench::{Bench, SimpleSource};
pub use port::IoPort;
pub use signals::Level;
pub use timer::TimerUnit;
pub use trace::{EventTrace, TraceEvent, TracingProbe};

use thiserror::Error;

/// Harness-level failures.
///
/// The dispatcher itself has no failing operations; these cover misuse of
/// the bench.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BenchError {
    /// `service` was called with the bench's global-interrupt-enable off.
    #[error("global interrupts are disabled; flags stay latched")]
    InterruptsDisabled,

    /// A stimulus addressed a pin that cannot raise interrupts.
    #[error("pin P{port}.{bit} is not interrupt-capable")]
    NotInterruptCapable { port: u8, bit: u8 },

    /// A stimulus addressed a source whose vector is not dispatched in
    /// this build.
    #[error("source '{0}' has no dispatched vector in this build")]
    SourceUnavailable(String),
}
