// VecMux - MSP430 Interrupt Dispatch Layer
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Central interrupt dispatch for the MSP430F5510 family.
//!
//! The hardware vector table is fixed at link time, but driver modules want
//! to claim interrupt sources at runtime without knowing which other module
//! shares the same physical vector. This crate provides:
//!
//! - [`VectorId`]: a dense, build-time-selected enumeration of logical
//!   interrupt sources (feature flags trim the superset; see the manifest).
//! - [`DispatchTable`]: one handler slot per logical source, mutated only
//!   through [`DispatchTable::install`] / [`DispatchTable::uninstall`].
//! - [`trampolines`]: one routine per enabled physical vector. Each resolves
//!   the firing sub-source where the vector is multiplexed, acknowledges the
//!   hardware flag, and invokes the installed handler.
//! - The deferred status-register protocol (`sr-on-exit` feature): handlers
//!   may request SR bit changes that take effect on interrupt return, which
//!   is the only way interrupt-time code can lift the CPU out of a low-power
//!   mode.
//!
//! Startup is two-phase: the table is const-constructed with every slot
//! holding the default handler, drivers install their handlers, and only
//! then does the application set GIE. Installs after that point are still
//! safe (they run inside a critical section) but should stay rare; the
//! install path is deliberately a couple of stores so it never becomes a
//! latency concern.
#![cfg_attr(not(test), no_std)]
#![cfg_attr(target_arch = "msp430", feature(asm_experimental_arch))]

mod exit;
mod regs;
mod table;
#[cfg(target_arch = "msp430")]
mod target;
pub mod trampolines;
mod vectors;

pub use exit::{ExitHook, SrBits};
pub use regs::{IntPort, Regs, TimerId};
pub use table::{DefaultHandler, DispatchTable, FnIsr, Isr};
pub use vectors::{Pin, PortId, VectorId};

/// The process-wide dispatch table the hardware vector bindings read.
///
/// Host-side harnesses construct their own [`DispatchTable`] instead; on
/// target this is the one the permanently bound vector entries consult.
pub static DISPATCH: DispatchTable = DispatchTable::new();
