// VecMux - MSP430 Interrupt Dispatch Layer
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Event trace shared by the bench and installed probes.
//!
//! The interesting property of a dispatch sequence is ordering: was the
//! hardware flag acknowledged before the handler ran, which multiplexed
//! sub-source went first. The bench records register-side events; handlers
//! installed through [`TracingProbe`] record their own invocation into the
//! same stream, so one list reconstructs the full sequence.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use vecmux_dispatch::{ExitHook, Isr, SrBits};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    /// A port flag was cleared. `port` is 1 or 2.
    Ack { port: u8, bit: u8 },
    /// A timer IV read reported a sub-source.
    TimerIv { timer: String, iv: u16 },
    /// A handler installed through [`TracingProbe`] ran.
    Handler { name: String },
    /// A deferred status-register request was applied on interrupt return.
    SrApplied { clear: u16, set: u16 },
}

/// Cloneable, shared event stream.
#[derive(Debug, Clone, Default)]
pub struct EventTrace {
    events: Arc<Mutex<Vec<TraceEvent>>>,
}

impl EventTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: TraceEvent) {
        self.events.lock().unwrap().push(event);
    }

    /// Current events, oldest first.
    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Drain the stream, returning what was in it.
    pub fn take(&self) -> Vec<TraceEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }
}

/// Handler that records its invocation and optionally requests a
/// status-register change on exit.
pub struct TracingProbe {
    name: &'static str,
    trace: EventTrace,
    clear_on_exit: SrBits,
    set_on_exit: SrBits,
}

impl TracingProbe {
    pub fn new(name: &'static str, trace: EventTrace) -> Self {
        Self {
            name,
            trace,
            clear_on_exit: SrBits::empty(),
            set_on_exit: SrBits::empty(),
        }
    }

    /// Make every invocation request `bits` be cleared on interrupt return.
    pub fn wake_with(mut self, bits: SrBits) -> Self {
        self.clear_on_exit = bits;
        self
    }

    pub fn set_on_exit(mut self, bits: SrBits) -> Self {
        self.set_on_exit = bits;
        self
    }

    /// Leak into the `'static` lifetime [`DispatchTable::install`] requires.
    ///
    /// [`DispatchTable::install`]: vecmux_dispatch::DispatchTable::install
    pub fn install_ref(self) -> &'static TracingProbe {
        Box::leak(Box::new(self))
    }
}

impl Isr for TracingProbe {
    fn on_interrupt(&self, exit: &ExitHook<'_>) {
        self.trace.record(TraceEvent::Handler {
            name: self.name.to_string(),
        });
        if !self.clear_on_exit.is_empty() {
            exit.clear_sr(self.clear_on_exit);
        }
        if !self.set_on_exit.is_empty() {
            exit.set_sr(self.set_on_exit);
        }
    }
}
