// VecMux - MSP430 Interrupt Dispatch Layer
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! The bench: register models wired to a dispatch table.
//!
//! Stimuli latch flags exactly as hardware would; nothing dispatches until
//! [`Bench::service`] runs, which takes pending vectors one activation at a
//! time in hardware priority order (higher vector number first, the F5510's
//! arbitration). Sources without a modeled peripheral behind them (RTC,
//! USCI, DMA, USB, ADC, comparator, NMIs) are raised directly through
//! [`SimpleSource`].

use serde::Serialize;
use serde_json::json;
use vecmux_dispatch::trampolines;
use vecmux_dispatch::{
    DispatchTable, IntPort, Pin, PortId, Regs, SrBits, TimerId, VectorId,
};

use crate::port::IoPort;
use crate::signals::Level;
use crate::timer::TimerUnit;
use crate::trace::{EventTrace, TraceEvent};
use crate::BenchError;

/// Single-condition interrupt sources with no register model behind them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SimpleSource {
    Rtc,
    UsciB1,
    UsciA1,
    Dma,
    UsbUbm,
    Adc10,
    UsciB0,
    UsciA0,
    CompB,
    Unmi,
    SysNmi,
}

impl SimpleSource {
    /// The logical source this stimulus dispatches to.
    pub fn vector(self) -> VectorId {
        match self {
            SimpleSource::Rtc => VectorId::Rtc,
            SimpleSource::UsciB1 => VectorId::UsciB1,
            SimpleSource::UsciA1 => VectorId::UsciA1,
            SimpleSource::Dma => VectorId::Dma,
            SimpleSource::UsbUbm => VectorId::UsbUbm,
            SimpleSource::Adc10 => VectorId::Adc10,
            SimpleSource::UsciB0 => VectorId::UsciB0,
            SimpleSource::UsciA0 => VectorId::UsciA0,
            SimpleSource::CompB => VectorId::CompB,
            SimpleSource::Unmi => VectorId::Unmi,
            SimpleSource::SysNmi => VectorId::SysNmi,
        }
    }
}

/// Register models plus a dispatch table, driven from test code.
pub struct Bench {
    pub table: DispatchTable,
    pub p1: IoPort,
    pub p2: IoPort,
    pub ta0: TimerUnit,
    pub ta1: TimerUnit,
    pub ta2: TimerUnit,
    pub tb0: TimerUnit,
    gie: bool,
    latched: Vec<SimpleSource>,
    sr_applied: Vec<(SrBits, SrBits)>,
    trace: EventTrace,
}

/// Mutable register view handed to the trampolines for one activation.
struct HwView<'a> {
    p1: &'a mut IoPort,
    p2: &'a mut IoPort,
    ta0: &'a mut TimerUnit,
    ta1: &'a mut TimerUnit,
    ta2: &'a mut TimerUnit,
    tb0: &'a mut TimerUnit,
    sr_applied: &'a mut Vec<(SrBits, SrBits)>,
    trace: &'a EventTrace,
}

impl HwView<'_> {
    fn timer(&mut self, timer: TimerId) -> &mut TimerUnit {
        match timer {
            TimerId::Ta0 => self.ta0,
            TimerId::Ta1 => self.ta1,
            TimerId::Ta2 => self.ta2,
            TimerId::Tb0 => self.tb0,
        }
    }
}

impl Regs for HwView<'_> {
    fn port_flags(&mut self, port: IntPort) -> u8 {
        match port {
            IntPort::P1 => self.p1.flags(),
            IntPort::P2 => self.p2.flags(),
        }
    }

    fn port_ack(&mut self, port: IntPort, bit: u8) {
        let (model, number) = match port {
            IntPort::P1 => (&mut *self.p1, 1),
            IntPort::P2 => (&mut *self.p2, 2),
        };
        model.ack(bit);
        self.trace.record(TraceEvent::Ack { port: number, bit });
    }

    fn timer_iv(&mut self, timer: TimerId) -> u16 {
        let iv = self.timer(timer).iv_read();
        if iv != 0 {
            self.trace.record(TraceEvent::TimerIv {
                timer: format!("{timer:?}").to_uppercase(),
                iv,
            });
        }
        iv
    }

    fn sr_modify(&mut self, clear: SrBits, set: SrBits) {
        self.sr_applied.push((clear, set));
        self.trace.record(TraceEvent::SrApplied {
            clear: clear.bits(),
            set: set.bits(),
        });
    }
}

impl Bench {
    pub fn new() -> Self {
        Self {
            table: DispatchTable::new(),
            p1: IoPort::new(),
            p2: IoPort::new(),
            ta0: TimerUnit::new(),
            ta1: TimerUnit::new(),
            ta2: TimerUnit::new(),
            tb0: TimerUnit::new(),
            gie: false,
            latched: Vec::new(),
            sr_applied: Vec::new(),
            trace: EventTrace::new(),
        }
    }

    /// Shared event stream; clone it into probes before installing them.
    pub fn trace(&self) -> EventTrace {
        self.trace.clone()
    }

    /// Status-register modifications applied on interrupt return so far.
    pub fn sr_applied(&self) -> &[(SrBits, SrBits)] {
        &self.sr_applied
    }

    pub fn set_gie(&mut self, enabled: bool) {
        self.gie = enabled;
    }

    /// Drive a level onto an interrupt-capable pin.
    pub fn drive(&mut self, pin: Pin, level: Level) -> Result<(), BenchError> {
        let port = match pin.port {
            PortId::P1 => &mut self.p1,
            PortId::P2 => &mut self.p2,
            other => {
                return Err(BenchError::NotInterruptCapable {
                    port: port_number(other),
                    bit: pin.bit,
                })
            }
        };
        port.drive(pin.bit, level);
        Ok(())
    }

    /// Latch a single-condition source.
    pub fn raise(&mut self, source: SimpleSource) {
        if !self.latched.contains(&source) {
            self.latched.push(source);
        }
    }

    /// Latch a capture/compare flag.
    ///
    /// CCR0 flags are accepted only for timers whose dedicated vector is
    /// dispatched; TA0's CCR0 belongs to the clock layer in the default
    /// build, and latching it here would pend a flag nothing ever services.
    pub fn raise_cc(&mut self, timer: TimerId, cc: u8) -> Result<(), BenchError> {
        if cc == 0 && VectorId::for_timer(timer).is_none() {
            let name = format!("{timer:?}").to_lowercase();
            return Err(BenchError::SourceUnavailable(format!("{name}.cc0")));
        }
        self.timer_mut(timer).raise_cc(cc);
        Ok(())
    }

    pub fn raise_overflow(&mut self, timer: TimerId) {
        self.timer_mut(timer).raise_overflow();
    }

    fn timer_mut(&mut self, timer: TimerId) -> &mut TimerUnit {
        match timer {
            TimerId::Ta0 => &mut self.ta0,
            TimerId::Ta1 => &mut self.ta1,
            TimerId::Ta2 => &mut self.ta2,
            TimerId::Tb0 => &mut self.tb0,
        }
    }

    /// Service pending interrupts until quiescent.
    ///
    /// Returns the number of vector activations taken. Latched flags are
    /// left in place when global interrupts are disabled, exactly as
    /// hardware leaves them.
    pub fn service(&mut self) -> Result<usize, BenchError> {
        if !self.gie {
            return Err(BenchError::InterruptsDisabled);
        }
        let mut activations = 0;
        while self.fire_next() {
            activations += 1;
        }
        tracing::debug!(activations, "bench serviced");
        Ok(activations)
    }

    /// Take the single highest-priority pending vector, if any.
    fn fire_next(&mut self) -> bool {
        let Bench {
            table,
            p1,
            p2,
            ta0,
            ta1,
            ta2,
            tb0,
            latched,
            sr_applied,
            trace,
            ..
        } = self;

        let mut take = |s: SimpleSource| -> bool {
            match latched.iter().position(|&x| x == s) {
                Some(i) => {
                    latched.remove(i);
                    true
                }
                None => false,
            }
        };

        let mut view = HwView {
            p1,
            p2,
            ta0,
            ta1,
            ta2,
            tb0,
            sr_applied,
            trace,
        };

        // Hardware arbitration: higher vector number wins.
        if take(SimpleSource::SysNmi) {
            trampolines::sysnmi(table, &mut view);
        } else if take(SimpleSource::Unmi) {
            trampolines::unmi(table, &mut view);
        } else if take(SimpleSource::CompB) {
            trampolines::comp_b(table, &mut view);
        } else if view.tb0.cc0_pending() {
            view.tb0.take_cc0();
            trampolines::timer0_b0(table, &mut view);
        } else if view.tb0.iv_pending() {
            trampolines::timer0_b1(table, &mut view);
        } else if take(SimpleSource::UsciA0) {
            trampolines::usci_a0(table, &mut view);
        } else if take(SimpleSource::UsciB0) {
            trampolines::usci_b0(table, &mut view);
        } else if take(SimpleSource::Adc10) {
            trampolines::adc10(table, &mut view);
        } else if view.ta0.iv_pending() {
            trampolines::timer0_a1(table, &mut view);
        } else if take(SimpleSource::UsbUbm) {
            trampolines::usb_ubm(table, &mut view);
        } else if take(SimpleSource::Dma) {
            trampolines::dma(table, &mut view);
        } else if view.ta1.cc0_pending() {
            view.ta1.take_cc0();
            trampolines::timer1_a0(table, &mut view);
        } else if view.ta1.iv_pending() {
            trampolines::timer1_a1(table, &mut view);
        } else if view.p1.flags() != 0 {
            trampolines::port1(table, &mut view);
        } else if take(SimpleSource::UsciA1) {
            trampolines::usci_a1(table, &mut view);
        } else if take(SimpleSource::UsciB1) {
            trampolines::usci_b1(table, &mut view);
        } else if view.ta2.cc0_pending() {
            view.ta2.take_cc0();
            trampolines::timer2_a0(table, &mut view);
        } else if view.ta2.iv_pending() {
            trampolines::timer2_a1(table, &mut view);
        } else if view.p2.flags() != 0 {
            trampolines::port2(table, &mut view);
        } else if take(SimpleSource::Rtc) {
            trampolines::rtc(table, &mut view);
        } else {
            return false;
        }
        true
    }

    /// Register-visible state as JSON, for reports and assertions.
    pub fn snapshot(&self) -> serde_json::Value {
        json!({
            "gie": self.gie,
            "p1": self.p1,
            "p2": self.p2,
            "ta0": self.ta0,
            "ta1": self.ta1,
            "ta2": self.ta2,
            "tb0": self.tb0,
            "latched": self.latched,
        })
    }
}

impl Default for Bench {
    fn default() -> Self {
        Self::new()
    }
}

fn port_number(port: PortId) -> u8 {
    match port {
        PortId::P1 => 1,
        PortId::P2 => 2,
        PortId::P3 => 3,
        PortId::P4 => 4,
        PortId::P5 => 5,
        PortId::P6 => 6,
        PortId::PJ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_requires_gie() {
        let mut bench = Bench::new();
        bench.raise(SimpleSource::Dma);
        assert_eq!(bench.service(), Err(BenchError::InterruptsDisabled));
        // The stimulus is still latched.
        bench.set_gie(true);
        assert_eq!(bench.service(), Ok(1));
    }

    #[test]
    fn test_drive_rejects_non_interrupt_ports() {
        let mut bench = Bench::new();
        let err = bench
            .drive(Pin::new(PortId::P4, 2), Level::High)
            .unwrap_err();
        assert_eq!(err, BenchError::NotInterruptCapable { port: 4, bit: 2 });
    }

    #[test]
    fn test_clock_owned_cc0_stimulus_is_rejected() {
        let mut bench = Bench::new();
        let err = bench.raise_cc(TimerId::Ta0, 0).unwrap_err();
        assert_eq!(err, BenchError::SourceUnavailable("ta0.cc0".into()));
        // CCR1+ on the same timer reports through TA0IV and latches fine.
        bench.raise_cc(TimerId::Ta0, 1).unwrap();
        // Other timers' CCR0 vectors are dispatched.
        bench.raise_cc(TimerId::Ta1, 0).unwrap();
        assert!(bench.ta1.cc0_pending());
    }

    #[test]
    fn test_higher_vector_number_is_serviced_first() {
        let mut bench = Bench::new();
        let trace = bench.trace();
        bench
            .table
            .install(VectorId::Rtc, crate::TracingProbe::new("rtc", trace.clone()).install_ref());
        bench
            .table
            .install(VectorId::SysNmi, crate::TracingProbe::new("sysnmi", trace.clone()).install_ref());

        bench.raise(SimpleSource::Rtc);
        bench.raise(SimpleSource::SysNmi);
        bench.set_gie(true);
        assert_eq!(bench.service(), Ok(2));

        let names: Vec<_> = trace
            .events()
            .into_iter()
            .filter_map(|e| match e {
                TraceEvent::Handler { name } => Some(name),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["sysnmi", "rtc"]);
    }

    #[test]
    fn test_snapshot_reflects_latched_state() {
        let mut bench = Bench::new();
        bench.p1.set_enabled(3, true);
        bench.drive(Pin::new(PortId::P1, 3), Level::High).unwrap();
        let snap = bench.snapshot();
        assert_eq!(snap["p1"]["ifg"], 0b0000_1000);
        assert_eq!(snap["gie"], false);
    }
}
