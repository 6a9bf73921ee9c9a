// VecMux - MSP430 Interrupt Dispatch Layer
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Scenario script format (YAML) and the source-name grammar.
//!
//! Sources are named the way datasheets talk about them: `p1.3` for a pin,
//! `ta1.cc2` / `tb0.ovf` for timer sub-sources, bare lowercase names
//! (`dma`, `usci-a0`, ...) for single-condition vectors.

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use vecmux_dispatch::{Pin, PortId, SrBits, TimerId, VectorId};
use vecmux_testbench::{Level, SimpleSource};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    pub name: Option<String>,
    #[serde(default)]
    pub probes: Vec<ProbeSpec>,
    // Steps are single-key maps ("- drive: {...}") or bare strings
    // ("- service"), not YAML-tagged values.
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub expect: Vec<Expectation>,
}

/// A named handler to install before the scenario runs.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeSpec {
    pub name: String,
    pub source: String,
    /// Optional LPM mask (`lpm0`..`lpm4`) the handler requests cleared on
    /// interrupt return.
    pub wake: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    /// Set a pin's edge select and interrupt enable.
    Configure {
        pin: String,
        #[serde(default)]
        edge: Edge,
        #[serde(default = "default_true")]
        enable: bool,
    },
    /// Drive a level onto a pin.
    Drive { pin: String, level: Level },
    /// Set the bench's global-interrupt-enable.
    Gie(bool),
    /// Take pending vectors until quiescent.
    Service,
    /// Latch a single-condition source.
    Raise(String),
    /// Latch a timer capture/compare flag.
    RaiseCc { timer: String, cc: u8 },
    /// Latch a timer overflow flag.
    RaiseOverflow(String),
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    #[default]
    Rising,
    Falling,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Expectation {
    pub handler: String,
    pub count: u32,
}

fn default_true() -> bool {
    true
}

pub fn load(text: &str) -> Result<Script> {
    serde_yaml::from_str(text).context("failed to parse scenario script")
}

/// `p1.3` and friends.
pub fn parse_pin(name: &str) -> Result<Pin> {
    let (port, bit) = name
        .split_once('.')
        .ok_or_else(|| anyhow!("bad pin name '{name}', expected e.g. 'p1.3'"))?;
    let port = match port {
        "p1" => PortId::P1,
        "p2" => PortId::P2,
        "p3" => PortId::P3,
        "p4" => PortId::P4,
        "p5" => PortId::P5,
        "p6" => PortId::P6,
        "pj" => PortId::PJ,
        other => bail!("unknown port '{other}' in pin name '{name}'"),
    };
    let bit: u8 = bit
        .parse()
        .with_context(|| format!("bad bit in pin name '{name}'"))?;
    if bit > 7 {
        bail!("bit out of range in pin name '{name}'");
    }
    Ok(Pin::new(port, bit))
}

pub fn parse_timer(name: &str) -> Result<TimerId> {
    match name {
        "ta0" => Ok(TimerId::Ta0),
        "ta1" => Ok(TimerId::Ta1),
        "ta2" => Ok(TimerId::Ta2),
        "tb0" => Ok(TimerId::Tb0),
        other => bail!("unknown timer '{other}'"),
    }
}

pub fn parse_simple(name: &str) -> Result<SimpleSource> {
    match name {
        "rtc" => Ok(SimpleSource::Rtc),
        "usci-b1" => Ok(SimpleSource::UsciB1),
        "usci-a1" => Ok(SimpleSource::UsciA1),
        "dma" => Ok(SimpleSource::Dma),
        "usb" => Ok(SimpleSource::UsbUbm),
        "adc10" => Ok(SimpleSource::Adc10),
        "usci-b0" => Ok(SimpleSource::UsciB0),
        "usci-a0" => Ok(SimpleSource::UsciA0),
        "comp-b" => Ok(SimpleSource::CompB),
        "unmi" => Ok(SimpleSource::Unmi),
        "sysnmi" => Ok(SimpleSource::SysNmi),
        other => bail!("unknown source '{other}'"),
    }
}

pub fn parse_wake(name: &str) -> Result<SrBits> {
    match name {
        "lpm0" => Ok(SrBits::LPM0),
        "lpm1" => Ok(SrBits::LPM1),
        "lpm2" => Ok(SrBits::LPM2),
        "lpm3" => Ok(SrBits::LPM3),
        "lpm4" => Ok(SrBits::LPM4),
        other => bail!("unknown low-power mode '{other}'"),
    }
}

fn overflow_vector(timer: TimerId) -> VectorId {
    match timer {
        TimerId::Ta0 => VectorId::Ta0Ifg,
        TimerId::Ta1 => VectorId::Ta1Ifg,
        TimerId::Ta2 => VectorId::Ta2Ifg,
        TimerId::Tb0 => VectorId::Tb0Ifg,
    }
}

/// Resolve a probe's source name to its logical vector.
pub fn parse_source(name: &str) -> Result<VectorId> {
    if let Some((timer, sub)) = name.split_once('.') {
        if let Ok(timer) = parse_timer(timer) {
            if sub == "ovf" {
                return Ok(overflow_vector(timer));
            }
            let cc: u8 = sub
                .strip_prefix("cc")
                .and_then(|n| n.parse().ok())
                .ok_or_else(|| anyhow!("bad timer sub-source '{sub}' in '{name}'"))?;
            return VectorId::for_timer_cc(timer, cc)
                .ok_or_else(|| anyhow!("source '{name}' is not available in this build"));
        }
        let pin = parse_pin(name)?;
        return VectorId::for_pin(pin)
            .ok_or_else(|| anyhow!("pin '{name}' cannot raise interrupts in this build"));
    }
    Ok(parse_simple(name)?.vector())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pin_names() {
        assert_eq!(parse_pin("p1.3").unwrap(), Pin::new(PortId::P1, 3));
        assert_eq!(parse_pin("p2.0").unwrap(), Pin::new(PortId::P2, 0));
        assert!(parse_pin("p7.1").is_err());
        assert!(parse_pin("p1.9").is_err());
        assert!(parse_pin("p13").is_err());
    }

    #[test]
    fn test_parse_source_names() {
        assert_eq!(parse_source("p1.3").unwrap(), VectorId::P1_3);
        assert_eq!(parse_source("ta1.cc2").unwrap(), VectorId::Ta1Cc2);
        assert_eq!(parse_source("tb0.ovf").unwrap(), VectorId::Tb0Ifg);
        assert_eq!(parse_source("dma").unwrap(), VectorId::Dma);
        assert_eq!(parse_source("usci-a0").unwrap(), VectorId::UsciA0);
        assert!(parse_source("ta1.cc7").is_err());
        assert!(parse_source("nonsense").is_err());
        // TA0 CCR0 is owned by the clock layer in the default build.
        assert!(parse_source("ta0.cc0").is_err());
        // P4 pins cannot raise interrupts.
        assert!(parse_source("p4.2").is_err());
    }

    #[test]
    fn test_parse_wake_masks() {
        assert_eq!(parse_wake("lpm3").unwrap(), SrBits::LPM3);
        assert!(parse_wake("lpm9").is_err());
    }

    #[test]
    fn test_script_yaml_round() {
        let text = r#"
name: switch-demo
probes:
  - name: sw1
    source: p1.3
    wake: lpm3
steps:
  - configure: { pin: p1.3, edge: falling }
  - gie: true
  - drive: { pin: p1.3, level: high }
  - drive: { pin: p1.3, level: low }
  - service
expect:
  - { handler: sw1, count: 1 }
"#;
        let script = load(text).unwrap();
        assert_eq!(script.name.as_deref(), Some("switch-demo"));
        assert_eq!(script.probes.len(), 1);
        assert_eq!(script.steps.len(), 5);
        assert_eq!(script.expect[0].count, 1);
        assert!(matches!(script.steps[4], Step::Service));
    }

    #[test]
    fn test_every_step_form_parses() {
        let text = r#"
steps:
  - configure: { pin: p2.0, edge: rising, enable: false }
  - drive: { pin: p2.0, level: low }
  - gie: false
  - service
  - raise: sysnmi
  - raise-cc: { timer: tb0, cc: 3 }
  - raise-overflow: ta2
"#;
        let script = load(text).unwrap();
        assert_eq!(script.steps.len(), 7);
        assert!(matches!(
            script.steps[0],
            Step::Configure { enable: false, .. }
        ));
        assert!(
            matches!(script.steps[5], Step::RaiseCc { ref timer, cc: 3 } if timer == "tb0")
        );
        assert!(matches!(script.steps[6], Step::RaiseOverflow(ref t) if t == "ta2"));
    }

    #[test]
    fn test_script_rejects_unknown_fields() {
        assert!(load("steps: []\nbogus: 1\n").is_err());
    }
}
