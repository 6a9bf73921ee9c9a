// VecMux - MSP430 Interrupt Dispatch Layer
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};

use vecmux_dispatch::PortId;
use vecmux_testbench::{Bench, TraceEvent, TracingProbe};

mod script;

use script::{Edge, Step};

const EXIT_PASS: u8 = 0;
const EXIT_EXPECT_FAIL: u8 = 1;
const EXIT_CONFIG_ERROR: u8 = 2;
const EXIT_RUNTIME_ERROR: u8 = 3;

const REPORT_SCHEMA_VERSION: &str = "1.0";

#[derive(Parser, Debug)]
#[command(author, version, about = "VecMux interrupt dispatch scenario runner", long_about = None)]
struct Cli {
    /// Enable debug-level tracing
    #[arg(short, long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a scenario script (YAML) against the bench.
    Run(RunArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Path to the scenario script (YAML)
    #[arg(short = 'c', long)]
    script: PathBuf,

    /// Print the report as JSON instead of a summary
    #[arg(long)]
    json: bool,

    /// Write the JSON report to a file as well
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct Report {
    report_schema_version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    status: String,
    activations: usize,
    handlers: BTreeMap<String, u32>,
    expectations: Vec<ExpectationResult>,
    events: Vec<TraceEvent>,
    snapshot: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ExpectationResult {
    handler: String,
    expected: u32,
    observed: u32,
    passed: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .init();
    }

    match cli.command {
        Commands::Run(args) => run(args),
    }
}

fn run(args: RunArgs) -> ExitCode {
    let text = match std::fs::read_to_string(&args.script) {
        Ok(text) => text,
        Err(e) => {
            error!("Failed to read script {:?}: {}", args.script, e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };
    let script = match script::load(&text) {
        Ok(script) => script,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    let mut bench = Bench::new();
    let trace = bench.trace();

    for spec in &script.probes {
        let id = match script::parse_source(&spec.source) {
            Ok(id) => id,
            Err(e) => {
                error!("probe '{}': {:#}", spec.name, e);
                return ExitCode::from(EXIT_CONFIG_ERROR);
            }
        };
        let name: &'static str = Box::leak(spec.name.clone().into_boxed_str());
        let mut probe = TracingProbe::new(name, trace.clone());
        if let Some(wake) = &spec.wake {
            match script::parse_wake(wake) {
                Ok(bits) => probe = probe.wake_with(bits),
                Err(e) => {
                    error!("probe '{}': {:#}", spec.name, e);
                    return ExitCode::from(EXIT_CONFIG_ERROR);
                }
            }
        }
        bench.table.install(id, probe.install_ref());
        info!(probe = %spec.name, source = %spec.source, "installed");
    }

    let mut activations = 0usize;
    for step in &script.steps {
        if let Err(code) = apply_step(&mut bench, step, &mut activations) {
            return code;
        }
    }

    let events = trace.events();
    let mut handlers: BTreeMap<String, u32> = BTreeMap::new();
    for event in &events {
        if let TraceEvent::Handler { name } = event {
            *handlers.entry(name.clone()).or_default() += 1;
        }
    }

    let mut all_passed = true;
    let expectations: Vec<ExpectationResult> = script
        .expect
        .iter()
        .map(|e| {
            let observed = handlers.get(&e.handler).copied().unwrap_or(0);
            let passed = observed == e.count;
            all_passed &= passed;
            ExpectationResult {
                handler: e.handler.clone(),
                expected: e.count,
                observed,
                passed,
            }
        })
        .collect();

    let report = Report {
        report_schema_version: REPORT_SCHEMA_VERSION,
        name: script.name.clone(),
        status: if all_passed { "pass" } else { "fail" }.to_string(),
        activations,
        handlers,
        expectations,
        events,
        snapshot: bench.snapshot(),
    };

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!("Failed to serialize report: {}", e);
                return ExitCode::from(EXIT_RUNTIME_ERROR);
            }
        }
    } else {
        info!(activations = report.activations, status = %report.status, "scenario finished");
        for result in &report.expectations {
            let mark = if result.passed { "ok" } else { "FAIL" };
            println!(
                "{mark:>4}  {}: expected {} invocation(s), observed {}",
                result.handler, result.expected, result.observed
            );
        }
    }

    if let Some(path) = &args.output {
        let json = match serde_json::to_vec_pretty(&report) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize report: {}", e);
                return ExitCode::from(EXIT_RUNTIME_ERROR);
            }
        };
        if let Err(e) = std::fs::write(path, json) {
            error!("Failed to write report {:?}: {}", path, e);
            return ExitCode::from(EXIT_RUNTIME_ERROR);
        }
    }

    if all_passed {
        ExitCode::from(EXIT_PASS)
    } else {
        ExitCode::from(EXIT_EXPECT_FAIL)
    }
}

fn apply_step(bench: &mut Bench, step: &Step, activations: &mut usize) -> Result<(), ExitCode> {
    match step {
        Step::Configure { pin, edge, enable } => {
            let pin = parse_or_config(script::parse_pin(pin))?;
            let port = match pin.port {
                PortId::P1 => &mut bench.p1,
                PortId::P2 => &mut bench.p2,
                other => {
                    error!("port {:?} is not interrupt-capable", other);
                    return Err(ExitCode::from(EXIT_CONFIG_ERROR));
                }
            };
            port.select_edge(pin.bit, matches!(edge, Edge::Falling));
            port.set_enabled(pin.bit, *enable);
        }
        Step::Drive { pin, level } => {
            let pin = parse_or_config(script::parse_pin(pin))?;
            if let Err(e) = bench.drive(pin, *level) {
                error!("{}", e);
                return Err(ExitCode::from(EXIT_CONFIG_ERROR));
            }
        }
        Step::Gie(enabled) => bench.set_gie(*enabled),
        Step::Service => match bench.service() {
            Ok(taken) => *activations += taken,
            Err(e) => {
                error!("service failed: {}", e);
                return Err(ExitCode::from(EXIT_RUNTIME_ERROR));
            }
        },
        Step::Raise(source) => {
            let source = parse_or_config(script::parse_simple(source))?;
            bench.raise(source);
        }
        Step::RaiseCc { timer, cc } => {
            let timer = parse_or_config(script::parse_timer(timer))?;
            if *cc > 6 {
                error!("capture/compare index {} out of range", cc);
                return Err(ExitCode::from(EXIT_CONFIG_ERROR));
            }
            if let Err(e) = bench.raise_cc(timer, *cc) {
                error!("{}", e);
                return Err(ExitCode::from(EXIT_CONFIG_ERROR));
            }
        }
        Step::RaiseOverflow(timer) => {
            let timer = parse_or_config(script::parse_timer(timer))?;
            bench.raise_overflow(timer);
        }
    }
    Ok(())
}

fn parse_or_config<T>(result: anyhow::Result<T>) -> Result<T, ExitCode> {
    result.map_err(|e| {
        error!("{:#}", e);
        ExitCode::from(EXIT_CONFIG_ERROR)
    })
}
