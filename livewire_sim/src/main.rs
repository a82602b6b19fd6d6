//! Livewire Simulator CLI
//!
//! Run liveness scenarios across seeds, or a JSON request against a
//! catalog circuit, and optionally dump the waveform.

use clap::Parser;
use livewire_core::{emit_waveform, LiveSet, LivenessAnalyzer, SimConfig, SimRun};
use livewire_sim::catalog;
use livewire_sim::{
    HarnessError, ScenarioId, ScenarioResult, ScenarioRunner, TraceExport, VcdWriter,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Livewire cycle simulator with observability analysis
#[derive(Parser, Debug)]
#[command(name = "livewire-sim")]
#[command(about = "Simulate circuits and mark the wires that mattered", long_about = None)]
struct Args {
    /// Master seed for stimulus (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Scenario to run (and_gate, xor_feedback, xor_from_nands, orphan_inputs,
    /// mux_dont_care, counter, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Number of consecutive seeds to test
    #[arg(long, default_value = "1")]
    seeds: usize,

    /// Cycles per simulation
    #[arg(short, long, default_value = "8")]
    cycles: u32,

    /// Catalog circuit to run a request file against
    #[arg(long, requires = "request")]
    circuit: Option<String>,

    /// JSON request file (cycles, inputs, observed)
    #[arg(long, requires = "circuit")]
    request: Option<String>,

    /// Accept inputs that do not match the circuit's declared ports
    #[arg(long)]
    lenient: bool,

    /// Write a VCD waveform to this file
    #[arg(long)]
    vcd: Option<String>,

    /// Export the trace to a JSON file
    #[arg(long)]
    export: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,
}

impl Args {
    fn config(&self) -> SimConfig {
        SimConfig {
            strict_ports: !self.lenient,
            ..Default::default()
        }
    }
}

/// Writes the requested waveform files for one finished run.
fn write_outputs(
    args: &Args,
    name: &str,
    seed: Option<u64>,
    run: &SimRun,
    live: &LiveSet,
    passed: bool,
) -> Result<(), HarnessError> {
    if let Some(path) = &args.vcd {
        let mut out = BufWriter::new(File::create(path)?);
        emit_waveform(run.trace(), Some(live), &mut VcdWriter::new(&mut out))?;
        out.flush()?;
        info!("Wrote VCD to {}", path);
    }

    if let Some(path) = &args.export {
        let analyzer = LivenessAnalyzer::new(run.trace());
        let mut export = TraceExport::new(name, seed);
        emit_waveform(run.trace(), Some(live), &mut export)?;
        export.finalize(passed, Some(&analyzer.report(live, run.roots().len())));
        export.write_to_file(path)?;
        info!("Exported {} frames to {}", export.frames.len(), path);
    }
    Ok(())
}

/// Runs a request file against a catalog circuit.
fn run_request(args: &Args, circuit_name: &str, request_path: &str) -> Result<(), HarnessError> {
    let (run, live) = catalog::run_request_file(circuit_name, request_path, args.config())?;
    let analyzer = LivenessAnalyzer::new(run.trace());
    let report = analyzer.report(&live, run.roots().len());
    let cycles = run.trace().cycles();

    if args.json {
        let dead: Vec<String> = analyzer.sweep(&live).iter().map(|k| k.to_string()).collect();
        let summary = serde_json::json!({
            "circuit": circuit_name,
            "cycles": cycles,
            "report": report,
            "live": live.keys().iter().map(|k| k.to_string()).collect::<Vec<_>>(),
            "dead": dead,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        info!(
            "{}: {} cycles, {} roots, {} live, {} dead",
            circuit_name, cycles, report.roots, report.total_live, report.total_dead
        );
        for key in live.keys() {
            info!("  live {}", key);
        }
    }

    write_outputs(args, circuit_name, None, &run, &live, true)
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        std::process::exit(1);
    }

    if !args.json {
        info!("Livewire Simulator v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    // Handle --circuit/--request mode
    if let (Some(circuit), Some(request)) = (&args.circuit, &args.request) {
        if let Err(e) = run_request(&args, circuit, request) {
            error!("✗ {} FAILED: {}", circuit, e);
            std::process::exit(1);
        }
        return;
    }

    // Parse scenarios
    let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
        ScenarioId::all()
    } else {
        vec![args.scenario.parse().unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            let names: Vec<&str> = ScenarioId::all().iter().map(|s| s.name()).collect();
            eprintln!("Available scenarios: {}, all", names.join(", "));
            std::process::exit(1);
        })]
    };

    let dumping = args.vcd.is_some() || args.export.is_some();
    if dumping && (scenarios.len() > 1 || args.seeds > 1) {
        eprintln!("Error: --vcd/--export only support a single scenario and seed");
        std::process::exit(1);
    }

    // Determine base seed
    let base_seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42)
    } else {
        args.seed
    };

    // Track results
    let mut all_results: Vec<ScenarioResult> = Vec::new();
    let mut failed_count = 0;

    for seed_offset in 0..args.seeds {
        let seed = base_seed.wrapping_add(seed_offset as u64);

        let runner = ScenarioRunner::new(seed)
            .with_cycles(args.cycles)
            .with_config(args.config());

        for scenario in &scenarios {
            let mut result = runner.run(*scenario);

            if !args.json {
                if result.passed {
                    info!(
                        "✓ {} (seed={}) PASSED: {} live / {} dead",
                        scenario.name(),
                        seed,
                        result.metrics.live,
                        result.metrics.dead
                    );
                } else {
                    error!(
                        "✗ {} (seed={}) FAILED: {}",
                        scenario.name(),
                        seed,
                        result.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }

            let write_error = match (&result.run, &result.live) {
                (Some(run), Some(live)) => {
                    let name = scenario.name();
                    write_outputs(&args, name, Some(seed), run, live, result.passed).err()
                }
                _ => None,
            };
            if let Some(e) = write_error {
                error!("Failed to write waveform: {}", e);
                result.passed = false;
                result.failure_reason = Some(e.to_string());
            }

            if !result.passed {
                failed_count += 1;
            }

            all_results.push(result);
        }
    }

    // Summary
    let total = all_results.len();
    let passed = total - failed_count;

    if args.json {
        // JSON output for CI parsing
        let summary = serde_json::json!({
            "total": total,
            "passed": passed,
            "failed": failed_count,
            "results": all_results.iter().map(|r| {
                serde_json::json!({
                    "scenario": r.scenario.name(),
                    "seed": r.seed,
                    "passed": r.passed,
                    "cycles": r.cycles,
                    "wires": r.metrics.wires,
                    "live": r.metrics.live,
                    "dead": r.metrics.dead,
                    "failure_reason": r.failure_reason,
                })
            }).collect::<Vec<_>>(),
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Failed to serialize summary: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        info!("");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        if failed_count == 0 {
            info!("✅ All {} scenario runs passed!", total);
        } else {
            error!("❌ {}/{} scenario runs failed!", failed_count, total);

            // List failed seeds
            for result in &all_results {
                if !result.passed {
                    error!(
                        "  - {} seed={}: {}",
                        result.scenario.name(),
                        result.seed,
                        result.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }
        }
    }

    // Exit with proper code for CI
    if failed_count > 0 {
        std::process::exit(1);
    }
}
