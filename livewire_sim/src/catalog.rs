//! Name-based lookup of the built-in circuits, for the CLI.

use crate::circuits::{
    BinaryGate, Counter, GateOp, Mux4, NotGate, OrphanInputs, XorFeedback, XorFromNands,
};
use crate::error::HarnessError;
use livewire_core::{Circuit, LiveSet, SimConfig, SimRequest, SimRun, Simulator};
use std::path::Path;
use tracing::info;

/// Every name [`lookup`] accepts.
pub const CIRCUIT_NAMES: &[&str] = &[
    "and",
    "or",
    "xor",
    "nand",
    "nor",
    "not",
    "xor_from_nands",
    "xor_feedback",
    "orphan_inputs",
    "mux4",
    "counter",
];

/// Builds the circuit registered under `name`.
pub fn lookup(name: &str) -> Option<Box<dyn Circuit>> {
    let circuit: Box<dyn Circuit> = match name {
        "and" => Box::new(BinaryGate::new(GateOp::And)),
        "or" => Box::new(BinaryGate::new(GateOp::Or)),
        "xor" => Box::new(BinaryGate::new(GateOp::Xor)),
        "nand" => Box::new(BinaryGate::new(GateOp::Nand)),
        "nor" => Box::new(BinaryGate::new(GateOp::Nor)),
        "not" => Box::new(NotGate),
        "xor_from_nands" => Box::new(XorFromNands),
        "xor_feedback" => Box::new(XorFeedback),
        "orphan_inputs" => Box::new(OrphanInputs),
        "mux4" => Box::new(Mux4),
        "counter" => Box::new(Counter::default()),
        _ => return None,
    };
    Some(circuit)
}

/// Loads a JSON request from `path`, runs it against the circuit named
/// `name` and marks the live wires.
pub fn run_request_file<P: AsRef<Path>>(
    name: &str,
    path: P,
    config: SimConfig,
) -> Result<(SimRun, LiveSet), HarnessError> {
    let circuit = lookup(name).ok_or_else(|| HarnessError::UnknownCircuit(name.to_string()))?;
    let request = SimRequest::load(&path)?;
    info!("Loaded {} cycle request from {}", request.cycles, path.as_ref().display());

    let run = Simulator::new(config).run(circuit.as_ref(), &request)?;
    let live = run.liveness();
    Ok((run, live))
}
