//! Livewire Core - Cycle-Accurate Simulation with Observability Analysis
//!
//! Simulates synchronous digital circuits cycle by cycle while recording,
//! for every value computed, which other values actually determined it.
//! After a run, a mark-and-sweep pass seeded by the observed outputs finds
//! the minimal set of wires that influenced them:
//! 1. **Provenance**: every wire carries edges to the wires it was computed from
//! 2. **Sensitivity**: gate rules prune don't-care operands (a 0 into an AND
//!    decides the result alone)
//! 3. **Liveness**: backward traversal from the roots across register
//!    boundaries marks what mattered; the rest is a don't-care for this run
//!
//! # Example
//!
//! ```
//! use livewire_core::{BitVector, Circuit, SimError, SimRequest, Simulator, WireBundle};
//!
//! struct AndGate;
//!
//! impl Circuit for AndGate {
//!     fn transition(
//!         &self,
//!         _state: &WireBundle,
//!         inputs: &WireBundle,
//!         _next_state: &mut WireBundle,
//!         outputs: &mut WireBundle,
//!     ) -> Result<(), SimError> {
//!         outputs.set("q", inputs.get("a")?.and(inputs.get("b")?))
//!     }
//! }
//!
//! let request = SimRequest::new(1)
//!     .with_input(0, "a", BitVector::bit(true))
//!     .with_input(0, "b", BitVector::bit(false))
//!     .observe(0, "q");
//!
//! let run = Simulator::default().run(&AndGate, &request)?;
//! let live = run.liveness();
//! assert!(live.is_live("b", 0));
//! assert!(!live.is_live("a", 0));
//! # Ok::<(), SimError>(())
//! ```

pub mod bitvec;
pub mod bundle;
pub mod circuit;
pub mod engine;
pub mod error;
pub mod liveness;
pub mod request;
pub mod sensitivity;
pub mod waveform;
pub mod wire;

// Re-export key types for convenience
pub use bitvec::{BitVector, CmpOp, MAX_WIDTH};
pub use bundle::{BundleRole, Drive, WireBundle};
pub use circuit::{Circuit, PortSpec};
pub use engine::{CycleFrame, SimConfig, SimRun, Simulator, Trace};
pub use error::{ErrorKind, SimError};
pub use liveness::{CycleLiveness, LiveSet, LivenessAnalyzer, LivenessReport};
pub use request::SimRequest;
pub use waveform::{emit_waveform, Sample, SignalDecl, WaveformSink};
pub use wire::{mux, OpResult, Wire, WireKey};
