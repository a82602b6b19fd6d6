//! Livewire Scenario Harness
//!
//! Circuit fixtures, seeded stimulus and end-to-end liveness scenarios for
//! `livewire_core`, plus the waveform sinks used by the `livewire-sim` CLI.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐  SimRequest  ┌───────────┐  Trace + roots  ┌──────────────────┐
//! │  Stimulus  ├─────────────►│ Simulator ├────────────────►│ LivenessAnalyzer │
//! │ (ChaCha8)  │              └─────▲─────┘                 └────────┬─────────┘
//! └────────────┘                    │ Circuit                        │ LiveSet
//!                             ┌─────┴─────┐                 ┌────────▼─────────┐
//!                             │ circuits  │                 │ VcdWriter /      │
//!                             │ (fixtures)│                 │ TraceExport      │
//!                             └───────────┘                 └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use livewire_sim::{ScenarioId, ScenarioRunner};
//!
//! let result = ScenarioRunner::new(42).with_cycles(4).run(ScenarioId::OrphanInputs);
//! assert!(result.passed);
//! ```

pub mod catalog;
pub mod circuits;
mod error;
mod exporter;
mod runner;
pub mod scenarios;
mod stimulus;
mod vcd;

pub use error::HarnessError;
pub use exporter::{ExportFrame, LivenessSummary, SampleValue, SignalInfo, TraceExport};
pub use runner::{ScenarioMetrics, ScenarioResult, ScenarioRunner};
pub use scenarios::ScenarioId;
pub use stimulus::Stimulus;
pub use vcd::VcdWriter;
