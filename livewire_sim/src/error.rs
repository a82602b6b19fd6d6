//! Error types for the scenario harness and CLI.

use livewire_core::SimError;
use thiserror::Error;

/// Errors raised around, rather than inside, a simulation.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The simulator rejected the request or a circuit broke its contract
    #[error(transparent)]
    Sim(#[from] SimError),

    /// A scenario ran but its expectation did not hold
    #[error("Expectation failed: {0}")]
    Expectation(String),

    /// No catalog circuit with that name
    #[error("Unknown circuit: {0}")]
    UnknownCircuit(String),

    /// Export file could not be written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Export could not be serialized
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HarnessError {
    /// Creates an expectation failure.
    pub fn expectation(msg: impl Into<String>) -> Self {
        Self::Expectation(msg.into())
    }
}
