//! Error types for the Livewire simulator.

use crate::bundle::BundleRole;
use thiserror::Error;

/// Broad classification of a [`SimError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The simulation request or configuration is invalid; nothing was run.
    Config,

    /// A circuit implementation broke the transition contract mid-run.
    Contract,

    /// Operands have widths no result-width rule accepts.
    Width,

    /// The waveform sink failed while consuming a finished trace.
    Sink,
}

/// Errors that can occur while building or running a simulation.
///
/// None of these are retried. Each carries the signal name, cycle and
/// operation needed to locate the fault in the circuit or request.
#[derive(Debug, Error)]
pub enum SimError {
    /// Requested cycle count is below one
    #[error("Invalid cycle count {0}: must simulate for at least 1 cycle")]
    InvalidCycleCount(u32),

    /// Requested cycle count exceeds the configured cap
    #[error("Cycle count {cycles} exceeds the limit of {max}")]
    CycleLimit { cycles: u32, max: u32 },

    /// Bit-vector width outside 1..=64
    #[error("Invalid bit-vector width {0}: must be between 1 and 64")]
    InvalidWidth(u32),

    /// Per-cycle inputs do not match the request or circuit
    #[error("Malformed inputs for cycle {cycle}: {reason}")]
    MalformedInputs { cycle: u32, reason: String },

    /// Observed output is not produced by the circuit on that cycle
    #[error("Observed output '{name}' is not produced on cycle {cycle}")]
    UnknownObservedOutput { name: String, cycle: u32 },

    /// Request could not be parsed
    #[error("Invalid simulation request: {0}")]
    InvalidRequest(String),

    /// Write attempted after the bundle was frozen
    #[error("Cannot write '{name}' to frozen {role} bundle on cycle {cycle}")]
    FrozenBundle { name: String, role: BundleRole, cycle: u32 },

    /// Same name assigned twice in one bundle
    #[error("Wire '{name}' already assigned in {role} bundle on cycle {cycle}")]
    DuplicateWire { name: String, role: BundleRole, cycle: u32 },

    /// Wire would take provenance from a later cycle
    #[error("Wire '{name}' on cycle {cycle} cannot read future wire {future}")]
    FutureSource { name: String, cycle: u32, future: String },

    /// Read of a name the bundle does not contain
    #[error("No wire '{name}' in {role} bundle on cycle {cycle}")]
    MissingWire { name: String, role: BundleRole, cycle: u32 },

    /// Mux select addresses a data candidate that does not exist
    #[error("Mux select '{select}'@{cycle} = {index} out of range for {candidates} candidates")]
    MuxSelectOutOfRange {
        select: String,
        cycle: u32,
        index: u64,
        candidates: usize,
    },

    /// Circuit did not populate a declared output
    #[error("Circuit '{circuit}' did not drive output '{name}' on cycle {cycle}")]
    MissingOutput { circuit: String, name: String, cycle: u32 },

    /// Operator applied to operands of incompatible widths
    #[error("Width mismatch in {op}: {left} vs {right} bits")]
    WidthMismatch { op: &'static str, left: u32, right: u32 },

    /// Waveform sink I/O failure
    #[error("Waveform sink error: {0}")]
    Sink(#[from] std::io::Error),
}

impl SimError {
    /// Creates a malformed-inputs error.
    pub fn malformed(cycle: u32, reason: impl Into<String>) -> Self {
        Self::MalformedInputs {
            cycle,
            reason: reason.into(),
        }
    }

    /// Creates a request parse error.
    pub fn request(msg: impl std::fmt::Display) -> Self {
        Self::InvalidRequest(msg.to_string())
    }

    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SimError::InvalidCycleCount(_)
            | SimError::CycleLimit { .. }
            | SimError::InvalidWidth(_)
            | SimError::MalformedInputs { .. }
            | SimError::UnknownObservedOutput { .. }
            | SimError::InvalidRequest(_) => ErrorKind::Config,
            SimError::FrozenBundle { .. }
            | SimError::DuplicateWire { .. }
            | SimError::FutureSource { .. }
            | SimError::MissingWire { .. }
            | SimError::MuxSelectOutOfRange { .. }
            | SimError::MissingOutput { .. } => ErrorKind::Contract,
            SimError::WidthMismatch { .. } => ErrorKind::Width,
            SimError::Sink(_) => ErrorKind::Sink,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(SimError::InvalidCycleCount(0).kind(), ErrorKind::Config);
        assert_eq!(SimError::malformed(3, "missing a").kind(), ErrorKind::Config);
        assert_eq!(SimError::CycleLimit { cycles: 9, max: 8 }.kind(), ErrorKind::Config);

        let frozen = SimError::FrozenBundle {
            name: "q".into(),
            role: BundleRole::Output,
            cycle: 2,
        };
        assert_eq!(frozen.kind(), ErrorKind::Contract);

        let width = SimError::WidthMismatch { op: "sub", left: 4, right: 8 };
        assert_eq!(width.kind(), ErrorKind::Width);
    }

    #[test]
    fn test_error_messages_carry_context() {
        let err = SimError::MissingWire {
            name: "m".into(),
            role: BundleRole::State,
            cycle: 7,
        };
        let msg = err.to_string();
        assert!(msg.contains("'m'"));
        assert!(msg.contains("state"));
        assert!(msg.contains('7'));
    }
}
