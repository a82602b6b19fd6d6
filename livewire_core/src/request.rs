//! Simulation requests: cycle count, per-cycle stimulus and observations.

use crate::bitvec::BitVector;
use crate::error::SimError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Everything the engine needs besides the circuit itself.
///
/// Serializes to JSON as:
///
/// ```json
/// {
///   "cycles": 2,
///   "inputs": { "0": { "a": { "value": 1, "width": 1 } } },
///   "observed": { "1": ["q"] }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimRequest {
    /// Number of clock edges to simulate (at least 1)
    pub cycles: u32,

    /// Input values per cycle
    #[serde(default)]
    pub inputs: BTreeMap<u32, BTreeMap<String, BitVector>>,

    /// Output names observed per cycle; these seed the liveness pass
    #[serde(default)]
    pub observed: BTreeMap<u32, BTreeSet<String>>,
}

impl SimRequest {
    /// Creates a request with no stimulus and no observations.
    pub fn new(cycles: u32) -> Self {
        Self {
            cycles,
            ..Default::default()
        }
    }

    /// Sets one input value on one cycle.
    pub fn with_input(mut self, cycle: u32, name: impl Into<String>, value: BitVector) -> Self {
        self.inputs.entry(cycle).or_default().insert(name.into(), value);
        self
    }

    /// Sets the same input value on every cycle.
    pub fn with_constant_input(mut self, name: impl Into<String>, value: BitVector) -> Self {
        let name = name.into();
        for cycle in 0..self.cycles {
            self.inputs.entry(cycle).or_default().insert(name.clone(), value);
        }
        self
    }

    /// Marks an output as observed on one cycle.
    pub fn observe(mut self, cycle: u32, name: impl Into<String>) -> Self {
        self.observed.entry(cycle).or_default().insert(name.into());
        self
    }

    /// Marks an output as observed on every cycle.
    pub fn observe_always(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        for cycle in 0..self.cycles {
            self.observed.entry(cycle).or_default().insert(name.clone());
        }
        self
    }

    /// Inputs for `cycle`, if any were given.
    pub fn inputs_at(&self, cycle: u32) -> Option<&BTreeMap<String, BitVector>> {
        self.inputs.get(&cycle)
    }

    /// Observed outputs for `cycle`, if any.
    pub fn observed_at(&self, cycle: u32) -> Option<&BTreeSet<String>> {
        self.observed.get(&cycle)
    }

    /// Total number of observed (cycle, name) pairs.
    pub fn observation_count(&self) -> usize {
        self.observed.values().map(|names| names.len()).sum()
    }

    /// Checks the request shape independent of any circuit.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.cycles < 1 {
            return Err(SimError::InvalidCycleCount(self.cycles));
        }
        if let Some(&cycle) = self.inputs.keys().find(|&&c| c >= self.cycles) {
            return Err(SimError::malformed(
                cycle,
                format!("inputs given past the last cycle ({})", self.cycles - 1),
            ));
        }
        for (&cycle, names) in self.observed.range(self.cycles..) {
            if let Some(name) = names.iter().next() {
                return Err(SimError::UnknownObservedOutput {
                    name: name.clone(),
                    cycle,
                });
            }
        }
        Ok(())
    }

    /// Parses a request from JSON.
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        serde_json::from_str(json).map_err(SimError::request)
    }

    /// Loads a request from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SimError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| SimError::request(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Serializes the request to pretty JSON.
    pub fn to_json(&self) -> Result<String, SimError> {
        serde_json::to_string_pretty(self).map_err(SimError::request)
    }
}
