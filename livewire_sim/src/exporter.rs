//! JSON exporter for offline waveform inspection.
//!
//! Collects a trace through the [`WaveformSink`] interface and writes it as
//! one pretty-printed JSON document.

use livewire_core::{LivenessReport, Sample, SignalDecl, SimError, WaveformSink};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;

/// A declared signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalInfo {
    pub name: String,
    pub width: u32,
}

/// One signal's value on one cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleValue {
    pub value: u64,
    pub width: u32,
    pub live: bool,
}

/// All signals on one cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportFrame {
    pub cycle: u32,
    pub samples: BTreeMap<String, SampleValue>,
}

/// Complete trace export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceExport {
    /// Circuit or scenario name
    pub circuit: String,

    /// Seed used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Signals in declaration order
    pub signals: Vec<SignalInfo>,

    /// All cycles, including the final state
    pub frames: Vec<ExportFrame>,

    /// Final results
    pub passed: bool,

    /// Liveness summary if analysis ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liveness: Option<LivenessSummary>,
}

/// Serializable copy of a [`LivenessReport`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessSummary {
    pub roots: usize,
    pub total_live: usize,
    pub total_dead: usize,
    /// `(cycle, live, dead)` per cycle
    pub cycles: Vec<(u32, usize, usize)>,
}

impl From<&LivenessReport> for LivenessSummary {
    fn from(report: &LivenessReport) -> Self {
        Self {
            roots: report.roots,
            total_live: report.total_live,
            total_dead: report.total_dead,
            cycles: report.cycles.iter().map(|c| (c.cycle, c.live, c.dead)).collect(),
        }
    }
}

impl TraceExport {
    /// Creates a new export container.
    pub fn new(circuit: &str, seed: Option<u64>) -> Self {
        Self {
            circuit: circuit.to_string(),
            seed,
            signals: Vec::new(),
            frames: Vec::new(),
            passed: false,
            liveness: None,
        }
    }

    /// Finalizes the export.
    pub fn finalize(&mut self, passed: bool, report: Option<&LivenessReport>) {
        self.passed = passed;
        self.liveness = report.map(LivenessSummary::from);
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

impl WaveformSink for TraceExport {
    fn declare(&mut self, signals: &[SignalDecl]) -> Result<(), SimError> {
        self.signals = signals
            .iter()
            .map(|d| SignalInfo {
                name: d.name.clone(),
                width: d.width,
            })
            .collect();
        Ok(())
    }

    fn cycle(&mut self, cycle: u32, samples: &BTreeMap<String, Sample>) -> Result<(), SimError> {
        let samples = samples
            .iter()
            .map(|(name, s)| {
                let value = SampleValue {
                    value: s.value.value(),
                    width: s.value.width(),
                    live: s.live,
                };
                (name.clone(), value)
            })
            .collect();
        self.frames.push(ExportFrame { cycle, samples });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuits::OrphanInputs;
    use livewire_core::{emit_waveform, BitVector, LivenessAnalyzer, SimRequest, Simulator};

    #[test]
    fn test_export_collects_frames() {
        let req = SimRequest::new(1)
            .with_input(0, "a", BitVector::bit(true))
            .with_input(0, "b", BitVector::bit(true))
            .with_input(0, "c", BitVector::bit(false))
            .with_input(0, "d", BitVector::bit(true))
            .observe(0, "q");
        let run = Simulator::default().run(&OrphanInputs, &req).unwrap();
        let analyzer = LivenessAnalyzer::new(run.trace());
        let live = analyzer.mark(run.roots());

        let mut export = TraceExport::new("orphan_inputs", Some(5));
        emit_waveform(run.trace(), Some(&live), &mut export).unwrap();
        export.finalize(true, Some(&analyzer.report(&live, run.roots().len())));

        assert_eq!(export.frames.len(), 2);
        let cycle0 = &export.frames[0].samples;
        assert!(cycle0["in.a"].live);
        assert!(!cycle0["in.c"].live);
        assert_eq!(cycle0["out.q"].value, 1);

        let json = serde_json::to_value(&export).unwrap();
        assert_eq!(json["circuit"], "orphan_inputs");
        assert_eq!(json["seed"], 5);
        assert_eq!(json["liveness"]["roots"], 1);
    }

    #[test]
    fn test_write_to_file() {
        let path =
            std::env::temp_dir().join(format!("livewire_export_{}.json", std::process::id()));
        let path = path.to_string_lossy().to_string();
        let export = TraceExport::new("empty", None);
        export.write_to_file(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let back: TraceExport = serde_json::from_str(&text).unwrap();
        assert_eq!(back.circuit, "empty");
        assert!(back.seed.is_none());
        std::fs::remove_file(&path).unwrap();
    }
}
