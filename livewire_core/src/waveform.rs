//! Hand-off of a finished trace to a waveform sink.
//!
//! The core knows nothing about file formats. It walks a completed trace in
//! cycle order and hands each cycle's wires to a [`WaveformSink`] as a flat
//! map from role-qualified signal name to value and liveness. Emission runs
//! after simulation and analysis, so a sink can never influence results.

use crate::bitvec::BitVector;
use crate::engine::Trace;
use crate::error::SimError;
use crate::liveness::LiveSet;
use std::collections::BTreeMap;
use tracing::debug;

/// A signal as declared to the sink before any samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalDecl {
    /// Role-qualified name, e.g. `out.q`
    pub name: String,

    /// Widest value seen for this signal across the trace
    pub width: u32,
}

/// One signal's value on one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub value: BitVector,

    /// False only for wires outside the marked live set
    pub live: bool,
}

/// Consumer of a named-signal time series.
pub trait WaveformSink {
    /// Called once, before the first cycle.
    fn declare(&mut self, signals: &[SignalDecl]) -> Result<(), SimError>;

    /// Called once per cycle in ascending order, with every wire that
    /// exists on that cycle exactly once.
    fn cycle(&mut self, cycle: u32, samples: &BTreeMap<String, Sample>) -> Result<(), SimError>;

    /// Called after the last cycle.
    fn finish(&mut self) -> Result<(), SimError> {
        Ok(())
    }
}

/// Streams `trace` into `sink`.
///
/// With `live = None` no analysis was run and every sample is reported live.
pub fn emit_waveform<S: WaveformSink + ?Sized>(
    trace: &Trace,
    live: Option<&LiveSet>,
    sink: &mut S,
) -> Result<(), SimError> {
    let mut widths: BTreeMap<String, u32> = BTreeMap::new();
    for wire in trace.wires() {
        let width = widths.entry(wire.key().signal_name()).or_insert(0);
        *width = (*width).max(wire.value().width());
    }
    let decls: Vec<SignalDecl> = widths
        .into_iter()
        .map(|(name, width)| SignalDecl { name, width })
        .collect();
    sink.declare(&decls)?;

    for cycle in 0..=trace.cycles() {
        let samples: BTreeMap<String, Sample> = trace
            .bundles_at(cycle)
            .into_iter()
            .flat_map(|bundle| bundle.iter())
            .map(|wire| {
                let sample = Sample {
                    value: wire.value(),
                    live: live.map_or(true, |set| set.contains(wire.key())),
                };
                (wire.key().signal_name(), sample)
            })
            .collect();
        sink.cycle(cycle, &samples)?;
    }

    sink.finish()?;
    debug!("Emitted {} signals over {} cycles", decls.len(), trace.cycles() + 1);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::WireBundle;
    use crate::circuit::Circuit;
    use crate::engine::Simulator;
    use crate::request::SimRequest;

    struct XorFeedback;

    impl Circuit for XorFeedback {
        fn initial_state(&self) -> Result<BTreeMap<String, BitVector>, SimError> {
            Ok(BTreeMap::from([("m".to_string(), BitVector::bit(false))]))
        }

        fn transition(
            &self,
            state: &WireBundle,
            inputs: &WireBundle,
            next_state: &mut WireBundle,
            outputs: &mut WireBundle,
        ) -> Result<(), SimError> {
            let m = state.get("m")?;
            next_state.set("m", inputs.get("a")?.xor(m))?;
            outputs.set("q", m)
        }
    }

    #[derive(Default)]
    struct Recorder {
        decls: Vec<SignalDecl>,
        cycles: Vec<(u32, BTreeMap<String, Sample>)>,
        finished: bool,
    }

    impl WaveformSink for Recorder {
        fn declare(&mut self, signals: &[SignalDecl]) -> Result<(), SimError> {
            self.decls = signals.to_vec();
            Ok(())
        }

        fn cycle(
            &mut self,
            cycle: u32,
            samples: &BTreeMap<String, Sample>,
        ) -> Result<(), SimError> {
            self.cycles.push((cycle, samples.clone()));
            Ok(())
        }

        fn finish(&mut self) -> Result<(), SimError> {
            self.finished = true;
            Ok(())
        }
    }

    fn run() -> crate::engine::SimRun {
        let req = SimRequest::new(2)
            .with_constant_input("a", BitVector::bit(true))
            .observe(1, "q");
        Simulator::default().run(&XorFeedback, &req).unwrap()
    }

    #[test]
    fn test_emits_every_cycle_in_order() {
        let run = run();
        let live = run.liveness();
        let mut sink = Recorder::default();
        emit_waveform(run.trace(), Some(&live), &mut sink).unwrap();

        let names: Vec<&str> = sink.decls.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["in.a", "out.q", "state.m"]);

        let cycles: Vec<u32> = sink.cycles.iter().map(|(c, _)| *c).collect();
        assert_eq!(cycles, vec![0, 1, 2]);
        assert_eq!(sink.cycles[0].1.len(), 3);
        // Only the final state exists on the last cycle
        assert_eq!(sink.cycles[2].1.len(), 1);
        assert!(sink.finished);
    }

    #[test]
    fn test_dead_marker_only_outside_live_set() {
        let run = run();
        let live = run.liveness();
        let mut sink = Recorder::default();
        emit_waveform(run.trace(), Some(&live), &mut sink).unwrap();

        let c1 = &sink.cycles[1].1;
        assert!(c1["out.q"].live);
        assert!(c1["state.m"].live);
        assert!(!c1["in.a"].live);
        assert!(!sink.cycles[0].1["out.q"].live);
    }

    #[test]
    fn test_without_analysis_everything_live() {
        let run = run();
        let mut sink = Recorder::default();
        emit_waveform(run.trace(), None, &mut sink).unwrap();
        assert!(sink.cycles.iter().all(|(_, s)| s.values().all(|x| x.live)));
    }
}
