//! Value-change dump output.
//!
//! Signals are grouped into one scope per bundle role (`state`, `in`, `out`)
//! under a `top` module with a `clk` signal. Each cycle occupies two time
//! steps: the clock rises at `2 * cycle` and falls at `2 * cycle + 1`.
//! Values outside the live set, and signals absent on a cycle, are dumped
//! as `x`. Only changes are written after the first cycle.

use livewire_core::{Sample, SignalDecl, SimError, WaveformSink};
use std::collections::BTreeMap;
use std::io::Write;
use tracing::debug;
use vcd::{IdCode, TimescaleUnit, Value};

/// What a signal last showed in the dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shown {
    Value(u64),
    Unknown,
}

#[derive(Debug, Clone)]
struct VcdSignal {
    id: IdCode,
    width: u32,
    last: Option<Shown>,
}

/// Writes a waveform as VCD through [`vcd::Writer`].
pub struct VcdWriter<W: Write> {
    writer: vcd::Writer<W>,
    clock: Option<IdCode>,
    signals: BTreeMap<String, VcdSignal>,
}

impl<W: Write> VcdWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            writer: vcd::Writer::new(out),
            clock: None,
            signals: BTreeMap::new(),
        }
    }

    fn change(&mut self, id: IdCode, width: u32, shown: Shown) -> std::io::Result<()> {
        match (width, shown) {
            (1, Shown::Value(v)) => self.writer.change_scalar(id, v & 1 == 1),
            (1, Shown::Unknown) => self.writer.change_scalar(id, Value::X),
            (_, Shown::Value(v)) => {
                let bits = (0..width).rev().map(|i| Value::from((v >> i) & 1 == 1));
                self.writer.change_vector(id, bits)
            }
            (_, Shown::Unknown) => self.writer.change_vector(id, vec![Value::X; width as usize]),
        }
    }
}

impl<W: Write> WaveformSink for VcdWriter<W> {
    fn declare(&mut self, signals: &[SignalDecl]) -> Result<(), SimError> {
        self.writer.timescale(1, TimescaleUnit::NS)?;
        self.writer.add_module("top")?;
        self.clock = Some(self.writer.add_wire(1, "clk")?);

        let mut scopes: BTreeMap<&str, Vec<(&str, &SignalDecl)>> = BTreeMap::new();
        for decl in signals {
            let (scope, name) = decl.name.split_once('.').unwrap_or(("top", decl.name.as_str()));
            scopes.entry(scope).or_default().push((name, decl));
        }

        for (scope, decls) in scopes {
            self.writer.add_module(scope)?;
            for (name, decl) in decls {
                let id = self.writer.add_wire(decl.width, name)?;
                let signal = VcdSignal {
                    id,
                    width: decl.width,
                    last: None,
                };
                self.signals.insert(decl.name.clone(), signal);
            }
            self.writer.upscope()?;
        }

        self.writer.upscope()?;
        self.writer.enddefinitions()?;
        debug!("VCD header written for {} signals", self.signals.len());
        Ok(())
    }

    fn cycle(&mut self, cycle: u32, samples: &BTreeMap<String, Sample>) -> Result<(), SimError> {
        let rise = u64::from(cycle) * 2;
        self.writer.timestamp(rise)?;
        if let Some(clock) = self.clock {
            self.writer.change_scalar(clock, Value::V1)?;
        }

        let mut changes = Vec::new();
        for (name, signal) in self.signals.iter_mut() {
            let shown = match samples.get(name) {
                Some(sample) if sample.live => Shown::Value(sample.value.value()),
                _ => Shown::Unknown,
            };
            if signal.last != Some(shown) {
                changes.push((signal.id, signal.width, shown));
                signal.last = Some(shown);
            }
        }
        for (id, width, shown) in changes {
            self.change(id, width, shown)?;
        }

        self.writer.timestamp(rise + 1)?;
        if let Some(clock) = self.clock {
            self.writer.change_scalar(clock, Value::V0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuits::{Mux4, XorFeedback};
    use livewire_core::{emit_waveform, BitVector, SimRequest, Simulator};

    fn dump(with_liveness: bool) -> String {
        let req = SimRequest::new(2)
            .with_constant_input("a", BitVector::bit(true))
            .observe(1, "q");
        let run = Simulator::default().run(&XorFeedback, &req).unwrap();
        let live = run.liveness();
        let live = if with_liveness { Some(&live) } else { None };

        let mut buf = Vec::new();
        let mut vcd = VcdWriter::new(&mut buf);
        emit_waveform(run.trace(), live, &mut vcd).unwrap();
        drop(vcd);
        String::from_utf8(buf).unwrap()
    }

    fn lines_between<'a>(text: &'a str, from: &str, to: &str) -> Vec<&'a str> {
        text.lines()
            .skip_while(|l| *l != from)
            .skip(1)
            .take_while(|l| *l != to)
            .collect()
    }

    #[test]
    fn test_header_scopes() {
        let text = dump(true);
        assert!(text.contains("$timescale"));
        assert!(text.contains("$scope module top $end"));
        assert!(text.contains("$scope module state $end"));
        assert!(text.contains("$scope module in $end"));
        assert!(text.contains("$scope module out $end"));
        assert!(text.contains("$enddefinitions $end"));
        assert!(text.lines().any(|l| l.starts_with("$var wire 1 ") && l.contains(" clk ")));
    }

    #[test]
    fn test_clock_edges() {
        let text = dump(true);
        for stamp in ["#0", "#1", "#2", "#3", "#4", "#5"] {
            assert!(text.lines().any(|l| l == stamp), "missing {stamp}");
        }
        assert!(!text.lines().any(|l| l == "#6"));
    }

    #[test]
    fn test_dead_values_are_x() {
        // Declaration order: clk '!', in.a '"', out.q '#', state.m '$'
        let text = dump(true);
        let cycle0 = lines_between(&text, "#0", "#1");
        // a@0 and m@0 are live, q@0 is not observed
        assert!(cycle0.contains(&"1\""));
        assert!(cycle0.contains(&"x#"));
        assert!(cycle0.contains(&"0$"));
    }

    #[test]
    fn test_without_liveness_no_x() {
        let text = dump(false);
        let body = lines_between(&text, "$enddefinitions $end", "#4");
        assert!(!body.iter().any(|l| l.starts_with('x')));
        // Only absent signals on the final cycle turn unknown
        let final_cycle = lines_between(&text, "#4", "#5");
        assert!(final_cycle.contains(&"x\""));
    }

    #[test]
    fn test_vectors_and_unchanged_values() {
        let mut req = SimRequest::new(2).observe(0, "q");
        for cycle in 0..2 {
            req = req.with_input(cycle, "sel", BitVector::new(1, 2).unwrap());
            for i in 0..4u64 {
                req = req.with_input(cycle, format!("d{i}"), BitVector::new(i + 8, 4).unwrap());
            }
        }
        let run = Simulator::default().run(&Mux4, &req).unwrap();
        let mut buf = Vec::new();
        let mut vcd = VcdWriter::new(&mut buf);
        emit_waveform(run.trace(), None, &mut vcd).unwrap();
        drop(vcd);
        let text = String::from_utf8(buf).unwrap();

        let cycle0 = lines_between(&text, "#0", "#1");
        assert!(cycle0.iter().any(|l| l.starts_with("b1001 ")));
        // Identical inputs on cycle 1 produce no value changes
        let cycle1 = lines_between(&text, "#2", "#3");
        assert_eq!(cycle1.len(), 1);
    }
}
