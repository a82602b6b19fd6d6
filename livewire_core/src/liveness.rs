//! Backward observability analysis over a finished trace.
//!
//! Starting from the observed root wires, walk provenance edges backwards and
//! mark every wire reached. Because operator results only record their
//! sensitizing operands, the marked set is the subset of evaluated values
//! that actually determined the observations in this run. Everything else is
//! a don't-care for this run's root set.
//!
//! The provenance graph is acyclic: edges point to wires built earlier, on
//! the same or an earlier cycle. The walk therefore needs no cycle detection
//! and visits each wire at most once.

use crate::engine::Trace;
use crate::wire::WireKey;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// Wires judged live, in approximate topological (inputs-first) order.
#[derive(Debug, Clone, Default)]
pub struct LiveSet {
    /// Discovery order, reversed
    order: Vec<WireKey>,

    /// Membership index
    members: HashSet<WireKey>,

    /// Wires popped off the work stack
    visits: usize,
}

impl LiveSet {
    /// Live keys, inputs first and roots last.
    pub fn keys(&self) -> &[WireKey] {
        &self.order
    }

    pub fn contains(&self, key: &WireKey) -> bool {
        self.members.contains(key)
    }

    /// True if any wire named `name` on `cycle` is live, whatever its role.
    pub fn is_live(&self, name: &str, cycle: u32) -> bool {
        self.order.iter().any(|k| k.name() == name && k.cycle() == cycle)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of wires the traversal expanded.
    pub fn visits(&self) -> usize {
        self.visits
    }
}

/// Per-cycle live/dead tally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleLiveness {
    pub cycle: u32,
    pub live: usize,
    pub dead: usize,
}

/// Summary of one liveness pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LivenessReport {
    pub roots: usize,
    pub total_live: usize,
    pub total_dead: usize,
    pub cycles: Vec<CycleLiveness>,
}

/// Mark-and-sweep over a [`Trace`].
pub struct LivenessAnalyzer<'a> {
    trace: &'a Trace,
}

impl<'a> LivenessAnalyzer<'a> {
    pub fn new(trace: &'a Trace) -> Self {
        Self { trace }
    }

    /// Marks every wire reachable from `roots` through provenance edges.
    pub fn mark(&self, roots: &[WireKey]) -> LiveSet {
        let mut members: HashSet<WireKey> = HashSet::new();
        let mut discovered: Vec<WireKey> = Vec::new();

        for root in roots {
            if members.insert(root.clone()) {
                discovered.push(root.clone());
            }
        }

        let mut stack = discovered.clone();
        let mut visits = 0;

        while let Some(key) = stack.pop() {
            visits += 1;
            let Some(wire) = self.trace.wire(&key) else {
                warn!("Live wire {} is not in the trace", key);
                continue;
            };
            for source in wire.sources() {
                if members.insert(source.clone()) {
                    discovered.push(source.clone());
                    stack.push(source.clone());
                }
            }
        }

        discovered.reverse();
        debug!(
            "Liveness: {} roots, {} live wires, {} visits",
            roots.len(),
            discovered.len(),
            visits
        );

        LiveSet {
            order: discovered,
            members,
            visits,
        }
    }

    /// Dead wires: everything in the trace not in `live`, in trace order.
    pub fn sweep(&self, live: &LiveSet) -> Vec<WireKey> {
        self.trace
            .wires()
            .filter(|w| !live.contains(w.key()))
            .map(|w| w.key().clone())
            .collect()
    }

    /// Tallies live and dead wires per cycle.
    pub fn report(&self, live: &LiveSet, roots: usize) -> LivenessReport {
        let mut per_cycle: BTreeMap<u32, CycleLiveness> = (0..=self.trace.cycles())
            .map(|cycle| (cycle, CycleLiveness { cycle, ..Default::default() }))
            .collect();

        for wire in self.trace.wires() {
            let entry = per_cycle.entry(wire.cycle()).or_default();
            if live.contains(wire.key()) {
                entry.live += 1;
            } else {
                entry.dead += 1;
            }
        }

        let cycles: Vec<CycleLiveness> = per_cycle.into_values().collect();
        LivenessReport {
            roots,
            total_live: cycles.iter().map(|c| c.live).sum(),
            total_dead: cycles.iter().map(|c| c.dead).sum(),
            cycles,
        }
    }
}
