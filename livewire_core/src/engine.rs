//! The cycle loop: threads state through a circuit and records the trace.

use crate::bundle::{BundleRole, WireBundle};
use crate::circuit::{Circuit, PortSpec};
use crate::error::SimError;
use crate::liveness::{LiveSet, LivenessAnalyzer};
use crate::request::SimRequest;
use crate::wire::{Wire, WireKey};
use std::collections::BTreeSet;
use tracing::{debug, error, info};

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Validate per-cycle inputs against the circuit's declared input ports
    pub strict_ports: bool,

    /// Emit a debug progress line every N cycles (0 = never)
    pub log_every: u32,

    /// Longest run accepted; longer requests fail before any cycle runs
    pub max_cycles: u32,
}

impl SimConfig {
    pub const DEFAULT_MAX_CYCLES: u32 = 1_000_000;
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            strict_ports: true,
            log_every: 1,
            max_cycles: Self::DEFAULT_MAX_CYCLES,
        }
    }
}

/// All bundles produced on one cycle.
#[derive(Debug, Clone)]
pub struct CycleFrame {
    pub cycle: u32,

    /// Register state at the start of the cycle
    pub state: WireBundle,

    /// Caller-driven inputs
    pub inputs: WireBundle,

    /// Outputs (and named intermediates) computed this cycle
    pub outputs: WireBundle,
}

/// The complete, frozen record of a run.
///
/// Acts as the wire arena: every [`WireKey`] a wire lists as a source
/// resolves through [`Trace::wire`].
#[derive(Debug, Clone)]
pub struct Trace {
    frames: Vec<CycleFrame>,

    /// State after the last edge (cycle N)
    final_state: WireBundle,
}

impl Trace {
    /// Number of simulated cycles.
    pub fn cycles(&self) -> u32 {
        self.frames.len() as u32
    }

    pub fn frames(&self) -> &[CycleFrame] {
        &self.frames
    }

    pub fn frame(&self, cycle: u32) -> Option<&CycleFrame> {
        self.frames.get(cycle as usize)
    }

    pub fn final_state(&self) -> &WireBundle {
        &self.final_state
    }

    /// The bundle holding `role` on `cycle`. State exists on cycles 0..=N,
    /// inputs and outputs on 0..N.
    pub fn bundle(&self, role: BundleRole, cycle: u32) -> Option<&WireBundle> {
        if role == BundleRole::State && cycle == self.cycles() {
            return Some(&self.final_state);
        }
        let frame = self.frame(cycle)?;
        Some(match role {
            BundleRole::State => &frame.state,
            BundleRole::Input => &frame.inputs,
            BundleRole::Output => &frame.outputs,
        })
    }

    /// Every bundle that exists on `cycle`, in role order.
    pub fn bundles_at(&self, cycle: u32) -> Vec<&WireBundle> {
        [BundleRole::State, BundleRole::Input, BundleRole::Output]
            .into_iter()
            .filter_map(|role| self.bundle(role, cycle))
            .collect()
    }

    /// Resolves a key to its wire.
    pub fn wire(&self, key: &WireKey) -> Option<&Wire> {
        self.bundle(key.role(), key.cycle())?.try_get(key.name())
    }

    /// All wires, cycle-ascending, then by role and name.
    pub fn wires(&self) -> impl Iterator<Item = &Wire> {
        (0..=self.cycles()).flat_map(move |c| self.bundles_at(c).into_iter().flat_map(|b| b.iter()))
    }

    pub fn wire_count(&self) -> usize {
        self.wires().count()
    }
}

/// A finished run: the trace plus the observed root wires.
#[derive(Debug, Clone)]
pub struct SimRun {
    trace: Trace,
    roots: Vec<WireKey>,
}

impl SimRun {
    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// Observed output wires, in cycle order.
    pub fn roots(&self) -> &[WireKey] {
        &self.roots
    }

    /// Marks the wires that determined the observed outputs.
    pub fn liveness(&self) -> LiveSet {
        LivenessAnalyzer::new(&self.trace).mark(&self.roots)
    }

    pub fn into_parts(self) -> (Trace, Vec<WireKey>) {
        (self.trace, self.roots)
    }
}

/// Drives a [`Circuit`] through a [`SimRequest`].
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    config: SimConfig,
}

impl Simulator {
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Runs `circuit` for `request.cycles` edges.
    ///
    /// Configuration errors surface before any cycle runs. Contract
    /// violations abort the run at the offending cycle.
    pub fn run<C: Circuit + ?Sized>(
        &self,
        circuit: &C,
        request: &SimRequest,
    ) -> Result<SimRun, SimError> {
        request.validate()?;
        if request.cycles > self.config.max_cycles {
            return Err(SimError::CycleLimit {
                cycles: request.cycles,
                max: self.config.max_cycles,
            });
        }
        if self.config.strict_ports {
            check_input_ports(&circuit.input_ports(), request)?;
        }
        let output_ports = circuit.output_ports();
        check_observed_ports(&output_ports, request)?;

        info!("Simulating '{}' for {} cycles", circuit.name(), request.cycles);

        let mut state = WireBundle::new(BundleRole::State, 0);
        for (name, value) in circuit.initial_state()? {
            state.set(&name, value)?;
        }
        state.freeze();

        let mut frames = Vec::new();
        let mut roots = Vec::new();

        for cycle in 0..request.cycles {
            let (inputs, next_state, outputs) = self
                .step(circuit, request, &output_ports, &state, cycle, &mut roots)
                .map_err(|e| {
                    error!("'{}' failed on cycle {}: {}", circuit.name(), cycle, e);
                    e
                })?;

            if self.config.log_every > 0 && cycle % self.config.log_every == 0 {
                debug!(
                    "  cycle {} | state={} inputs={} outputs={} roots={}",
                    cycle,
                    state.len(),
                    inputs.len(),
                    outputs.len(),
                    roots.len()
                );
            }

            frames.push(CycleFrame {
                cycle,
                state,
                inputs,
                outputs,
            });
            state = next_state;
        }

        let trace = Trace {
            frames,
            final_state: state,
        };
        info!(
            "Finished '{}': {} wires, {} observed roots",
            circuit.name(),
            trace.wire_count(),
            roots.len()
        );

        Ok(SimRun { trace, roots })
    }

    /// One clock edge. Returns the frozen input, next-state and output
    /// bundles and appends the cycle's observed wires to `roots`.
    fn step<C: Circuit + ?Sized>(
        &self,
        circuit: &C,
        request: &SimRequest,
        output_ports: &[PortSpec],
        state: &WireBundle,
        cycle: u32,
        roots: &mut Vec<WireKey>,
    ) -> Result<(WireBundle, WireBundle, WireBundle), SimError> {
        let mut inputs = WireBundle::new(BundleRole::Input, cycle);
        if let Some(values) = request.inputs_at(cycle) {
            for (name, value) in values {
                inputs.set(name, *value)?;
            }
        }
        inputs.freeze();

        let mut next_state = WireBundle::new(BundleRole::State, cycle + 1);
        let mut outputs = WireBundle::new(BundleRole::Output, cycle);
        circuit.transition(state, &inputs, &mut next_state, &mut outputs)?;
        next_state.freeze();
        outputs.freeze();

        if let Some(port) = output_ports.iter().find(|p| !outputs.contains(&p.name)) {
            return Err(SimError::MissingOutput {
                circuit: circuit.name().to_string(),
                name: port.name.clone(),
                cycle,
            });
        }

        for name in request.observed_at(cycle).into_iter().flatten() {
            let wire = outputs.try_get(name).ok_or_else(|| SimError::UnknownObservedOutput {
                name: name.clone(),
                cycle,
            })?;
            roots.push(wire.key().clone());
        }

        Ok((inputs, next_state, outputs))
    }
}

/// Every cycle must drive exactly the declared inputs at their widths.
fn check_input_ports(ports: &[PortSpec], request: &SimRequest) -> Result<(), SimError> {
    if ports.is_empty() {
        return Ok(());
    }
    let empty = Default::default();
    for cycle in 0..request.cycles {
        let given = request.inputs_at(cycle).unwrap_or(&empty);
        let mut problems = Vec::new();

        let missing: Vec<&str> = ports
            .iter()
            .filter(|p| !given.contains_key(&p.name))
            .map(|p| p.name.as_str())
            .collect();
        if !missing.is_empty() {
            problems.push(format!("missing input(s) {:?}", missing));
        }

        let unexpected: Vec<&str> = given
            .keys()
            .filter(|name| !ports.iter().any(|p| &p.name == *name))
            .map(|name| name.as_str())
            .collect();
        if !unexpected.is_empty() {
            problems.push(format!("unexpected input(s) {:?}", unexpected));
        }

        let wrong_width: Vec<String> = ports
            .iter()
            .filter_map(|p| {
                let value = given.get(&p.name)?;
                (value.width() != p.width)
                    .then(|| format!("{} ({} bits, expected {})", p.name, value.width(), p.width))
            })
            .collect();
        if !wrong_width.is_empty() {
            problems.push(format!("wrong width {}", wrong_width.join(", ")));
        }

        if !problems.is_empty() {
            return Err(SimError::malformed(cycle, problems.join("; ")));
        }
    }
    Ok(())
}

/// With declared outputs, observations are checked before the run starts.
fn check_observed_ports(ports: &[PortSpec], request: &SimRequest) -> Result<(), SimError> {
    if ports.is_empty() {
        return Ok(());
    }
    let declared: BTreeSet<&str> = ports.iter().map(|p| p.name.as_str()).collect();
    for (&cycle, names) in &request.observed {
        if let Some(name) = names.iter().find(|n| !declared.contains(n.as_str())) {
            return Err(SimError::UnknownObservedOutput {
                name: name.clone(),
                cycle,
            });
        }
    }
    Ok(())
}
