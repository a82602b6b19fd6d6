//! Scenario runner - simulates a fixture and checks the liveness verdict.

use crate::circuits::{
    BinaryGate, Counter, GateOp, Mux4, OrphanInputs, XorFeedback, XorFromNands,
};
use crate::error::HarnessError;
use crate::scenarios::ScenarioId;
use crate::stimulus::Stimulus;

use livewire_core::{
    BitVector, Circuit, LiveSet, LivenessAnalyzer, LivenessReport, SimConfig, SimRequest, SimRun,
    Simulator,
};
use tracing::{debug, info, warn};

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether scenario passed all assertions
    pub passed: bool,

    /// Cycles simulated
    pub cycles: u32,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Metrics collected during run
    pub metrics: ScenarioMetrics,

    /// The finished simulation, absent if it never completed
    pub run: Option<SimRun>,

    /// Marked wires, absent if the simulation never completed
    pub live: Option<LiveSet>,
}

impl ScenarioResult {
    fn failed(scenario: ScenarioId, seed: u64, cycles: u32, err: HarnessError) -> Self {
        warn!("Scenario {} failed (seed={}): {}", scenario, seed, err);
        Self {
            scenario,
            seed,
            passed: false,
            cycles,
            failure_reason: Some(err.to_string()),
            metrics: ScenarioMetrics::default(),
            run: None,
            live: None,
        }
    }
}

/// Metrics collected during scenario execution.
#[derive(Debug, Clone, Default)]
pub struct ScenarioMetrics {
    /// Wires in the trace
    pub wires: usize,

    /// Wires marked live
    pub live: usize,

    /// Wires left dead
    pub dead: usize,

    /// Observed root wires
    pub roots: usize,

    /// Wires the traversal expanded
    pub visits: usize,

    /// Per-cycle tallies
    pub report: LivenessReport,
}

/// Runs liveness scenarios.
pub struct ScenarioRunner {
    /// Seed for the input stimulus
    seed: u64,

    /// Cycles per simulation
    cycles: u32,

    /// Engine configuration
    config: SimConfig,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            cycles: 8,
            config: SimConfig::default(),
        }
    }

    /// Sets the number of simulated cycles.
    pub fn with_cycles(mut self, cycles: u32) -> Self {
        self.cycles = cycles;
        self
    }

    /// Sets the engine configuration.
    pub fn with_config(mut self, config: SimConfig) -> Self {
        self.config = config;
        self
    }

    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        info!(
            "Starting scenario: {} (seed={}, cycles={})",
            scenario.name(),
            self.seed,
            self.cycles
        );

        let (circuit, request) = match self.setup(scenario) {
            Ok(setup) => setup,
            Err(e) => return ScenarioResult::failed(scenario, self.seed, self.cycles, e),
        };

        let run = match Simulator::new(self.config.clone()).run(circuit.as_ref(), &request) {
            Ok(run) => run,
            Err(e) => return ScenarioResult::failed(scenario, self.seed, self.cycles, e.into()),
        };

        let analyzer = LivenessAnalyzer::new(run.trace());
        let live = analyzer.mark(run.roots());
        let report = analyzer.report(&live, run.roots().len());
        let metrics = ScenarioMetrics {
            wires: run.trace().wire_count(),
            live: report.total_live,
            dead: report.total_dead,
            roots: run.roots().len(),
            visits: live.visits(),
            report,
        };
        debug!(
            "{}: {} wires, {} live, {} dead",
            scenario, metrics.wires, metrics.live, metrics.dead
        );

        let verdict = self.check(scenario, &request, &run, &live);
        let (passed, failure_reason) = match verdict {
            Ok(()) => {
                info!("Scenario {} passed (seed={})", scenario, self.seed);
                (true, None)
            }
            Err(e) => {
                warn!("Scenario {} failed (seed={}): {}", scenario, self.seed, e);
                (false, Some(e.to_string()))
            }
        };

        ScenarioResult {
            scenario,
            seed: self.seed,
            passed,
            cycles: self.cycles,
            failure_reason,
            metrics,
            run: Some(run),
            live: Some(live),
        }
    }

    /// Builds the circuit and request for a scenario.
    fn setup(&self, scenario: ScenarioId) -> Result<(Box<dyn Circuit>, SimRequest), HarnessError> {
        let mut stim = Stimulus::new(self.seed);
        let last = self.cycles.saturating_sub(1);

        let setup: (Box<dyn Circuit>, SimRequest) = match scenario {
            ScenarioId::AndGate => {
                let gate = BinaryGate::new(GateOp::And);
                let request = stim.request(&gate.input_ports(), self.cycles)?.observe_always("q");
                (Box::new(gate), request)
            }
            ScenarioId::XorFeedback => {
                let request = SimRequest::new(self.cycles)
                    .with_constant_input("a", BitVector::bit(true))
                    .observe(last, "q");
                (Box::new(XorFeedback), request)
            }
            ScenarioId::XorFromNands => {
                let request =
                    stim.request(&XorFromNands.input_ports(), self.cycles)?.observe_always("c");
                (Box::new(XorFromNands), request)
            }
            ScenarioId::OrphanInputs => {
                let request =
                    stim.request(&OrphanInputs.input_ports(), self.cycles)?.observe_always("q");
                (Box::new(OrphanInputs), request)
            }
            ScenarioId::MuxDontCare => {
                let mut request = SimRequest::new(self.cycles).observe_always("q");
                for cycle in 0..self.cycles {
                    request = request.with_input(cycle, "sel", stim.value(2)?);
                    let shared = stim.value(Mux4::DATA_WIDTH)?;
                    for i in 0..4 {
                        let value = if cycle % 2 == 0 {
                            shared
                        } else {
                            stim.value(Mux4::DATA_WIDTH)?
                        };
                        request = request.with_input(cycle, format!("d{i}"), value);
                    }
                }
                (Box::new(Mux4), request)
            }
            ScenarioId::Counter => {
                let mut request = SimRequest::new(self.cycles).observe(last, "q");
                for cycle in 0..self.cycles {
                    request = request.with_input(cycle, "en", BitVector::bit(stim.chance(0.5)));
                }
                (Box::new(Counter::default()), request)
            }
        };
        Ok(setup)
    }

    fn check(
        &self,
        scenario: ScenarioId,
        request: &SimRequest,
        run: &SimRun,
        live: &LiveSet,
    ) -> Result<(), HarnessError> {
        match scenario {
            ScenarioId::AndGate => check_and_gate(request, run, live),
            ScenarioId::XorFeedback => check_feedback(request, run, live),
            ScenarioId::XorFromNands => check_xor_from_nands(request, run, live),
            ScenarioId::OrphanInputs => check_orphans(request, live),
            ScenarioId::MuxDontCare => check_mux(request, run, live),
            ScenarioId::Counter => check_counter(request, run, live),
        }
    }
}

fn input(request: &SimRequest, cycle: u32, name: &str) -> Result<BitVector, HarnessError> {
    request
        .inputs_at(cycle)
        .and_then(|m| m.get(name))
        .copied()
        .ok_or_else(|| HarnessError::expectation(format!("no input {name} on cycle {cycle}")))
}

fn output(run: &SimRun, cycle: u32, name: &str) -> Result<BitVector, HarnessError> {
    let frame = run
        .trace()
        .frame(cycle)
        .ok_or_else(|| HarnessError::expectation(format!("no frame for cycle {cycle}")))?;
    Ok(frame.outputs.get(name)?.value())
}

fn expect_live(live: &LiveSet, name: &str, cycle: u32, expected: bool) -> Result<(), HarnessError> {
    if live.is_live(name, cycle) == expected {
        Ok(())
    } else {
        let verdict = if expected { "live" } else { "dead" };
        Err(HarnessError::expectation(format!("{name}@{cycle} should be {verdict}")))
    }
}

fn check_and_gate(request: &SimRequest, run: &SimRun, live: &LiveSet) -> Result<(), HarnessError> {
    for cycle in 0..request.cycles {
        let a = input(request, cycle, "a")?;
        let b = input(request, cycle, "b")?;
        let q = output(run, cycle, "q")?;
        if q != a.and(&b) {
            let expected = a.and(&b);
            return Err(HarnessError::expectation(format!("q@{cycle} = {q}, expected {expected}")));
        }
        // A 0 alone decides the result; the other side is then a don't-care
        let a_controls = a.is_zero() && !b.is_zero();
        let b_controls = b.is_zero() && !a.is_zero();
        expect_live(live, "a", cycle, !b_controls)?;
        expect_live(live, "b", cycle, !a_controls)?;
        expect_live(live, "q", cycle, true)?;
    }
    Ok(())
}

fn check_feedback(request: &SimRequest, run: &SimRun, live: &LiveSet) -> Result<(), HarnessError> {
    let last = request.cycles - 1;
    // With a = 1 throughout, m toggles every cycle from 0
    let expected = BitVector::bit(last % 2 == 1);
    let q = output(run, last, "q")?;
    if q != expected {
        return Err(HarnessError::expectation(format!("q@{last} = {q}, expected {expected}")));
    }
    for cycle in 0..last {
        expect_live(live, "a", cycle, true)?;
        expect_live(live, "m", cycle, true)?;
    }
    expect_live(live, "a", last, false)
}

fn check_xor_from_nands(
    request: &SimRequest,
    run: &SimRun,
    live: &LiveSet,
) -> Result<(), HarnessError> {
    for cycle in 0..request.cycles {
        let a = input(request, cycle, "a")?;
        let b = input(request, cycle, "b")?;
        let c = output(run, cycle, "c")?;
        if c != a.xor(&b) {
            let expected = a.xor(&b);
            return Err(HarnessError::expectation(format!("c@{cycle} = {c}, expected {expected}")));
        }
        expect_live(live, "a", cycle, true)?;
        expect_live(live, "b", cycle, true)?;
    }
    Ok(())
}

fn check_orphans(request: &SimRequest, live: &LiveSet) -> Result<(), HarnessError> {
    for cycle in 0..request.cycles {
        expect_live(live, "c", cycle, false)?;
        expect_live(live, "d", cycle, false)?;
    }
    Ok(())
}

fn check_mux(request: &SimRequest, run: &SimRun, live: &LiveSet) -> Result<(), HarnessError> {
    for cycle in 0..request.cycles {
        let sel = input(request, cycle, "sel")?.value();
        let data = (0..4)
            .map(|i| input(request, cycle, &format!("d{i}")))
            .collect::<Result<Vec<_>, _>>()?;
        let q = output(run, cycle, "q")?;
        if q != data[sel as usize] {
            let expected = data[sel as usize];
            return Err(HarnessError::expectation(format!("q@{cycle} = {q}, expected {expected}")));
        }
        let all_equal = data.iter().all(|d| *d == data[0]);
        expect_live(live, "sel", cycle, !all_equal)?;
        for i in 0..4u64 {
            expect_live(live, &format!("d{i}"), cycle, i == sel)?;
        }
    }
    Ok(())
}

fn check_counter(request: &SimRequest, run: &SimRun, live: &LiveSet) -> Result<(), HarnessError> {
    let last = request.cycles - 1;
    let mut enabled = 0u64;
    for cycle in 0..last {
        if !input(request, cycle, "en")?.is_zero() {
            enabled += 1;
        }
    }
    let q = output(run, last, "q")?;
    if q.value() != enabled % 256 {
        return Err(HarnessError::expectation(format!(
            "q@{last} = {}, expected {}",
            q.value(),
            enabled % 256
        )));
    }
    // count and count + 1 always differ, so every earlier enable steered q
    for cycle in 0..last {
        let en = !input(request, cycle, "en")?.is_zero();
        expect_live(live, "en", cycle, true)?;
        expect_live(live, "inc", cycle, en)?;
    }
    expect_live(live, "en", last, false)
}
