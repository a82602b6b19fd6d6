//! End-to-end liveness scenarios.

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioId {
    /// LW-001: AND gate under random inputs, checked against the don't-care table
    AndGate,

    /// LW-002: Feedback register; only inputs before the observed cycle matter
    XorFeedback,

    /// LW-003: XOR from four NANDs; XOR-equivalent logic keeps both inputs live
    XorFromNands,

    /// LW-004: Unused inputs never become live
    OrphanInputs,

    /// LW-005: Mux select is a don't-care when all data agree
    MuxDontCare,

    /// LW-006: Enable-gated counter across register boundaries
    Counter,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::AndGate,
            ScenarioId::XorFeedback,
            ScenarioId::XorFromNands,
            ScenarioId::OrphanInputs,
            ScenarioId::MuxDontCare,
            ScenarioId::Counter,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::AndGate => "and_gate",
            ScenarioId::XorFeedback => "xor_feedback",
            ScenarioId::XorFromNands => "xor_from_nands",
            ScenarioId::OrphanInputs => "orphan_inputs",
            ScenarioId::MuxDontCare => "mux_dont_care",
            ScenarioId::Counter => "counter",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::AndGate => "Random a/b into an AND gate, a 0 on one side kills the other",
            ScenarioId::XorFeedback => "m' = a ^ m observed once at the last cycle",
            ScenarioId::XorFromNands => "NAND-built XOR, both inputs live every cycle",
            ScenarioId::OrphanInputs => "c and d are driven but never read",
            ScenarioId::MuxDontCare => "4-way mux with equal data on even cycles",
            ScenarioId::Counter => "8-bit counter with random enable, observed at the end",
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "and_gate" | "andgate" | "lw-001" => Ok(ScenarioId::AndGate),
            "xor_feedback" | "xorfeedback" | "lw-002" => Ok(ScenarioId::XorFeedback),
            "xor_from_nands" | "xorfromnands" | "lw-003" => Ok(ScenarioId::XorFromNands),
            "orphan_inputs" | "orphaninputs" | "lw-004" => Ok(ScenarioId::OrphanInputs),
            "mux_dont_care" | "muxdontcare" | "lw-005" => Ok(ScenarioId::MuxDontCare),
            "counter" | "lw-006" => Ok(ScenarioId::Counter),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}
