//! Gate and circuit fixtures.
//!
//! Each fixture is an independent [`Circuit`] implementation; nothing here
//! is known to the core.

use livewire_core::{mux, BitVector, Circuit, CmpOp, OpResult, PortSpec, SimError, Wire, WireBundle};
use std::collections::BTreeMap;

// =============================================================================
// COMBINATIONAL GATES
// =============================================================================

/// Two-input gate operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOp {
    And,
    Or,
    Xor,
    Nand,
    Nor,
}

impl GateOp {
    fn apply(&self, a: &Wire, b: &Wire) -> OpResult {
        match self {
            GateOp::And => a.and(b),
            GateOp::Or => a.or(b),
            GateOp::Xor => a.xor(b),
            GateOp::Nand => a.nand(b),
            GateOp::Nor => a.nor(b),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            GateOp::And => "and",
            GateOp::Or => "or",
            GateOp::Xor => "xor",
            GateOp::Nand => "nand",
            GateOp::Nor => "nor",
        }
    }
}

/// `q = a <op> b` on 1-bit inputs.
#[derive(Debug, Clone)]
pub struct BinaryGate {
    op: GateOp,
}

impl BinaryGate {
    pub fn new(op: GateOp) -> Self {
        Self { op }
    }
}

impl Circuit for BinaryGate {
    fn name(&self) -> &str {
        self.op.name()
    }

    fn input_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("a", 1), PortSpec::new("b", 1)]
    }

    fn output_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("q", 1)]
    }

    fn transition(
        &self,
        _state: &WireBundle,
        inputs: &WireBundle,
        _next_state: &mut WireBundle,
        outputs: &mut WireBundle,
    ) -> Result<(), SimError> {
        outputs.set("q", self.op.apply(inputs.get("a")?, inputs.get("b")?))
    }
}

/// `q = !a`
#[derive(Debug, Clone, Default)]
pub struct NotGate;

impl Circuit for NotGate {
    fn name(&self) -> &str {
        "not"
    }

    fn input_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("a", 1)]
    }

    fn output_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("q", 1)]
    }

    fn transition(
        &self,
        _state: &WireBundle,
        inputs: &WireBundle,
        _next_state: &mut WireBundle,
        outputs: &mut WireBundle,
    ) -> Result<(), SimError> {
        outputs.set("q", inputs.get("a")?.not())
    }
}

/// XOR built from four NAND gates, with the intermediates kept as named
/// wires `m1`..`m3`.
#[derive(Debug, Clone, Default)]
pub struct XorFromNands;

impl Circuit for XorFromNands {
    fn name(&self) -> &str {
        "xor_from_nands"
    }

    fn input_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("a", 1), PortSpec::new("b", 1)]
    }

    fn output_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("c", 1)]
    }

    fn transition(
        &self,
        _state: &WireBundle,
        inputs: &WireBundle,
        _next_state: &mut WireBundle,
        out: &mut WireBundle,
    ) -> Result<(), SimError> {
        let (a, b) = (inputs.get("a")?, inputs.get("b")?);
        out.set("m1", a.nand(b))?;
        let m2 = a.nand(out.get("m1")?);
        out.set("m2", m2)?;
        let m3 = out.get("m1")?.nand(b);
        out.set("m3", m3)?;
        let c = out.get("m2")?.nand(out.get("m3")?);
        out.set("c", c)
    }
}

/// AND of `a` and `b`; `c` and `d` are driven but never read.
#[derive(Debug, Clone, Default)]
pub struct OrphanInputs;

impl Circuit for OrphanInputs {
    fn name(&self) -> &str {
        "orphan_inputs"
    }

    fn input_ports(&self) -> Vec<PortSpec> {
        ["a", "b", "c", "d"].into_iter().map(|n| PortSpec::new(n, 1)).collect()
    }

    fn output_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("q", 1)]
    }

    fn transition(
        &self,
        _state: &WireBundle,
        inputs: &WireBundle,
        _next_state: &mut WireBundle,
        outputs: &mut WireBundle,
    ) -> Result<(), SimError> {
        outputs.set("q", inputs.get("a")?.and(inputs.get("b")?))
    }
}

/// Four-way mux: `q = [d0, d1, d2, d3][sel]` over 4-bit data.
#[derive(Debug, Clone, Default)]
pub struct Mux4;

impl Mux4 {
    pub const DATA_WIDTH: u32 = 4;
}

impl Circuit for Mux4 {
    fn name(&self) -> &str {
        "mux4"
    }

    fn input_ports(&self) -> Vec<PortSpec> {
        let mut ports = vec![PortSpec::new("sel", 2)];
        ports.extend((0..4).map(|i| PortSpec::new(format!("d{i}"), Self::DATA_WIDTH)));
        ports
    }

    fn output_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("q", Self::DATA_WIDTH)]
    }

    fn transition(
        &self,
        _state: &WireBundle,
        inputs: &WireBundle,
        _next_state: &mut WireBundle,
        outputs: &mut WireBundle,
    ) -> Result<(), SimError> {
        let data = [inputs.get("d1")?, inputs.get("d2")?, inputs.get("d3")?];
        outputs.set("q", mux(inputs.get("sel")?, inputs.get("d0")?, &data)?)
    }
}

// =============================================================================
// SEQUENTIAL CIRCUITS
// =============================================================================

/// One-bit feedback register: `m[i+1] = a[i] ^ m[i]`, `q = m`.
#[derive(Debug, Clone, Default)]
pub struct XorFeedback;

impl Circuit for XorFeedback {
    fn name(&self) -> &str {
        "xor_feedback"
    }

    fn initial_state(&self) -> Result<BTreeMap<String, BitVector>, SimError> {
        Ok(BTreeMap::from([("m".to_string(), BitVector::bit(false))]))
    }

    fn input_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("a", 1)]
    }

    fn output_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("q", 1)]
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

/// Enable-gated 8-bit counter.
///
/// `count` increments through ADD when `en` is set and wraps at 256 (ADD
/// carries no extra bit). `q` shows the current count and `at_limit` flags
/// `count == limit`.
#[derive(Debug, Clone)]
pub struct Counter {
    limit: u64,
}

impl Counter {
    pub const WIDTH: u32 = 8;

    pub fn new(limit: u64) -> Self {
        Self { limit }
    }
}

impl Default for Counter {
    fn default() -> Self {
        Self::new(0xff)
    }
}

impl Circuit for Counter {
    fn name(&self) -> &str {
        "counter"
    }

    fn initial_state(&self) -> Result<BTreeMap<String, BitVector>, SimError> {
        Ok(BTreeMap::from([("count".to_string(), BitVector::zero(Self::WIDTH)?)]))
    }

    fn input_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("en", 1)]
    }

    fn output_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("q", Self::WIDTH), PortSpec::new("at_limit", 1)]
    }

    fn transition(
        &self,
        state: &WireBundle,
        inputs: &WireBundle,
        next_state: &mut WireBundle,
        out: &mut WireBundle,
    ) -> Result<(), SimError> {
        let count = state.get("count")?;
        out.set("one", BitVector::new(1, Self::WIDTH)?)?;
        out.set("limit", BitVector::new(self.limit, Self::WIDTH)?)?;

        let inc = count.add(out.get("one")?);
        out.set("inc", inc)?;
        let next = mux(inputs.get("en")?, count, &[out.get("inc")?])?;
        next_state.set("count", next)?;

        out.set("q", count)?;
        let at_limit = count.compare(out.get("limit")?, CmpOp::Eq);
        out.set("at_limit", at_limit)
    }
}
