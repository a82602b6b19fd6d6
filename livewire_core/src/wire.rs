//! Concrete wires and provenance-tracking operators.
//!
//! A [`Wire`] is the value a named signal took on one cycle, plus the keys of
//! the wires that were read to compute it. Operators on wires return an
//! [`OpResult`] whose sources are already pruned by the sensitivity rules,
//! so storing one in a bundle records only the operands that mattered.

use crate::bitvec::{BitVector, CmpOp};
use crate::bundle::BundleRole;
use crate::error::SimError;
use crate::sensitivity::{self, Operands, Sensitized};
use std::fmt;
use std::sync::Arc;

/// Identity of a wire in a trace: which bundle, which cycle, which name.
///
/// Ordered by cycle first so sorted keys read in simulation order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WireKey {
    cycle: u32,
    role: BundleRole,
    name: Arc<str>,
}

impl WireKey {
    pub fn new(role: BundleRole, cycle: u32, name: impl Into<Arc<str>>) -> Self {
        Self {
            cycle,
            role,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    pub fn role(&self) -> BundleRole {
        self.role
    }

    /// Role-qualified signal name, e.g. `state.m` or `out.q`.
    pub fn signal_name(&self) -> String {
        format!("{}.{}", self.role.prefix(), self.name)
    }
}

impl fmt::Display for WireKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}@{}", self.role.prefix(), self.name, self.cycle)
    }
}

/// The value of a named signal on one cycle, with its provenance.
///
/// Immutable once built; only [`crate::bundle::WireBundle`] creates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wire {
    key: WireKey,
    value: BitVector,
    sources: Vec<WireKey>,
}

impl Wire {
    pub(crate) fn new(key: WireKey, value: BitVector, sources: Vec<WireKey>) -> Self {
        Self { key, value, sources }
    }

    pub fn key(&self) -> &WireKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        self.key.name()
    }

    pub fn cycle(&self) -> u32 {
        self.key.cycle()
    }

    pub fn role(&self) -> BundleRole {
        self.key.role()
    }

    pub fn value(&self) -> BitVector {
        self.value
    }

    /// Wires whose values determined this one. Empty for primary inputs,
    /// initial state and constants.
    pub fn sources(&self) -> &[WireKey] {
        &self.sources
    }

    fn binary(&self, other: &Wire, result: Sensitized) -> OpResult {
        let sources = match result.operands {
            Operands::Left => vec![self.key.clone()],
            Operands::Right => vec![other.key.clone()],
            Operands::Both if self.key == other.key => vec![self.key.clone()],
            Operands::Both => vec![self.key.clone(), other.key.clone()],
        };
        OpResult {
            value: result.value,
            sources,
        }
    }

    fn unary(&self, value: BitVector) -> OpResult {
        OpResult {
            value,
            sources: vec![self.key.clone()],
        }
    }

    pub fn and(&self, other: &Wire) -> OpResult {
        self.binary(other, sensitivity::and(&self.value, &other.value))
    }

    pub fn or(&self, other: &Wire) -> OpResult {
        self.binary(other, sensitivity::or(&self.value, &other.value))
    }

    pub fn nand(&self, other: &Wire) -> OpResult {
        self.binary(other, sensitivity::nand(&self.value, &other.value))
    }

    pub fn nor(&self, other: &Wire) -> OpResult {
        self.binary(other, sensitivity::nor(&self.value, &other.value))
    }

    pub fn xor(&self, other: &Wire) -> OpResult {
        self.binary(other, sensitivity::xor(&self.value, &other.value))
    }

    pub fn xnor(&self, other: &Wire) -> OpResult {
        self.binary(other, sensitivity::xnor(&self.value, &other.value))
    }

    /// See [`BitVector::add`]: the sum wraps at the wider operand's width.
    pub fn add(&self, other: &Wire) -> OpResult {
        self.binary(other, sensitivity::add(&self.value, &other.value))
    }

    pub fn sub(&self, other: &Wire) -> Result<OpResult, SimError> {
        Ok(self.binary(other, sensitivity::sub(&self.value, &other.value)?))
    }

    pub fn compare(&self, other: &Wire, op: CmpOp) -> OpResult {
        self.binary(other, sensitivity::compare(&self.value, &other.value, op))
    }

    pub fn not(&self) -> OpResult {
        self.unary(self.value.not())
    }

    /// Forwards the value unchanged, keeping this wire as the source.
    pub fn buf(&self) -> OpResult {
        self.unary(self.value)
    }
}

/// Selects `on_zero` when `select` is 0, else `data[select - 1]`.
///
/// The selected wire is always a source. `select` is a source only when the
/// candidates disagree in value.
pub fn mux(select: &Wire, on_zero: &Wire, data: &[&Wire]) -> Result<OpResult, SimError> {
    let candidates: Vec<&Wire> = std::iter::once(on_zero).chain(data.iter().copied()).collect();
    let values: Vec<BitVector> = candidates.iter().map(|w| w.value).collect();

    let choice =
        sensitivity::mux(&select.value, &values).ok_or_else(|| SimError::MuxSelectOutOfRange {
            select: select.name().to_string(),
            cycle: select.cycle(),
            index: select.value.value(),
            candidates: candidates.len(),
        })?;

    let chosen = candidates[choice.index];
    let mut sources = Vec::with_capacity(2);
    if choice.select_live {
        sources.push(select.key.clone());
    }
    if !sources.contains(&chosen.key) {
        sources.push(chosen.key.clone());
    }

    Ok(OpResult {
        value: choice.value,
        sources,
    })
}

/// An operator result awaiting a name: value plus pruned sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpResult {
    value: BitVector,
    sources: Vec<WireKey>,
}

impl OpResult {
    pub fn value(&self) -> BitVector {
        self.value
    }

    pub fn sources(&self) -> &[WireKey] {
        &self.sources
    }

    pub(crate) fn into_parts(self) -> (BitVector, Vec<WireKey>) {
        (self.value, self.sources)
    }
}

impl From<&Wire> for OpResult {
    fn from(wire: &Wire) -> Self {
        wire.buf()
    }
}
