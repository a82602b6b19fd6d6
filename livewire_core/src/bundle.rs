//! Per-cycle wire bundles with a one-way freeze barrier.

use crate::bitvec::BitVector;
use crate::error::SimError;
use crate::wire::{OpResult, Wire, WireKey};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Which part of a circuit's interface a bundle holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BundleRole {
    /// Register state visible at the start of a cycle
    State,

    /// Primary inputs driven by the caller
    Input,

    /// Outputs and intermediate combinational wires
    Output,
}

impl BundleRole {
    /// Short prefix used in qualified signal names.
    pub fn prefix(&self) -> &'static str {
        match self {
            BundleRole::State => "state",
            BundleRole::Input => "in",
            BundleRole::Output => "out",
        }
    }
}

impl fmt::Display for BundleRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BundleRole::State => "state",
            BundleRole::Input => "input",
            BundleRole::Output => "output",
        };
        f.write_str(name)
    }
}

/// What a bundle slot is driven with.
#[derive(Debug, Clone)]
pub enum Drive {
    /// A raw value with no provenance (primary input, constant, reset value)
    Value(BitVector),

    /// An operator result carrying its pruned sources
    Op(OpResult),
}

impl From<BitVector> for Drive {
    fn from(value: BitVector) -> Self {
        Drive::Value(value)
    }
}

impl From<OpResult> for Drive {
    fn from(result: OpResult) -> Self {
        Drive::Op(result)
    }
}

impl From<&Wire> for Drive {
    fn from(wire: &Wire) -> Self {
        Drive::Op(wire.buf())
    }
}

/// The wires of one role on one cycle.
///
/// Open bundles accept each name once. After [`WireBundle::freeze`] every
/// write fails and the contents never change again, so nothing consumed by
/// a later computation can be altered after the fact.
#[derive(Debug, Clone)]
pub struct WireBundle {
    role: BundleRole,
    cycle: u32,
    wires: BTreeMap<Arc<str>, Wire>,
    frozen: bool,
}

impl WireBundle {
    /// Creates an empty, open bundle.
    pub fn new(role: BundleRole, cycle: u32) -> Self {
        Self {
            role,
            cycle,
            wires: BTreeMap::new(),
            frozen: false,
        }
    }

    pub fn role(&self) -> BundleRole {
        self.role
    }

    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Returns the named wire, failing if absent.
    pub fn get(&self, name: &str) -> Result<&Wire, SimError> {
        self.wires.get(name).ok_or_else(|| SimError::MissingWire {
            name: name.to_string(),
            role: self.role,
            cycle: self.cycle,
        })
    }

    pub fn try_get(&self, name: &str) -> Option<&Wire> {
        self.wires.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.wires.contains_key(name)
    }

    /// Drives `name` on this bundle's cycle.
    ///
    /// The new wire is stamped with the bundle's own role and cycle. Fails if
    /// the bundle is frozen, the name is already driven, or the result reads
    /// a wire from a later cycle.
    pub fn set(&mut self, name: &str, drive: impl Into<Drive>) -> Result<(), SimError> {
        if self.frozen {
            return Err(SimError::FrozenBundle {
                name: name.to_string(),
                role: self.role,
                cycle: self.cycle,
            });
        }
        if self.wires.contains_key(name) {
            return Err(SimError::DuplicateWire {
                name: name.to_string(),
                role: self.role,
                cycle: self.cycle,
            });
        }

        let (value, sources) = match drive.into() {
            Drive::Value(value) => (value, Vec::new()),
            Drive::Op(result) => result.into_parts(),
        };
        if let Some(future) = sources.iter().find(|k| k.cycle() > self.cycle) {
            return Err(SimError::FutureSource {
                name: name.to_string(),
                cycle: self.cycle,
                future: future.to_string(),
            });
        }

        let name: Arc<str> = Arc::from(name);
        let key = WireKey::new(self.role, self.cycle, name.clone());
        self.wires.insert(name, Wire::new(key, value, sources));
        Ok(())
    }

    /// Freezes the bundle. Idempotent; returns the bundle for chaining.
    pub fn freeze(&mut self) -> &mut Self {
        self.frozen = true;
        self
    }

    /// Consuming form of [`WireBundle::freeze`].
    pub fn frozen(mut self) -> Self {
        self.frozen = true;
        self
    }

    /// Wires in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Wire> {
        self.wires.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.wires.keys().map(|n| n.as_ref())
    }

    pub fn len(&self) -> usize {
        self.wires.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wires.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_set_and_get() {
        let mut bundle = WireBundle::new(BundleRole::Input, 4);
        bundle.set("a", BitVector::bit(true)).unwrap();

        let a = bundle.get("a").unwrap();
        assert_eq!(a.value(), BitVector::bit(true));
        assert_eq!(a.cycle(), 4);
        assert_eq!(a.role(), BundleRole::Input);
        assert!(a.sources().is_empty());
    }

    #[test]
    fn test_get_missing_fails() {
        let bundle = WireBundle::new(BundleRole::Output, 1);
        let err = bundle.get("q").unwrap_err();
        assert!(matches!(err, SimError::MissingWire { cycle: 1, role: BundleRole::Output, .. }));
    }

    #[test]
    fn test_write_after_freeze_fails() {
        let mut bundle = WireBundle::new(BundleRole::State, 0);
        bundle.set("m", BitVector::bit(false)).unwrap();
        bundle.freeze();

        let err = bundle.set("n", BitVector::bit(true)).unwrap_err();
        assert!(matches!(err, SimError::FrozenBundle { .. }));
        assert_eq!(bundle.len(), 1);
        assert!(!bundle.contains("n"));
    }

    #[test]
    fn test_freeze_is_idempotent_and_chains() {
        let mut bundle = WireBundle::new(BundleRole::State, 0);
        assert!(bundle.freeze().freeze().is_frozen());
        assert!(WireBundle::new(BundleRole::Input, 0).frozen().is_frozen());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut bundle = WireBundle::new(BundleRole::Output, 0);
        bundle.set("q", BitVector::bit(false)).unwrap();
        let err = bundle.set("q", BitVector::bit(true)).unwrap_err();
        assert!(matches!(err, SimError::DuplicateWire { .. }));
        assert_eq!(bundle.get("q").unwrap().value(), BitVector::bit(false));
    }

    #[test]
    fn test_op_result_stamped_with_bundle_cycle() {
        let mut inputs = WireBundle::new(BundleRole::Input, 0);
        inputs.set("a", BitVector::bit(true)).unwrap();
        inputs.set("b", BitVector::bit(true)).unwrap();
        inputs.freeze();

        let mut next = WireBundle::new(BundleRole::State, 1);
        let a = inputs.get("a").unwrap();
        let b = inputs.get("b").unwrap();
        next.set("m", a.xor(b)).unwrap();

        let m = next.get("m").unwrap();
        assert_eq!(m.cycle(), 1);
        assert_eq!(m.sources(), &[a.key().clone(), b.key().clone()]);
    }

    #[test]
    fn test_open_bundle_readable_for_intermediates() {
        let mut out = WireBundle::new(BundleRole::Output, 0);
        out.set("t", BitVector::bit(true)).unwrap();
        let t = out.get("t").unwrap().not();
        out.set("q", t).unwrap();
        assert_eq!(out.get("q").unwrap().sources()[0].name(), "t");
    }

    #[test]
    fn test_future_source_rejected() {
        let mut next = WireBundle::new(BundleRole::State, 1);
        next.set("m", BitVector::bit(true)).unwrap();
        let m = next.get("m").unwrap().buf();

        let mut out = WireBundle::new(BundleRole::Output, 0);
        let err = out.set("q", m).unwrap_err();
        assert!(matches!(err, SimError::FutureSource { cycle: 0, .. }));
    }

    proptest! {
        #[test]
        fn prop_frozen_bundle_unchanged(
            names in proptest::collection::btree_set("[a-z]{1,4}", 1..8),
            extra in "[a-z]{1,4}",
            value in any::<u64>(),
        ) {
            let mut bundle = WireBundle::new(BundleRole::Input, 2);
            for name in &names {
                bundle.set(name, BitVector::new(value, 8).unwrap()).unwrap();
            }
            bundle.freeze();
            let before: Vec<Wire> = bundle.iter().cloned().collect();

            let first = names.iter().next().unwrap().clone();
            for name in [first, extra] {
                prop_assert!(bundle.set(&name, BitVector::bit(true)).is_err());
            }
            let after: Vec<Wire> = bundle.iter().cloned().collect();
            prop_assert_eq!(before, after);
        }
    }
}
