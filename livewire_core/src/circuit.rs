//! The clocked-transition contract every simulated circuit fulfils.

use crate::bitvec::BitVector;
use crate::bundle::WireBundle;
use crate::error::SimError;
use std::collections::BTreeMap;

/// A named, fixed-width port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSpec {
    pub name: String,
    pub width: u32,
}

impl PortSpec {
    pub fn new(name: impl Into<String>, width: u32) -> Self {
        Self {
            name: name.into(),
            width,
        }
    }
}

/// A synchronous circuit modelled as a state machine over cycles.
///
/// On every rising clock edge the engine calls [`Circuit::transition`] with
/// the frozen state and input bundles for that cycle. The implementation
/// drives `next_state` (tagged with the following cycle) and `outputs`
/// (tagged with the current cycle); the engine freezes both afterwards.
///
/// Implementations must read only the bundles handed to them. Combinational
/// circuits keep the default empty [`Circuit::initial_state`].
///
/// # Example
///
/// ```
/// use livewire_core::{Circuit, SimError, WireBundle};
///
/// struct AndGate;
///
/// impl Circuit for AndGate {
///     fn transition(
///         &self,
///         _state: &WireBundle,
///         inputs: &WireBundle,
///         _next_state: &mut WireBundle,
///         outputs: &mut WireBundle,
///     ) -> Result<(), SimError> {
///         outputs.set("q", inputs.get("a")?.and(inputs.get("b")?))
///     }
/// }
/// ```
pub trait Circuit {
    /// Name used in logs and errors.
    fn name(&self) -> &str {
        "circuit"
    }

    /// Register values on cycle 0.
    fn initial_state(&self) -> Result<BTreeMap<String, BitVector>, SimError> {
        Ok(BTreeMap::new())
    }

    /// Declared primary inputs. Empty means undeclared: inputs are not
    /// validated against the circuit.
    fn input_ports(&self) -> Vec<PortSpec> {
        Vec::new()
    }

    /// Declared outputs the circuit must drive on every cycle.
    fn output_ports(&self) -> Vec<PortSpec> {
        Vec::new()
    }

    /// Computes one clock edge.
    fn transition(
        &self,
        state: &WireBundle,
        inputs: &WireBundle,
        next_state: &mut WireBundle,
        outputs: &mut WireBundle,
    ) -> Result<(), SimError>;
}

impl<C: Circuit + ?Sized> Circuit for Box<C> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn initial_state(&self) -> Result<BTreeMap<String, BitVector>, SimError> {
        (**self).initial_state()
    }

    fn input_ports(&self) -> Vec<PortSpec> {
        (**self).input_ports()
    }

    fn output_ports(&self) -> Vec<PortSpec> {
        (**self).output_ports()
    }

    fn transition(
        &self,
        state: &WireBundle,
        inputs: &WireBundle,
        next_state: &mut WireBundle,
        outputs: &mut WireBundle,
    ) -> Result<(), SimError> {
        (**self).transition(state, inputs, next_state, outputs)
    }
}
