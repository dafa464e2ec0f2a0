//! Propagators: stateless functions from input values to output writes.
//!
//! A propagator bundles input cells, output cells, an informant, and a
//! pure function. When any input cell's active value changes, the
//! network calls the function with the inputs' active values (in input
//! order) and applies whatever writes come back as *derived* content:
//! content justified by the beliefs that were read, so it retracts
//! automatically when they do.
//!
//! The function must be deterministic and side-effect-free; it must
//! not block. By convention it returns [`Activation::Skip`] when an
//! input is [`Value::Nothing`], and may forward
//! [`Value::Contradiction`] to its outputs so a clash upstream stays
//! visible downstream.
//!
//! [`Value::Nothing`]: crate::lattice::Value::Nothing
//! [`Value::Contradiction`]: crate::lattice::Value::Contradiction

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cell::CellId;
use crate::lattice::Value;
use crate::tms::Informant;

/// Handle to a propagator. Only minted by
/// [`Network::create_propagator`](crate::network::Network::create_propagator);
/// handles are never reused within a network's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PropagatorId(pub(crate) usize);

impl fmt::Display for PropagatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// What a firing produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Activation {
    /// Nothing to contribute (typically: some input was `Nothing`).
    Skip,
    /// Derived writes to apply, in order.
    Write(Vec<(CellId, Value)>),
}

impl Activation {
    /// A single-write activation.
    pub fn write_one(cell: CellId, value: Value) -> Self {
        Activation::Write(vec![(cell, value)])
    }
}

/// The function type a propagator runs. Receives the inputs' active
/// values in input order.
pub type PropagatorFn = Arc<dyn Fn(&[Value]) -> Activation + Send + Sync>;

/// A registered propagator: immutable wiring plus the function.
#[derive(Clone)]
pub struct Propagator {
    pub(crate) inputs: Vec<CellId>,
    pub(crate) outputs: Vec<CellId>,
    pub(crate) informant: Informant,
    pub(crate) f: PropagatorFn,
}

impl Propagator {
    pub(crate) fn new(
        inputs: Vec<CellId>,
        outputs: Vec<CellId>,
        informant: Informant,
        f: PropagatorFn,
    ) -> Self {
        Self {
            inputs,
            outputs,
            informant,
            f,
        }
    }

    /// The cells this propagator reads, in call order.
    pub fn inputs(&self) -> &[CellId] {
        &self.inputs
    }

    /// The cells this propagator declares it writes.
    pub fn outputs(&self) -> &[CellId] {
        &self.outputs
    }

    /// The informant stamped on every derivation this propagator makes.
    pub fn informant(&self) -> &Informant {
        &self.informant
    }

    /// Run the function over the given input values. A panic inside the
    /// function is contained and treated as [`Activation::Skip`]; the
    /// network makes forward progress and the propagator will simply be
    /// re-fired the next time its inputs change.
    pub(crate) fn fire(&self, inputs: &[Value]) -> Activation {
        match catch_unwind(AssertUnwindSafe(|| (self.f)(inputs))) {
            Ok(activation) => activation,
            Err(_) => {
                warn!(informant = %self.informant, "propagator panicked; treating as skip");
                Activation::Skip
            }
        }
    }
}

impl fmt::Debug for Propagator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Propagator")
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("informant", &self.informant)
            .finish_non_exhaustive()
    }
}
