//! Belief-cells: bags of `{value, node}` pairs read through the TMS.
//!
//! A cell never stores "its value". It stores **beliefs**, each one a
//! value paired with the TMS node that tracks whether the value is
//! currently believed. The value a reader sees is a *projection*:
//! collect the values of beliefs whose nodes are `in`, then
//!
//! - no active beliefs → [`Value::Nothing`]
//! - all active values lattice-equal → that value
//! - otherwise → [`Value::Contradiction`]
//!
//! This projection deliberately is **not** a lattice merge. A lattice
//! cell can only grow; the projection can shrink when labels flip
//! `out`, which is exactly what makes retraction work without ever
//! rebuilding the network.
//!
//! [`Value::Nothing`]: crate::lattice::Value::Nothing
//! [`Value::Contradiction`]: crate::lattice::Value::Contradiction

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lattice::{LatticeKind, Value};
use crate::propagator::PropagatorId;
use crate::tms::{Informant, NodeId, Tms};

/// Handle to a cell. Only minted by
/// [`Network::create_cell`](crate::network::Network::create_cell);
/// handles are never reused within a network's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellId(pub(crate) usize);

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// One unit of content: a value, the TMS node tracking its status, and
/// the informant it came from (mirrored from the node for fast lookup
/// during retraction).
#[derive(Debug, Clone)]
pub struct Belief {
    /// The asserted or derived value.
    pub value: Value,
    /// The TMS node whose label says whether this belief is active.
    pub node: NodeId,
    /// Where the value came from.
    pub informant: Informant,
    // Last fixpoint generation at which the node was observed `in`;
    // compaction ages beliefs by this.
    pub(crate) last_in_generation: u64,
}

/// A cell: an append-only bag of beliefs plus its subscribers.
pub struct BeliefCell {
    kind: LatticeKind,
    beliefs: Vec<Belief>,
    // Insertion order is the firing order.
    subscribers: Vec<PropagatorId>,
}

impl BeliefCell {
    pub(crate) fn new(kind: LatticeKind) -> Self {
        Self {
            kind,
            beliefs: Vec::new(),
            subscribers: Vec::new(),
        }
    }

    /// The value kind this cell was created with.
    pub fn kind(&self) -> LatticeKind {
        self.kind
    }

    /// Every belief ever added to this cell, active or not.
    ///
    /// # Example
    ///
    /// ```rust
    /// use hearsay::lattice::Value;
    /// use hearsay::network::Network;
    ///
    /// let mut net = Network::new();
    /// let c = net.create_cell();
    /// net.add_content(c, Value::Number(40.0), "s1").unwrap();
    /// net.add_content(c, Value::Number(65.0), "s2").unwrap();
    /// net.retract_content(c, "s2").unwrap();
    ///
    /// // Retraction flips labels; the belief record stays until
    /// // compaction.
    /// let cell = net.cell(c).unwrap();
    /// assert_eq!(cell.beliefs().len(), 2);
    /// let active = cell
    ///     .beliefs()
    ///     .iter()
    ///     .filter(|b| net.tms().label(b.node).is_in())
    ///     .count();
    /// assert_eq!(active, 1);
    /// ```
    pub fn beliefs(&self) -> &[Belief] {
        &self.beliefs
    }

    /// Propagators subscribed to this cell, in insertion order.
    pub fn subscribers(&self) -> &[PropagatorId] {
        &self.subscribers
    }

    pub(crate) fn subscribe(&mut self, id: PropagatorId) {
        if !self.subscribers.contains(&id) {
            self.subscribers.push(id);
        }
    }

    pub(crate) fn push_belief(&mut self, belief: Belief) {
        self.beliefs.push(belief);
    }

    /// Index of the first belief with this informant and a
    /// lattice-equal value, regardless of label.
    pub(crate) fn find_belief(&self, informant: &Informant, value: &Value) -> Option<usize> {
        self.beliefs
            .iter()
            .position(|b| b.informant == *informant && b.value.lattice_eq(value))
    }

    /// The active-value projection over currently-`in` beliefs.
    pub fn active_value(&self, tms: &Tms) -> Value {
        let mut active = self
            .beliefs
            .iter()
            .filter(|b| tms.label(b.node).is_in())
            .map(|b| &b.value);
        let Some(first) = active.next() else {
            return Value::Nothing;
        };
        for v in active {
            if !first.lattice_eq(v) {
                return Value::Contradiction;
            }
        }
        first.clone()
    }

    /// Record the current generation on every belief whose node is
    /// `in`, so compaction can age the rest.
    pub(crate) fn mark_in_beliefs(&mut self, tms: &Tms, generation: u64) {
        for b in &mut self.beliefs {
            if tms.label(b.node).is_in() {
                b.last_in_generation = generation;
            }
        }
    }

    /// Drop beliefs failing the keep predicate; returns how many were
    /// discarded.
    pub(crate) fn sweep(&mut self, keep: impl Fn(&Belief) -> bool) -> usize {
        let before = self.beliefs.len();
        self.beliefs.retain(|b| keep(b));
        before - self.beliefs.len()
    }
}
