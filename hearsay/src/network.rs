//! The network: cells, propagators, and their TMS, behind one owner.
//!
//! All cells and propagators live behind a single serialized owner:
//! every public operation runs to quiescence before returning, so a
//! caller never observes a half-propagated network. (Early propagator
//! systems gave each cell and each propagator its own actor; at even
//! moderate scale that becomes a message storm. One owner with plain
//! in-memory maps keeps the same handle-based API and makes the global
//! fixpoint invariant trivial to maintain.)
//!
//! ## Data flow
//!
//! [`Network::add_content`] turns the caller's informant into a TMS
//! assumption, appends a belief, and, if the cell's active value
//! changed, fires subscribed propagators depth-first in subscription
//! order. Each firing reads the inputs' active values, and its writes
//! are applied as **derived** content: the written belief's node is
//! justified by the input beliefs that were read. Retracting an
//! informant therefore cascades automatically: the TMS relabels, the
//! derived values vanish from every active view, and nothing is ever
//! rebuilt.
//!
//! # Example
//!
//! ```rust
//! use hearsay::arith::adder;
//! use hearsay::lattice::Value;
//! use hearsay::network::Network;
//!
//! let mut net = Network::new();
//! let a = net.create_cell();
//! let b = net.create_cell();
//! let s = net.create_cell();
//! adder(&mut net, a, b, s).unwrap();
//!
//! net.add_content(a, Value::Number(3.0), "src_a").unwrap();
//! net.add_content(b, Value::Number(5.0), "src_b").unwrap();
//! assert_eq!(net.read_cell(s).unwrap(), Value::Number(8.0));
//!
//! // Retracting an input withdraws everything derived from it.
//! net.retract_content(a, "src_a").unwrap();
//! assert_eq!(net.read_cell(s).unwrap(), Value::Nothing);
//! ```

use std::collections::{BTreeSet, HashMap, VecDeque};

use lattice_core::JoinOf;
use tracing::{debug, trace, warn};

use crate::cell::{Belief, BeliefCell, CellId};
use crate::config::NetworkConfig;
use crate::error::NetworkError;
use crate::lattice::{LatticeKind, Value};
use crate::propagator::{Activation, Propagator, PropagatorFn, PropagatorId};
use crate::tms::{Informant, NodeId, Tms};

/// A belief-tracking propagator network.
///
/// Owns its cells, its propagators, and the TMS that tracks why each
/// value is believed. Ids are monotonically assigned and never reused;
/// cells and propagators are created, never destroyed.
pub struct Network {
    cells: Vec<BeliefCell>,
    propagators: Vec<Propagator>,
    tms: Tms,
    config: NetworkConfig,
    // Source informant of each belief node, across all cells. Used to
    // name the assumptions behind a value in `support_of`.
    informants: HashMap<NodeId, Informant>,
    // Distinguishes re-added beliefs from their retracted ancestors.
    nonce: u64,
    // Bumped once per public mutating call; compaction ages by it.
    generation: u64,
}

impl Network {
    /// An empty network with default configuration.
    pub fn new() -> Self {
        Self::with_config(NetworkConfig::default())
    }

    /// An empty network with the given configuration.
    pub fn with_config(config: NetworkConfig) -> Self {
        Self {
            cells: Vec::new(),
            propagators: Vec::new(),
            tms: Tms::new(),
            config,
            informants: HashMap::new(),
            nonce: 0,
            generation: 0,
        }
    }

    /// The network's configuration.
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Read access to the underlying TMS: labels, supports, `why`.
    pub fn tms(&self) -> &Tms {
        &self.tms
    }

    /// Create a number-valued cell.
    pub fn create_cell(&mut self) -> CellId {
        self.create_cell_with_kind(LatticeKind::Number)
    }

    /// Create a cell of the given value kind.
    pub fn create_cell_with_kind(&mut self, kind: LatticeKind) -> CellId {
        let id = CellId(self.cells.len());
        self.cells.push(BeliefCell::new(kind));
        id
    }

    /// Read access to a cell's beliefs and subscribers.
    pub fn cell(&self, id: CellId) -> Result<&BeliefCell, NetworkError> {
        self.cells.get(id.0).ok_or(NetworkError::CellNotFound(id))
    }

    /// Read access to a propagator's wiring.
    pub fn propagator(&self, id: PropagatorId) -> Option<&Propagator> {
        self.propagators.get(id.0)
    }

    /// Register a propagator and fire it once so pre-existing values
    /// propagate immediately.
    ///
    /// Every input cell must exist (`CellsNotFound` otherwise); output
    /// cells need not; writes to unknown outputs are dropped silently.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use hearsay::lattice::Value;
    /// use hearsay::network::Network;
    /// use hearsay::propagator::Activation;
    ///
    /// let mut net = Network::new();
    /// let celsius = net.create_cell();
    /// let kelvin = net.create_cell();
    ///
    /// net.create_propagator(
    ///     vec![celsius],
    ///     vec![kelvin],
    ///     "to-kelvin",
    ///     Arc::new(move |vals| match vals[0].as_number() {
    ///         Some(c) => Activation::write_one(kelvin, Value::Number(c + 273.15)),
    ///         None => Activation::Skip,
    ///     }),
    /// )
    /// .unwrap();
    ///
    /// net.add_content(celsius, Value::Number(20.0), "thermometer").unwrap();
    /// assert_eq!(net.read_cell(kelvin).unwrap(), Value::Number(293.15));
    /// ```
    pub fn create_propagator(
        &mut self,
        inputs: Vec<CellId>,
        outputs: Vec<CellId>,
        informant: impl Into<Informant>,
        f: PropagatorFn,
    ) -> Result<PropagatorId, NetworkError> {
        let informant = informant.into();
        if informant.is_empty() || informant.is_assumption() {
            return Err(NetworkError::InformantRequired);
        }
        let missing: Vec<CellId> = inputs
            .iter()
            .filter(|c| c.0 >= self.cells.len())
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(NetworkError::CellsNotFound(missing));
        }
        let id = PropagatorId(self.propagators.len());
        for input in &inputs {
            self.cells[input.0].subscribe(id);
        }
        debug!(propagator = %id, %informant, ?inputs, ?outputs, "propagator installed");
        self.propagators
            .push(Propagator::new(inputs, outputs, informant, f));
        self.generation += 1;
        self.fire_propagator(id);
        self.refresh_generations();
        Ok(id)
    }

    /// The cell's active value: [`Value::Nothing`], a merged value, or
    /// [`Value::Contradiction`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use hearsay::lattice::Value;
    /// use hearsay::network::Network;
    ///
    /// let mut net = Network::new();
    /// let c = net.create_cell();
    /// assert_eq!(net.read_cell(c).unwrap(), Value::Nothing);
    ///
    /// net.add_content(c, Value::Number(40.0), "s1").unwrap();
    /// assert_eq!(net.read_cell(c).unwrap(), Value::Number(40.0));
    ///
    /// // A second opinion that disagrees is a contradiction, not an
    /// // error.
    /// net.add_content(c, Value::Number(65.0), "s2").unwrap();
    /// assert_eq!(net.read_cell(c).unwrap(), Value::Contradiction);
    /// ```
    pub fn read_cell(&self, cell: CellId) -> Result<Value, NetworkError> {
        self.cell(cell).map(|c| c.active_value(&self.tms))
    }

    /// Assert content into a cell on the authority of `informant`.
    ///
    /// The informant must be non-empty and must not be the reserved
    /// TMS marker `assumption` (`InformantRequired` otherwise).
    ///
    /// The informant becomes a retractable TMS assumption. If the cell
    /// already holds an active belief with the same informant and a
    /// lattice-equal value, the call is a no-op. If the cell's active
    /// value changes, subscribed propagators fire before the call
    /// returns.
    ///
    /// # Example
    ///
    /// ```rust
    /// use hearsay::error::NetworkError;
    /// use hearsay::lattice::Value;
    /// use hearsay::network::Network;
    ///
    /// let mut net = Network::new();
    /// let c = net.create_cell();
    ///
    /// net.add_content(c, Value::Number(1.0), "sensor").unwrap();
    ///
    /// // Beliefs must be traceable: no informant, no content.
    /// assert_eq!(
    ///     net.add_content(c, Value::Number(1.0), ""),
    ///     Err(NetworkError::InformantRequired)
    /// );
    /// ```
    pub fn add_content(
        &mut self,
        cell: CellId,
        value: Value,
        informant: impl Into<Informant>,
    ) -> Result<(), NetworkError> {
        let informant = informant.into();
        let c = self
            .cells
            .get(cell.0)
            .ok_or(NetworkError::CellNotFound(cell))?;
        if informant.is_empty() || informant.is_assumption() {
            return Err(NetworkError::InformantRequired);
        }
        if !c.kind().admits(&value) {
            return Err(NetworkError::LatticeMismatch {
                cell,
                expected: c.kind(),
            });
        }
        let already_in = c
            .beliefs()
            .iter()
            .any(|b| {
                b.informant == informant
                    && b.value.lattice_eq(&value)
                    && self.tms.label(b.node).is_in()
            });
        if already_in {
            trace!(%cell, %informant, "add_content no-op: belief already active");
            return Ok(());
        }
        debug!(%cell, %informant, %value, "add_content");
        let before = self.active_of(cell);
        let node = self.fresh_node(cell, &informant);
        self.tms.assume_node(node);
        self.generation += 1;
        self.cells[cell.0].push_belief(Belief {
            value,
            node,
            informant,
            last_in_generation: self.generation,
        });
        self.changed_since(cell, &before);
        self.refresh_generations();
        Ok(())
    }

    /// Retract everything this informant asserted into the cell.
    ///
    /// The informant's assumptions are withdrawn and the TMS relabels
    /// to fixpoint; every derived value whose support vanished drops
    /// out of the active views. Afterwards every propagator in the
    /// network is re-fired, so any cell whose active value changed is
    /// reconsidered. Retracting an informant with no beliefs in the
    /// cell is a no-op.
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
    /// assert_eq!(net.read_cell(c).unwrap(), Value::Contradiction);
    ///
    /// // Withdrawing the offending source restores the survivor.
    /// net.retract_content(c, "s2").unwrap();
    /// assert_eq!(net.read_cell(c).unwrap(), Value::Number(40.0));
    /// ```
    pub fn retract_content(
        &mut self,
        cell: CellId,
        informant: impl Into<Informant>,
    ) -> Result<(), NetworkError> {
        let informant = informant.into();
        let c = self
            .cells
            .get(cell.0)
            .ok_or(NetworkError::CellNotFound(cell))?;
        let nodes: Vec<NodeId> = c
            .beliefs()
            .iter()
            .filter(|b| b.informant == informant)
            .map(|b| b.node)
            .collect();
        debug!(%cell, %informant, retracting = nodes.len(), "retract_content");
        for node in nodes {
            self.tms.retract_assumption(node);
        }
        self.generation += 1;
        // Label flips can ripple anywhere, so every propagator is
        // reconsidered. A refined implementation would map flipped
        // nodes back to their cells and fire only those subscribers.
        for i in 0..self.propagators.len() {
            self.fire_propagator(PropagatorId(i));
        }
        self.refresh_generations();
        Ok(())
    }

    /// The informants whose assumptions transitively support the cell's
    /// active beliefs.
    ///
    /// Walks each active belief's support chain (`why`, then the
    /// in-lists, recursively) down to assumption nodes. Retracting
    /// every informant returned is guaranteed to clear the cell. This
    /// is the entry point for dependency-directed backtracking layered
    /// above the kernel.
    ///
    /// # Example
    ///
    /// ```rust
    /// use hearsay::arith::adder;
    /// use hearsay::lattice::Value;
    /// use hearsay::network::Network;
    /// use hearsay::tms::Informant;
    ///
    /// let mut net = Network::new();
    /// let (a, b, s) = (net.create_cell(), net.create_cell(), net.create_cell());
    /// adder(&mut net, a, b, s).unwrap();
    /// net.add_content(a, Value::Number(3.0), "src_a").unwrap();
    /// net.add_content(b, Value::Number(5.0), "src_b").unwrap();
    ///
    /// // The derived sum is supported by both sources.
    /// let support = net.support_of(s).unwrap();
    /// assert!(support.contains(&Informant::from("src_a")));
    /// assert!(support.contains(&Informant::from("src_b")));
    /// ```
    pub fn support_of(&self, cell: CellId) -> Result<BTreeSet<Informant>, NetworkError> {
        let c = self.cell(cell)?;
        let JoinOf(support) = c
            .beliefs()
            .iter()
            .filter(|b| self.tms.label(b.node).is_in())
            .map(|b| self.assumptions_behind(b.node))
            .collect::<JoinOf<BTreeSet<Informant>>>();
        Ok(support)
    }

    /// Sweep aged-out beliefs. Returns how many were discarded.
    ///
    /// A belief is discarded when its node has been `out` for at least
    /// the configured horizon of generations and no justification in
    /// the TMS references the node (so dropping the record cannot
    /// invalidate provenance elsewhere). Nodes themselves are never
    /// deleted.
    pub fn compact(&mut self) -> usize {
        let horizon = self.config.compaction_horizon;
        let generation = self.generation;
        let tms = &self.tms;
        let mut swept = 0;
        for cell in &mut self.cells {
            swept += cell.sweep(|b| {
                tms.label(b.node).is_in()
                    || tms.has_consequences(b.node)
                    || generation.saturating_sub(b.last_in_generation) < horizon
            });
        }
        if swept > 0 {
            debug!(swept, "compacted beliefs");
        }
        swept
    }

    fn active_of(&self, cell: CellId) -> Value {
        self.cells[cell.0].active_value(&self.tms)
    }

    fn fresh_node(&mut self, cell: CellId, informant: &Informant) -> NodeId {
        let name = format!("{cell}!{informant}#{}", self.nonce);
        self.nonce += 1;
        let node = self.tms.create_node(&name);
        self.informants.insert(node, informant.clone());
        node
    }

    /// If the cell's active value moved away from `before`, fire its
    /// subscribers in subscription order. Depth-first: a firing that
    /// changes further cells recurses before the next subscriber runs.
    fn changed_since(&mut self, cell: CellId, before: &Value) {
        let after = self.active_of(cell);
        if before.lattice_eq(&after) {
            return;
        }
        debug!(%cell, %before, %after, "active value changed");
        let subscribers = self.cells[cell.0].subscribers().to_vec();
        for id in subscribers {
            self.fire_propagator(id);
        }
    }

    fn fire_propagator(&mut self, id: PropagatorId) {
        let Some(prop) = self.propagators.get(id.0).cloned() else {
            return;
        };
        let inputs: Vec<Value> = prop.inputs().iter().map(|c| self.active_of(*c)).collect();
        trace!(propagator = %id, informant = %prop.informant(), "firing");
        match prop.fire(&inputs) {
            Activation::Skip => {}
            Activation::Write(writes) => {
                for (out, value) in writes {
                    self.apply_derived(prop.inputs(), prop.informant(), out, value);
                }
            }
        }
    }

    /// Apply one derived write: reuse or create the belief, justify its
    /// node by the input beliefs that were read, and propagate onward
    /// if the output cell's active value changed.
    fn apply_derived(
        &mut self,
        prop_inputs: &[CellId],
        informant: &Informant,
        out: CellId,
        value: Value,
    ) {
        let Some(c) = self.cells.get(out.0) else {
            trace!(%out, "dropping write to unknown cell");
            return;
        };
        if !c.kind().admits(&value) {
            warn!(%out, %value, expected = %c.kind(), "dropping kind-mismatched derived write");
            return;
        }
        let before = self.active_of(out);
        let in_list = self.supporting_nodes(prop_inputs);
        let node = match self.cells[out.0].find_belief(informant, &value) {
            Some(ix) => self.cells[out.0].beliefs()[ix].node,
            None => {
                let node = self.fresh_node(out, informant);
                self.cells[out.0].push_belief(Belief {
                    value,
                    node,
                    informant: informant.clone(),
                    last_in_generation: self.generation,
                });
                node
            }
        };
        // Derived beliefs are never assumptions: when the TMS finds no
        // valid justification left, they drop out on their own.
        self.tms
            .justify_node(node, informant.clone(), in_list, Vec::new());
        self.changed_since(out, &before);
    }

    /// One supporting node per input cell: an `in` belief whose value
    /// equals the cell's active value. A contradictory input has no
    /// single such belief, so every `in` belief of that cell joins the
    /// list (a causally sufficient superset).
    fn supporting_nodes(&self, inputs: &[CellId]) -> Vec<NodeId> {
        let mut supports = Vec::with_capacity(inputs.len());
        for input in inputs {
            let cell = &self.cells[input.0];
            match cell.active_value(&self.tms) {
                Value::Nothing => {}
                Value::Contradiction => {
                    supports.extend(
                        cell.beliefs()
                            .iter()
                            .filter(|b| self.tms.label(b.node).is_in())
                            .map(|b| b.node),
                    );
                }
                active => {
                    if let Some(b) = cell
                        .beliefs()
                        .iter()
                        .find(|b| self.tms.label(b.node).is_in() && b.value.lattice_eq(&active))
                    {
                        supports.push(b.node);
                    }
                }
            }
        }
        supports
    }

    /// Walk a node's support chain down to assumption nodes, collecting
    /// their informants.
    fn assumptions_behind(&self, node: NodeId) -> BTreeSet<Informant> {
        let mut found = BTreeSet::new();
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::from([node]);
        while let Some(n) = queue.pop_front() {
            if !seen.insert(n) {
                continue;
            }
            if self.tms.is_assumption(n) {
                if let Some(informant) = self.informants.get(&n) {
                    found.insert(informant.clone());
                }
                continue;
            }
            if let Some(just) = self.tms.why(n) {
                queue.extend(just.in_list.iter().copied());
            }
        }
        found
    }

    fn refresh_generations(&mut self) {
        let generation = self.generation;
        let tms = &self.tms;
        for cell in &mut self.cells {
            cell.mark_in_beliefs(tms, generation);
        }
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}
