//! A justification-based truth maintenance system (JTMS).
//!
//! The TMS is a graph of labeled **nodes** linked by **justifications**.
//! Each node is either `in` (currently believed) or `out` (not
//! currently supported). A justification `(informant, in_list,
//! out_list)` authorizes its node to be `in` exactly when every node in
//! `in_list` is `in` and every node in `out_list` is `out`. The
//! out-list is what makes the system **non-monotonic**: a default like
//! "birds fly unless abnormal" is one justification with `bird` in the
//! in-list and `abnormal` in the out-list.
//!
//! Labels are recomputed by a breadth-first worklist whenever a
//! justification is added or an assumption is toggled; after every
//! public operation the graph is at fixpoint. Retraction toggles
//! labels; nodes are never deleted.
//!
//! # Example
//!
//! ```rust
//! use hearsay::tms::{Informant, Label, Tms};
//!
//! let mut tms = Tms::new();
//! let bird = tms.create_node("bird");
//! let abnormal = tms.create_node("abnormal");
//! let flies = tms.create_node("flies");
//!
//! tms.assume_node(bird);
//! tms.justify_node(flies, Informant::from("default"), vec![bird], vec![abnormal]);
//! assert_eq!(tms.label(flies), Label::In);
//!
//! // New contrary evidence defeats the default…
//! tms.assume_node(abnormal);
//! assert_eq!(tms.label(flies), Label::Out);
//!
//! // …and retracting it restores the default.
//! tms.retract_assumption(abnormal);
//! assert_eq!(tms.label(flies), Label::In);
//! ```

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

/// The reserved informant naming assumption justifications.
const ASSUMPTION_INFORMANT: &str = "assumption";

/// A caller-supplied label identifying the *source* of a belief: a
/// sensor name, a rule name, a propagator identity. Retraction is
/// addressed by informant.
///
/// # Example
///
/// ```rust
/// use hearsay::tms::Informant;
///
/// let src: Informant = "front-door-sensor".into();
/// assert_eq!(src.as_str(), "front-door-sensor");
/// assert!(!src.is_assumption());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Informant(String);

impl Informant {
    /// The reserved informant marking assumption justifications.
    pub fn assumption() -> Self {
        Informant(ASSUMPTION_INFORMANT.to_string())
    }

    /// Is this the reserved assumption informant?
    pub fn is_assumption(&self) -> bool {
        self.0 == ASSUMPTION_INFORMANT
    }

    /// The informant text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Is the informant the empty string? Empty informants are rejected
    /// wherever content enters the network.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Informant {
    fn from(s: &str) -> Self {
        Informant(s.to_string())
    }
}

impl From<String> for Informant {
    fn from(s: String) -> Self {
        Informant(s)
    }
}

impl fmt::Display for Informant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to a TMS node. Only minted by [`Tms::create_node`]; handles
/// are never reused within a TMS lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// A node's label: believed or not currently supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    /// The node has a valid justification and is believed.
    In,
    /// No justification for the node is currently valid.
    Out,
}

impl Label {
    /// `true` iff the label is [`Label::In`].
    pub fn is_in(&self) -> bool {
        matches!(self, Label::In)
    }
}

/// An immutable record authorizing a node to be `in`.
///
/// Valid iff every node in `in_list` is `in` and every node in
/// `out_list` is `out`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Justification {
    /// Who installed this justification.
    pub informant: Informant,
    /// Antecedents that must be `in`.
    pub in_list: Vec<NodeId>,
    /// Antecedents that must be `out`.
    pub out_list: Vec<NodeId>,
}

impl Justification {
    /// Is this the special justification inserted by
    /// [`Tms::assume_node`]?
    pub fn is_assumption(&self) -> bool {
        self.informant.is_assumption()
    }
}

struct Node {
    name: String,
    label: Label,
    assumption: bool,
    justifications: Vec<Justification>,
    // Clone of the winning justification rather than an index, so
    // justification removal cannot leave a dangling reference.
    support: Option<Justification>,
    // Every node whose justifications reference this one, in either
    // list. Maintained incrementally by justify_node.
    consequences: BTreeSet<NodeId>,
}

/// The truth maintenance system: a labeled-node graph kept at fixpoint.
#[derive(Default)]
pub struct Tms {
    nodes: Vec<Node>,
    by_name: HashMap<String, NodeId>,
}

impl Tms {
    /// Create an empty TMS.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes created so far.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Has no nodes yet?
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Create a node, or return the existing one of the same name.
    /// Fresh nodes start `out`, with no justifications and no support.
    ///
    /// # Example
    ///
    /// ```rust
    /// use hearsay::tms::{Label, Tms};
    ///
    /// let mut tms = Tms::new();
    /// let a = tms.create_node("a");
    /// assert_eq!(tms.label(a), Label::Out);
    ///
    /// // Idempotent: the same name resolves to the same node.
    /// assert_eq!(tms.create_node("a"), a);
    /// assert_eq!(tms.len(), 1);
    /// ```
    pub fn create_node(&mut self, name: &str) -> NodeId {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.to_string(),
            label: Label::Out,
            assumption: false,
            justifications: Vec::new(),
            support: None,
            consequences: BTreeSet::new(),
        });
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Look up a node by name.
    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    /// The node's current label. Unknown handles read as `Out`.
    pub fn label(&self, node: NodeId) -> Label {
        self.nodes.get(node.0).map_or(Label::Out, |n| n.label)
    }

    /// The justification currently making the node `in`, or `None`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use hearsay::tms::{Informant, Tms};
    ///
    /// let mut tms = Tms::new();
    /// let a = tms.create_node("a");
    /// let b = tms.create_node("b");
    ///
    /// tms.assume_node(a);
    /// tms.justify_node(b, Informant::from("rule"), vec![a], vec![]);
    ///
    /// let support = tms.why(b).unwrap();
    /// assert_eq!(support.informant.as_str(), "rule");
    /// assert_eq!(support.in_list, vec![a]);
    ///
    /// // An out node has no support.
    /// tms.retract_assumption(a);
    /// assert!(tms.why(b).is_none());
    /// ```
    pub fn why(&self, node: NodeId) -> Option<&Justification> {
        self.nodes.get(node.0).and_then(|n| n.support.as_ref())
    }

    /// Is the node currently flagged as an assumption?
    pub fn is_assumption(&self, node: NodeId) -> bool {
        self.nodes.get(node.0).is_some_and(|n| n.assumption)
    }

    /// The node's name.
    pub fn name(&self, node: NodeId) -> &str {
        self.nodes.get(node.0).map_or("", |n| n.name.as_str())
    }

    /// Does any justification in the graph reference this node?
    ///
    /// Compaction uses this: a belief whose node is referenced elsewhere
    /// must not be discarded, since dropping it could invalidate the
    /// provenance of other beliefs.
    pub fn has_consequences(&self, node: NodeId) -> bool {
        self.nodes
            .get(node.0)
            .is_some_and(|n| !n.consequences.is_empty())
    }

    /// Install a justification and re-propagate labels from the node.
    ///
    /// The justification is appended (insertion order is the observable
    /// tie-break: among several valid justifications, the earliest
    /// installed becomes the support). An exact duplicate (same
    /// informant, same antecedent lists) is not re-appended, which
    /// keeps repeated derivations of the same value from accumulating
    /// state.
    pub fn justify_node(
        &mut self,
        node: NodeId,
        informant: Informant,
        in_list: Vec<NodeId>,
        out_list: Vec<NodeId>,
    ) {
        debug_assert!(
            !informant.is_assumption(),
            "assumption justifications are installed by assume_node"
        );
        let Some(_) = self.nodes.get(node.0) else {
            warn!(%node, "justify_node on unknown node");
            return;
        };
        let just = Justification {
            informant,
            in_list,
            out_list,
        };
        if self.nodes[node.0].justifications.contains(&just) {
            // Re-derivation of an already-recorded dependency; the
            // label may still need refreshing (antecedents may have
            // flipped since).
            self.propagate_from(node);
            return;
        }
        for antecedent in just.in_list.iter().chain(just.out_list.iter()) {
            if let Some(a) = self.nodes.get_mut(antecedent.0) {
                a.consequences.insert(node);
            } else {
                warn!(%antecedent, "justification references unknown node");
            }
        }
        self.nodes[node.0].justifications.push(just);
        self.propagate_from(node);
    }

    /// Mark the node as an assumption and make it `in` by prepending
    /// the special assumption justification. Re-assuming an assumption
    /// is a no-op.
    pub fn assume_node(&mut self, node: NodeId) {
        let Some(n) = self.nodes.get_mut(node.0) else {
            warn!(%node, "assume_node on unknown node");
            return;
        };
        if n.assumption {
            return;
        }
        n.assumption = true;
        n.justifications.insert(
            0,
            Justification {
                informant: Informant::assumption(),
                in_list: Vec::new(),
                out_list: Vec::new(),
            },
        );
        self.propagate_from(node);
    }

    /// Withdraw the assumption: remove every assumption justification
    /// from the node and re-propagate. The node may stay `in` if some
    /// other justification still holds.
    pub fn retract_assumption(&mut self, node: NodeId) {
        let Some(n) = self.nodes.get_mut(node.0) else {
            warn!(%node, "retract_assumption on unknown node");
            return;
        };
        n.assumption = false;
        n.justifications.retain(|j| !j.is_assumption());
        self.propagate_from(node);
    }

    /// Is the justification valid under current labels?
    fn valid(&self, just: &Justification) -> bool {
        just.in_list.iter().all(|n| self.label(*n).is_in())
            && just.out_list.iter().all(|n| !self.label(*n).is_in())
    }

    /// Scan justifications in insertion order; the first valid one
    /// wins.
    fn compute_label(&self, node: NodeId) -> (Label, Option<Justification>) {
        for just in &self.nodes[node.0].justifications {
            if self.valid(just) {
                return (Label::In, Some(just.clone()));
            }
        }
        (Label::Out, None)
    }

    /// Breadth-first label propagation to fixpoint. Whenever a node's
    /// recomputed label differs from the stored one, every consequence
    /// is re-examined.
    fn propagate_from(&mut self, start: NodeId) {
        let mut queue = VecDeque::from([start]);
        while let Some(id) = queue.pop_front() {
            let (label, support) = self.compute_label(id);
            let node = &mut self.nodes[id.0];
            let flipped = node.label != label;
            node.label = label;
            node.support = support;
            if flipped {
                trace!(node = %id, name = node.name.as_str(), ?label, "label flip");
                queue.extend(node.consequences.iter().copied());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_node_is_out() {
        let mut tms = Tms::new();
        let n = tms.create_node("n");
        assert_eq!(tms.label(n), Label::Out);
        assert!(tms.why(n).is_none());
        assert!(!tms.is_assumption(n));
    }

    #[test]
    fn create_node_is_idempotent() {
        let mut tms = Tms::new();
        let a = tms.create_node("a");
        let a2 = tms.create_node("a");
        assert_eq!(a, a2);
        assert_eq!(tms.len(), 1);
    }

    #[test]
    fn assume_makes_in_retract_makes_out() {
        let mut tms = Tms::new();
        let a = tms.create_node("a");
        tms.assume_node(a);
        assert_eq!(tms.label(a), Label::In);
        assert!(tms.is_assumption(a));
        assert!(tms.why(a).is_some_and(|j| j.is_assumption()));

        tms.retract_assumption(a);
        assert_eq!(tms.label(a), Label::Out);
        assert!(!tms.is_assumption(a));
        assert!(tms.why(a).is_none());
    }

    #[test]
    fn justification_fires_when_antecedents_in() {
        let mut tms = Tms::new();
        let a = tms.create_node("a");
        let b = tms.create_node("b");
        tms.justify_node(b, "rule".into(), vec![a], vec![]);
        assert_eq!(tms.label(b), Label::Out);

        tms.assume_node(a);
        assert_eq!(tms.label(b), Label::In);
        assert_eq!(
            tms.why(b).map(|j| j.informant.clone()),
            Some(Informant::from("rule"))
        );
    }

    #[test]
    fn retraction_cascades_through_chain() {
        let mut tms = Tms::new();
        let a = tms.create_node("a");
        let b = tms.create_node("b");
        let c = tms.create_node("c");
        tms.justify_node(b, "ab".into(), vec![a], vec![]);
        tms.justify_node(c, "bc".into(), vec![b], vec![]);

        tms.assume_node(a);
        assert_eq!(tms.label(c), Label::In);

        tms.retract_assumption(a);
        assert_eq!(tms.label(b), Label::Out);
        assert_eq!(tms.label(c), Label::Out);
    }

    #[test]
    fn out_list_defeats_default() {
        let mut tms = Tms::new();
        let bird = tms.create_node("bird");
        let abnormal = tms.create_node("abnormal");
        let flies = tms.create_node("flies");

        tms.assume_node(bird);
        tms.justify_node(flies, "default".into(), vec![bird], vec![abnormal]);
        assert_eq!(tms.label(flies), Label::In);

        tms.assume_node(abnormal);
        assert_eq!(tms.label(flies), Label::Out);

        tms.retract_assumption(abnormal);
        assert_eq!(tms.label(flies), Label::In);
    }

    #[test]
    fn first_valid_justification_is_support() {
        let mut tms = Tms::new();
        let a = tms.create_node("a");
        let b = tms.create_node("b");
        let n = tms.create_node("n");
        tms.assume_node(a);
        tms.assume_node(b);
        tms.justify_node(n, "first".into(), vec![a], vec![]);
        tms.justify_node(n, "second".into(), vec![b], vec![]);

        assert_eq!(tms.label(n), Label::In);
        assert_eq!(tms.why(n).map(|j| j.informant.as_str()), Some("first"));

        // Defeat the first; the second takes over.
        tms.retract_assumption(a);
        assert_eq!(tms.label(n), Label::In);
        assert_eq!(tms.why(n).map(|j| j.informant.as_str()), Some("second"));
    }

    #[test]
    fn duplicate_justifications_are_not_accumulated() {
        let mut tms = Tms::new();
        let a = tms.create_node("a");
        let n = tms.create_node("n");
        tms.assume_node(a);
        tms.justify_node(n, "rule".into(), vec![a], vec![]);
        tms.justify_node(n, "rule".into(), vec![a], vec![]);
        assert_eq!(tms.nodes[n.0].justifications.len(), 1);
    }

    #[test]
    fn other_support_survives_retraction() {
        let mut tms = Tms::new();
        let a = tms.create_node("a");
        let n = tms.create_node("n");
        tms.assume_node(a);
        tms.assume_node(n);
        tms.justify_node(n, "rule".into(), vec![a], vec![]);

        // Retracting the assumption on n leaves the rule in force.
        tms.retract_assumption(n);
        assert_eq!(tms.label(n), Label::In);
        assert_eq!(tms.why(n).map(|j| j.informant.as_str()), Some("rule"));
    }

    #[test]
    fn consequences_tracked_for_out_list_members() {
        let mut tms = Tms::new();
        let a = tms.create_node("a");
        let n = tms.create_node("n");
        tms.justify_node(n, "unless".into(), vec![], vec![a]);
        assert_eq!(tms.label(n), Label::In);
        assert!(tms.has_consequences(a));

        tms.assume_node(a);
        assert_eq!(tms.label(n), Label::Out);
    }
}
