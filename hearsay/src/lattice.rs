//! The cell value algebra: a bounded lattice of partial information.
//!
//! Every belief-cell holds values drawn from [`Value`]:
//!
//! - [`Value::Nothing`]: bottom, "no information yet"
//! - [`Value::Number`]: a floating-point quantity
//! - [`Value::Set`]: a finite domain of integers (used by the solver)
//! - [`Value::Contradiction`]: top, "irreconcilable information"
//!
//! `merge` (the lattice join) moves strictly up this order: merging two
//! close numbers keeps the first, merging two sets intersects them
//! (domains *shrink* as information sharpens), and merging anything
//! irreconcilable yields [`Value::Contradiction`]. Contradiction is a
//! value, never an error; callers resolve one by retracting an
//! informant.
//!
//! # Numeric equality
//!
//! Two numbers are lattice-equal when `|a − b| ≤ ε·max(|a|, |b|)` with
//! ε = 1e-10. A contradiction arising from floating-point roundoff
//! beyond that tolerance is surfaced, not silently re-merged away.
//!
//! # Example
//!
//! ```rust
//! use hearsay::lattice::Value;
//! use lattice_core::JoinSemilattice;
//!
//! let a = Value::Number(3.0);
//! let b = Value::Number(5.0);
//!
//! assert_eq!(a.join(&Value::Nothing), a);
//! assert_eq!(a.join(&a), a);
//! assert_eq!(a.join(&b), Value::Contradiction);
//! ```

use std::collections::BTreeSet;
use std::fmt;

use lattice_core::{BoundedJoinSemilattice, BoundedLattice, JoinSemilattice, MeetSemilattice};
use serde::{Deserialize, Serialize};

/// Relative tolerance for numeric lattice equality.
pub const EPSILON: f64 = 1e-10;

/// Two floats are "the same number" up to relative ε.
fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON * a.abs().max(b.abs())
}

/// A partial-information value held by a belief-cell.
///
/// The order is `Nothing < {Number, Set} < Contradiction`. Distinct
/// numbers (beyond ε) and disjoint sets have no upper bound short of
/// `Contradiction`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Bottom: no information.
    Nothing,
    /// A numeric quantity.
    Number(f64),
    /// A finite domain of integers. Invariant: non-empty. Use
    /// [`Value::set`] to construct; it normalizes an empty domain to
    /// `Contradiction`.
    Set(BTreeSet<i64>),
    /// Top: the cell has received irreconcilable information.
    Contradiction,
}

impl Value {
    /// Build a set value, normalizing the empty domain to
    /// `Contradiction` (an empty domain means "infeasible").
    ///
    /// # Example
    ///
    /// ```rust
    /// use hearsay::lattice::Value;
    ///
    /// assert_eq!(Value::set([1, 2, 2]), Value::set([2, 1]));
    /// assert_eq!(Value::set([]), Value::Contradiction);
    /// ```
    pub fn set<I: IntoIterator<Item = i64>>(items: I) -> Self {
        let s: BTreeSet<i64> = items.into_iter().collect();
        if s.is_empty() {
            Value::Contradiction
        } else {
            Value::Set(s)
        }
    }

    /// Is this the bottom element?
    pub fn is_nothing(&self) -> bool {
        matches!(self, Value::Nothing)
    }

    /// Is this the top element?
    pub fn is_contradiction(&self) -> bool {
        matches!(self, Value::Contradiction)
    }

    /// The number inside, if this is a numeric value.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(x) => Some(*x),
            _ => None,
        }
    }

    /// The domain inside, if this is a set value.
    pub fn as_set(&self) -> Option<&BTreeSet<i64>> {
        match self {
            Value::Set(s) => Some(s),
            _ => None,
        }
    }

    /// The lattice kind this value belongs to, or `None` for the
    /// kind-agnostic bounds `Nothing` and `Contradiction`.
    pub fn kind(&self) -> Option<LatticeKind> {
        match self {
            Value::Number(_) => Some(LatticeKind::Number),
            Value::Set(_) => Some(LatticeKind::Set),
            Value::Nothing | Value::Contradiction => None,
        }
    }

    /// Equality compatible with the merge: ε-tolerant on numbers,
    /// strict on sets. `lattice_eq(a, b)` implies `a.join(&b) == a`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use hearsay::lattice::Value;
    ///
    /// let a = Value::Number(1.0);
    /// let b = Value::Number(1.0 + 1e-12);
    /// assert!(a.lattice_eq(&b));
    /// assert!(!a.lattice_eq(&Value::Number(2.0)));
    /// assert!(!a.lattice_eq(&Value::Nothing));
    /// ```
    pub fn lattice_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nothing, Value::Nothing) => true,
            (Value::Contradiction, Value::Contradiction) => true,
            (Value::Number(a), Value::Number(b)) => close(*a, *b),
            (Value::Set(a), Value::Set(b)) => a == b,
            _ => false,
        }
    }
}

impl JoinSemilattice for Value {
    /// The merge: least upper bound in the information order.
    fn join(&self, other: &Self) -> Self {
        match (self, other) {
            (Value::Contradiction, _) | (_, Value::Contradiction) => Value::Contradiction,
            (Value::Nothing, x) | (x, Value::Nothing) => x.clone(),
            (Value::Number(a), Value::Number(b)) => {
                if close(*a, *b) {
                    Value::Number(*a)
                } else {
                    Value::Contradiction
                }
            }
            (Value::Set(a), Value::Set(b)) => {
                let meet = a.meet(b);
                if meet.is_empty() {
                    Value::Contradiction
                } else {
                    Value::Set(meet)
                }
            }
            // Cross-kind information has no common refinement.
            (Value::Number(_), Value::Set(_)) | (Value::Set(_), Value::Number(_)) => {
                Value::Contradiction
            }
        }
    }
}

impl BoundedJoinSemilattice for Value {
    fn bottom() -> Self {
        Value::Nothing
    }
}

impl MeetSemilattice for Value {
    /// Greatest lower bound in the information order: the most that
    /// two values agree on. Dual to the merge: sets *union* here,
    /// since either domain refines their common ancestor.
    fn meet(&self, other: &Self) -> Self {
        match (self, other) {
            (Value::Nothing, _) | (_, Value::Nothing) => Value::Nothing,
            (Value::Contradiction, x) | (x, Value::Contradiction) => x.clone(),
            (Value::Number(a), Value::Number(b)) => {
                if close(*a, *b) {
                    Value::Number(*a)
                } else {
                    Value::Nothing
                }
            }
            (Value::Set(a), Value::Set(b)) => Value::Set(a.join(b)),
            (Value::Number(_), Value::Set(_)) | (Value::Set(_), Value::Number(_)) => Value::Nothing,
        }
    }
}

impl BoundedLattice for Value {
    fn top() -> Self {
        Value::Contradiction
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nothing => write!(f, "nothing"),
            Value::Number(x) => write!(f, "{x}"),
            Value::Set(s) => {
                write!(f, "{{")?;
                for (i, v) in s.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "}}")
            }
            Value::Contradiction => write!(f, "contradiction"),
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Number(x)
    }
}

/// The value kind a cell is declared with.
///
/// Cells are monomorphic: a Number cell only ever accepts numbers, a
/// Set cell only ever accepts domains. Mixed writes are rejected at
/// `add_content` time with
/// [`NetworkError::LatticeMismatch`](crate::error::NetworkError::LatticeMismatch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LatticeKind {
    /// ε-tolerant floating-point quantities.
    Number,
    /// Finite integer domains merged by intersection.
    Set,
}

impl LatticeKind {
    /// Whether this cell kind accepts the given value. The bounds
    /// `Nothing` and `Contradiction` belong to every kind.
    ///
    /// # Example
    ///
    /// ```rust
    /// use hearsay::lattice::{LatticeKind, Value};
    ///
    /// assert!(LatticeKind::Number.admits(&Value::Number(1.0)));
    /// assert!(LatticeKind::Number.admits(&Value::Nothing));
    /// assert!(!LatticeKind::Number.admits(&Value::set([1, 2])));
    /// ```
    pub fn admits(&self, value: &Value) -> bool {
        match value.kind() {
            None => true,
            Some(k) => k == *self,
        }
    }
}

impl fmt::Display for LatticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LatticeKind::Number => write!(f, "number"),
            LatticeKind::Set => write!(f, "set"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(x: f64) -> Value {
        Value::Number(x)
    }

    #[test]
    fn nothing_is_identity() {
        assert_eq!(Value::Nothing.join(&num(3.0)), num(3.0));
        assert_eq!(num(3.0).join(&Value::Nothing), num(3.0));
        assert_eq!(Value::Nothing.join(&Value::Nothing), Value::Nothing);
    }

    #[test]
    fn contradiction_absorbs() {
        assert_eq!(Value::Contradiction.join(&num(3.0)), Value::Contradiction);
        assert_eq!(num(3.0).join(&Value::Contradiction), Value::Contradiction);
        assert_eq!(
            Value::Nothing.join(&Value::Contradiction),
            Value::Contradiction
        );
    }

    #[test]
    fn close_numbers_merge_distinct_numbers_clash() {
        assert_eq!(num(1.0).join(&num(1.0)), num(1.0));
        // Within relative ε.
        assert_eq!(num(1.0).join(&num(1.0 + 1e-12)), num(1.0));
        assert_eq!(num(2.0).join(&num(3.0)), Value::Contradiction);
    }

    #[test]
    fn zero_is_close_to_zero() {
        assert!(num(0.0).lattice_eq(&num(0.0)));
        assert!(!num(0.0).lattice_eq(&num(1e-6)));
    }

    #[test]
    fn set_merge_is_intersection() {
        let a = Value::set([1, 2, 3]);
        let b = Value::set([2, 3, 4]);
        assert_eq!(a.join(&b), Value::set([2, 3]));
    }

    #[test]
    fn disjoint_sets_clash() {
        let a = Value::set([1, 2]);
        let b = Value::set([3, 4]);
        assert_eq!(a.join(&b), Value::Contradiction);
    }

    #[test]
    fn empty_set_normalizes_to_contradiction() {
        assert_eq!(Value::set([]), Value::Contradiction);
    }

    #[test]
    fn cross_kind_merge_is_contradiction() {
        assert_eq!(num(1.0).join(&Value::set([1])), Value::Contradiction);
    }

    #[test]
    fn lattice_eq_is_merge_compatible() {
        let a = num(1.0);
        let b = num(1.0 + 1e-12);
        assert!(a.lattice_eq(&b));
        assert_eq!(a.join(&b), a);
    }

    #[test]
    fn kind_admits_bounds() {
        assert!(LatticeKind::Number.admits(&Value::Nothing));
        assert!(LatticeKind::Number.admits(&Value::Contradiction));
        assert!(LatticeKind::Number.admits(&num(1.0)));
        assert!(!LatticeKind::Number.admits(&Value::set([1])));
        assert!(LatticeKind::Set.admits(&Value::set([1])));
        assert!(!LatticeKind::Set.admits(&num(1.0)));
    }
}
