#![deny(missing_docs)]
//! # lattice-core — semilattice traits and combinators
//!
//! This crate provides the order-theoretic vocabulary the rest of the
//! workspace is written in:
//!
//! - [`JoinSemilattice`]: associative, commutative, idempotent `join`
//!   (least upper bound)
//! - [`BoundedJoinSemilattice`]: join-semilattice with a bottom element ⊥
//! - [`MeetSemilattice`]: the dual `meet` (greatest lower bound)
//! - [`BoundedLattice`]: both operations plus a top element ⊤
//! - [`JoinOf`]: a [`FromIterator`] collector that folds any iterator of
//!   lattice values by `join`, starting from ⊥
//!
//! ## Quick start
//!
//! ```rust
//! use lattice_core::{JoinSemilattice, MeetSemilattice, BoundedJoinSemilattice};
//! use std::collections::BTreeSet;
//!
//! let a: BTreeSet<_> = [1, 2, 3].into_iter().collect();
//! let b: BTreeSet<_> = [2, 3, 4].into_iter().collect();
//!
//! // join = union, meet = intersection, bottom = ∅
//! assert_eq!(a.join(&b), [1, 2, 3, 4].into_iter().collect());
//! assert_eq!(a.meet(&b), [2, 3].into_iter().collect());
//! assert!(BTreeSet::<i32>::bottom().is_empty());
//! ```
//!
//! ## Standard library implementations
//!
//! - [`BTreeSet<T>`](std::collections::BTreeSet) and
//!   [`HashSet<T>`](std::collections::HashSet): join = union,
//!   meet = intersection, bottom = empty set
//! - [`Option<L>`](Option): lifted lattice with `None` as bottom and
//!   `Some(a) ⊔ Some(b)` delegating to `L`
//! - Pairs `(A, B)`: componentwise product lattice

// Make the current crate visible as `lattice_core` so examples read the
// same inside and outside the crate.
extern crate self as lattice_core;

use std::collections::BTreeSet;
use std::collections::HashSet;
use std::hash::Hash;
use std::ops::Deref;

/// A **join-semilattice**: a type with a least-upper-bound operation.
///
/// Laws (not enforced by the type system):
///
/// - **Associative**: `a.join(&b).join(&c) == a.join(&b.join(&c))`
/// - **Commutative**: `a.join(&b) == b.join(&a)`
/// - **Idempotent**: `a.join(&a) == a`
///
/// The operation induces a partial order: `x ≤ y` iff `x.join(&y) == y`.
///
/// # Example
///
/// ```rust
/// use lattice_core::JoinSemilattice;
/// use std::collections::BTreeSet;
///
/// let a: BTreeSet<_> = [1, 2].into_iter().collect();
/// let b: BTreeSet<_> = [2, 3].into_iter().collect();
/// assert_eq!(a.join(&b), [1, 2, 3].into_iter().collect());
/// ```
pub trait JoinSemilattice: Sized {
    /// Least upper bound of `self` and `other`.
    fn join(&self, other: &Self) -> Self;

    /// In-place join.
    fn join_assign(&mut self, other: &Self) {
        *self = self.join(other);
    }

    /// The induced order: `self ≤ other` iff joining adds nothing.
    fn leq(&self, other: &Self) -> bool
    where
        Self: PartialEq,
    {
        self.join(other) == *other
    }
}

/// A join-semilattice with an explicit bottom element ⊥.
///
/// Laws: `bottom().join(&a) == a` for every `a` (⊥ is the identity of
/// `join`, and the least element of the induced order).
pub trait BoundedJoinSemilattice: JoinSemilattice {
    /// The least element ⊥.
    fn bottom() -> Self;

    /// Join every element of an iterator, starting from ⊥.
    ///
    /// Empty iterators yield ⊥.
    fn join_all_from_bottom<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        iter.into_iter().fold(Self::bottom(), |acc, x| acc.join(&x))
    }
}

/// A **meet-semilattice**: the dual operation, greatest lower bound.
///
/// Laws mirror [`JoinSemilattice`]: associative, commutative, idempotent.
///
/// # Example
///
/// ```rust
/// use lattice_core::MeetSemilattice;
/// use std::collections::BTreeSet;
///
/// let a: BTreeSet<_> = [1, 2, 3].into_iter().collect();
/// let b: BTreeSet<_> = [2, 3, 4].into_iter().collect();
/// assert_eq!(a.meet(&b), [2, 3].into_iter().collect());
/// ```
pub trait MeetSemilattice: Sized {
    /// Greatest lower bound of `self` and `other`.
    fn meet(&self, other: &Self) -> Self;
}

/// A bounded lattice: join, meet, bottom, and a top element ⊤.
///
/// Laws: `a.meet(&top()) == a` for every `a` (⊤ is the identity of
/// `meet`, and the greatest element of the order).
pub trait BoundedLattice: BoundedJoinSemilattice + MeetSemilattice {
    /// The greatest element ⊤.
    fn top() -> Self;
}

// Sets: join = union, meet = intersection, bottom = ∅.

impl<T: Ord + Clone> JoinSemilattice for BTreeSet<T> {
    fn join(&self, other: &Self) -> Self {
        self.union(other).cloned().collect()
    }
}

impl<T: Ord + Clone> BoundedJoinSemilattice for BTreeSet<T> {
    fn bottom() -> Self {
        BTreeSet::new()
    }
}

impl<T: Ord + Clone> MeetSemilattice for BTreeSet<T> {
    fn meet(&self, other: &Self) -> Self {
        self.intersection(other).cloned().collect()
    }
}

impl<T: Eq + Hash + Clone> JoinSemilattice for HashSet<T> {
    fn join(&self, other: &Self) -> Self {
        self.union(other).cloned().collect()
    }
}

impl<T: Eq + Hash + Clone> BoundedJoinSemilattice for HashSet<T> {
    fn bottom() -> Self {
        HashSet::new()
    }
}

impl<T: Eq + Hash + Clone> MeetSemilattice for HashSet<T> {
    fn meet(&self, other: &Self) -> Self {
        self.intersection(other).cloned().collect()
    }
}

// Option: lifted lattice, None = ⊥.

impl<L: JoinSemilattice + Clone> JoinSemilattice for Option<L> {
    fn join(&self, other: &Self) -> Self {
        match (self, other) {
            (None, x) | (x, None) => x.clone(),
            (Some(a), Some(b)) => Some(a.join(b)),
        }
    }
}

impl<L: JoinSemilattice + Clone> BoundedJoinSemilattice for Option<L> {
    fn bottom() -> Self {
        None
    }
}

// Pairs: componentwise product lattice.

impl<A: JoinSemilattice, B: JoinSemilattice> JoinSemilattice for (A, B) {
    fn join(&self, other: &Self) -> Self {
        (self.0.join(&other.0), self.1.join(&other.1))
    }
}

impl<A: BoundedJoinSemilattice, B: BoundedJoinSemilattice> BoundedJoinSemilattice for (A, B) {
    fn bottom() -> Self {
        (A::bottom(), B::bottom())
    }
}

impl<A: MeetSemilattice, B: MeetSemilattice> MeetSemilattice for (A, B) {
    fn meet(&self, other: &Self) -> Self {
        (self.0.meet(&other.0), self.1.meet(&other.1))
    }
}

/// A wrapper type for collecting values using their lattice `join`.
///
/// `JoinOf<L>` turns any iterator of `L` into a single value by
/// repeatedly applying `join`, starting from ⊥. It implements
/// [`FromIterator`] for both owned `L` and references `&L`:
///
/// ```
/// use lattice_core::{JoinOf, JoinSemilattice};
/// use std::collections::BTreeSet;
///
/// let a: BTreeSet<_> = [1, 2].into_iter().collect();
/// let b: BTreeSet<_> = [2, 3].into_iter().collect();
///
/// // Join = union, so collecting produces the union.
/// let JoinOf(u) = [a, b].into_iter().collect::<JoinOf<_>>();
/// assert_eq!(u, [1, 2, 3].into_iter().collect());
/// ```
///
/// # Empty iterators
///
/// An empty iterator yields the **bottom** element (`L::bottom()`), so
/// `JoinOf` is a total reduction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOf<L>(pub L);

impl<L> JoinOf<L> {
    /// Unwrap the inner value.
    pub fn into_inner(self) -> L {
        self.0
    }
}

impl<L> Deref for JoinOf<L> {
    type Target = L;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Collect with join, treating an empty iterator as ⊥.
impl<L> FromIterator<L> for JoinOf<L>
where
    L: BoundedJoinSemilattice,
{
    fn from_iter<T: IntoIterator<Item = L>>(iter: T) -> Self {
        JoinOf(L::join_all_from_bottom(iter))
    }
}

/// Collect with join from references, cloning items. Still treats an
/// empty iterator as ⊥.
impl<'a, L> FromIterator<&'a L> for JoinOf<L>
where
    L: BoundedJoinSemilattice + Clone,
{
    fn from_iter<T: IntoIterator<Item = &'a L>>(iter: T) -> Self {
        let acc = iter.into_iter().fold(L::bottom(), |acc, x| acc.join(x));
        JoinOf(acc)
    }
}
