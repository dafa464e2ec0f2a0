//! Property-based tests for the value lattice.
//!
//! These verify that the merge actually satisfies the semilattice laws
//! it claims: commutativity and idempotence over the whole value space,
//! associativity over well-separated values (ε-closeness is not
//! transitive at the tolerance boundary, so associativity is only
//! meaningful away from it; integer-valued numbers are never within
//! relative ε of a distinct integer).

use std::collections::BTreeSet;

use proptest::prelude::*;

use hearsay::lattice::Value;
use lattice_core::{BoundedJoinSemilattice, BoundedLattice, JoinSemilattice, MeetSemilattice};

/// Any value, numbers drawn from a finite range.
fn any_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Nothing),
        Just(Value::Contradiction),
        (-1e9f64..1e9f64).prop_map(Value::Number),
        prop::collection::btree_set(-50i64..50, 1..6).prop_map(Value::Set),
    ]
}

/// Values whose numbers sit on an integer grid, so lattice equality
/// coincides with exact equality.
fn separated_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Nothing),
        Just(Value::Contradiction),
        (-1000i32..1000).prop_map(|n| Value::Number(f64::from(n))),
        prop::collection::btree_set(-50i64..50, 1..6).prop_map(Value::Set),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn merge_is_commutative(a in any_value(), b in any_value()) {
        let ab = a.join(&b);
        let ba = b.join(&a);
        prop_assert!(ab.lattice_eq(&ba), "{ab} vs {ba}");
    }

    #[test]
    fn merge_is_idempotent(a in any_value()) {
        prop_assert!(a.join(&a).lattice_eq(&a));
    }

    #[test]
    fn merge_is_associative_on_separated_values(
        a in separated_value(),
        b in separated_value(),
        c in separated_value()
    ) {
        let left = a.join(&b).join(&c);
        let right = a.join(&b.join(&c));
        prop_assert!(left.lattice_eq(&right), "{left} vs {right}");
    }

    #[test]
    fn bottom_is_identity(a in any_value()) {
        prop_assert!(Value::bottom().join(&a).lattice_eq(&a));
        prop_assert!(a.join(&Value::bottom()).lattice_eq(&a));
    }

    #[test]
    fn top_absorbs(a in any_value()) {
        prop_assert_eq!(Value::top().join(&a), Value::Contradiction);
        prop_assert_eq!(a.join(&Value::top()), Value::Contradiction);
    }

    #[test]
    fn absorption_holds(a in separated_value(), b in separated_value()) {
        // a ∨ (a ∧ b) = a
        let lhs = a.join(&a.meet(&b));
        prop_assert!(lhs.lattice_eq(&a), "{lhs} vs {a}");
    }

    #[test]
    fn equality_is_merge_compatible(a in any_value(), b in any_value()) {
        if a.lattice_eq(&b) {
            prop_assert!(a.join(&b).lattice_eq(&a));
        }
    }

    #[test]
    fn set_merge_never_widens(
        a in prop::collection::btree_set(-50i64..50, 1..8),
        b in prop::collection::btree_set(-50i64..50, 1..8)
    ) {
        match Value::Set(a.clone()).join(&Value::Set(b.clone())) {
            Value::Set(merged) => {
                prop_assert!(merged.is_subset(&a));
                prop_assert!(merged.is_subset(&b));
            }
            Value::Contradiction => {
                let inter: BTreeSet<i64> = a.intersection(&b).copied().collect();
                prop_assert!(inter.is_empty());
            }
            other => prop_assert!(false, "unexpected merge result {other}"),
        }
    }
}
