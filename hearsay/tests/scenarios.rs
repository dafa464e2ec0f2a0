//! End-to-end assertion/retraction scenarios over small constraint
//! networks.

use std::collections::BTreeSet;

use hearsay::arith::{adder, constant, multiplier};
use hearsay::lattice::Value;
use hearsay::network::Network;
use hearsay::tms::{Informant, Label};
use hearsay::CellId;

fn num(x: f64) -> Value {
    Value::Number(x)
}

fn three_cells(net: &mut Network) -> (CellId, CellId, CellId) {
    (net.create_cell(), net.create_cell(), net.create_cell())
}

#[test]
fn adder_forward_then_retract_source() {
    let mut net = Network::new();
    let (a, b, s) = three_cells(&mut net);
    adder(&mut net, a, b, s).unwrap();

    net.add_content(a, num(3.0), "src_a").unwrap();
    net.add_content(b, num(5.0), "src_b").unwrap();
    assert_eq!(net.read_cell(s), Ok(num(8.0)));

    net.retract_content(a, "src_a").unwrap();
    assert_eq!(net.read_cell(s), Ok(Value::Nothing));
    assert_eq!(net.read_cell(a), Ok(Value::Nothing));
    // The untouched source is unaffected.
    assert_eq!(net.read_cell(b), Ok(num(5.0)));
}

#[test]
fn adder_backward_then_retract_sum() {
    let mut net = Network::new();
    let (a, b, s) = three_cells(&mut net);
    adder(&mut net, a, b, s).unwrap();

    net.add_content(s, num(8.0), "src_s").unwrap();
    net.add_content(a, num(3.0), "src_a").unwrap();
    assert_eq!(net.read_cell(b), Ok(num(5.0)));

    net.retract_content(s, "src_s").unwrap();
    assert_eq!(net.read_cell(b), Ok(Value::Nothing));
}

#[test]
fn contradiction_and_recovery_without_propagators() {
    let mut net = Network::new();
    let c = net.create_cell();

    net.add_content(c, num(40.0), "s1").unwrap();
    net.add_content(c, num(65.0), "s2").unwrap();
    assert_eq!(net.read_cell(c), Ok(Value::Contradiction));

    net.retract_content(c, "s2").unwrap();
    assert_eq!(net.read_cell(c), Ok(num(40.0)));
}

#[test]
fn nonmonotonic_default_reasoning() {
    // Pure TMS usage: birds fly unless abnormal.
    let mut tms = hearsay::Tms::new();
    let bird = tms.create_node("bird");
    let abnormal = tms.create_node("abnormal");
    let flies = tms.create_node("flies");

    tms.assume_node(bird);
    tms.justify_node(flies, Informant::from("default"), vec![bird], vec![abnormal]);
    assert_eq!(tms.label(flies), Label::In);

    tms.assume_node(abnormal);
    assert_eq!(tms.label(flies), Label::Out);

    tms.retract_assumption(abnormal);
    assert_eq!(tms.label(flies), Label::In);
}

#[test]
fn diamond_cascade_retracts_as_a_unit() {
    let mut net = Network::new();
    let a = net.create_cell();
    let k2 = net.create_cell();
    let k3 = net.create_cell();
    let b = net.create_cell();
    let c = net.create_cell();
    let d = net.create_cell();

    multiplier(&mut net, a, k2, b).unwrap();
    multiplier(&mut net, a, k3, c).unwrap();
    adder(&mut net, b, c, d).unwrap();
    constant(&mut net, k2, 2.0, "k2").unwrap();
    constant(&mut net, k3, 3.0, "k3").unwrap();

    net.add_content(a, num(4.0), "src_a").unwrap();
    assert_eq!(net.read_cell(b), Ok(num(8.0)));
    assert_eq!(net.read_cell(c), Ok(num(12.0)));
    assert_eq!(net.read_cell(d), Ok(num(20.0)));

    net.retract_content(a, "src_a").unwrap();
    for cell in [a, b, c, d] {
        assert_eq!(net.read_cell(cell), Ok(Value::Nothing));
    }
    // The assumed constants survive.
    assert_eq!(net.read_cell(k2), Ok(num(2.0)));
    assert_eq!(net.read_cell(k3), Ok(num(3.0)));
}

#[test]
fn double_add_equals_single_add() {
    let mut net = Network::new();
    let (a, b, s) = three_cells(&mut net);
    adder(&mut net, a, b, s).unwrap();

    net.add_content(a, num(1.0), "src").unwrap();
    net.add_content(a, num(1.0), "src").unwrap();
    net.add_content(b, num(2.0), "other").unwrap();

    // The repeat assertion was a no-op: one belief from this source.
    let from_src = net
        .cell(a)
        .unwrap()
        .beliefs()
        .iter()
        .filter(|belief| belief.informant == Informant::from("src"))
        .count();
    assert_eq!(from_src, 1);
    assert_eq!(net.read_cell(s), Ok(num(3.0)));
}

#[test]
fn second_retract_is_a_noop() {
    let mut net = Network::new();
    let (a, b, s) = three_cells(&mut net);
    adder(&mut net, a, b, s).unwrap();
    net.add_content(a, num(1.0), "src").unwrap();
    net.add_content(b, num(2.0), "other").unwrap();

    net.retract_content(a, "src").unwrap();
    net.retract_content(a, "src").unwrap();
    assert_eq!(net.read_cell(a), Ok(Value::Nothing));
    assert_eq!(net.read_cell(s), Ok(Value::Nothing));
    assert_eq!(net.read_cell(b), Ok(num(2.0)));
}

#[test]
fn monotone_recovery_restores_the_survivor() {
    let mut net = Network::new();
    let c = net.create_cell();

    net.add_content(c, num(1.0), "s1").unwrap();
    assert_eq!(net.read_cell(c), Ok(num(1.0)));

    net.add_content(c, num(2.0), "s2").unwrap();
    assert_eq!(net.read_cell(c), Ok(Value::Contradiction));

    net.retract_content(c, "s2").unwrap();
    assert_eq!(net.read_cell(c), Ok(num(1.0)));
}

#[test]
fn insertion_order_breaks_justification_ties() {
    let mut tms = hearsay::Tms::new();
    let a = tms.create_node("a");
    let b = tms.create_node("b");
    let n = tms.create_node("n");
    tms.assume_node(a);
    tms.assume_node(b);
    tms.justify_node(n, Informant::from("earlier"), vec![a], vec![]);
    tms.justify_node(n, Informant::from("later"), vec![b], vec![]);

    // Both are valid; the earliest installed is the support.
    assert_eq!(tms.why(n).map(|j| j.informant.as_str()), Some("earlier"));
}

#[test]
fn active_cells_always_have_an_in_belief() {
    let mut net = Network::new();
    let (a, b, s) = three_cells(&mut net);
    adder(&mut net, a, b, s).unwrap();
    net.add_content(a, num(3.0), "src_a").unwrap();
    net.add_content(b, num(5.0), "src_b").unwrap();

    for cell in [a, b, s] {
        if net.read_cell(cell).unwrap() != Value::Nothing {
            let cell_ref = net.cell(cell).unwrap();
            assert!(cell_ref
                .beliefs()
                .iter()
                .any(|belief| net.tms().label(belief.node).is_in()));
        }
    }
}

#[test]
fn any_two_of_three_derive_the_third() {
    // a + b = s: each pair of assertions must derive the remaining
    // quantity with the same numbers.
    let cases: [(&str, f64, &str, f64, &str, f64); 3] = [
        ("a", 3.0, "b", 5.0, "s", 8.0),
        ("a", 3.0, "s", 8.0, "b", 5.0),
        ("b", 5.0, "s", 8.0, "a", 3.0),
    ];
    for (n1, v1, n2, v2, expect_name, expect) in cases {
        let mut net = Network::new();
        let (a, b, s) = three_cells(&mut net);
        adder(&mut net, a, b, s).unwrap();
        let by_name = |n: &str| match n {
            "a" => a,
            "b" => b,
            _ => s,
        };
        net.add_content(by_name(n1), num(v1), "first").unwrap();
        net.add_content(by_name(n2), num(v2), "second").unwrap();
        assert_eq!(
            net.read_cell(by_name(expect_name)),
            Ok(num(expect)),
            "asserting {n1} and {n2}"
        );
    }
}

#[test]
fn multiplier_round_trip_with_nonzero_divisors() {
    let cases: [(&str, f64, &str, f64, &str, f64); 3] = [
        ("a", 4.0, "b", 3.0, "p", 12.0),
        ("a", 4.0, "p", 12.0, "b", 3.0),
        ("b", 3.0, "p", 12.0, "a", 4.0),
    ];
    for (n1, v1, n2, v2, expect_name, expect) in cases {
        let mut net = Network::new();
        let (a, b, p) = three_cells(&mut net);
        multiplier(&mut net, a, b, p).unwrap();
        let by_name = |n: &str| match n {
            "a" => a,
            "b" => b,
            _ => p,
        };
        net.add_content(by_name(n1), num(v1), "first").unwrap();
        net.add_content(by_name(n2), num(v2), "second").unwrap();
        assert_eq!(
            net.read_cell(by_name(expect_name)),
            Ok(num(expect)),
            "asserting {n1} and {n2}"
        );
    }
}

#[test]
fn support_of_reaches_through_the_diamond() {
    let mut net = Network::new();
    let a = net.create_cell();
    let k2 = net.create_cell();
    let b = net.create_cell();
    multiplier(&mut net, a, k2, b).unwrap();
    constant(&mut net, k2, 2.0, "k2").unwrap();
    net.add_content(a, num(4.0), "src_a").unwrap();

    let support = net.support_of(b).unwrap();
    assert_eq!(
        support,
        BTreeSet::from([Informant::from("src_a"), Informant::from("k2")])
    );
}
