//! Bidirectional arithmetic constraints built from primitive
//! propagators.
//!
//! An [`adder`] over cells `(a, b, s)` is not a function. It is the
//! *relation* `a + b = s`, installed as three propagators so that any
//! two known quantities derive the third:
//!
//! - `[a, b] → s`: `s := a + b`
//! - `[s, a] → b`: `b := s − a`
//! - `[s, b] → a`: `a := s − b`
//!
//! [`multiplier`] is the analogous relation `a · b = p`, with the
//! backward rules guarded against division by zero (they skip rather
//! than raise; fixpoint is already the retry mechanism).
//!
//! Every rule forwards [`Value::Contradiction`] through its output, so
//! a clash in one branch of a network stays visible downstream.
//!
//! # Example
//!
//! ```rust
//! use hearsay::arith::adder;
//! use hearsay::lattice::Value;
//! use hearsay::network::Network;
//!
//! let mut net = Network::new();
//! let (a, b, s) = (net.create_cell(), net.create_cell(), net.create_cell());
//! adder(&mut net, a, b, s).unwrap();
//!
//! // Assert the *sum* and one addend; the other addend appears.
//! net.add_content(s, Value::Number(8.0), "src_s").unwrap();
//! net.add_content(a, Value::Number(3.0), "src_a").unwrap();
//! assert_eq!(net.read_cell(b).unwrap(), Value::Number(5.0));
//! ```

use std::sync::Arc;

use num_traits::Zero;

use crate::cell::CellId;
use crate::error::NetworkError;
use crate::lattice::Value;
use crate::network::Network;
use crate::propagator::{Activation, PropagatorFn, PropagatorId};

/// A binary numeric rule writing to `out`: fires `f` when both inputs
/// are numbers, forwards contradictions, and skips everything else
/// (including `f` returning `None`).
fn binary_rule(out: CellId, f: impl Fn(f64, f64) -> Option<f64> + Send + Sync + 'static) -> PropagatorFn {
    Arc::new(move |vals: &[Value]| {
        if vals.iter().any(Value::is_contradiction) {
            return Activation::write_one(out, Value::Contradiction);
        }
        match (vals[0].as_number(), vals[1].as_number()) {
            (Some(x), Some(y)) => match f(x, y) {
                Some(z) => Activation::write_one(out, Value::Number(z)),
                None => Activation::Skip,
            },
            _ => Activation::Skip,
        }
    })
}

/// Install the constraint `a + b = s`.
///
/// Returns the three propagator ids (sum, then the two differences).
pub fn adder(
    net: &mut Network,
    a: CellId,
    b: CellId,
    s: CellId,
) -> Result<[PropagatorId; 3], NetworkError> {
    let sum = net.create_propagator(
        vec![a, b],
        vec![s],
        format!("sum({a},{b})"),
        binary_rule(s, |x, y| Some(x + y)),
    )?;
    let diff_b = net.create_propagator(
        vec![s, a],
        vec![b],
        format!("diff({s},{a})"),
        binary_rule(b, |x, y| Some(x - y)),
    )?;
    let diff_a = net.create_propagator(
        vec![s, b],
        vec![a],
        format!("diff({s},{b})"),
        binary_rule(a, |x, y| Some(x - y)),
    )?;
    Ok([sum, diff_b, diff_a])
}

/// Install the constraint `a · b = p`.
///
/// The backward rules skip when the divisor is zero: `p / 0` derives
/// nothing rather than raising.
///
/// # Example
///
/// ```rust
/// use hearsay::arith::multiplier;
/// use hearsay::lattice::Value;
/// use hearsay::network::Network;
///
/// let mut net = Network::new();
/// let (a, b, p) = (net.create_cell(), net.create_cell(), net.create_cell());
/// multiplier(&mut net, a, b, p).unwrap();
///
/// net.add_content(p, Value::Number(12.0), "src_p").unwrap();
/// net.add_content(a, Value::Number(4.0), "src_a").unwrap();
/// assert_eq!(net.read_cell(b).unwrap(), Value::Number(3.0));
/// ```
pub fn multiplier(
    net: &mut Network,
    a: CellId,
    b: CellId,
    p: CellId,
) -> Result<[PropagatorId; 3], NetworkError> {
    let div = |x: f64, y: f64| if y.is_zero() { None } else { Some(x / y) };
    let product = net.create_propagator(
        vec![a, b],
        vec![p],
        format!("product({a},{b})"),
        binary_rule(p, |x, y| Some(x * y)),
    )?;
    let quot_b = net.create_propagator(
        vec![p, a],
        vec![b],
        format!("quotient({p},{a})"),
        binary_rule(b, div),
    )?;
    let quot_a = net.create_propagator(
        vec![p, b],
        vec![a],
        format!("quotient({p},{b})"),
        binary_rule(a, div),
    )?;
    Ok([product, quot_b, quot_a])
}

/// Assert a named numeric constant into a cell.
///
/// Sugar over `add_content`; the constant is an ordinary retractable
/// assumption under the given informant.
pub fn constant(
    net: &mut Network,
    cell: CellId,
    value: f64,
    informant: &str,
) -> Result<(), NetworkError> {
    net.add_content(cell, Value::Number(value), informant)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(x: f64) -> Value {
        Value::Number(x)
    }

    fn three_cells(net: &mut Network) -> (CellId, CellId, CellId) {
        (net.create_cell(), net.create_cell(), net.create_cell())
    }

    #[test]
    fn adder_derives_forward() {
        let mut net = Network::new();
        let (a, b, s) = three_cells(&mut net);
        adder(&mut net, a, b, s).unwrap();

        net.add_content(a, num(3.0), "src_a").unwrap();
        net.add_content(b, num(5.0), "src_b").unwrap();
        assert_eq!(net.read_cell(s), Ok(num(8.0)));
    }

    #[test]
    fn adder_derives_both_backward_directions() {
        let mut net = Network::new();
        let (a, b, s) = three_cells(&mut net);
        adder(&mut net, a, b, s).unwrap();

        net.add_content(s, num(8.0), "src_s").unwrap();
        net.add_content(b, num(5.0), "src_b").unwrap();
        assert_eq!(net.read_cell(a), Ok(num(3.0)));
    }

    #[test]
    fn multiplier_round_trips() {
        let mut net = Network::new();
        let (a, b, p) = three_cells(&mut net);
        multiplier(&mut net, a, b, p).unwrap();

        net.add_content(p, num(12.0), "src_p").unwrap();
        net.add_content(a, num(4.0), "src_a").unwrap();
        assert_eq!(net.read_cell(b), Ok(num(3.0)));
    }

    #[test]
    fn division_by_zero_derives_nothing() {
        let mut net = Network::new();
        let (a, b, p) = three_cells(&mut net);
        multiplier(&mut net, a, b, p).unwrap();

        net.add_content(p, num(12.0), "src_p").unwrap();
        net.add_content(a, num(0.0), "src_a").unwrap();
        // p / 0 must not raise and must not invent a value, so b
        // stays unknown.
        assert_eq!(net.read_cell(b), Ok(Value::Nothing));
    }

    #[test]
    fn contradiction_flows_downstream() {
        let mut net = Network::new();
        let (a, b, s) = three_cells(&mut net);
        adder(&mut net, a, b, s).unwrap();

        net.add_content(b, num(5.0), "src_b").unwrap();
        net.add_content(a, num(1.0), "first").unwrap();
        net.add_content(a, num(2.0), "second").unwrap();

        assert_eq!(net.read_cell(a), Ok(Value::Contradiction));
        assert_eq!(net.read_cell(s), Ok(Value::Contradiction));
    }

    #[test]
    fn contradiction_recovers_downstream() {
        let mut net = Network::new();
        let (a, b, s) = three_cells(&mut net);
        adder(&mut net, a, b, s).unwrap();

        net.add_content(b, num(5.0), "src_b").unwrap();
        net.add_content(a, num(1.0), "first").unwrap();
        net.add_content(a, num(2.0), "second").unwrap();
        net.retract_content(a, "second").unwrap();

        assert_eq!(net.read_cell(a), Ok(num(1.0)));
        assert_eq!(net.read_cell(s), Ok(num(6.0)));
    }
}
