//! A finite-domain constraint solver: AC-3 arc consistency plus
//! chronological backtracking.
//!
//! Variables are named; each holds a domain: a finite set of integers,
//! the same set lattice the network's `Set` cells use, shrinking as
//! information sharpens. A **constraint** is a scope (the variables it
//! concerns) plus a predicate over a *partial* assignment. Predicates
//! must answer `true` when their scope is not fully assigned ("possibly
//! satisfied"); [`Constraint::binary`] builds that shape for you.
//!
//! [`solve`] runs three phases:
//!
//! 1. a single revision pass over unary constraints,
//! 2. AC-3 to arc-consistency fixpoint over binary arcs,
//! 3. chronological backtracking with minimum-remaining-values
//!    variable selection.
//!
//! # Example
//!
//! ```rust
//! use std::collections::{BTreeMap, BTreeSet};
//! use hearsay::solver::{solve, Constraint};
//!
//! let domains: BTreeMap<String, BTreeSet<i64>> = [
//!     ("x".to_string(), BTreeSet::from([1, 2, 3])),
//!     ("y".to_string(), BTreeSet::from([1, 2, 3])),
//! ]
//! .into();
//!
//! let constraints = vec![Constraint::binary("x", "y", |x, y| x < y)];
//! let solution = solve(&domains, &constraints).unwrap();
//! assert!(solution["x"] < solution["y"]);
//! ```

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;

use lattice_core::MeetSemilattice;
use tracing::{debug, trace};

use crate::error::SolveError;

/// A variable-to-domain map: the solver's input.
pub type Domains = BTreeMap<String, BTreeSet<i64>>;

/// A complete variable-to-value map: the solver's output.
pub type Assignment = BTreeMap<String, i64>;

/// A predicate over a partial assignment. Must return `true` when its
/// constraint's scope is not fully assigned.
pub type Predicate = Arc<dyn Fn(&Assignment) -> bool + Send + Sync>;

/// A constraint: the variables it concerns plus a predicate.
#[derive(Clone)]
pub struct Constraint {
    scope: Vec<String>,
    predicate: Predicate,
}

impl Constraint {
    /// A constraint from an explicit scope and predicate. The predicate
    /// receives partial assignments and should answer `true` whenever a
    /// scope variable is still unassigned.
    pub fn new<I, S>(scope: I, predicate: impl Fn(&Assignment) -> bool + Send + Sync + 'static) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scope: scope.into_iter().map(Into::into).collect(),
            predicate: Arc::new(predicate),
        }
    }

    /// A binary constraint over `x` and `y`, automatically "possibly
    /// satisfied" while either is unassigned.
    ///
    /// # Example
    ///
    /// ```rust
    /// use hearsay::solver::Constraint;
    ///
    /// let c = Constraint::binary("x", "y", |x, y| x != y);
    /// assert_eq!(c.scope(), &["x".to_string(), "y".to_string()]);
    /// ```
    pub fn binary(
        x: impl Into<String>,
        y: impl Into<String>,
        test: impl Fn(i64, i64) -> bool + Send + Sync + 'static,
    ) -> Self {
        let x = x.into();
        let y = y.into();
        let (xk, yk) = (x.clone(), y.clone());
        Constraint::new([x, y], move |assignment: &Assignment| {
            match (assignment.get(&xk), assignment.get(&yk)) {
                (Some(a), Some(b)) => test(*a, *b),
                _ => true,
            }
        })
    }

    /// A unary constraint over one variable.
    pub fn unary(x: impl Into<String>, test: impl Fn(i64) -> bool + Send + Sync + 'static) -> Self {
        let x = x.into();
        let xk = x.clone();
        Constraint::new([x], move |assignment: &Assignment| {
            match assignment.get(&xk) {
                Some(a) => test(*a),
                None => true,
            }
        })
    }

    /// The variables this constraint concerns.
    pub fn scope(&self) -> &[String] {
        &self.scope
    }

    fn holds(&self, assignment: &Assignment) -> bool {
        (self.predicate)(assignment)
    }
}

/// Solve the CSP. Returns a complete assignment, or
/// [`SolveError::NoSolution`] when the constraints are unsatisfiable.
pub fn solve(domains: &Domains, constraints: &[Constraint]) -> Result<Assignment, SolveError> {
    let mut domains = domains.clone();
    revise_unary(&mut domains, constraints)?;
    ac3(&mut domains, constraints)?;
    debug!(variables = domains.len(), "arc consistency reached");
    let mut assignment = Assignment::new();
    if backtrack(&domains, constraints, &mut assignment) {
        Ok(assignment)
    } else {
        Err(SolveError::NoSolution)
    }
}

/// One pass keeping only values that satisfy each unary predicate.
fn revise_unary(domains: &mut Domains, constraints: &[Constraint]) -> Result<(), SolveError> {
    for c in constraints.iter().filter(|c| c.scope.len() == 1) {
        let var = &c.scope[0];
        let Some(domain) = domains.get(var) else {
            continue;
        };
        let allowed: BTreeSet<i64> = domain
            .iter()
            .copied()
            .filter(|v| c.holds(&Assignment::from([(var.clone(), *v)])))
            .collect();
        let pruned = domain.meet(&allowed);
        if pruned.is_empty() {
            return Err(SolveError::NoSolution);
        }
        domains.insert(var.clone(), pruned);
    }
    Ok(())
}

/// Arcs are ordered variable pairs drawn from a constraint's scope.
fn initial_arcs(constraints: &[Constraint]) -> VecDeque<(String, String, usize)> {
    let mut queue = VecDeque::new();
    for (ci, c) in constraints.iter().enumerate() {
        for x in &c.scope {
            for y in &c.scope {
                if x != y {
                    queue.push_back((x.clone(), y.clone(), ci));
                }
            }
        }
    }
    queue
}

/// AC-3: revise arcs until fixpoint, re-enqueueing the neighbors of any
/// variable whose domain shrank.
fn ac3(domains: &mut Domains, constraints: &[Constraint]) -> Result<(), SolveError> {
    let mut queue = initial_arcs(constraints);
    while let Some((x, y, ci)) = queue.pop_front() {
        if !revise(domains, &x, &y, &constraints[ci])? {
            continue;
        }
        trace!(variable = %x, against = %y, "domain revised");
        for (cj, c) in constraints.iter().enumerate() {
            if !c.scope.contains(&x) {
                continue;
            }
            for z in &c.scope {
                if *z != x && *z != y {
                    queue.push_back((z.clone(), x.clone(), cj));
                }
            }
        }
    }
    Ok(())
}

/// Remove from `domain(x)` every value with no supporting partner in
/// `domain(y)`. Returns whether the domain shrank; an emptied domain is
/// immediate failure.
fn revise(
    domains: &mut Domains,
    x: &str,
    y: &str,
    constraint: &Constraint,
) -> Result<bool, SolveError> {
    let (Some(dx), Some(dy)) = (domains.get(x), domains.get(y)) else {
        return Ok(false);
    };
    let supported: BTreeSet<i64> = dx
        .iter()
        .copied()
        .filter(|vx| {
            dy.iter().any(|vy| {
                constraint.holds(&Assignment::from([
                    (x.to_string(), *vx),
                    (y.to_string(), *vy),
                ]))
            })
        })
        .collect();
    if supported.is_empty() {
        return Err(SolveError::NoSolution);
    }
    let shrank = supported.len() < dx.len();
    if shrank {
        domains.insert(x.to_string(), supported);
    }
    Ok(shrank)
}

/// Chronological backtracking with minimum-remaining-values selection.
fn backtrack(domains: &Domains, constraints: &[Constraint], assignment: &mut Assignment) -> bool {
    let Some(var) = domains
        .keys()
        .filter(|v| !assignment.contains_key(*v))
        .min_by_key(|v| domains[*v].len())
        .cloned()
    else {
        return true;
    };
    for value in &domains[&var] {
        assignment.insert(var.clone(), *value);
        if constraints.iter().all(|c| c.holds(assignment))
            && backtrack(domains, constraints, assignment)
        {
            return true;
        }
        assignment.remove(&var);
    }
    false
}
