//! Error taxonomy for the kernel.
//!
//! Only genuine API misuse is an error here. A [`Value::Contradiction`]
//! is *not*: contradictions are first-class lattice values, observable
//! through `read_cell` and resolved by retracting the offending
//! informant.
//!
//! [`Value::Contradiction`]: crate::lattice::Value::Contradiction

use thiserror::Error;

use crate::cell::CellId;
use crate::lattice::LatticeKind;

/// Failures surfaced by [`Network`](crate::network::Network) operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// An operation referred to a cell id this network never issued.
    #[error("unknown cell {0}")]
    CellNotFound(CellId),

    /// A propagator was declared over one or more unknown input cells.
    #[error("unknown cells {0:?}")]
    CellsNotFound(Vec<CellId>),

    /// Content was added without an informant. Every belief must be
    /// traceable to a source, so this is a hard reject.
    #[error("an informant is required to add content")]
    InformantRequired,

    /// A value of the wrong lattice kind was written to a cell.
    #[error("cell {cell} holds {expected} values")]
    LatticeMismatch {
        /// The cell that rejected the write.
        cell: CellId,
        /// The value kind the cell was created with.
        expected: LatticeKind,
    },
}

/// Failures surfaced by the finite-domain solver.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveError {
    /// The constraints are unsatisfiable, or propagation emptied a
    /// variable's domain.
    #[error("no solution")]
    NoSolution,
}
