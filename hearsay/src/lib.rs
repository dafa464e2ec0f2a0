#![deny(missing_docs)]
//! # hearsay — belief-tracking constraint propagation
//!
//! A dataflow kernel whose cells hold **beliefs** rather than values.
//! Every piece of content carries a *provenance*, managed by a
//! justification-based truth maintenance system (JTMS): which external
//! source, or which propagator reading which beliefs, caused it.
//! Retract any assumption and every value derived from it vanishes
//! from the active view, cascading cleanly, without the network ever
//! being rebuilt.
//!
//! Core pieces:
//!
//! - [`lattice`]: the cell value algebra (`Nothing`, numbers, finite
//!   integer domains, `Contradiction`) with merge as lattice join
//! - [`tms`]: labeled nodes, justifications with in/out-lists,
//!   non-monotonic label propagation to fixpoint
//! - [`cell`]: belief-cells whose read value is a projection over
//!   currently-believed content
//! - [`propagator`]: pure functions from input values to output
//!   writes, installed with an informant
//! - [`network`]: the serialized owner of cells, propagators, and the
//!   TMS; every public call returns at quiescence
//! - [`arith`]: bidirectional adder and multiplier constraints
//! - [`solver`]: AC-3 arc consistency plus chronological backtracking
//!   over finite integer domains
//! - [`shared`] *(feature = "async")*: a clonable handle serializing a
//!   network behind a mutex, with watch-based `await_value`
//! - [`assert_stream_ext`] *(feature = "async")*: drain a
//!   `futures::Stream` of assertions into a shared network
//!
//! ## Concepts
//!
//! A cell holds a bag of `(value, node)` pairs. The TMS labels each
//! node `in` (believed) or `out` (unsupported). Reading a cell
//! projects through those labels: no active beliefs reads as
//! `Nothing`; agreeing active beliefs read as their value;
//! disagreeing active beliefs read as `Contradiction`, a first-class
//! value, not an error.
//!
//! Asserted content becomes a TMS *assumption*, retractable as a unit.
//! Derived content is justified by the beliefs the propagator read, so
//! it is never retracted directly; it simply loses support.
//!
//! ## Quick start
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
//! net.add_content(a, Value::Number(3.0), "src_a").unwrap();
//! net.add_content(b, Value::Number(5.0), "src_b").unwrap();
//! assert_eq!(net.read_cell(s).unwrap(), Value::Number(8.0));
//!
//! net.retract_content(a, "src_a").unwrap();
//! assert_eq!(net.read_cell(s).unwrap(), Value::Nothing);
//! ```
//!
//! ## Features
//!
//! - **`async`** *(enabled by default)*: the [`shared`] and
//!   [`assert_stream_ext`] modules. Requires `tokio` and `futures`.
//!
//! To use only the synchronous kernel:
//! ```toml
//! hearsay = { version = "…", default-features = false }
//! ```

// Make the current crate visible as `hearsay` so doc examples read the
// same inside and outside the crate.
extern crate self as hearsay;

pub mod arith;
pub mod cell;
pub mod config;
pub mod error;
pub mod lattice;
pub mod network;
pub mod propagator;
pub mod solver;
pub mod tms;

#[cfg(feature = "async")]
pub mod assert_stream_ext;

#[cfg(feature = "async")]
pub mod shared;

pub use cell::{Belief, BeliefCell, CellId};
pub use config::NetworkConfig;
pub use error::{NetworkError, SolveError};
pub use lattice::{LatticeKind, Value};
pub use network::Network;
pub use propagator::{Activation, Propagator, PropagatorFn, PropagatorId};
pub use tms::{Informant, Justification, Label, NodeId, Tms};

#[cfg(feature = "async")]
pub use shared::SharedNetwork;
