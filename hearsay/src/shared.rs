#![cfg(feature = "async")]
//! A clonable, task-friendly handle over a [`Network`].
//!
//! The kernel itself is a single serialized owner; this wrapper
//! realizes that contract for async programs as a `Mutex<Network>` plus
//! a `tokio::sync::watch` **revision channel**. Every mutating
//! operation runs to quiescence under the lock and then bumps the
//! revision, waking any task parked in [`SharedNetwork::await_value`].
//!
//! Unlike a monotone cell, a belief-cell's value can *recede* when an
//! assumption is retracted, so waiting is predicate-based rather than
//! threshold-based: the waiter simply re-checks its predicate on every
//! revision (fast path first, subscription second, so no wakeup is
//! lost).
//!
//! # Example
//!
//! ```rust,ignore
//! use hearsay::lattice::Value;
//! use hearsay::network::Network;
//! use hearsay::shared::SharedNetwork;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let net = SharedNetwork::new(Network::new());
//! let cell = net.create_cell();
//!
//! let waiter = {
//!     let net = net.clone();
//!     tokio::spawn(async move { net.await_value(cell, |v| !v.is_nothing()).await })
//! };
//!
//! net.add_content(cell, Value::Number(42.0), "sensor").unwrap();
//! assert_eq!(waiter.await.unwrap(), Ok(Value::Number(42.0)));
//! # }
//! ```

use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use crate::cell::CellId;
use crate::error::NetworkError;
use crate::lattice::{LatticeKind, Value};
use crate::network::Network;
use crate::propagator::{PropagatorFn, PropagatorId};
use crate::tms::Informant;

/// A shared, serialized handle over a network.
pub struct SharedNetwork {
    inner: Arc<Inner>,
}

struct Inner {
    network: Mutex<Network>,
    // Bumped after every mutation that reached fixpoint.
    revision: watch::Sender<u64>,
}

impl Clone for SharedNetwork {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl SharedNetwork {
    /// Wrap a network for shared use.
    pub fn new(network: Network) -> Self {
        let (revision, _rx) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                network: Mutex::new(network),
                revision,
            }),
        }
    }

    /// Run a closure with exclusive access to the network, then notify
    /// waiters. The escape hatch for anything without a dedicated
    /// wrapper; keep the closure synchronous and quick.
    pub fn with<R>(&self, f: impl FnOnce(&mut Network) -> R) -> R {
        let result = f(&mut self.inner.network.lock().unwrap());
        self.bump();
        result
    }

    /// Create a number-valued cell.
    pub fn create_cell(&self) -> CellId {
        self.inner.network.lock().unwrap().create_cell()
    }

    /// Create a cell of the given value kind.
    pub fn create_cell_with_kind(&self, kind: LatticeKind) -> CellId {
        self.inner.network.lock().unwrap().create_cell_with_kind(kind)
    }

    /// Register a propagator; it fires once before this returns.
    pub fn create_propagator(
        &self,
        inputs: Vec<CellId>,
        outputs: Vec<CellId>,
        informant: impl Into<Informant>,
        f: PropagatorFn,
    ) -> Result<PropagatorId, NetworkError> {
        let result = self
            .inner
            .network
            .lock()
            .unwrap()
            .create_propagator(inputs, outputs, informant, f);
        self.bump();
        result
    }

    /// Assert content; returns after the network reaches fixpoint.
    pub fn add_content(
        &self,
        cell: CellId,
        value: Value,
        informant: impl Into<Informant>,
    ) -> Result<(), NetworkError> {
        let result = self
            .inner
            .network
            .lock()
            .unwrap()
            .add_content(cell, value, informant);
        self.bump();
        result
    }

    /// Retract by informant; returns after the network reaches
    /// fixpoint.
    pub fn retract_content(
        &self,
        cell: CellId,
        informant: impl Into<Informant>,
    ) -> Result<(), NetworkError> {
        let result = self
            .inner
            .network
            .lock()
            .unwrap()
            .retract_content(cell, informant);
        self.bump();
        result
    }

    /// The cell's current active value.
    pub fn read_cell(&self, cell: CellId) -> Result<Value, NetworkError> {
        self.inner.network.lock().unwrap().read_cell(cell)
    }

    /// Wait until the cell's active value satisfies the predicate, and
    /// return that value.
    ///
    /// The predicate is re-checked on every revision of the network;
    /// values here can both sharpen and recede, so there is no monotone
    /// shortcut. Returns immediately if the predicate already holds.
    pub async fn await_value(
        &self,
        cell: CellId,
        predicate: impl Fn(&Value) -> bool,
    ) -> Result<Value, NetworkError> {
        // Fast path: check the current state directly.
        let current = self.read_cell(cell)?;
        if predicate(&current) {
            return Ok(current);
        }

        // Then subscribe for revisions.
        let mut rx = self.inner.revision.subscribe();
        loop {
            if rx.changed().await.is_err() {
                // Sender lives as long as self; treat as a final check.
                return self.read_cell(cell);
            }
            let current = self.read_cell(cell)?;
            if predicate(&current) {
                return Ok(current);
            }
        }
    }

    fn bump(&self) {
        self.inner.revision.send_modify(|r| *r += 1);
    }
}
