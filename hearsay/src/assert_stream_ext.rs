#![cfg(feature = "async")]
//! Stream extensions for feeding assertions into a network
//! (feature = `"async"`).
//!
//! External adapters (sensor bridges, message consumers, replayed
//! journals) naturally produce a `futures::Stream` of assertions.
//! This module adds `.assert_all(&net)` to any such stream, draining it
//! into a [`SharedNetwork`] one quiescent operation at a time.

use async_trait::async_trait;
use futures::Stream;
use futures::StreamExt;

use crate::cell::CellId;
use crate::error::NetworkError;
use crate::lattice::Value;
use crate::shared::SharedNetwork;
use crate::tms::Informant;

/// One externally-sourced assertion: a value for a cell on the
/// authority of an informant.
#[derive(Debug, Clone)]
pub struct Assertion {
    /// Target cell.
    pub cell: CellId,
    /// The asserted value.
    pub value: Value,
    /// The source to file the belief under (and retract by, later).
    pub informant: Informant,
}

impl Assertion {
    /// Convenience constructor.
    pub fn new(cell: CellId, value: Value, informant: impl Into<Informant>) -> Self {
        Self {
            cell,
            value,
            informant: informant.into(),
        }
    }
}

/// Extension trait draining streams of assertions into a network.
///
/// Automatically implemented for every `Stream<Item = Assertion>`.
///
/// # Example
///
/// ```rust,ignore
/// use futures::stream;
/// use hearsay::assert_stream_ext::{Assertion, AssertStreamExt};
/// use hearsay::lattice::Value;
///
/// let readings = stream::iter(vec![
///     Assertion::new(temperature, Value::Number(21.5), "thermometer"),
///     Assertion::new(humidity, Value::Number(0.4), "hygrometer"),
/// ]);
/// let applied = readings.assert_all(&net).await?;
/// assert_eq!(applied, 2);
/// ```
#[async_trait]
pub trait AssertStreamExt: Stream<Item = Assertion> + Sized + Unpin + Send {
    /// Apply every assertion in order, each one running to fixpoint
    /// before the next is read. Stops at the first error and returns
    /// it; otherwise returns how many assertions were applied.
    async fn assert_all(mut self, net: &SharedNetwork) -> Result<u64, NetworkError> {
        let mut applied = 0;
        while let Some(assertion) = self.next().await {
            net.add_content(assertion.cell, assertion.value, assertion.informant)?;
            applied += 1;
        }
        Ok(applied)
    }
}

#[async_trait]
impl<T> AssertStreamExt for T where T: Stream<Item = Assertion> + Sized + Unpin + Send {}
