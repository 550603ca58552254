//! Snapshot data structure.
//!
//! A [`Snapshot`] is the unit returned by a single read against the store:
//! the key of the node that was read and its JSON value. `Value::Null`
//! encodes an absent node; the store never omits the snapshot itself.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A (key, value) pair produced by one read against the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Key of the node the read targeted.
    pub key: String,
    /// The node's value; `Null` when the node does not exist.
    pub value: Value,
}

impl Snapshot {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// Whether the read found nothing at the target node.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.value.is_null()
    }
}
