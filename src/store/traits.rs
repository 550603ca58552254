// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Store capability traits.
//!
//! The realtime store itself is an external collaborator. This layer only
//! requires a reference factory ([`SyncStore`]) and a per-location handle
//! ([`Reference`]) with read/write/subscribe operations. Transport, auth
//! and retries live behind these traits.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::snapshot::Snapshot;

/// Callback invoked with each snapshot delivered to a live subscription.
pub type SnapshotCallback = Box<dyn Fn(Snapshot) + Send + Sync>;

/// Event selector for reads and subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// The whole value at the location.
    Value,
    /// A child was added under the location.
    ChildAdded,
    /// A child under the location changed.
    ChildChanged,
    /// A child under the location was removed.
    ChildRemoved,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value => write!(f, "value"),
            Self::ChildAdded => write!(f, "child_added"),
            Self::ChildChanged => write!(f, "child_changed"),
            Self::ChildRemoved => write!(f, "child_removed"),
        }
    }
}

/// Failure surfaced by the underlying store transport. Propagated to
/// callers unchanged, never swallowed.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("node not found")]
    NotFound,
    #[error("permission denied at '{path}'")]
    PermissionDenied { path: String },
    #[error("store backend error: {0}")]
    Backend(String),
}

/// A connected store: a factory for location handles.
pub trait SyncStore: Send + Sync {
    /// Handle for the node at a slash-joined path.
    fn reference(&self, path: &str) -> Box<dyn Reference>;
}

/// Handle for one location in the tree.
#[async_trait]
pub trait Reference: Send + Sync {
    /// Read the location once.
    async fn once(&self, event: EventType) -> Result<Snapshot, StoreError>;

    /// Register a live subscription; `callback` may fire any number of
    /// times. No unsubscribe is exposed by this layer.
    fn on(&self, event: EventType, callback: SnapshotCallback);

    /// A copy of this handle whose reads order children by the named
    /// child field.
    fn order_by_child(&self, key: &str) -> Box<dyn Reference>;

    /// Overwrite the location with `value`.
    async fn write(&self, value: Value) -> Result<(), StoreError>;

    /// Merge the keys of `value` into the location.
    async fn update(&self, value: Value) -> Result<(), StoreError>;

    /// Append `value` as a new child with a store-generated unique key;
    /// returns the handle for the new child.
    async fn push_child(&self, value: Value) -> Result<Box<dyn Reference>, StoreError>;

    /// Handle for a node nested under this one.
    fn child_reference(&self, sub_path: &str) -> Box<dyn Reference>;

    /// Delete the location.
    async fn remove(&self) -> Result<(), StoreError>;

    /// The location's own key (its last path segment).
    fn key(&self) -> String;

    /// Fully-qualified location string, prefixed by the store's origin URL.
    fn url(&self) -> String;
}
