// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! In-process store implementation.
//!
//! [`MemoryStore`] keeps the whole tree as one JSON value behind a
//! `parking_lot::RwLock` and implements the full [`SyncStore`]/
//! [`Reference`] contract: path-addressed reads and writes, merge updates,
//! push-key generation, child ordering and subscription dispatch. It backs
//! the test suites and local development; production deployments plug a
//! real transport in behind the same traits.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use super::traits::{EventType, Reference, SnapshotCallback, StoreError, SyncStore};
use crate::config::SyncConfig;
use crate::snapshot::Snapshot;

struct Watcher {
    event: EventType,
    callback: SnapshotCallback,
}

/// In-process tree-structured store.
#[derive(Clone)]
pub struct MemoryStore {
    origin: String,
    root: Arc<RwLock<Value>>,
    watchers: Arc<DashMap<String, Vec<Arc<Watcher>>>>,
}

impl MemoryStore {
    /// Open a store whose reference URLs are prefixed by the configured
    /// sync endpoint.
    #[must_use]
    pub fn connect(config: &SyncConfig) -> Self {
        Self {
            origin: config.sync_url.trim_end_matches('/').to_string(),
            root: Arc::new(RwLock::new(Value::Null)),
            watchers: Arc::new(DashMap::new()),
        }
    }

    /// Fire `Value` watchers registered at `segments`.
    fn notify(&self, segments: &[String], value: &Value) {
        self.dispatch(segments, EventType::Value, || {
            let key = segments.last().cloned().unwrap_or_default();
            Snapshot::new(key, value.clone())
        });
    }

    /// Fire child-event watchers registered at the parent `segments`.
    fn notify_child(&self, segments: &[String], event: EventType, child: &Snapshot) {
        self.dispatch(segments, event, || child.clone());
    }

    fn dispatch<F>(&self, segments: &[String], event: EventType, snapshot: F)
    where
        F: Fn() -> Snapshot,
    {
        let path = segments.join("/");
        // Clone the watcher handles out before invoking so a callback that
        // registers a new subscription does not re-enter the shard lock.
        let matched: Vec<Arc<Watcher>> = match self.watchers.get(&path) {
            Some(entry) => entry
                .iter()
                .filter(|w| w.event == event)
                .cloned()
                .collect(),
            None => return,
        };
        for watcher in matched {
            (watcher.callback)(snapshot());
        }
    }
}

impl SyncStore for MemoryStore {
    fn reference(&self, path: &str) -> Box<dyn Reference> {
        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Box::new(MemoryReference {
            store: self.clone(),
            segments,
            order_by: None,
        })
    }
}

struct MemoryReference {
    store: MemoryStore,
    segments: Vec<String>,
    order_by: Option<String>,
}

#[async_trait]
impl Reference for MemoryReference {
    async fn once(&self, _event: EventType) -> Result<Snapshot, StoreError> {
        let node = {
            let root = self.store.root.read();
            node_at(&root, &self.segments).cloned().unwrap_or(Value::Null)
        };
        let node = match &self.order_by {
            Some(field) => reorder_by_child(node, field),
            None => node,
        };
        Ok(Snapshot::new(self.key(), node))
    }

    fn on(&self, event: EventType, callback: SnapshotCallback) {
        let path = self.segments.join("/");
        self.store
            .watchers
            .entry(path)
            .or_default()
            .push(Arc::new(Watcher { event, callback }));
    }

    fn order_by_child(&self, key: &str) -> Box<dyn Reference> {
        Box::new(MemoryReference {
            store: self.store.clone(),
            segments: self.segments.clone(),
            order_by: Some(key.to_string()),
        })
    }

    async fn write(&self, value: Value) -> Result<(), StoreError> {
        if self.segments.is_empty() {
            return Err(StoreError::Backend(
                "cannot overwrite the store root".to_string(),
            ));
        }
        debug!(path = %self.segments.join("/"), "write");
        {
            let mut root = self.store.root.write();
            *ensure_node(&mut root, &self.segments) = value.clone();
        }
        self.store.notify(&self.segments, &value);
        Ok(())
    }

    async fn update(&self, value: Value) -> Result<(), StoreError> {
        let Value::Object(patch) = value else {
            return Err(StoreError::Backend(
                "update requires a map value".to_string(),
            ));
        };
        debug!(path = %self.segments.join("/"), keys = patch.len(), "update");
        let merged = {
            let mut root = self.store.root.write();
            let node = ensure_node(&mut root, &self.segments);
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            if let Value::Object(map) = node {
                for (key, entry) in patch {
                    map.insert(key, entry);
                }
            }
            node.clone()
        };
        self.store.notify(&self.segments, &merged);
        Ok(())
    }

    async fn push_child(&self, value: Value) -> Result<Box<dyn Reference>, StoreError> {
        let key = push_key();
        let mut child_segments = self.segments.clone();
        child_segments.push(key.clone());
        debug!(path = %self.segments.join("/"), key = %key, "push");
        {
            let mut root = self.store.root.write();
            *ensure_node(&mut root, &child_segments) = value.clone();
        }
        self.store.notify(&child_segments, &value);
        let child = Snapshot::new(key, value);
        self.store
            .notify_child(&self.segments, EventType::ChildAdded, &child);
        Ok(Box::new(MemoryReference {
            store: self.store.clone(),
            segments: child_segments,
            order_by: None,
        }))
    }

    fn child_reference(&self, sub_path: &str) -> Box<dyn Reference> {
        let mut segments = self.segments.clone();
        segments.extend(
            sub_path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        );
        Box::new(MemoryReference {
            store: self.store.clone(),
            segments,
            order_by: None,
        })
    }

    async fn remove(&self) -> Result<(), StoreError> {
        let Some((key, parent)) = self.segments.split_last() else {
            return Err(StoreError::Backend(
                "cannot remove the store root".to_string(),
            ));
        };
        debug!(path = %self.segments.join("/"), "remove");
        let removed = {
            let mut root = self.store.root.write();
            match node_at_mut(&mut root, parent) {
                Some(Value::Object(map)) => map.shift_remove(key),
                _ => None,
            }
        };
        if let Some(value) = removed {
            self.store.notify(&self.segments, &Value::Null);
            let child = Snapshot::new(key.clone(), value);
            self.store
                .notify_child(parent, EventType::ChildRemoved, &child);
        }
        Ok(())
    }

    fn key(&self) -> String {
        self.segments.last().cloned().unwrap_or_default()
    }

    fn url(&self) -> String {
        format!("{}/{}", self.store.origin, self.segments.join("/"))
    }
}

/// Store-generated unique child key.
fn push_key() -> String {
    format!("-{}", Uuid::new_v4().simple())
}

fn node_at<'a>(mut node: &'a Value, segments: &[String]) -> Option<&'a Value> {
    for segment in segments {
        node = node.get(segment)?;
    }
    Some(node)
}

fn node_at_mut<'a>(mut node: &'a mut Value, segments: &[String]) -> Option<&'a mut Value> {
    for segment in segments {
        node = node.get_mut(segment)?;
    }
    Some(node)
}

/// Walk to `segments`, materializing intermediate object maps. A non-map
/// node on the way is overwritten, matching realtime-store write semantics.
fn ensure_node<'a>(node: &'a mut Value, segments: &[String]) -> &'a mut Value {
    segments.iter().fold(node, |node, segment| {
        if !matches!(node, Value::Object(_)) {
            *node = Value::Object(Map::new());
        }
        match node {
            Value::Object(map) => map.entry(segment.clone()).or_insert(Value::Null),
            other => other,
        }
    })
}

/// Reorder an object-map snapshot's entries by the named child field.
/// Entries missing the field keep their relative order (stable sort).
/// Non-map values pass through untouched.
fn reorder_by_child(node: Value, field: &str) -> Value {
    match node {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(_, a), (_, b)| compare_values(a.get(field), b.get(field)));
            Value::Object(entries.into_iter().collect())
        }
        other => other,
    }
}

/// Realtime-store child ordering: absent < null < bool < number < string,
/// anything else compares equal within its rank.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None => 0,
            Some(Value::Null) => 1,
            Some(Value::Bool(_)) => 2,
            Some(Value::Number(_)) => 3,
            Some(Value::String(_)) => 4,
            Some(_) => 5,
        }
    }
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}
