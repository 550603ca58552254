// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Lazy query builder.
//!
//! A [`Query`] is a deferred read against a path. Builder calls configure
//! it; nothing touches the store until a terminal (`find`, `get`, `first`)
//! runs or a subscription (`on`) is registered.
//!
//! A relation-mode query (built by [`Relation::query`](crate::Relation::query))
//! resolves in two steps: read the membership map under the owner's
//! relation child, then fetch every member from the target class
//! concurrently. The fan-out is all-or-nothing: the first failing fetch
//! rejects the whole call and aborts its siblings. Results come back in
//! membership-map iteration order, not completion order.

use serde_json::Value;
use tokio::task::JoinSet;
use tracing::warn;

use crate::client::SyncClient;
use crate::error::Error;
use crate::object::Object;
use crate::path::Path;
use crate::snapshot::Snapshot;
use crate::store::traits::{EventType, Reference, StoreError};

/// Equality predicate applied to the next terminal call.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub key: String,
    pub value: Value,
}

#[derive(Debug, Clone)]
struct RelationSpec {
    class_name: String,
    relation_name: String,
}

impl RelationSpec {
    fn child_key(&self) -> String {
        format!("_relation_{}_{}", self.class_name, self.relation_name)
    }
}

/// A lazily-configured read operation (or relation traversal) over a path.
pub struct Query {
    client: SyncClient,
    path: Path,
    predicate: Option<Predicate>,
    relation: Option<RelationSpec>,
}

impl Query {
    pub(crate) fn new(client: SyncClient, path: Path) -> Self {
        Self {
            client,
            path,
            predicate: None,
            relation: None,
        }
    }

    pub(crate) fn for_relation(
        client: SyncClient,
        path: Path,
        class_name: &str,
        relation_name: &str,
    ) -> Self {
        Self {
            client,
            path,
            predicate: None,
            relation: Some(RelationSpec {
                class_name: class_name.to_string(),
                relation_name: relation_name.to_string(),
            }),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current predicate, if one has been set.
    #[must_use]
    pub fn predicate(&self) -> Option<&Predicate> {
        self.predicate.as_ref()
    }

    /// Set the equality predicate for the next terminal call.
    ///
    /// Relations do not support filtering: on a relation-mode query this
    /// warns and leaves the query untouched.
    #[must_use]
    pub fn equal_to(mut self, key: &str, value: impl Into<Value>) -> Self {
        if self.relation.is_some() {
            warn!(path = %self.path, "equal_to is not supported on relation queries; ignored");
            return self;
        }
        self.predicate = Some(Predicate {
            key: key.to_string(),
            value: value.into(),
        });
        self
    }

    /// Resolve the query into a sequence of objects.
    ///
    /// Non-relation mode issues a single read (ordered by the predicate
    /// key when one is set) and wraps the snapshot into exactly one
    /// detached [`Object`]. Relation mode fans out per member.
    pub async fn find(&self) -> Result<Vec<Object>, Error> {
        if let Some(spec) = &self.relation {
            return Box::pin(self.find_related(spec)).await;
        }
        let snapshot = self.reference().once(EventType::Value).await?;
        Ok(vec![Object::detached(
            self.client.clone(),
            self.path.clone(),
            snapshot,
        )])
    }

    /// Read the path ordered by `key` and wrap the snapshot into one
    /// detached object whose logical key is the requested one.
    pub async fn get(&self, key: &str) -> Result<Object, Error> {
        let reference = self.client.store().reference(&self.path.join());
        let snapshot = reference.order_by_child(key).once(EventType::Value).await?;
        Ok(Object::detached(
            self.client.clone(),
            self.path.clone(),
            Snapshot::new(key, snapshot.value),
        ))
    }

    /// `find()` and take the first element; an empty result is an
    /// [`Error::EmptyResult`] rather than an out-of-bounds access.
    pub async fn first(&self) -> Result<Object, Error> {
        let mut found = self.find().await?;
        if found.is_empty() {
            return Err(Error::EmptyResult {
                path: self.path.join(),
            });
        }
        Ok(found.remove(0))
    }

    /// Register a live subscription. Each firing wraps the snapshot the
    /// same way `find` does and invokes `callback` with the object.
    /// No unsubscribe is exposed by this layer.
    pub fn on<F>(&self, event: EventType, callback: F)
    where
        F: Fn(Object) + Send + Sync + 'static,
    {
        let client = self.client.clone();
        let path = self.path.clone();
        self.reference().on(
            event,
            Box::new(move |snapshot| {
                callback(Object::detached(client.clone(), path.clone(), snapshot));
            }),
        );
    }

    /// Reference for this query's path, ordered by the predicate key when
    /// a predicate is set.
    fn reference(&self) -> Box<dyn Reference> {
        let reference = self.client.store().reference(&self.path.join());
        match &self.predicate {
            Some(predicate) => reference.order_by_child(&predicate.key),
            None => reference,
        }
    }

    /// Relation traversal: membership map first, then one `get` per member
    /// key against the target class, joined fail-fast.
    async fn find_related(&self, spec: &RelationSpec) -> Result<Vec<Object>, Error> {
        let membership_path = self.path.child(&spec.child_key())?;
        let membership = Query::new(self.client.clone(), membership_path).first().await?;
        let member_keys: Vec<String> = match membership.val() {
            Some(Value::Object(map)) => map.keys().cloned().collect(),
            _ => Vec::new(),
        };
        if member_keys.is_empty() {
            return Ok(Vec::new());
        }

        let class_path = Path::from_segments([spec.class_name.clone()])?;
        let mut fetches: JoinSet<(usize, Result<Object, Error>)> = JoinSet::new();
        for (index, key) in member_keys.iter().enumerate() {
            let client = self.client.clone();
            let path = class_path.clone();
            let key = key.clone();
            fetches.spawn(async move { (index, Query::new(client, path).get(&key).await) });
        }

        let mut members: Vec<Option<Object>> = Vec::new();
        members.resize_with(member_keys.len(), || None);
        while let Some(joined) = fetches.join_next().await {
            let (index, fetched) =
                joined.map_err(|e| Error::Store(StoreError::Backend(e.to_string())))?;
            // First member failure rejects the whole find; dropping the
            // JoinSet aborts the in-flight siblings.
            members[index] = Some(fetched?);
        }
        Ok(members.into_iter().flatten().collect())
    }
}
