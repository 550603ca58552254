// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Object wrapper.
//!
//! An [`Object`] is one logical entity bound to a path. Writes decide which
//! timestamp metadata to stamp from the path's [`PathKind`]: class-level
//! overwrites and pushes stamp `createdAt` + `updatedAt`, instance-level
//! merges stamp `updatedAt` only, anything deeper is written untouched.
//!
//! # Backing states
//!
//! An object is either **bound** to a live store reference (the form
//! [`SyncClient::object`](crate::SyncClient::object) hands out; all
//! mutations go through it) or **detached**, holding only its path and the
//! cached snapshot a query wrapped (the form query terminals hand out).
//! A detached object must be [`rehydrate`](Object::rehydrate)d before
//! mutation.

use serde_json::{Map, Value};
use tracing::warn;

use crate::client::SyncClient;
use crate::error::Error;
use crate::path::{Path, PathKind};
use crate::relation::Relation;
use crate::snapshot::Snapshot;
use crate::store::traits::Reference;

/// Key of the field `to_json` injects the entry key under.
pub const OBJECT_ID_FIELD: &str = "_objectId_";

/// Target of a pointer write: a raw key, or an object whose key is taken.
pub enum PointerTarget {
    Key(String),
}

impl From<&str> for PointerTarget {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for PointerTarget {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<&Object> for PointerTarget {
    fn from(object: &Object) -> Self {
        Self::Key(object.key())
    }
}

enum Backing {
    /// Live reference; reads and writes go through it.
    Bound(Box<dyn Reference>),
    /// Read result: path + cached snapshot only.
    Detached { key: String },
}

/// One logical entity at a path.
pub struct Object {
    client: SyncClient,
    path: Path,
    val: Option<Value>,
    backing: Backing,
}

impl Object {
    /// Object bound to a fresh reference for `path`.
    pub(crate) fn bound(client: SyncClient, path: Path) -> Self {
        let reference = client.store().reference(&path.join());
        Self {
            client,
            path,
            val: None,
            backing: Backing::Bound(reference),
        }
    }

    /// Object bound to an existing reference; the path is recovered from
    /// the reference's URL.
    pub(crate) fn from_reference(
        client: SyncClient,
        reference: Box<dyn Reference>,
    ) -> Result<Self, Error> {
        let path = Path::from_reference_url(&reference.url())?;
        Ok(Self {
            client,
            path,
            val: None,
            backing: Backing::Bound(reference),
        })
    }

    /// Detached object wrapping a query's snapshot.
    pub(crate) fn detached(client: SyncClient, path: Path, snapshot: Snapshot) -> Self {
        let val = match snapshot.value {
            Value::Null => None,
            value => Some(value),
        };
        Self {
            client,
            path,
            val,
            backing: Backing::Detached { key: snapshot.key },
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cached value from the last read that produced this object, if any.
    #[must_use]
    pub fn val(&self) -> Option<&Value> {
        self.val.as_ref()
    }

    /// The store-assigned key: the bound reference's key, or the wrapped
    /// snapshot's key for a detached object.
    #[must_use]
    pub fn key(&self) -> String {
        match &self.backing {
            Backing::Bound(reference) => reference.key(),
            Backing::Detached { key } => key.clone(),
        }
    }

    /// Rebind a detached object to a live reference so it can be mutated.
    /// The cached value is kept. Bound objects pass through unchanged.
    #[must_use]
    pub fn rehydrate(self) -> Self {
        match self.backing {
            Backing::Bound(_) => self,
            Backing::Detached { .. } => {
                let reference = self.client.store().reference(&self.path.join());
                Self {
                    backing: Backing::Bound(reference),
                    ..self
                }
            }
        }
    }

    fn reference(&self) -> Result<&dyn Reference, Error> {
        match &self.backing {
            Backing::Bound(reference) => Ok(reference.as_ref()),
            Backing::Detached { .. } => Err(Error::InvalidOperation(format!(
                "object at '{}' is detached; rehydrate before mutating",
                self.path
            ))),
        }
    }

    /// Full overwrite at the bound reference. Class-level paths get
    /// `createdAt` and `updatedAt` stamped into `data` first.
    ///
    /// The cached value is not refreshed; re-read for the stored state.
    pub async fn set(&self, mut data: Value) -> Result<&Self, Error> {
        let reference = self.reference()?;
        self.stamp_created_and_updated(&mut data);
        reference.write(data).await?;
        Ok(self)
    }

    /// Partial merge-update. Instance-level paths get `updatedAt` stamped
    /// (never `createdAt`); other depths merge `data` untouched.
    pub async fn save(&self, mut data: Value) -> Result<&Self, Error> {
        let reference = self.reference()?;
        if self.path.kind() == PathKind::Instance {
            if let Value::Object(map) = &mut data {
                map.insert("updatedAt".to_string(), epoch_millis().into());
            }
        }
        reference.update(data).await?;
        Ok(self)
    }

    /// Append `data` as a new child with a store-generated key. Stamping
    /// follows the same rule as [`set`](Object::set) since pushes target a
    /// class-level collection. Returns a new object bound to the child.
    pub async fn push(&self, mut data: Value) -> Result<Object, Error> {
        let reference = self.reference()?;
        self.stamp_created_and_updated(&mut data);
        let child = reference.push_child(data).await?;
        Object::from_reference(self.client.clone(), child)
    }

    /// Read one child field indirectly through the query mechanism.
    pub async fn get(&self, key: &str) -> Result<Object, Error> {
        self.client.query(self.path.clone()).get(key).await
    }

    /// Delete the node at the bound reference.
    pub async fn remove(&self) -> Result<(), Error> {
        let reference = self.reference()?;
        reference.remove().await?;
        Ok(())
    }

    /// A new object bound to a reference nested under this one.
    pub fn child(&self, sub_path: &str) -> Result<Object, Error> {
        let reference = self.reference()?;
        let sub = Path::parse(sub_path)?;
        let child = reference.child_reference(&sub.join());
        Ok(Object {
            client: self.client.clone(),
            path: self.path.extend(&sub),
            val: None,
            backing: Backing::Bound(child),
        })
    }

    /// A relation descriptor with this object as owner.
    #[must_use]
    pub fn relation(&self, class_name: &str, relation_name: &str) -> Relation {
        Relation::new(
            self.client.clone(),
            self.path.clone(),
            class_name,
            relation_name,
        )
    }

    /// Merge-update the pointer field `_pointer_<class>_<name>` with the
    /// target's key. Only instance-level objects carry pointers; any other
    /// depth fails with [`Error::InvalidOperation`] before touching the
    /// store.
    pub async fn save_pointer(
        &self,
        target_class: &str,
        pointer_name: &str,
        target: impl Into<PointerTarget>,
    ) -> Result<&Self, Error> {
        if self.path.kind() != PathKind::Instance {
            return Err(Error::InvalidOperation(format!(
                "save_pointer requires an instance path, '{}' is {}",
                self.path,
                self.path.kind()
            )));
        }
        let reference = self.reference()?;
        let PointerTarget::Key(key) = target.into();
        let mut patch = Map::new();
        patch.insert(
            format!("_pointer_{target_class}_{pointer_name}"),
            Value::String(key),
        );
        reference.update(Value::Object(patch)).await?;
        Ok(self)
    }

    /// Flatten the cached snapshot into plain JSON: the entry key is
    /// injected into the entry under [`OBJECT_ID_FIELD`] and only the
    /// first entry is returned (one logical object per wrapper).
    ///
    /// With no cached value this warns and yields `None`; callers must
    /// null-check rather than expect an error.
    #[must_use]
    pub fn to_json(&self) -> Option<Value> {
        let Some(val) = &self.val else {
            warn!(path = %self.path, "object has no cached value");
            return None;
        };
        let Value::Object(entries) = val else {
            warn!(path = %self.path, "cached value is not a key-value map");
            return None;
        };
        let Some((key, entry)) = entries.iter().next() else {
            warn!(path = %self.path, "cached value has no entries");
            return None;
        };
        let Value::Object(fields) = entry else {
            warn!(path = %self.path, key = %key, "entry is not a map");
            return None;
        };
        let mut flat = fields.clone();
        flat.insert(OBJECT_ID_FIELD.to_string(), Value::String(key.clone()));
        Some(Value::Object(flat))
    }

    fn stamp_created_and_updated(&self, data: &mut Value) {
        if self.path.kind() != PathKind::Class {
            return;
        }
        if let Value::Object(map) = data {
            let now = epoch_millis();
            map.insert("createdAt".to_string(), now.into());
            map.insert("updatedAt".to_string(), now.into());
        }
    }
}

fn epoch_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
