//! Relation wrapper.
//!
//! A [`Relation`] models a many-to-many link between two classes. It is
//! stored entirely inside the owner instance, as a child node keyed
//! `_relation_<TargetClass>_<relationName>` whose value maps each related
//! object's key to a truthy marker:
//!
//! ```text
//! User/u1/_relation_Team_myTeams = { "t1": true, "t2": true }
//! ```
//!
//! Membership is traversed through a relation-mode
//! [`Query`](crate::Query); removing a member is a future extension.

use serde_json::{Map, Value};

use crate::client::SyncClient;
use crate::error::Error;
use crate::object::PointerTarget;
use crate::path::{Path, PathKind};
use crate::query::Query;

/// Many-to-many association owned by one instance.
pub struct Relation {
    client: SyncClient,
    owner_path: Path,
    class_name: String,
    relation_name: String,
}

impl Relation {
    pub(crate) fn new(
        client: SyncClient,
        owner_path: Path,
        class_name: &str,
        relation_name: &str,
    ) -> Self {
        Self {
            client,
            owner_path,
            class_name: class_name.to_string(),
            relation_name: relation_name.to_string(),
        }
    }

    /// Key of the membership child node under the owner.
    #[must_use]
    pub fn child_key(&self) -> String {
        format!("_relation_{}_{}", self.class_name, self.relation_name)
    }

    /// Write a membership marker for `target` under the owner.
    ///
    /// The owner must be an instance; any other depth fails with
    /// [`Error::InvalidOperation`] before touching the store.
    pub async fn add(&self, target: impl Into<PointerTarget>) -> Result<(), Error> {
        if self.owner_path.kind() != PathKind::Instance {
            return Err(Error::InvalidOperation(format!(
                "relation add requires an instance owner, '{}' is {}",
                self.owner_path,
                self.owner_path.kind()
            )));
        }
        let PointerTarget::Key(key) = target.into();
        let mut marker = Map::new();
        marker.insert(key, Value::Bool(true));
        self.client
            .store()
            .reference(&self.owner_path.join())
            .child_reference(&self.child_key())
            .update(Value::Object(marker))
            .await?;
        Ok(())
    }

    /// A relation-mode query over the owner path; resolve it with
    /// [`Query::find`].
    #[must_use]
    pub fn query(&self) -> Query {
        Query::for_relation(
            self.client.clone(),
            self.owner_path.clone(),
            &self.class_name,
            &self.relation_name,
        )
    }
}
