//! Client facade.
//!
//! [`SyncClient`] holds the open store handle and constructs
//! [`Query`](crate::Query), [`Object`](crate::Object) and
//! [`Relation`](crate::Relation) values bound to it. The client is a cheap
//! clone (one `Arc`); every wrapper carries its own copy.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use sync_objects::{MemoryStore, Path, SyncClient, SyncConfig};
//!
//! let store = MemoryStore::connect(&SyncConfig::default());
//! let client = SyncClient::new(Arc::new(store));
//! let users = client.query(Path::parse("User").unwrap());
//! ```

use std::sync::Arc;

use crate::error::Error;
use crate::object::Object;
use crate::path::Path;
use crate::query::Query;
use crate::store::traits::SyncStore;

/// Handle to a connected sync database.
#[derive(Clone)]
pub struct SyncClient {
    store: Arc<dyn SyncStore>,
}

impl SyncClient {
    #[must_use]
    pub fn new(store: Arc<dyn SyncStore>) -> Self {
        Self { store }
    }

    pub(crate) fn store(&self) -> &dyn SyncStore {
        self.store.as_ref()
    }

    /// A lazy query over `path`. Nothing is read until a terminal call.
    #[must_use]
    pub fn query(&self, path: Path) -> Query {
        Query::new(self.clone(), path)
    }

    /// An object bound to a live reference for `path`.
    #[must_use]
    pub fn object(&self, path: Path) -> Object {
        Object::bound(self.clone(), path)
    }

    /// Convenience: the bound class-level object for `name`.
    pub fn class(&self, name: &str) -> Result<Object, Error> {
        Ok(self.object(Path::from_segments([name])?))
    }
}
