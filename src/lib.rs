//! # Sync Objects
//!
//! A thin object-relation access layer over a hierarchical, path-addressed
//! realtime sync database.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       SyncClient                            │
//! │  • Holds the open store handle                              │
//! │  • Constructs Query / Object / Relation bound to it         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────┐  ┌──────────────────┐  ┌────────────────┐
//! │      Query       │  │      Object      │  │    Relation    │
//! │  lazy reads,     │  │  set/save/push,  │  │  membership    │
//! │  equal_to,       │  │  pointers,       │  │  markers +     │
//! │  relation fanout │  │  timestamping    │  │  member fetch  │
//! └──────────────────┘  └──────────────────┘  └────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │              SyncStore / Reference traits                   │
//! │  • The external realtime store (transport, auth, retries)   │
//! │  • MemoryStore implements them in-process for dev & tests   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Paths carry the schema: one segment is a class (`User`), two an
//! instance (`User/abc123`), three or more a nested child such as a
//! relation membership node. Writes use that role to decide which
//! timestamp metadata to stamp.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use serde_json::json;
//! use sync_objects::{MemoryStore, SyncClient, SyncConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sync_objects::Error> {
//!     let store = MemoryStore::connect(&SyncConfig::default());
//!     let client = SyncClient::new(Arc::new(store));
//!
//!     // Append an instance under the User class
//!     let user = client.class("User")?.push(json!({"name": "GrePuG"})).await?;
//!
//!     // Merge-update it (stamps updatedAt)
//!     user.save(json!({"city": "Oslo"})).await?;
//!
//!     // Link it to a team and walk the relation back
//!     user.relation("Team", "myTeams").add("t1").await?;
//!     let teams = user.relation("Team", "myTeams").query().find().await?;
//!     assert_eq!(teams.len(), 1);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`client`]: the [`SyncClient`] facade
//! - [`query`]: lazy [`Query`] with `equal_to`/`find`/`get`/`first`/`on`
//! - [`object`]: the [`Object`] wrapper and its stamping rules
//! - [`relation`]: many-to-many [`Relation`] encoding
//! - [`path`]: validated [`Path`] + [`PathKind`] addressing
//! - [`store`]: the consumed store traits and the in-process [`MemoryStore`]

pub mod client;
pub mod config;
pub mod error;
pub mod object;
pub mod path;
pub mod query;
pub mod relation;
pub mod snapshot;
pub mod store;

pub use client::SyncClient;
pub use config::SyncConfig;
pub use error::Error;
pub use object::{Object, PointerTarget, OBJECT_ID_FIELD};
pub use path::{Path, PathKind};
pub use query::{Predicate, Query};
pub use relation::Relation;
pub use snapshot::Snapshot;
pub use store::memory::MemoryStore;
pub use store::traits::{EventType, Reference, SnapshotCallback, StoreError, SyncStore};
