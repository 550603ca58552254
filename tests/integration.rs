//! Integration tests for the object-relation layer.
//!
//! Everything runs against the in-process [`MemoryStore`]; the store shims
//! below wrap it to stagger or fail individual reads so concurrency
//! behavior (ordering, fail-fast fan-out) is observable.
//!
//! # Test Organization
//! - `happy_*` - Normal operation: writes, queries, relations, pointers
//! - `failure_*` - Empty results, failing member fetches, depth violations

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use sync_objects::{
    Error, EventType, MemoryStore, Object, Path, Reference, Snapshot, SnapshotCallback,
    StoreError, SyncClient, SyncConfig, SyncStore, OBJECT_ID_FIELD,
};

// =============================================================================
// Store Shims
// =============================================================================

/// Wraps [`MemoryStore`] and tampers with ordered reads: per-key delays to
/// force out-of-order completion, plus an optional key whose read fails.
struct ShimStore {
    inner: MemoryStore,
    fail_key: Option<String>,
}

impl ShimStore {
    fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            fail_key: None,
        }
    }

    fn failing_on(inner: MemoryStore, key: &str) -> Self {
        Self {
            inner,
            fail_key: Some(key.to_string()),
        }
    }
}

impl SyncStore for ShimStore {
    fn reference(&self, path: &str) -> Box<dyn Reference> {
        Box::new(ShimReference {
            inner: self.inner.reference(path),
            delay: Duration::ZERO,
            fail: false,
            fail_key: self.fail_key.clone(),
        })
    }
}

struct ShimReference {
    inner: Box<dyn Reference>,
    delay: Duration,
    fail: bool,
    fail_key: Option<String>,
}

#[async_trait]
impl Reference for ShimReference {
    async fn once(&self, event: EventType) -> Result<Snapshot, StoreError> {
        if self.fail {
            return Err(StoreError::Backend("injected read failure".to_string()));
        }
        tokio::time::sleep(self.delay).await;
        self.inner.once(event).await
    }

    fn on(&self, event: EventType, callback: SnapshotCallback) {
        self.inner.on(event, callback);
    }

    fn order_by_child(&self, key: &str) -> Box<dyn Reference> {
        // The first member key gets the slowest read so completion order
        // inverts membership order.
        let delay = if key.ends_with('1') {
            Duration::from_millis(40)
        } else {
            Duration::from_millis(5)
        };
        Box::new(ShimReference {
            inner: self.inner.order_by_child(key),
            delay,
            fail: self.fail_key.as_deref() == Some(key),
            fail_key: self.fail_key.clone(),
        })
    }

    async fn write(&self, value: Value) -> Result<(), StoreError> {
        self.inner.write(value).await
    }

    async fn update(&self, value: Value) -> Result<(), StoreError> {
        self.inner.update(value).await
    }

    async fn push_child(&self, value: Value) -> Result<Box<dyn Reference>, StoreError> {
        self.inner.push_child(value).await
    }

    fn child_reference(&self, sub_path: &str) -> Box<dyn Reference> {
        Box::new(ShimReference {
            inner: self.inner.child_reference(sub_path),
            delay: Duration::ZERO,
            fail: false,
            fail_key: self.fail_key.clone(),
        })
    }

    async fn remove(&self) -> Result<(), StoreError> {
        self.inner.remove().await
    }

    fn key(&self) -> String {
        self.inner.key()
    }

    fn url(&self) -> String {
        self.inner.url()
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn memory_client() -> SyncClient {
    SyncClient::new(Arc::new(MemoryStore::connect(&SyncConfig::default())))
}

fn path(input: &str) -> Path {
    Path::parse(input).unwrap()
}

/// Client over the shim plus direct access to the wrapped memory store
/// for seeding.
fn shim_client(fail_key: Option<&str>) -> (SyncClient, MemoryStore) {
    let memory = MemoryStore::connect(&SyncConfig::default());
    let shim = match fail_key {
        Some(key) => ShimStore::failing_on(memory.clone(), key),
        None => ShimStore::new(memory.clone()),
    };
    (SyncClient::new(Arc::new(shim)), memory)
}

async fn seed(store: &MemoryStore, at: &str, value: Value) {
    store.reference(at).write(value).await.unwrap();
}

fn keys_of(objects: &[Object]) -> Vec<String> {
    objects.iter().map(Object::key).collect()
}

// =============================================================================
// Happy Path
// =============================================================================

#[tokio::test]
async fn happy_push_query_flatten_round_trip() {
    let client = memory_client();
    let user = client
        .class("User")
        .unwrap()
        .push(json!({"name": "GrePuG"}))
        .await
        .unwrap();

    let found = client.query(path("User")).first().await.unwrap();
    let flat = found.to_json().unwrap();
    assert_eq!(flat["name"], "GrePuG");
    assert_eq!(flat[OBJECT_ID_FIELD], Value::String(user.key()));
    assert!(flat["createdAt"].is_i64());
    assert!(flat["updatedAt"].is_i64());
}

#[tokio::test]
async fn happy_instance_save_stamps_updated_only() {
    let client = memory_client();
    let user = client.object(path("User/u1"));
    user.set(json!({"name": "x"})).await.unwrap();
    user.save(json!({"city": "Oslo"})).await.unwrap();

    let found = client.query(path("User")).first().await.unwrap();
    let stored = &found.val().unwrap()["u1"];
    assert_eq!(stored["city"], "Oslo");
    assert!(stored["updatedAt"].is_i64());
    assert!(stored.get("createdAt").is_none());
}

#[tokio::test]
async fn happy_pointer_then_relation_round_trip() {
    let client = memory_client();
    seed_team_fixture(&client).await;

    let user = client.object(path("User/u1"));
    user.save_pointer("Team", "homeTeam", "t1").await.unwrap();
    user.relation("Team", "myTeams").add("t1").await.unwrap();
    user.relation("Team", "myTeams").add("t2").await.unwrap();

    let members = user
        .relation("Team", "myTeams")
        .query()
        .find()
        .await
        .unwrap();
    assert_eq!(keys_of(&members), ["t1", "t2"]);

    let raw = client.query(path("User")).first().await.unwrap();
    let stored = &raw.val().unwrap()["u1"];
    assert_eq!(stored["_pointer_Team_homeTeam"], "t1");
    assert_eq!(
        stored["_relation_Team_myTeams"],
        json!({"t1": true, "t2": true})
    );
}

async fn seed_team_fixture(client: &SyncClient) {
    client
        .object(path("Team/t1"))
        .set(json!({"name": "alpha"}))
        .await
        .unwrap();
    client
        .object(path("Team/t2"))
        .set(json!({"name": "beta"}))
        .await
        .unwrap();
    client
        .object(path("User/u1"))
        .set(json!({"name": "x"}))
        .await
        .unwrap();
}

#[tokio::test]
async fn happy_relation_order_survives_staggered_fetches() {
    let (client, memory) = shim_client(None);
    seed(
        &memory,
        "User/u1/_relation_Subtournament_mySubtournament",
        json!({"k1": true, "k2": true}),
    )
    .await;
    seed(
        &memory,
        "Subtournament",
        json!({"k1": {"name": "first"}, "k2": {"name": "second"}}),
    )
    .await;

    // k1's fetch is the slowest, so completions arrive k2 then k1; results
    // must still follow membership order.
    let members = client
        .object(path("User/u1"))
        .relation("Subtournament", "mySubtournament")
        .query()
        .find()
        .await
        .unwrap();
    assert_eq!(keys_of(&members), ["k1", "k2"]);
}

#[tokio::test]
async fn happy_subscription_wraps_each_event() {
    use std::sync::Mutex;

    let client = memory_client();
    let seen: Arc<Mutex<Vec<Option<Value>>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    client
        .query(path("Score/s1"))
        .on(EventType::Value, move |object| {
            sink.lock().unwrap().push(object.val().cloned());
        });

    let score = client.object(path("Score/s1"));
    score.set(json!({"points": 1})).await.unwrap();
    score.save(json!({"points": 2})).await.unwrap();

    let events = seen.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].as_ref().unwrap()["points"], 2);
}

#[tokio::test]
async fn happy_equal_to_orders_class_read() {
    // Seed the collection directly so class-level timestamp stamping does
    // not add sibling entries to the ordered read.
    let memory = MemoryStore::connect(&SyncConfig::default());
    seed(
        &memory,
        "User",
        json!({
            "u1": {"displayName": "zz"},
            "u2": {"displayName": "aa"},
        }),
    )
    .await;
    let client = SyncClient::new(Arc::new(memory));

    let found = client
        .query(path("User"))
        .equal_to("displayName", "aa")
        .find()
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    let keys: Vec<&String> = found[0].val().unwrap().as_object().unwrap().keys().collect();
    assert_eq!(keys, ["u2", "u1"]);
}

#[tokio::test]
async fn happy_child_and_remove() {
    let client = memory_client();
    let user = client.object(path("User/u1"));
    user.set(json!({"name": "x"})).await.unwrap();

    let profile = user.child("profile").unwrap();
    profile.set(json!({"city": "Oslo"})).await.unwrap();
    profile.remove().await.unwrap();

    let found = client.query(path("User")).first().await.unwrap();
    assert!(found.val().unwrap()["u1"].get("profile").is_none());
}

// =============================================================================
// Failure Scenarios
// =============================================================================

#[tokio::test]
async fn failure_first_on_empty_relation_is_an_error() {
    let client = memory_client();
    client
        .object(path("User/u1"))
        .set(json!({"name": "x"}))
        .await
        .unwrap();

    let result = client
        .object(path("User/u1"))
        .relation("Team", "myTeams")
        .query()
        .first()
        .await;
    assert!(matches!(result, Err(Error::EmptyResult { .. })));
}

#[tokio::test]
async fn failure_relation_fanout_is_all_or_nothing() {
    let (client, memory) = shim_client(Some("k2"));
    seed(
        &memory,
        "User/u1/_relation_Team_myTeams",
        json!({"k1": true, "k2": true, "k3": true}),
    )
    .await;
    seed(
        &memory,
        "Team",
        json!({"k1": {}, "k2": {}, "k3": {}}),
    )
    .await;

    let result = client
        .object(path("User/u1"))
        .relation("Team", "myTeams")
        .query()
        .find()
        .await;
    assert!(matches!(result, Err(Error::Store(_))));
}

#[tokio::test]
async fn failure_store_error_propagates_unchanged() {
    let (client, _memory) = shim_client(Some("score"));
    // The ordered read carries the failing key, so the plain query fails.
    let result = client
        .query(path("User"))
        .equal_to("score", 10)
        .find()
        .await;
    match result {
        Err(Error::Store(StoreError::Backend(message))) => {
            assert!(message.contains("injected"));
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected a backend error"),
    }
}

#[tokio::test]
async fn failure_depth_violations_fail_before_io() {
    let client = memory_client();

    let class_level = client.object(path("User"));
    assert!(matches!(
        class_level.save_pointer("Team", "t", "k").await,
        Err(Error::InvalidOperation(_))
    ));
    assert!(matches!(
        class_level.relation("Team", "t").add("k").await,
        Err(Error::InvalidOperation(_))
    ));

    // Nothing was written.
    let found = client.query(path("User")).first().await.unwrap();
    assert!(found.val().is_none());
}
