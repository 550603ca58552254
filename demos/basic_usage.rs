// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Basic sync-objects usage example.
//!
//! Demonstrates:
//! 1. Connecting a client over the in-process store
//! 2. Pushing instances into a class collection
//! 3. Querying with an ordered equality predicate
//! 4. Saving a pointer and a many-to-many relation
//! 5. Walking the relation back as objects
//! 6. Watching a path live
//!
//! # Run
//!
//! ```bash
//! cargo run --example basic_usage
//! ```

use std::sync::Arc;

use serde_json::json;
use sync_objects::{EventType, MemoryStore, Path, SyncClient, SyncConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Simple logging (no filter for simplicity)
    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .init();

    println!("\n╔═══════════════════════════════════════════════════════════════╗");
    println!("║           sync-objects: Basic Usage Example                   ║");
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    // ─────────────────────────────────────────────────────────────────────────
    // 1. Connect a client
    // ─────────────────────────────────────────────────────────────────────────
    let config = SyncConfig::default();
    println!("1. Connecting to {}", config.sync_url);
    let client = SyncClient::new(Arc::new(MemoryStore::connect(&config)));

    // ─────────────────────────────────────────────────────────────────────────
    // 2. Push two users into the User class
    // ─────────────────────────────────────────────────────────────────────────
    println!("2. Pushing users");
    let users = client.class("User")?;
    let alice = users.push(json!({"displayName": "alice", "score": 20})).await?;
    let bob = users.push(json!({"displayName": "bob", "score": 10})).await?;
    println!("   alice => User/{}", alice.key());
    println!("   bob   => User/{}", bob.key());

    // ─────────────────────────────────────────────────────────────────────────
    // 3. Ordered read over the collection
    // ─────────────────────────────────────────────────────────────────────────
    println!("3. Reading User ordered by score");
    let found = client
        .query(Path::parse("User")?)
        .equal_to("score", 10)
        .find()
        .await?;
    println!("   wrapped {} snapshot(s)", found.len());

    // ─────────────────────────────────────────────────────────────────────────
    // 4. Pointer + relation
    // ─────────────────────────────────────────────────────────────────────────
    println!("4. Linking alice to subtournaments");
    client
        .object(Path::parse("Subtournament/s1")?)
        .set(json!({"name": "spring open"}))
        .await?;
    client
        .object(Path::parse("Subtournament/s2")?)
        .set(json!({"name": "autumn cup"}))
        .await?;

    alice.save_pointer("Subtournament", "current", "s1").await?;
    let entered = alice.relation("Subtournament", "entered");
    entered.add("s1").await?;
    entered.add("s2").await?;

    // ─────────────────────────────────────────────────────────────────────────
    // 5. Walk the relation back
    // ─────────────────────────────────────────────────────────────────────────
    println!("5. Members of alice.entered:");
    for member in entered.query().find().await? {
        println!("   - {}", member.key());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // 6. Live subscription
    // ─────────────────────────────────────────────────────────────────────────
    println!("6. Watching alice for changes");
    client
        .query(alice.path().clone())
        .on(EventType::Value, |object| {
            if let Some(value) = object.val() {
                println!("   updated: score={}", value["score"]);
            }
        });
    alice.save(json!({"score": 30})).await?;

    println!("\nDone.");
    Ok(())
}
