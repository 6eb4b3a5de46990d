//! Integration tests for the stream → store pipeline.

mod helpers;

use std::sync::Arc;

use beacon_core::config::dedup::DedupConfig;
use beacon_core::config::store::StoreConfig;
use beacon_core::traits::storage::KvStorage;
use beacon_core::types::record::NotificationKind;
use beacon_store::NotificationStore;

use helpers::{Harness, event, wait_for};

#[tokio::test]
async fn test_stream_event_lands_in_store_and_persists() {
    let harness = Harness::new(true, vec![]).await;
    let seeded = harness.store.len();

    harness.router.route(event("alice", "hello there")).await;

    let records = harness.store.records();
    assert_eq!(records.len(), seeded + 1);
    assert_eq!(records[0].title, "alice");
    assert_eq!(records[0].message, "hello there");
    assert_eq!(records[0].kind, NotificationKind::Message);

    // The mutation reached durable storage: a fresh store over the same
    // backend restores it.
    let reloaded = NotificationStore::new(
        Arc::clone(&harness.storage) as Arc<dyn KvStorage>,
        StoreConfig::default(),
        &DedupConfig::default(),
    );
    reloaded.load().await;
    assert!(
        reloaded
            .records()
            .iter()
            .any(|r| r.message == "hello there")
    );
}

#[tokio::test]
async fn test_rapid_duplicate_events_collapse_to_one_record() {
    let harness = Harness::new(true, vec![]).await;
    let seeded = harness.store.len();

    harness.router.route(event("alice", "ping")).await;
    harness.router.route(event("alice", "ping")).await;

    assert_eq!(harness.store.len(), seeded + 1);
}

#[tokio::test]
async fn test_distinct_events_are_all_kept() {
    let harness = Harness::new(true, vec![]).await;
    let seeded = harness.store.len();

    harness.router.route(event("alice", "first")).await;
    harness.router.route(event("alice", "second")).await;
    harness.router.route(event("bob", "third")).await;

    assert_eq!(harness.store.len(), seeded + 3);
}

#[tokio::test]
async fn test_hidden_events_flush_on_visibility() {
    let harness = Harness::new(false, vec![]).await;
    let seeded = harness.store.len();

    harness.router.route(event("alice", "while hidden 1")).await;
    harness.router.route(event("alice", "while hidden 2")).await;
    assert_eq!(harness.store.len(), seeded);
    assert_eq!(harness.queue.buffered(), 2);

    harness.queue.set_visible(true).await;
    let records = harness.store.records();
    assert_eq!(records.len(), seeded + 2);
    // Newest-first: the later arrival leads.
    assert_eq!(records[0].message, "while hidden 2");
    assert_eq!(records[1].message, "while hidden 1");
}

#[tokio::test]
async fn test_read_state_flows_through_store() {
    let harness = Harness::new(true, vec![]).await;
    harness.store.clear().await;

    harness.router.route(event("alice", "unread one")).await;
    harness.router.route(event("bob", "unread two")).await;
    assert_eq!(harness.store.unread_count(), 2);

    let id = harness.store.records()[0].id.clone();
    harness.store.mark_read(&id).await;
    assert_eq!(harness.store.unread_count(), 1);

    harness.store.mark_all_read().await;
    assert_eq!(harness.store.unread_count(), 0);
}

#[tokio::test]
async fn test_full_loop_through_subscription_manager() {
    let harness = Harness::new(true, vec![]).await;
    harness.store.clear().await;

    let source = helpers::ScriptedSource::new(0);
    let manager = harness.manager(
        source.clone(),
        beacon_core::config::stream::StreamConfig::default(),
    );
    manager.start().unwrap();

    let mgr = Arc::clone(&manager);
    wait_for(move || mgr.phase() == beacon_stream::SubscriptionPhase::Active).await;

    source.emit(event("alice", "via the stream"));
    let store = Arc::clone(&harness.store);
    wait_for(move || store.len() == 1).await;
    assert_eq!(harness.store.records()[0].message, "via the stream");

    manager.teardown();
}
