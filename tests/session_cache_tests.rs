// SPDX-License-Identifier: MIT
// Copyright 2026 Prep-Tracker contributors

//! Degraded-storage behavior: the session cache is advisory and all of its
//! failures stay contained.

mod common;

use common::{make_identity, FailingStore};
use prep_tracker::auth::{AuthBroadcaster, SessionCache};
use prep_tracker::store::kv::{KeyValueStore, MemoryStore};
use std::sync::{Arc, Mutex};

#[test]
fn test_cache_failures_are_swallowed() {
    let cache = SessionCache::new(Arc::new(FailingStore), "prep:");

    // None of these may panic or propagate.
    cache.write(&make_identity("u1"));
    cache.clear();
    assert!(cache.read().is_none());
}

#[test]
fn test_broadcaster_works_over_failing_storage() {
    let cache = SessionCache::new(Arc::new(FailingStore), "prep:");
    let broadcaster = AuthBroadcaster::new(cache);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    broadcaster.subscribe(move |identity| {
        sink.lock().unwrap().push(identity.map(|i| i.uid.clone()));
        Ok(())
    });

    // The cache mirror fails silently; confirmation and fan-out proceed.
    broadcaster.set_identity(Some(make_identity("u1")));
    broadcaster.set_identity(None);

    assert_eq!(
        *seen.lock().unwrap(),
        vec![Some("u1".to_string()), None]
    );
    assert!(broadcaster.is_confirmed());
}

#[test]
fn test_rewrite_replaces_previous_projection() {
    let store = Arc::new(MemoryStore::new());
    let cache = SessionCache::new(store.clone(), "prep:");

    cache.write(&make_identity("first"));
    cache.write(&make_identity("second"));

    let entry = cache.read().unwrap();
    assert_eq!(entry.identity.uid, "second");

    let raw = store.get("prep:session").unwrap().unwrap();
    assert!(!raw.contains("first"));
}

#[test]
fn test_cache_round_trips_full_identity() {
    let cache = SessionCache::new(Arc::new(MemoryStore::new()), "prep:");
    let identity = make_identity("u1");
    cache.write(&identity);

    let entry = cache.read().unwrap();
    assert_eq!(entry.identity, identity);
    assert_eq!(entry.identity.email.as_deref(), Some("u1@example.com"));
}
