// SPDX-License-Identifier: MIT
// Copyright 2026 Prep-Tracker contributors

use prep_tracker::config::Config;
use prep_tracker::error::{AppError, Result};
use prep_tracker::models::{Identity, Provider};
use prep_tracker::services::{CatalogService, GateSurface};
use prep_tracker::store::kv::{KeyValueStore, MemoryStore};
use prep_tracker::store::RemoteLedger;
use prep_tracker::AppState;
use std::sync::{Arc, Mutex};

/// Install a RUST_LOG-driven subscriber for test debugging. Safe to call
/// from every test; only the first call wins.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

#[allow(dead_code)]
pub fn make_identity(uid: &str) -> Identity {
    Identity {
        uid: uid.to_string(),
        display_name: Some("Test User".to_string()),
        email: Some(format!("{}@example.com", uid)),
        verified: true,
        avatar_url: None,
        provider: Provider::Google,
    }
}

#[allow(dead_code)]
pub fn sample_catalog_json() -> &'static str {
    r#"{
        "version": 1,
        "problems": [
            {
                "id": "lc_1",
                "title": "Two Sum",
                "difficulty": "Easy",
                "categories": ["arrays", "hash-table"],
                "companies": ["BigCo"],
                "solutions": [
                    {"name": "HashMap one-pass", "time_complexity": "O(n)", "space_complexity": "O(n)"}
                ]
            },
            {
                "id": "lc_42",
                "title": "Trapping Rain Water",
                "difficulty": "Hard",
                "categories": ["arrays", "two-pointers"],
                "companies": []
            },
            {
                "id": "sys_url_shortener",
                "title": "Design a URL Shortener",
                "difficulty": "Medium",
                "categories": ["system-design"],
                "companies": ["BigCo"]
            }
        ]
    }"#
}

/// App state over in-memory storage and the given remote ledger.
#[allow(dead_code)]
pub fn make_app_state(remote: RemoteLedger) -> AppState {
    let catalog = CatalogService::load_from_json(sample_catalog_json()).expect("valid catalog");
    AppState::new(
        Config::default(),
        Arc::new(MemoryStore::new()),
        remote,
        catalog,
    )
}

/// Gate surface that records every effect for assertions.
#[derive(Default)]
pub struct RecordingSurface {
    events: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl RecordingSurface {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn count_of(&self, prefix: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }

    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl GateSurface for RecordingSurface {
    fn apply_overlay(&self, region: &str) {
        self.record(format!("overlay:{}", region));
    }

    fn remove_overlay(&self, region: &str) {
        self.record(format!("unveil:{}", region));
    }

    fn show_signin_prompt(&self, action: &str) {
        self.record(format!("prompt:{}", action));
    }

    fn navigate(&self, target: &str) {
        self.record(format!("navigate:{}", target));
    }
}

/// Store where every operation fails, for exercising degraded paths.
#[derive(Default)]
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(AppError::Storage("store unavailable".to_string()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Err(AppError::Storage("store unavailable".to_string()))
    }

    fn remove(&self, _key: &str) -> Result<()> {
        Err(AppError::Storage("store unavailable".to_string()))
    }

    fn keys_with_prefix(&self, _prefix: &str) -> Result<Vec<String>> {
        Err(AppError::Storage("store unavailable".to_string()))
    }
}
