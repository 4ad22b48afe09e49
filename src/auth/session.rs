// SPDX-License-Identifier: MIT
// Copyright 2026 Prep-Tracker contributors

//! Session cache: durable best-effort mirror of the last known identity.
//!
//! Exists to avoid a flash of logged-out UI on page load before the auth
//! provider confirms state. Advisory only; nothing authorizes against it,
//! and every failure here is swallowed after logging.

use crate::models::{Identity, SessionEntry};
use crate::store::keys;
use crate::store::kv::KeyValueStore;
use crate::time_utils;
use std::sync::Arc;

/// Best-effort cache of the last confirmed identity.
#[derive(Clone)]
pub struct SessionCache {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl SessionCache {
    pub fn new(store: Arc<dyn KeyValueStore>, storage_prefix: &str) -> Self {
        Self {
            store,
            key: format!("{}{}", storage_prefix, keys::SESSION),
        }
    }

    /// Persist the projection. Storage failures are logged and swallowed.
    pub fn write(&self, identity: &Identity) {
        let entry = SessionEntry {
            identity: identity.clone(),
            written_at: time_utils::now_rfc3339(),
        };
        let json = match serde_json::to_string(&entry) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize session entry");
                return;
            }
        };
        if let Err(e) = self.store.set(&self.key, &json) {
            tracing::warn!(error = %e, "Failed to persist session entry");
        }
    }

    /// Remove the cached projection. Failures are logged and swallowed.
    pub fn clear(&self) {
        if let Err(e) = self.store.remove(&self.key) {
            tracing::warn!(error = %e, "Failed to clear session entry");
        }
    }

    /// The last written projection. Absent on a miss, on a storage failure,
    /// or when the stored payload does not parse.
    pub fn read(&self) -> Option<SessionEntry> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Session cache unavailable");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(error = %e, "Dropping malformed session entry");
                None
            }
        }
    }
}
