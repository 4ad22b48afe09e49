// SPDX-License-Identifier: MIT
// Copyright 2026 Prep-Tracker contributors

//! Local progress ledger over the key-value storage seam.
//!
//! Entries are keyed by problem id only. The local ledger is the working
//! copy for whoever is at the page; reconciliation folds it into the
//! identity-scoped remote ledger after sign-in.

use crate::error::Result;
use crate::models::{ProblemId, ProgressRecord, ProgressStatus};
use crate::store::keys;
use crate::store::kv::KeyValueStore;
use crate::time_utils;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Stored form of one local record: the record plus the portion of each
/// counter already reflected in the remote ledger. The baselines keep
/// repeated reconciliations from re-adding the same seconds and views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalEntry {
    #[serde(flatten)]
    pub record: ProgressRecord,
    /// Portion of `time_spent_secs` already pushed remotely.
    #[serde(default)]
    pub synced_time_secs: u64,
    /// Portion of `view_count` already pushed remotely.
    #[serde(default)]
    pub synced_views: u32,
}

impl LocalEntry {
    pub fn new(record: ProgressRecord) -> Self {
        Self {
            record,
            synced_time_secs: 0,
            synced_views: 0,
        }
    }

    /// Seconds not yet reflected remotely.
    pub fn pending_time_secs(&self) -> u64 {
        self.record.time_spent_secs.saturating_sub(self.synced_time_secs)
    }

    /// Views not yet reflected remotely.
    pub fn pending_views(&self) -> u32 {
        self.record.view_count.saturating_sub(self.synced_views)
    }
}

/// Local progress ledger.
#[derive(Clone)]
pub struct LocalLedger {
    store: Arc<dyn KeyValueStore>,
    prefix: String,
}

impl LocalLedger {
    pub fn new(store: Arc<dyn KeyValueStore>, storage_prefix: &str) -> Self {
        Self {
            store,
            prefix: format!("{}{}", storage_prefix, keys::PROGRESS),
        }
    }

    fn key_for(&self, id: &ProblemId) -> String {
        format!("{}{}", self.prefix, urlencoding::encode(id.as_str()))
    }

    /// Read one entry. A malformed stored value is logged and treated as
    /// absent; a storage failure propagates.
    pub fn get(&self, id: &ProblemId) -> Result<Option<LocalEntry>> {
        let Some(raw) = self.store.get(&self.key_for(id))? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) => {
                tracing::warn!(problem = %id, error = %e, "Dropping malformed local progress entry");
                Ok(None)
            }
        }
    }

    pub fn put(&self, id: &ProblemId, entry: &LocalEntry) -> Result<()> {
        let json = serde_json::to_string(entry)
            .map_err(|e| crate::error::AppError::Storage(e.to_string()))?;
        self.store.set(&self.key_for(id), &json)
    }

    /// Read-modify-write helper. Creates a fresh record when absent and
    /// stamps `last_updated` with the current time.
    pub fn upsert<F>(&self, id: &ProblemId, mutate: F) -> Result<LocalEntry>
    where
        F: FnOnce(&mut LocalEntry),
    {
        let now = time_utils::now_rfc3339();
        let mut entry = self
            .get(id)?
            .unwrap_or_else(|| LocalEntry::new(ProgressRecord::new(&now)));
        mutate(&mut entry);
        entry.record.last_updated = now;
        self.put(id, &entry)?;
        Ok(entry)
    }

    /// Explicit status change by the user. Stamps `solved_at` on the first
    /// transition into `Solved`. Downgrades are applied verbatim; the
    /// never-downgrade rule binds merges, not direct user edits.
    pub fn set_status(&self, id: &ProblemId, status: ProgressStatus) -> Result<LocalEntry> {
        self.upsert(id, |entry| {
            if status == ProgressStatus::Solved && entry.record.solved_at.is_none() {
                entry.record.solved_at = Some(time_utils::now_rfc3339());
            }
            entry.record.status = status;
        })
    }

    /// Bump the view counter for a problem.
    pub fn record_view(&self, id: &ProblemId) -> Result<LocalEntry> {
        self.upsert(id, |entry| {
            entry.record.view_count = entry.record.view_count.saturating_add(1);
        })
    }

    /// Fold `secs` of viewing time into a problem's record.
    pub fn add_time(&self, id: &ProblemId, secs: u64) -> Result<LocalEntry> {
        self.upsert(id, |entry| {
            entry.record.time_spent_secs = entry.record.time_spent_secs.saturating_add(secs);
        })
    }

    /// Every stored entry, sorted by problem id. Undecodable keys and
    /// malformed values are logged and skipped.
    pub fn entries(&self) -> Result<Vec<(ProblemId, LocalEntry)>> {
        let mut out = Vec::new();
        for key in self.store.keys_with_prefix(&self.prefix)? {
            let encoded = &key[self.prefix.len()..];
            let id = match urlencoding::decode(encoded) {
                Ok(decoded) => ProblemId::new(decoded.into_owned()),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Skipping undecodable progress key");
                    continue;
                }
            };
            if let Some(entry) = self.get(&id)? {
                out.push((id, entry));
            }
        }
        out.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(out)
    }

    /// Replace the local entry with the merged remote record and advance the
    /// sync baselines to match it.
    pub fn overwrite_from_remote(&self, id: &ProblemId, remote: &ProgressRecord) -> Result<()> {
        let entry = LocalEntry {
            synced_time_secs: remote.time_spent_secs,
            synced_views: remote.view_count,
            record: remote.clone(),
        };
        self.put(id, &entry)
    }

    /// Record that the given counter totals are now reflected remotely.
    /// Does not bump `last_updated`; sync bookkeeping is not a record change.
    pub fn mark_synced(&self, id: &ProblemId, time_secs: u64, views: u32) -> Result<()> {
        let Some(mut entry) = self.get(id)? else {
            return Ok(());
        };
        entry.synced_time_secs = time_secs;
        entry.synced_views = views;
        self.put(id, &entry)
    }

    /// Render helper: a problem's status, degrading to `NotStarted` when the
    /// entry is absent or storage is unavailable.
    pub fn status_of(&self, id: &ProblemId) -> ProgressStatus {
        match self.get(id) {
            Ok(Some(entry)) => entry.record.status,
            Ok(None) => ProgressStatus::NotStarted,
            Err(e) => {
                tracing::warn!(problem = %id, error = %e, "Progress lookup failed; rendering as not started");
                ProgressStatus::NotStarted
            }
        }
    }
}
