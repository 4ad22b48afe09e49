// SPDX-License-Identifier: MIT
// Copyright 2026 Prep-Tracker contributors

//! Reconciliation between the local progress ledger and the remote one.
//!
//! Runs once per absent-to-present identity transition:
//! 1. Enumerate local entries
//! 2. Push each into the remote ledger under the identity, merging field
//!    by field against what is already there
//! 3. Pull the merged remote ledger back and overwrite local entries
//!
//! Every record is handled independently; a failing record is logged,
//! counted, and skipped, and gets retried on the next transition. Re-running
//! against an unchanged ledger is a no-op thanks to the rank/max merge rules
//! and the counter sync baselines.

use crate::auth::broadcaster::{AuthBroadcaster, Subscription};
use crate::error::Result;
use crate::models::{Identity, ProblemId};
use crate::store::{LocalEntry, LocalLedger, RemoteLedger};
use dashmap::DashMap;
use futures_util::{stream, StreamExt};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Mutex as AsyncMutex;

/// Outcome counts for one reconciliation run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Local records pushed into the remote ledger.
    pub pushed: usize,
    /// Remote records written back over local entries.
    pub pulled: usize,
    /// Records skipped after a per-record failure.
    pub skipped: usize,
}

/// Push-then-pull reconciler.
#[derive(Clone)]
pub struct Reconciler {
    local: LocalLedger,
    remote: RemoteLedger,
    /// Per-uid guard: at most one run per identity in flight.
    in_flight: Arc<DashMap<String, Arc<AsyncMutex<()>>>>,
    max_concurrent: usize,
}

impl Reconciler {
    pub fn new(local: LocalLedger, remote: RemoteLedger, max_concurrent: usize) -> Self {
        Self {
            local,
            remote,
            in_flight: Arc::new(DashMap::new()),
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Run one reconciliation for `identity`. When a run for the same uid is
    /// already in flight this returns immediately with an empty summary.
    pub async fn reconcile(&self, identity: &Identity) -> ReconcileSummary {
        let uid = identity.uid.clone();
        let guard = self
            .in_flight
            .entry(uid.clone())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone();
        let Ok(_running) = guard.try_lock() else {
            tracing::info!(uid = %uid, "Reconciliation already in flight; skipping");
            return ReconcileSummary::default();
        };

        let mut summary = ReconcileSummary::default();

        // 1. Enumerate the local ledger
        let entries = match self.local.entries() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(uid = %uid, error = %e, "Local ledger unreadable; pull-only run");
                Vec::new()
            }
        };

        // 2. Push every record, bounded concurrency, each one independent
        let results = stream::iter(entries)
            .map(|(id, entry)| {
                let uid = uid.clone();
                async move {
                    let result = self.push_record(&uid, &id, &entry).await;
                    if result.is_ok() {
                        if let Err(e) = self.local.mark_synced(
                            &id,
                            entry.record.time_spent_secs,
                            entry.record.view_count,
                        ) {
                            tracing::warn!(problem = %id, error = %e, "Failed to advance sync baseline");
                        }
                    }
                    (id, result)
                }
            })
            .buffer_unordered(self.max_concurrent)
            .collect::<Vec<(ProblemId, Result<()>)>>()
            .await;

        for (id, result) in results {
            match result {
                Ok(()) => summary.pushed += 1,
                Err(e) => {
                    summary.skipped += 1;
                    tracing::warn!(uid = %uid, problem = %id, error = %e, "Skipping record push");
                }
            }
        }

        // 3. Pull the merged ledger and overwrite local, entry by entry
        match self.remote.fetch_all(&uid).await {
            Ok(records) => {
                for (id, record) in records {
                    match self.local.overwrite_from_remote(&id, &record) {
                        Ok(()) => summary.pulled += 1,
                        Err(e) => {
                            summary.skipped += 1;
                            tracing::warn!(uid = %uid, problem = %id, error = %e, "Skipping record pull");
                        }
                    }
                }
            }
            Err(e) => {
                tracing::warn!(uid = %uid, error = %e, "Remote pull failed; local ledger left as-is");
            }
        }

        tracing::info!(
            uid = %uid,
            pushed = summary.pushed,
            pulled = summary.pulled,
            skipped = summary.skipped,
            "Reconciliation complete"
        );
        summary
    }

    /// Merge one local record into its remote counterpart and upsert the
    /// result. A record the remote ledger has never seen is written as-is.
    async fn push_record(&self, uid: &str, id: &ProblemId, entry: &LocalEntry) -> Result<()> {
        let merged = match self.remote.get(uid, id).await? {
            Some(remote) => entry.record.merged_into_remote(
                &remote,
                entry.pending_time_secs(),
                entry.pending_views(),
            ),
            None => entry.record.clone(),
        };
        self.remote.set(uid, id, &merged).await
    }

    /// Subscribe the absent-to-present transition watcher on `auth`. Each
    /// qualifying transition spawns a fire-and-forget reconciliation. The
    /// returned handle keeps the watcher attached; unsubscribe to detach.
    pub fn attach(&self, auth: &AuthBroadcaster) -> Subscription {
        let reconciler = self.clone();
        let last_uid: Mutex<Option<String>> = Mutex::new(None);
        auth.subscribe(move |identity| {
            let mut last = last_uid.lock().unwrap_or_else(PoisonError::into_inner);
            match identity {
                // A new uid appearing counts as a transition; the same uid
                // reported again (profile refresh) does not.
                Some(identity) if last.as_deref() != Some(identity.uid.as_str()) => {
                    *last = Some(identity.uid.clone());
                    let reconciler = reconciler.clone();
                    let identity = identity.clone();
                    match tokio::runtime::Handle::try_current() {
                        Ok(handle) => {
                            handle.spawn(async move {
                                reconciler.reconcile(&identity).await;
                            });
                        }
                        Err(_) => {
                            tracing::warn!(uid = %identity.uid, "No async runtime; skipping progress sync");
                        }
                    }
                }
                Some(_) => {}
                None => {
                    *last = None;
                }
            }
            Ok(())
        })
    }
}
