// SPDX-License-Identifier: MIT
// Copyright 2026 Prep-Tracker contributors

//! Remote progress ledger, keyed by identity.
//!
//! A clonable client handle over one of three backends: in-memory (tests
//! and single-process shells), offline (every call fails, for exercising
//! degraded paths), and Firestore behind the `firestore` feature.

use crate::error::{AppError, Result};
use crate::models::{ProblemId, ProgressRecord};
use crate::time_utils;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;

/// Remote, identity-scoped progress ledger.
#[derive(Clone)]
pub struct RemoteLedger {
    backend: Backend,
}

#[derive(Clone)]
enum Backend {
    Memory(MemoryBackend),
    Offline,
    #[cfg(feature = "firestore")]
    Firestore(crate::store::firestore::FirestoreLedger),
}

#[derive(Clone, Default)]
struct MemoryBackend {
    records: Arc<DashMap<(String, String), ProgressRecord>>,
    /// Problem ids whose document operations fail (test hook for
    /// partial-sync paths).
    failing: Arc<HashSet<String>>,
}

impl MemoryBackend {
    fn check(&self, problem: &ProblemId) -> Result<()> {
        if self.failing.contains(problem.as_str()) {
            return Err(AppError::Sync(format!(
                "simulated failure for {}",
                problem
            )));
        }
        Ok(())
    }

    fn key(uid: &str, problem: &ProblemId) -> (String, String) {
        (uid.to_string(), problem.as_str().to_string())
    }
}

impl RemoteLedger {
    /// Fully functional in-memory backend.
    pub fn new_memory() -> Self {
        Self {
            backend: Backend::Memory(MemoryBackend::default()),
        }
    }

    /// In-memory backend whose document operations fail for the given
    /// problem ids. Used by tests of partial-sync behavior.
    pub fn new_memory_failing(ids: impl IntoIterator<Item = ProblemId>) -> Self {
        Self {
            backend: Backend::Memory(MemoryBackend {
                records: Arc::new(DashMap::new()),
                failing: Arc::new(ids.into_iter().map(|id| id.as_str().to_string()).collect()),
            }),
        }
    }

    /// Backend where every call fails, mirroring an unreachable store.
    pub fn new_offline() -> Self {
        Self {
            backend: Backend::Offline,
        }
    }

    /// Firestore backend; respects FIRESTORE_EMULATOR_HOST.
    #[cfg(feature = "firestore")]
    pub async fn new_firestore(project_id: &str, collection: &str) -> Result<Self> {
        let ledger = crate::store::firestore::FirestoreLedger::connect(project_id, collection).await?;
        Ok(Self {
            backend: Backend::Firestore(ledger),
        })
    }

    /// One identity's record for one problem.
    pub async fn get(&self, uid: &str, problem: &ProblemId) -> Result<Option<ProgressRecord>> {
        match &self.backend {
            Backend::Memory(mem) => {
                mem.check(problem)?;
                Ok(mem
                    .records
                    .get(&MemoryBackend::key(uid, problem))
                    .map(|r| r.clone()))
            }
            Backend::Offline => Err(offline()),
            #[cfg(feature = "firestore")]
            Backend::Firestore(fs) => fs.get(uid, problem).await,
        }
    }

    /// Upsert one record.
    pub async fn set(&self, uid: &str, problem: &ProblemId, record: &ProgressRecord) -> Result<()> {
        match &self.backend {
            Backend::Memory(mem) => {
                mem.check(problem)?;
                mem.records
                    .insert(MemoryBackend::key(uid, problem), record.clone());
                Ok(())
            }
            Backend::Offline => Err(offline()),
            #[cfg(feature = "firestore")]
            Backend::Firestore(fs) => fs.set(uid, problem, record).await,
        }
    }

    /// Fold viewing-time seconds and view counts into a record, creating it
    /// when absent.
    pub async fn add_time(&self, uid: &str, problem: &ProblemId, secs: u64, views: u32) -> Result<()> {
        match &self.backend {
            Backend::Memory(mem) => {
                mem.check(problem)?;
                let now = time_utils::now_rfc3339();
                let mut entry = mem
                    .records
                    .entry(MemoryBackend::key(uid, problem))
                    .or_insert_with(|| ProgressRecord::new(&now));
                entry.time_spent_secs = entry.time_spent_secs.saturating_add(secs);
                entry.view_count = entry.view_count.saturating_add(views);
                entry.last_updated = now;
                Ok(())
            }
            Backend::Offline => Err(offline()),
            #[cfg(feature = "firestore")]
            Backend::Firestore(fs) => fs.add_time(uid, problem, secs, views).await,
        }
    }

    /// All records for one identity, sorted by problem id.
    pub async fn fetch_all(&self, uid: &str) -> Result<Vec<(ProblemId, ProgressRecord)>> {
        match &self.backend {
            Backend::Memory(mem) => {
                let mut out: Vec<(ProblemId, ProgressRecord)> = mem
                    .records
                    .iter()
                    .filter(|entry| entry.key().0 == uid)
                    .map(|entry| (ProblemId::new(entry.key().1.clone()), entry.value().clone()))
                    .collect();
                out.sort_by(|a, b| a.0.cmp(&b.0));
                Ok(out)
            }
            Backend::Offline => Err(offline()),
            #[cfg(feature = "firestore")]
            Backend::Firestore(fs) => {
                let mut out = fs.fetch_all(uid).await?;
                out.sort_by(|a, b| a.0.cmp(&b.0));
                Ok(out)
            }
        }
    }
}

fn offline() -> AppError {
    AppError::Sync("Remote ledger not connected (offline mode)".to_string())
}
