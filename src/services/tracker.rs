// SPDX-License-Identifier: MIT
// Copyright 2026 Prep-Tracker contributors

//! View and time tracking for the problem detail view.
//!
//! The shell drives this: `start_viewing` when a problem opens, `tick` on
//! its heartbeat (see `Config::heartbeat_secs`), `flush` when the tab is
//! hidden or the page unloads, `stop_viewing` when the view closes. Local
//! writes are synchronous; the remote half of a flush is spawned
//! fire-and-forget so an unloading page never waits on the network.
//!
//! Counters stay pending in the local ledger until a flush or a
//! reconciliation confirms them remotely, so nothing is lost when a flush
//! cannot reach the store.

use crate::auth::broadcaster::AuthBroadcaster;
use crate::models::ProblemId;
use crate::store::{LocalLedger, RemoteLedger};
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// What triggered a flush; log context only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushReason {
    Heartbeat,
    TabHidden,
    Unload,
    ViewClosed,
}

struct ActiveView {
    problem: ProblemId,
    /// Start of the current accumulation window; advanced by whole seconds
    /// on every tick so fractional remainders carry over.
    window_started: DateTime<Utc>,
}

/// Tracks how long the viewer keeps a problem open.
pub struct TimeTracker {
    local: LocalLedger,
    remote: RemoteLedger,
    auth: Arc<AuthBroadcaster>,
    active: Mutex<Option<ActiveView>>,
}

impl TimeTracker {
    pub fn new(local: LocalLedger, remote: RemoteLedger, auth: Arc<AuthBroadcaster>) -> Self {
        Self {
            local,
            remote,
            auth,
            active: Mutex::new(None),
        }
    }

    /// Open a problem view: closes any previous view, bumps the view
    /// counter, and starts accumulating time.
    pub fn start_viewing(&self, problem: &ProblemId) {
        self.start_viewing_at(problem, Utc::now());
    }

    fn start_viewing_at(&self, problem: &ProblemId, now: DateTime<Utc>) {
        self.stop_viewing();
        if let Err(e) = self.local.record_view(problem) {
            tracing::warn!(problem = %problem, error = %e, "Failed to record view");
        }
        *self.lock_active() = Some(ActiveView {
            problem: problem.clone(),
            window_started: now,
        });
    }

    /// Heartbeat: fold elapsed whole seconds into the local record.
    pub fn tick(&self) {
        self.tick_at(Utc::now());
    }

    fn tick_at(&self, now: DateTime<Utc>) {
        let mut active = self.lock_active();
        let Some(view) = active.as_mut() else {
            return;
        };
        let elapsed = (now - view.window_started).num_seconds().max(0) as u64;
        if elapsed == 0 {
            return;
        }
        view.window_started = view.window_started + Duration::seconds(elapsed as i64);
        let problem = view.problem.clone();
        drop(active);

        if let Err(e) = self.local.add_time(&problem, elapsed) {
            tracing::warn!(problem = %problem, error = %e, "Failed to record viewing time");
        }
    }

    /// Fold outstanding time locally, then send everything pending to the
    /// remote ledger when a confirmed identity exists. Without one the
    /// counters simply stay pending.
    pub fn flush(&self, reason: FlushReason) {
        self.tick();
        let problem = match self.lock_active().as_ref() {
            Some(view) => view.problem.clone(),
            None => return,
        };
        self.flush_problem(&problem, reason);
    }

    /// Close the active view, flushing it first.
    pub fn stop_viewing(&self) {
        if self.lock_active().is_none() {
            return;
        }
        self.flush(FlushReason::ViewClosed);
        *self.lock_active() = None;
    }

    fn flush_problem(&self, problem: &ProblemId, reason: FlushReason) {
        let entry = match self.local.get(problem) {
            Ok(Some(entry)) => entry,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(problem = %problem, error = %e, "Flush read failed");
                return;
            }
        };
        let secs = entry.pending_time_secs();
        let views = entry.pending_views();
        if secs == 0 && views == 0 {
            return;
        }

        let Some(uid) = self.auth.confirmed_uid() else {
            tracing::debug!(problem = %problem, reason = ?reason, "No confirmed identity; keeping time local");
            return;
        };

        let totals = (entry.record.time_spent_secs, entry.record.view_count);
        let remote = self.remote.clone();
        let local = self.local.clone();
        let problem = problem.clone();

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    match remote.add_time(&uid, &problem, secs, views).await {
                        Ok(()) => {
                            if let Err(e) = local.mark_synced(&problem, totals.0, totals.1) {
                                tracing::warn!(problem = %problem, error = %e, "Failed to advance sync baseline");
                            }
                            tracing::debug!(
                                problem = %problem,
                                secs,
                                views,
                                reason = ?reason,
                                "Flushed viewing time"
                            );
                        }
                        Err(e) => {
                            tracing::warn!(problem = %problem, error = %e, "Remote time flush failed; counters stay pending");
                        }
                    }
                });
            }
            Err(_) => {
                tracing::debug!(problem = %problem, "No async runtime; flush kept local");
            }
        }
    }

    fn lock_active(&self) -> MutexGuard<'_, Option<ActiveView>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
