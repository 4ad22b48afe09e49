// SPDX-License-Identifier: MIT
// Copyright 2026 Prep-Tracker contributors

//! Per-problem progress records and their field-level merge rules.

use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Problem Id ───────────────────────────────────────────────────────────

/// Composite problem identifier: a category prefix joined to a problem key,
/// e.g. `lc_1` or `sys_url_shortener`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProblemId(String);

impl ProblemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Category prefix: `lc` for `lc_1`. Unprefixed ids are their own
    /// category.
    pub fn category_prefix(&self) -> &str {
        self.0.split('_').next().unwrap_or(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProblemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProblemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

// ─── Progress Status ──────────────────────────────────────────────────────

/// Progress status for one problem. Variant order is the merge ranking:
/// reconciliation never moves a record to an earlier variant.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressStatus {
    #[default]
    NotStarted,
    Working,
    NeedsHelp,
    Solved,
}

impl ProgressStatus {
    /// Wire/storage form of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not-started",
            Self::Working => "working",
            Self::NeedsHelp => "needs-help",
            Self::Solved => "solved",
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Progress Record ──────────────────────────────────────────────────────

/// One tracked problem's progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// Current status.
    #[serde(default)]
    pub status: ProgressStatus,
    /// When the problem was first opened (RFC3339).
    #[serde(default)]
    pub first_seen: String,
    /// Most recent change to any field (RFC3339).
    #[serde(default)]
    pub last_updated: String,
    /// When the problem first reached `solved` (RFC3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solved_at: Option<String>,
    /// Cumulative seconds spent with the problem view open.
    #[serde(default)]
    pub time_spent_secs: u64,
    /// Number of times the problem view was opened.
    #[serde(default)]
    pub view_count: u32,
}

impl ProgressRecord {
    /// Fresh record first seen at `now`.
    pub fn new(now: &str) -> Self {
        Self {
            status: ProgressStatus::NotStarted,
            first_seen: now.to_string(),
            last_updated: now.to_string(),
            solved_at: None,
            time_spent_secs: 0,
            view_count: 0,
        }
    }

    /// Field-level merge of this (local) record into its remote counterpart.
    ///
    /// `delta_secs` and `delta_views` are the local counter amounts not yet
    /// reflected remotely; counters accumulate across devices, so the delta
    /// is added to the remote totals rather than comparing absolutes. Status
    /// takes the higher rank, `first_seen` the earlier stamp, the remaining
    /// timestamps the later stamp.
    pub fn merged_into_remote(
        &self,
        remote: &ProgressRecord,
        delta_secs: u64,
        delta_views: u32,
    ) -> ProgressRecord {
        ProgressRecord {
            status: self.status.max(remote.status),
            first_seen: min_stamp(&self.first_seen, &remote.first_seen),
            last_updated: max_stamp(&self.last_updated, &remote.last_updated),
            solved_at: max_opt_stamp(self.solved_at.as_deref(), remote.solved_at.as_deref()),
            time_spent_secs: remote.time_spent_secs.saturating_add(delta_secs),
            view_count: remote.view_count.saturating_add(delta_views),
        }
    }
}

// Stamps are RFC3339 at uniform precision, so lexicographic comparison is
// time comparison. Empty strings come from older stored records and count
// as missing.

fn min_stamp(a: &str, b: &str) -> String {
    if a.is_empty() {
        return b.to_string();
    }
    if b.is_empty() {
        return a.to_string();
    }
    if a <= b { a.to_string() } else { b.to_string() }
}

fn max_stamp(a: &str, b: &str) -> String {
    if a >= b { a.to_string() } else { b.to_string() }
}

fn max_opt_stamp(a: Option<&str>, b: Option<&str>) -> Option<String> {
    match (a, b) {
        (Some(a), Some(b)) => Some(max_stamp(a, b)),
        (Some(a), None) => Some(a.to_string()),
        (None, Some(b)) => Some(b.to_string()),
        (None, None) => None,
    }
}
