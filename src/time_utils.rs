// SPDX-License-Identifier: MIT
// Copyright 2026 Prep-Tracker contributors

//! Shared helpers for date/time formatting.
//!
//! Every timestamp this crate stores is RFC3339 UTC at seconds precision
//! with a `Z` suffix, so plain string comparison agrees with time order.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Current time in the stored-timestamp format.
pub fn now_rfc3339() -> String {
    format_utc_rfc3339(Utc::now())
}
