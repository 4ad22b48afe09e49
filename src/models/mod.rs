// SPDX-License-Identifier: MIT
// Copyright 2026 Prep-Tracker contributors

//! Data models for the tracker core.

pub mod identity;
pub mod problem;
pub mod progress;

pub use identity::{Identity, Provider, SessionEntry};
pub use problem::{CatalogFile, Difficulty, Problem, ProblemCard, Solution};
pub use progress::{ProblemId, ProgressRecord, ProgressStatus};
