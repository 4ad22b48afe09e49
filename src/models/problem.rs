// SPDX-License-Identifier: MIT
// Copyright 2026 Prep-Tracker contributors

//! Problem catalog models: the static dataset the site renders.

use crate::models::progress::{ProblemId, ProgressStatus};
use serde::{Deserialize, Serialize};

/// Problem difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// One solution approach with its complexity annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// Approach name, e.g. "Two pointers".
    pub name: String,
    /// Big-O time, e.g. "O(n)".
    pub time_complexity: String,
    /// Big-O space.
    pub space_complexity: String,
    /// Optional writeup or video link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// A problem in the static catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub id: ProblemId,
    pub title: String,
    pub difficulty: Difficulty,
    /// Topic tags, e.g. "arrays", "dynamic-programming".
    #[serde(default)]
    pub categories: Vec<String>,
    /// Companies known to ask this problem.
    #[serde(default)]
    pub companies: Vec<String>,
    #[serde(default)]
    pub solutions: Vec<Solution>,
}

/// Versioned catalog document as shipped with the site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    pub version: u32,
    pub problems: Vec<Problem>,
}

/// Card view-model: one problem joined with the viewer's progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProblemCard {
    pub id: ProblemId,
    pub title: String,
    pub difficulty: Difficulty,
    pub categories: Vec<String>,
    pub companies: Vec<String>,
    pub solution_count: usize,
    pub status: ProgressStatus,
}
