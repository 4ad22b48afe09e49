// SPDX-License-Identifier: MIT
// Copyright 2026 Prep-Tracker contributors

//! Problem catalog: loading, validation, filtering, and card rendering.
//!
//! The catalog is a static dataset shipped with the site. Cards join it
//! with the viewer's local progress; filters are conjunctive.

use crate::models::{CatalogFile, Difficulty, Problem, ProblemCard, ProblemId, ProgressStatus};
use crate::store::LocalLedger;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Catalog document versions this build understands.
const SUPPORTED_VERSIONS: &[u32] = &[1];

/// Service for loading the problem catalog and rendering cards from it.
#[derive(Debug, Default, Clone)]
pub struct CatalogService {
    problems: Vec<Problem>,
    version: u32,
}

impl CatalogService {
    /// Load the catalog from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let json_data = fs::read_to_string(path.as_ref())
            .map_err(|e| CatalogError::IoError(e.to_string()))?;
        Self::load_from_json(&json_data)
    }

    /// Load the catalog from a JSON string.
    pub fn load_from_json(json_data: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile =
            serde_json::from_str(json_data).map_err(|e| CatalogError::ParseError(e.to_string()))?;

        if !SUPPORTED_VERSIONS.contains(&file.version) {
            return Err(CatalogError::UnsupportedVersion(file.version));
        }

        let mut seen = HashSet::new();
        for problem in &file.problems {
            if !seen.insert(problem.id.clone()) {
                return Err(CatalogError::DuplicateProblem(problem.id.to_string()));
            }
        }

        tracing::info!(
            version = file.version,
            count = file.problems.len(),
            "Loaded problem catalog"
        );

        Ok(Self {
            problems: file.problems,
            version: file.version,
        })
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    /// Look up one problem by id.
    pub fn get(&self, id: &ProblemId) -> Option<&Problem> {
        self.problems.iter().find(|p| &p.id == id)
    }

    /// Problems matching every set filter. Status filters only apply when
    /// rendering cards, since status lives in the progress ledger.
    pub fn filter(&self, filter: &CatalogFilter) -> Vec<&Problem> {
        self.problems.iter().filter(|p| filter.matches(p)).collect()
    }

    /// Render models: filtered problems joined with the viewer's progress.
    pub fn cards(&self, filter: &CatalogFilter, ledger: &LocalLedger) -> Vec<ProblemCard> {
        self.filter(filter)
            .into_iter()
            .map(|p| ProblemCard {
                id: p.id.clone(),
                title: p.title.clone(),
                difficulty: p.difficulty,
                categories: p.categories.clone(),
                companies: p.companies.clone(),
                solution_count: p.solutions.len(),
                status: ledger.status_of(&p.id),
            })
            .filter(|card| match filter.status {
                Some(status) => card.status == status,
                None => true,
            })
            .collect()
    }
}

/// Conjunctive catalog filters; unset fields do not constrain.
#[derive(Debug, Default, Clone)]
pub struct CatalogFilter {
    pub difficulty: Option<Difficulty>,
    /// Topic tag, matched case-insensitively.
    pub category: Option<String>,
    /// Company tag, matched case-insensitively.
    pub company: Option<String>,
    /// Case-insensitive title substring.
    pub text: Option<String>,
    /// Viewer progress status; applies in [`CatalogService::cards`] only.
    pub status: Option<ProgressStatus>,
}

impl CatalogFilter {
    fn matches(&self, problem: &Problem) -> bool {
        if let Some(difficulty) = self.difficulty {
            if problem.difficulty != difficulty {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if !problem
                .categories
                .iter()
                .any(|c| c.eq_ignore_ascii_case(category))
            {
                return false;
            }
        }
        if let Some(company) = &self.company {
            if !problem
                .companies
                .iter()
                .any(|c| c.eq_ignore_ascii_case(company))
            {
                return false;
            }
        }
        if let Some(text) = &self.text {
            if !problem.title.to_lowercase().contains(&text.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

/// Errors that can occur during catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read file: {0}")]
    IoError(String),

    #[error("Failed to parse catalog: {0}")]
    ParseError(String),

    #[error("Unsupported catalog version: {0}")]
    UnsupportedVersion(u32),

    #[error("Duplicate problem id: {0}")]
    DuplicateProblem(String),
}
