// SPDX-License-Identifier: MIT
// Copyright 2026 Prep-Tracker contributors

//! Application error types.

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Auth provider failure, carrying the provider's error code and the
    /// user-facing message mapped from it.
    #[error("Auth provider error ({code}): {message}")]
    Provider { code: String, message: String },

    #[error("Local storage error: {0}")]
    Storage(String),

    #[error("Progress sync error: {0}")]
    Sync(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Build a `Provider` error with the user-facing message for `code`.
    pub fn provider(code: impl Into<String>) -> Self {
        let code = code.into();
        let message = crate::auth::messages::friendly_message(&code).to_string();
        Self::Provider { code, message }
    }
}

impl From<crate::services::catalog::CatalogError> for AppError {
    fn from(err: crate::services::catalog::CatalogError) -> Self {
        Self::Catalog(err.to_string())
    }
}

/// Result type alias used across the crate.
pub type Result<T> = std::result::Result<T, AppError>;
