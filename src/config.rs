//! Application configuration loaded from environment variables.

/// Configuration for the tracker core.
#[derive(Debug, Clone)]
pub struct Config {
    /// Prefix prepended to every local storage key.
    pub storage_prefix: String,
    /// Remote collection holding per-user progress documents.
    pub progress_collection: String,
    /// Where blocked anonymous actions navigate to. When unset, a sign-in
    /// prompt is surfaced in place instead.
    pub signin_redirect: Option<String>,
    /// Interval, in seconds, at which the shell should drive the time
    /// tracker's heartbeat.
    pub heartbeat_secs: u64,
    /// Upper bound on concurrent per-record pushes during reconciliation.
    pub max_concurrent_sync: usize,
    /// GCP project for the Firestore-backed remote ledger.
    pub gcp_project_id: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_prefix: "prep:".to_string(),
            progress_collection: "progress".to_string(),
            signin_redirect: None,
            heartbeat_secs: 30,
            max_concurrent_sync: 50,
            gcp_project_id: "local-dev".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let heartbeat_secs = match std::env::var("PREP_HEARTBEAT_SECS") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid("PREP_HEARTBEAT_SECS"))?,
            Err(_) => defaults.heartbeat_secs,
        };

        let max_concurrent_sync = match std::env::var("PREP_MAX_CONCURRENT_SYNC") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid("PREP_MAX_CONCURRENT_SYNC"))?,
            Err(_) => defaults.max_concurrent_sync,
        };

        Ok(Self {
            storage_prefix: std::env::var("PREP_STORAGE_PREFIX")
                .unwrap_or(defaults.storage_prefix),
            progress_collection: std::env::var("PREP_PROGRESS_COLLECTION")
                .unwrap_or(defaults.progress_collection),
            signin_redirect: std::env::var("PREP_SIGNIN_REDIRECT").ok(),
            heartbeat_secs,
            max_concurrent_sync,
            gcp_project_id: std::env::var("GCP_PROJECT_ID").unwrap_or(defaults.gcp_project_id),
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
