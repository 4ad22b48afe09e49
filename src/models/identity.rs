// SPDX-License-Identifier: MIT
// Copyright 2026 Prep-Tracker contributors

//! Identity models: the signed-in principal as reported by the auth
//! provider, and its durable session-cache projection.

use serde::{Deserialize, Serialize};

/// Sign-in provider, serialized with the hosted auth service's provider ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provider {
    #[serde(rename = "google.com")]
    Google,
    #[serde(rename = "github.com")]
    Github,
    #[serde(rename = "password")]
    Password,
    /// Any provider id this build does not know about.
    #[serde(untagged)]
    Other(String),
}

/// The signed-in principal, as most recently reported by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Opaque stable user id from the auth provider.
    pub uid: String,
    /// Display name, absent for bare email accounts.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Email address, absent when the provider grants no email scope.
    #[serde(default)]
    pub email: Option<String>,
    /// Whether the provider has verified the email address.
    #[serde(default)]
    pub verified: bool,
    /// Avatar URL.
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Which provider produced this identity.
    pub provider: Provider,
}

/// Serialized session-cache entry: the last known identity plus the time it
/// was written. Advisory data only; nothing authorizes against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub identity: Identity,
    /// When this projection was written (RFC3339).
    pub written_at: String,
}
