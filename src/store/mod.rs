// SPDX-License-Identifier: MIT
// Copyright 2026 Prep-Tracker contributors

//! Storage layer: the local key-value mirror and the remote progress ledger.

#[cfg(feature = "firestore")]
pub mod firestore;
pub mod kv;
pub mod local;
pub mod remote;

pub use kv::{JsonFileStore, KeyValueStore, MemoryStore};
pub use local::{LocalEntry, LocalLedger};
pub use remote::RemoteLedger;

/// Storage key fragments and remote collection names.
pub mod keys {
    /// Local key (after the prefix) for the serialized session projection.
    pub const SESSION: &str = "session";
    /// Local key fragment prefixed to per-problem progress entries.
    pub const PROGRESS: &str = "progress:";
    /// Default remote collection holding per-user progress documents.
    pub const PROGRESS_COLLECTION: &str = "progress";
}
