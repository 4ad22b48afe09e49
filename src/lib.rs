// SPDX-License-Identifier: MIT
// Copyright 2026 Prep-Tracker contributors

//! Prep-Tracker: headless core for an interview-prep problem catalog site.
//!
//! Owns auth-state broadcast, session caching, the per-problem progress
//! ledgers (local and remote) with their reconciliation, content gating,
//! view/time tracking, and catalog rendering. The embedding shell owns the
//! UI and the vendor auth SDK: it feeds every provider report into
//! [`auth::AuthBroadcaster::set_identity`] and implements the
//! [`store::kv::KeyValueStore`] and [`services::gate::GateSurface`] seams.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod time_utils;

use std::sync::Arc;

use crate::auth::{AuthBroadcaster, SessionCache, Subscription};
use crate::config::Config;
use crate::services::{CatalogService, ContentGate, GateSurface, Reconciler, TimeTracker};
use crate::store::kv::KeyValueStore;
use crate::store::{LocalLedger, RemoteLedger};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub auth: Arc<AuthBroadcaster>,
    pub local: LocalLedger,
    pub remote: RemoteLedger,
    pub catalog: CatalogService,
    pub reconciler: Arc<Reconciler>,
    /// Keeps the sign-in sync watcher attached for the page's lifetime.
    _auto_sync: Subscription,
}

impl AppState {
    /// Wire the core together: the session cache seeds the broadcaster's
    /// optimistic value, and the reconciler watches for absent-to-present
    /// identity transitions.
    pub fn new(
        config: Config,
        store: Arc<dyn KeyValueStore>,
        remote: RemoteLedger,
        catalog: CatalogService,
    ) -> Self {
        let session = SessionCache::new(store.clone(), &config.storage_prefix);
        let auth = Arc::new(AuthBroadcaster::new(session));
        let local = LocalLedger::new(store, &config.storage_prefix);
        let reconciler = Arc::new(Reconciler::new(
            local.clone(),
            remote.clone(),
            config.max_concurrent_sync,
        ));
        let auto_sync = reconciler.attach(&auth);

        Self {
            config,
            auth,
            local,
            remote,
            catalog,
            reconciler,
            _auto_sync: auto_sync,
        }
    }

    /// Content gate bound to this state's broadcaster and redirect config.
    pub fn gate(&self, surface: Arc<dyn GateSurface>) -> ContentGate {
        ContentGate::new(
            self.auth.clone(),
            surface,
            self.config.signin_redirect.clone(),
        )
    }

    /// Time tracker bound to this state's ledgers.
    pub fn time_tracker(&self) -> TimeTracker {
        TimeTracker::new(self.local.clone(), self.remote.clone(), self.auth.clone())
    }
}
