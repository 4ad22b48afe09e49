// SPDX-License-Identifier: MIT
// Copyright 2026 Prep-Tracker contributors

//! Content gating: translate broadcast auth state into UI effects and guard
//! protected actions.
//!
//! Access answers come only from confirmed state; the optimistic session
//! projection renders UI but never grants anything.

use crate::auth::broadcaster::{AuthBroadcaster, Subscription};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// UI surface the embedding shell implements. All effects are synchronous
/// and must not panic.
pub trait GateSurface: Send + Sync {
    /// Obscure a region and show the sign-in overlay on it.
    fn apply_overlay(&self, region: &str);
    /// Remove the overlay from a region.
    fn remove_overlay(&self, region: &str);
    /// Open the sign-in prompt for a blocked action.
    fn show_signin_prompt(&self, action: &str);
    /// Navigate to a target; terminal for the current view.
    fn navigate(&self, target: &str);
}

/// Gate over the current confirmed identity.
#[derive(Clone)]
pub struct ContentGate {
    auth: Arc<AuthBroadcaster>,
    surface: Arc<dyn GateSurface>,
    signin_redirect: Option<String>,
}

impl ContentGate {
    pub fn new(
        auth: Arc<AuthBroadcaster>,
        surface: Arc<dyn GateSurface>,
        signin_redirect: Option<String>,
    ) -> Self {
        Self {
            auth,
            surface,
            signin_redirect,
        }
    }

    /// True iff a confirmed identity is present right now. When it is not,
    /// navigates to the configured redirect (or surfaces the sign-in prompt
    /// when none is configured) and returns false. Never panics.
    pub fn require_access(&self, action: &str) -> bool {
        if self.auth.confirmed_identity().is_some() {
            return true;
        }
        tracing::debug!(action, "Blocked action without confirmed identity");
        match &self.signin_redirect {
            Some(target) => self.surface.navigate(target),
            None => self.surface.show_signin_prompt(action),
        }
        false
    }

    /// Overlay `region` until a confirmed sign-in arrives. The overlay is
    /// removed exactly once, after which the watcher removes itself.
    pub fn gate(&self, region: &str) {
        self.surface.apply_overlay(region);

        let region = region.to_string();
        let surface = self.surface.clone();
        let removed = Arc::new(AtomicBool::new(false));
        let handle: Arc<OnceLock<Subscription>> = Arc::new(OnceLock::new());

        let removed_in = removed.clone();
        let handle_in = handle.clone();
        let subscription = self.auth.subscribe(move |identity| {
            if identity.is_some() && !removed_in.swap(true, Ordering::AcqRel) {
                surface.remove_overlay(&region);
                if let Some(subscription) = handle_in.get() {
                    subscription.unsubscribe();
                }
            }
            Ok(())
        });

        // subscribe replays synchronously, so the removal may already have
        // run before the handle was set; finish the cleanup here then.
        if handle.set(subscription).is_ok() && removed.load(Ordering::Acquire) {
            if let Some(subscription) = handle.get() {
                subscription.unsubscribe();
            }
        }
    }

    /// Wrap a handler so it only runs behind a passing access check. The
    /// original handler is preserved inside the returned action.
    pub fn protect<F>(&self, action: &str, handler: F) -> ProtectedAction
    where
        F: Fn() + Send + Sync + 'static,
    {
        ProtectedAction {
            gate: self.clone(),
            action: action.to_string(),
            handler: Arc::new(handler),
        }
    }
}

/// An intercepted UI action. [`ProtectedAction::invoke`] runs the wrapped
/// handler only when access is granted.
#[derive(Clone)]
pub struct ProtectedAction {
    gate: ContentGate,
    action: String,
    handler: Arc<dyn Fn() + Send + Sync>,
}

impl ProtectedAction {
    /// Run the access check, then the handler. Returns whether the handler
    /// ran.
    pub fn invoke(&self) -> bool {
        if self.gate.require_access(&self.action) {
            (self.handler)();
            true
        } else {
            false
        }
    }
}
