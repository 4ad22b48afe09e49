// SPDX-License-Identifier: MIT
// Copyright 2026 Prep-Tracker contributors

//! Auth state broadcaster: the single in-memory holder of the current
//! identity and the fan-out point for everything that reacts to it.
//!
//! Two states, one direction: `Unconfirmed` (page loaded, provider has not
//! reported) moves to `Confirmed` on the first provider report and never
//! moves back. While unconfirmed, an optimistic projection read from the
//! session cache may be served for rendering; it is never delivered to
//! subscribers and never authorizes anything.
//!
//! Fan-out contract, per subscriber: notifications arrive in confirmation
//! order, at most once per confirmed value, with a synchronous replay of
//! the current confirmed value at subscribe time. A subscriber error is
//! logged and does not interrupt delivery to the others.

use crate::auth::session::SessionCache;
use crate::models::Identity;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Subscriber callback. Runs synchronously during fan-out.
pub type Listener = Arc<dyn Fn(Option<&Identity>) -> anyhow::Result<()> + Send + Sync>;

/// Snapshot of the broadcaster's state.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthSnapshot {
    /// Provider has not reported yet; `optimistic` echoes the session cache.
    Unconfirmed { optimistic: Option<Identity> },
    /// Provider has reported. `None` is confirmed signed-out.
    Confirmed { identity: Option<Identity> },
}

struct State {
    snapshot: AuthSnapshot,
    /// Confirmation counter; 0 while unconfirmed, bumped by every
    /// `set_identity`.
    seq: u64,
}

struct Entry {
    id: u64,
    /// Highest confirmation seq delivered (or skipped) for this subscriber.
    /// The fetch_max on it is what keeps a subscribe racing a round from
    /// producing a duplicate or out-of-order notification.
    seen_seq: AtomicU64,
    /// Serializes invocations of this subscriber across threads.
    delivery: Mutex<()>,
    active: AtomicBool,
    listener: Listener,
}

type Registry = Arc<Mutex<Vec<Arc<Entry>>>>;

/// Holder and fan-out point for the page's auth state.
pub struct AuthBroadcaster {
    cache: SessionCache,
    state: Mutex<State>,
    registry: Registry,
    next_id: AtomicU64,
    /// Serializes `set_identity` rounds so every subscriber observes the
    /// same confirmation order.
    dispatch: Mutex<()>,
}

impl AuthBroadcaster {
    /// Build over the session cache, seeding the optimistic projection
    /// from it.
    pub fn new(cache: SessionCache) -> Self {
        let optimistic = cache.read().map(|entry| entry.identity);
        if optimistic.is_some() {
            tracing::debug!("Seeded optimistic identity from session cache");
        }
        Self {
            cache,
            state: Mutex::new(State {
                snapshot: AuthSnapshot::Unconfirmed { optimistic },
                seq: 0,
            }),
            registry: Arc::new(Mutex::new(Vec::new())),
            next_id: AtomicU64::new(1),
            dispatch: Mutex::new(()),
        }
    }

    /// Accept a provider report: confirm the state, mirror it into the
    /// session cache, then notify subscribers in registration order.
    ///
    /// Must not be called from inside a subscriber; the provider bridge is
    /// its only caller.
    pub fn set_identity(&self, identity: Option<Identity>) {
        // A panicking subscriber must not wedge later rounds.
        let _round = self
            .dispatch
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let seq = {
            let mut state = lock(&self.state);
            state.seq += 1;
            state.snapshot = AuthSnapshot::Confirmed {
                identity: identity.clone(),
            };
            state.seq
        };

        match &identity {
            Some(id) => self.cache.write(id),
            None => self.cache.clear(),
        }

        tracing::debug!(seq, signed_in = identity.is_some(), "Broadcasting auth state");

        // Snapshot after the state flip: an entry registered after this
        // point replays the new value itself, and seen_seq suppresses the
        // duplicate if it also made the snapshot.
        let entries: Vec<Arc<Entry>> = lock(&self.registry).clone();
        for entry in entries {
            Self::deliver(&entry, identity.as_ref(), seq);
        }
    }

    /// Register a subscriber. When a confirmed value already exists it is
    /// replayed synchronously before this returns.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(Option<&Identity>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let entry = Arc::new(Entry {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            seen_seq: AtomicU64::new(0),
            delivery: Mutex::new(()),
            active: AtomicBool::new(true),
            listener: Arc::new(listener),
        });
        lock(&self.registry).push(entry.clone());

        let replay = {
            let state = lock(&self.state);
            match &state.snapshot {
                AuthSnapshot::Confirmed { identity } => Some((identity.clone(), state.seq)),
                AuthSnapshot::Unconfirmed { .. } => None,
            }
        };
        if let Some((identity, seq)) = replay {
            Self::deliver(&entry, identity.as_ref(), seq);
        }

        Subscription {
            registry: self.registry.clone(),
            id: entry.id,
        }
    }

    fn deliver(entry: &Entry, identity: Option<&Identity>, seq: u64) {
        let _serialized = entry
            .delivery
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !entry.active.load(Ordering::Acquire) {
            return;
        }
        if entry.seen_seq.fetch_max(seq, Ordering::AcqRel) >= seq {
            return;
        }
        if let Err(e) = (entry.listener)(identity) {
            tracing::error!(
                subscriber = entry.id,
                error = %e,
                "Auth subscriber failed; continuing fan-out"
            );
        }
    }

    /// Latest renderable value: the confirmed identity, or the optimistic
    /// projection while the provider has not reported.
    pub fn current(&self) -> Option<Identity> {
        match &lock(&self.state).snapshot {
            AuthSnapshot::Confirmed { identity } => identity.clone(),
            AuthSnapshot::Unconfirmed { optimistic } => optimistic.clone(),
        }
    }

    /// Current state snapshot.
    pub fn snapshot(&self) -> AuthSnapshot {
        lock(&self.state).snapshot.clone()
    }

    /// The confirmed identity; `None` while unconfirmed or signed out.
    pub fn confirmed_identity(&self) -> Option<Identity> {
        match &lock(&self.state).snapshot {
            AuthSnapshot::Confirmed { identity } => identity.clone(),
            AuthSnapshot::Unconfirmed { .. } => None,
        }
    }

    /// Uid of the confirmed identity, if any.
    pub fn confirmed_uid(&self) -> Option<String> {
        match &lock(&self.state).snapshot {
            AuthSnapshot::Confirmed {
                identity: Some(identity),
            } => Some(identity.uid.clone()),
            _ => None,
        }
    }

    /// Whether the provider has reported at least once.
    pub fn is_confirmed(&self) -> bool {
        matches!(
            lock(&self.state).snapshot,
            AuthSnapshot::Confirmed { .. }
        )
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle for removing a subscriber. Dropping the handle does not
/// unsubscribe; call [`Subscription::unsubscribe`], which is idempotent and
/// may be called from inside the subscriber itself.
pub struct Subscription {
    registry: Registry,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(&self) {
        let mut entries = lock(&self.registry);
        if let Some(pos) = entries.iter().position(|entry| entry.id == self.id) {
            let entry = entries.remove(pos);
            entry.active.store(false, Ordering::Release);
        }
    }
}
