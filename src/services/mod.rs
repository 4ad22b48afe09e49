// SPDX-License-Identifier: MIT
// Copyright 2026 Prep-Tracker contributors

//! Services module - business logic layer.

pub mod catalog;
pub mod gate;
pub mod reconciler;
pub mod tracker;

pub use catalog::{CatalogError, CatalogFilter, CatalogService};
pub use gate::{ContentGate, GateSurface, ProtectedAction};
pub use reconciler::{ReconcileSummary, Reconciler};
pub use tracker::{FlushReason, TimeTracker};
