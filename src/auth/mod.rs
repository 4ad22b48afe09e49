// SPDX-License-Identifier: MIT
// Copyright 2026 Prep-Tracker contributors

//! Authentication state: broadcaster, session cache, and provider error
//! messages.

pub mod broadcaster;
pub mod messages;
pub mod session;

pub use broadcaster::{AuthBroadcaster, AuthSnapshot, Subscription};
pub use session::SessionCache;
