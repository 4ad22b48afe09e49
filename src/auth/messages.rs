// SPDX-License-Identifier: MIT
// Copyright 2026 Prep-Tracker contributors

//! User-facing messages for auth provider error codes.

/// Map a provider error code to the message shown to the user. Codes this
/// build does not recognize get the generic line.
pub fn friendly_message(code: &str) -> &'static str {
    match code {
        "auth/popup-closed-by-user" => "The sign-in window was closed before finishing. Try again.",
        "auth/cancelled-popup-request" => "Another sign-in attempt is already in progress.",
        "auth/popup-blocked" => {
            "Your browser blocked the sign-in window. Allow popups for this site and retry."
        }
        "auth/network-request-failed" => {
            "Network error during sign-in. Check your connection and retry."
        }
        "auth/too-many-requests" => "Too many sign-in attempts. Wait a moment and try again.",
        "auth/user-disabled" => "This account has been disabled.",
        "auth/account-exists-with-different-credential" => {
            "An account already exists with this email under a different sign-in method."
        }
        _ => "Sign-in failed. Please try again.",
    }
}
