//! Auth types shared by the wrapper, the provider seam and the pages.
//!
//! Field names follow the GoTrue JSON payloads so these types deserialize
//! straight from provider responses. Unknown fields are ignored.

use serde::{Deserialize, Serialize};

pub const NOT_CONFIGURED: &str = "Auth not configured";

// =============================================================================
// ERROR
// =============================================================================

/// Error returned by every auth operation.
///
/// The provider owns the wording; pages display `message` as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AuthError {
    pub message: String,
    /// HTTP status of the provider response, when there was one.
    pub status: Option<u16>,
    /// Provider error code (GoTrue `error_code`), when supplied.
    pub code: Option<String>,
}

impl AuthError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), status: None, code: None }
    }

    /// The error every operation returns when no provider is configured.
    #[must_use]
    pub fn not_configured() -> Self {
        Self::new(NOT_CONFIGURED)
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

// =============================================================================
// USER / SESSION
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_confirmed_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub expires_in: i64,
    /// Unix seconds. Filled from `expires_in` when the provider omits it.
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub user: Option<User>,
}

fn default_token_type() -> String {
    "bearer".into()
}

impl Session {
    /// Fill in `expires_at` relative to `now` if the provider left it out.
    #[must_use]
    pub fn stamped(mut self, now: i64) -> Self {
        if self.expires_at.is_none() {
            self.expires_at = Some(now + self.expires_in);
        }
        self
    }

    /// True when the session expires within `margin_secs` of `now`.
    #[must_use]
    pub fn expires_within(&self, now: i64, margin_secs: i64) -> bool {
        self.expires_at
            .map_or(false, |at| at - now <= margin_secs)
    }
}

/// Result of sign-up and sign-in.
///
/// Sign-up leaves `session` empty while email confirmation is pending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthResponse {
    pub user: Option<User>,
    pub session: Option<Session>,
}

// =============================================================================
// EVENTS
// =============================================================================

/// Session transition reported to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEvent {
    /// Sent once to each new listener with the session at that moment.
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    /// The page was opened from a password-reset link.
    PasswordRecovery,
}

impl AuthEvent {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InitialSession => "INITIAL_SESSION",
            Self::SignedIn => "SIGNED_IN",
            Self::SignedOut => "SIGNED_OUT",
            Self::TokenRefreshed => "TOKEN_REFRESHED",
            Self::PasswordRecovery => "PASSWORD_RECOVERY",
        }
    }
}

impl std::fmt::Display for AuthEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
