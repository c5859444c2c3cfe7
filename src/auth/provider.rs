//! Provider seam: the operations the site needs from an identity provider.
//!
//! [`GoTrueClient`](super::gotrue::GoTrueClient) is the production
//! implementation; tests substitute their own.

use std::sync::Arc;

use super::listeners::{AuthStateListener, Subscription};
use super::types::{AuthError, AuthResponse, Session, User};

#[async_trait::async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    /// The current session, refreshed first if it is about to expire.
    async fn get_session(&self) -> Result<Option<Session>, AuthError>;

    /// The signed-in user as the provider currently sees it.
    async fn get_user(&self) -> Result<Option<User>, AuthError>;

    async fn reset_password_for_email(&self, email: &str, redirect_to: &str) -> Result<(), AuthError>;

    /// Adopt a session carried in a redirect URL fragment
    /// (`#access_token=...&refresh_token=...&expires_in=...&type=...`).
    ///
    /// Returns `Ok(None)` when detection is disabled or the URL carries no
    /// session. An `error_description` in the URL is returned as an error.
    async fn detect_session_in_url(&self, url: &str) -> Result<Option<Session>, AuthError>;

    fn on_auth_state_change(&self, listener: Arc<dyn AuthStateListener>) -> Subscription;
}
