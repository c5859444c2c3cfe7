//! Auth: null-safe facade over the identity provider.
//!
//! DESIGN
//! ======
//! [`AuthClient`] holds an optional provider that is set once, when the
//! client is built. Without configuration there is no provider and every
//! operation still answers: writes fail with "Auth not configured", reads
//! report "nobody signed in". Pages therefore never check whether auth is
//! available; they only branch on the returned `Result`.
//!
//! The provider sits behind the [`AuthProvider`] trait so pages can be
//! driven by a substitute in tests.

pub mod gotrue;
pub mod listeners;
pub mod provider;
pub mod types;

use std::sync::Arc;

pub use listeners::{AuthStateListener, Subscription};
pub use provider::AuthProvider;
pub use types::{AuthError, AuthEvent, AuthResponse, Session, User};

use crate::storage::{MemoryStorage, Storage};
use gotrue::{GoTrueClient, GoTrueOptions};

/// Path the password-reset email links back to.
pub const RESET_PASSWORD_PATH: &str = "/reset-password";

#[derive(Clone)]
pub struct AuthClient {
    provider: Option<Arc<dyn AuthProvider>>,
    site_origin: String,
}

impl AuthClient {
    /// Build a client for the Supabase project at `url` with key `key`.
    ///
    /// A missing or blank value disables auth for the life of this client.
    /// Session persistence goes to a process-local store; use
    /// [`AuthClient::initialize_with_storage`] to supply another.
    #[must_use]
    pub fn initialize(url: Option<&str>, key: Option<&str>, site_origin: &str) -> Self {
        Self::initialize_with_storage(url, key, site_origin, Arc::new(MemoryStorage::new()))
    }

    #[must_use]
    pub fn initialize_with_storage(
        url: Option<&str>,
        key: Option<&str>,
        site_origin: &str,
        storage: Arc<dyn Storage>,
    ) -> Self {
        let (Some(url), Some(key)) = (non_blank(url), non_blank(key)) else {
            tracing::warn!("Supabase credentials not configured. Auth features disabled.");
            return Self::disabled(site_origin);
        };

        match GoTrueClient::new(url, key, GoTrueOptions::default(), storage) {
            Ok(client) => {
                let client = Arc::new(client);
                let _ticker = client.start_auto_refresh();
                tracing::info!(url, "auth client initialized");
                Self::with_provider(client, site_origin)
            }
            Err(e) => {
                tracing::warn!(error = %e, "auth client could not be built. Auth features disabled.");
                Self::disabled(site_origin)
            }
        }
    }

    /// A client with no provider.
    #[must_use]
    pub fn disabled(site_origin: &str) -> Self {
        Self { provider: None, site_origin: trim_origin(site_origin) }
    }

    /// A client backed by an arbitrary provider.
    #[must_use]
    pub fn with_provider(provider: Arc<dyn AuthProvider>, site_origin: &str) -> Self {
        Self { provider: Some(provider), site_origin: trim_origin(site_origin) }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Register a new account. The provider may require email confirmation,
    /// in which case the response carries a user but no session.
    ///
    /// # Errors
    ///
    /// Returns "Auth not configured" without a provider, otherwise the
    /// provider's error.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        let provider = self.provider.as_ref().ok_or_else(AuthError::not_configured)?;
        provider.sign_up(email, password).await
    }

    /// # Errors
    ///
    /// Returns "Auth not configured" without a provider, otherwise the
    /// provider's error.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        let provider = self.provider.as_ref().ok_or_else(AuthError::not_configured)?;
        provider.sign_in_with_password(email, password).await
    }

    /// # Errors
    ///
    /// Returns "Auth not configured" without a provider, otherwise the
    /// provider's error.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let provider = self.provider.as_ref().ok_or_else(AuthError::not_configured)?;
        provider.sign_out().await
    }

    /// Current session. Without a provider this is `Ok(None)`, not an error.
    ///
    /// # Errors
    ///
    /// Returns the provider's error, e.g. when a due refresh is rejected.
    pub async fn get_session(&self) -> Result<Option<Session>, AuthError> {
        match &self.provider {
            Some(provider) => provider.get_session().await,
            None => Ok(None),
        }
    }

    /// The signed-in user, or `None` when there is none or it can't be known.
    pub async fn get_current_user(&self) -> Option<User> {
        let provider = self.provider.as_ref()?;
        match provider.get_user().await {
            Ok(user) => user,
            Err(e) => {
                tracing::debug!(error = %e, "current user lookup failed");
                None
            }
        }
    }

    /// Observe session transitions. Without a provider the returned token is
    /// inert and the listener is never called.
    pub fn on_auth_state_change(&self, listener: impl AuthStateListener + 'static) -> Subscription {
        match &self.provider {
            Some(provider) => provider.on_auth_state_change(Arc::new(listener)),
            None => Subscription::inert(),
        }
    }

    /// Adopt a session handed back in the page URL by an email link
    /// (sign-up confirmation or password reset). Hosts call this once with
    /// the URL the page was opened at. Without a provider this is
    /// `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns the error carried in the URL, or the provider's error when
    /// the token in the URL can't be verified.
    pub async fn detect_session_in_url(&self, url: &str) -> Result<Option<Session>, AuthError> {
        match &self.provider {
            Some(provider) => provider.detect_session_in_url(url).await,
            None => Ok(None),
        }
    }

    /// Ask the provider to email a reset link pointing at this site's
    /// `/reset-password` page.
    ///
    /// # Errors
    ///
    /// Returns "Auth not configured" without a provider, otherwise the
    /// provider's error.
    pub async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        let provider = self.provider.as_ref().ok_or_else(AuthError::not_configured)?;
        provider
            .reset_password_for_email(email, &self.reset_redirect())
            .await
    }

    #[must_use]
    pub fn reset_redirect(&self) -> String {
        format!("{}{RESET_PASSWORD_PATH}", self.site_origin)
    }
}

impl std::fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClient")
            .field("configured", &self.is_configured())
            .field("site_origin", &self.site_origin)
            .finish()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn trim_origin(origin: &str) -> String {
    origin.trim_end_matches('/').to_owned()
}


#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
