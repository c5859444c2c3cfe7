//! Supabase Auth (GoTrue) REST client.
//!
//! DESIGN
//! ======
//! Talks to the `/auth/v1/...` endpoints with `reqwest`. The client owns the
//! current session and mirrors the browser SDK behaviors the site relies on:
//!
//! - sessions are persisted to a [`Storage`] and restored on construction
//! - a background ticker refreshes sessions that are about to expire
//! - a session handed back in a redirect URL fragment can be adopted
//! - every session transition is broadcast to registered listeners
//!
//! Each operation makes exactly one request (a refresh may precede it) and
//! reports the outcome; nothing is retried.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use reqwest::{Method, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

use super::listeners::{AuthStateListener, ListenerSet, Subscription};
use super::provider::AuthProvider;
use super::types::{AuthError, AuthEvent, AuthResponse, Session, User};
use crate::storage::Storage;

pub const AUTO_REFRESH_TICK: Duration = Duration::from_secs(30);
/// A session is refreshed once it expires within this many ticks.
const AUTO_REFRESH_TICK_THRESHOLD: i64 = 3;
const EXPIRY_MARGIN_SECS: i64 = 90;
const REQUEST_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Behavior switches, named after the browser SDK's `auth` options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoTrueOptions {
    pub auto_refresh_token: bool,
    pub persist_session: bool,
    pub detect_session_in_url: bool,
}

impl Default for GoTrueOptions {
    fn default() -> Self {
        Self { auto_refresh_token: true, persist_session: true, detect_session_in_url: true }
    }
}

pub struct GoTrueClient {
    http: reqwest::Client,
    auth_url: String,
    api_key: String,
    options: GoTrueOptions,
    storage: Arc<dyn Storage>,
    storage_key: String,
    session: Mutex<Option<Session>>,
    listeners: ListenerSet,
}

impl GoTrueClient {
    /// Build a client for the project at `supabase_url`.
    ///
    /// When sessions are persisted, a session previously saved in `storage`
    /// is restored here.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not parse or the HTTP client fails
    /// to build.
    pub fn new(
        supabase_url: &str,
        api_key: &str,
        options: GoTrueOptions,
        storage: Arc<dyn Storage>,
    ) -> Result<Self, AuthError> {
        let base = supabase_url.trim_end_matches('/');
        let parsed = Url::parse(base).map_err(|e| AuthError::new(format!("invalid Supabase URL: {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| AuthError::new(format!("HTTP client build failed: {e}")))?;

        let client = Self {
            http,
            auth_url: format!("{base}/auth/v1"),
            api_key: api_key.to_owned(),
            options,
            storage,
            storage_key: storage_key_for(&parsed),
            session: Mutex::new(None),
            listeners: ListenerSet::new(),
        };
        if options.persist_session {
            client.restore_session();
        }
        Ok(client)
    }

    /// Storage key of the persisted session, `sb-<project ref>-auth-token`.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    #[must_use]
    pub fn options(&self) -> GoTrueOptions {
        self.options
    }

    /// Spawn the auto-refresh ticker on the current Tokio runtime.
    ///
    /// Returns `None` when auto-refresh is disabled or no runtime is running.
    /// The task ends by itself once the client is dropped.
    pub fn start_auto_refresh(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if !self.options.auto_refresh_token {
            return None;
        }
        let runtime = tokio::runtime::Handle::try_current().ok()?;
        let client = Arc::downgrade(self);
        Some(runtime.spawn(async move {
            let mut ticker = tokio::time::interval(AUTO_REFRESH_TICK);
            loop {
                ticker.tick().await;
                let Some(client) = client.upgrade() else {
                    break;
                };
                client.auto_refresh_tick().await;
            }
        }))
    }

    async fn auto_refresh_tick(&self) {
        let Some(session) = self.current_session() else {
            return;
        };
        let margin = AUTO_REFRESH_TICK_THRESHOLD * duration_secs(AUTO_REFRESH_TICK);
        if !session.expires_within(now_unix(), margin) {
            return;
        }
        if let Err(e) = self.refresh_session(&session.refresh_token).await {
            tracing::warn!(error = %e, "auto-refresh failed");
        }
    }

    // =========================================================================
    // SESSION SLOT
    // =========================================================================

    fn current_session(&self) -> Option<Session> {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store_session(&self, session: Option<Session>) {
        if self.options.persist_session {
            match &session {
                Some(s) => match serde_json::to_string(s) {
                    Ok(raw) => self.storage.set_item(&self.storage_key, &raw),
                    Err(e) => tracing::warn!(error = %e, "session not persisted"),
                },
                None => self.storage.remove_item(&self.storage_key),
            }
        }
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = session;
    }

    fn restore_session(&self) {
        let Some(raw) = self.storage.get_item(&self.storage_key) else {
            return;
        };
        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => {
                tracing::debug!(key = %self.storage_key, "restored persisted session");
                *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Some(session);
            }
            Err(e) => {
                tracing::warn!(key = %self.storage_key, error = %e, "discarding unreadable persisted session");
                self.storage.remove_item(&self.storage_key);
            }
        }
    }

    fn adopt(&self, session: Session) -> Session {
        let session = session.stamped(now_unix());
        self.store_session(Some(session.clone()));
        self.listeners.emit(AuthEvent::SignedIn, Some(&session));
        session
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AuthError> {
        let result: Result<Session, AuthError> = self
            .request(
                Method::POST,
                &self.endpoint("/token?grant_type=refresh_token"),
                None,
                Some(json!({ "refresh_token": refresh_token })),
            )
            .await;
        match result {
            Ok(session) => {
                let session = session.stamped(now_unix());
                self.store_session(Some(session.clone()));
                self.listeners.emit(AuthEvent::TokenRefreshed, Some(&session));
                Ok(session)
            }
            Err(e) => {
                // Only a 4xx means the refresh token was rejected and the
                // session is gone. Outages and transport failures keep it for
                // the next attempt.
                if is_rejection(&e) {
                    self.store_session(None);
                    self.listeners.emit(AuthEvent::SignedOut, None);
                }
                Err(e)
            }
        }
    }

    // =========================================================================
    // HTTP
    // =========================================================================

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.auth_url, path)
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> Result<T, AuthError> {
        let text = self.send(method, url, bearer, body).await?;
        serde_json::from_str(&text).map_err(|e| AuthError::new(format!("unexpected auth response: {e}")))
    }

    async fn send(&self, method: Method, url: &str, bearer: Option<&str>, body: Option<Value>) -> Result<String, AuthError> {
        let mut request = self
            .http
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(bearer.unwrap_or(self.api_key.as_str()));
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AuthError::new(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| AuthError::new(e.to_string()).with_status(status))?;

        if !(200..300).contains(&status) {
            tracing::debug!(%status, url, "auth request rejected");
            return Err(parse_error_body(status, &text));
        }
        Ok(text)
    }
}

#[async_trait::async_trait]
impl AuthProvider for GoTrueClient {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        let body: Value = self
            .request(
                Method::POST,
                &self.endpoint("/signup"),
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await?;

        // With email confirmation on, GoTrue answers with the bare user.
        if body.get("access_token").is_some() {
            let session: Session = serde_json::from_value(body)
                .map_err(|e| AuthError::new(format!("unexpected auth response: {e}")))?;
            let session = self.adopt(session);
            return Ok(AuthResponse { user: session.user.clone(), session: Some(session) });
        }
        let user: User =
            serde_json::from_value(body).map_err(|e| AuthError::new(format!("unexpected auth response: {e}")))?;
        Ok(AuthResponse { user: Some(user), session: None })
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        let session: Session = self
            .request(
                Method::POST,
                &self.endpoint("/token?grant_type=password"),
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await?;
        let session = self.adopt(session);
        Ok(AuthResponse { user: session.user.clone(), session: Some(session) })
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let Some(session) = self.current_session() else {
            return Ok(());
        };
        let result = self
            .send(Method::POST, &self.endpoint("/logout"), Some(session.access_token.as_str()), None)
            .await;
        match result {
            Ok(_) => {}
            // Already signed out on the provider side.
            Err(e) if matches!(e.status, Some(401 | 403 | 404)) => {
                tracing::debug!(error = %e, "remote session already gone");
            }
            Err(e) => return Err(e),
        }
        self.store_session(None);
        self.listeners.emit(AuthEvent::SignedOut, None);
        Ok(())
    }

    async fn get_session(&self) -> Result<Option<Session>, AuthError> {
        let Some(session) = self.current_session() else {
            return Ok(None);
        };
        if session.expires_within(now_unix(), EXPIRY_MARGIN_SECS) {
            return self.refresh_session(&session.refresh_token).await.map(Some);
        }
        Ok(Some(session))
    }

    async fn get_user(&self) -> Result<Option<User>, AuthError> {
        let Some(session) = self.get_session().await? else {
            return Ok(None);
        };
        let user = self
            .request(Method::GET, &self.endpoint("/user"), Some(session.access_token.as_str()), None)
            .await?;
        Ok(Some(user))
    }

    async fn reset_password_for_email(&self, email: &str, redirect_to: &str) -> Result<(), AuthError> {
        let url = Url::parse_with_params(&self.endpoint("/recover"), &[("redirect_to", redirect_to)])
            .map_err(|e| AuthError::new(format!("invalid redirect: {e}")))?;
        self.send(Method::POST, url.as_str(), None, Some(json!({ "email": email })))
            .await?;
        Ok(())
    }

    async fn detect_session_in_url(&self, url: &str) -> Result<Option<Session>, AuthError> {
        if !self.options.detect_session_in_url {
            return Ok(None);
        }
        let params = UrlSessionParams::parse(url)?;
        if let Some(description) = params.error_description {
            let mut err = AuthError::new(description);
            err.code = params.error_code;
            return Err(err);
        }
        let Some(access_token) = params.access_token else {
            return Ok(None);
        };
        let (Some(refresh_token), Some(expires_in)) = (params.refresh_token, params.expires_in) else {
            return Err(AuthError::new("Incomplete session in URL"));
        };

        let user: User = self
            .request(Method::GET, &self.endpoint("/user"), Some(access_token.as_str()), None)
            .await?;
        let session = Session {
            access_token,
            refresh_token,
            token_type: params.token_type.unwrap_or_else(|| "bearer".into()),
            expires_in,
            expires_at: params.expires_at,
            user: Some(user),
        }
        .stamped(now_unix());

        let event = if params.kind.as_deref() == Some("recovery") {
            AuthEvent::PasswordRecovery
        } else {
            AuthEvent::SignedIn
        };
        self.store_session(Some(session.clone()));
        self.listeners.emit(event, Some(&session));
        Ok(Some(session))
    }

    fn on_auth_state_change(&self, listener: Arc<dyn AuthStateListener>) -> Subscription {
        let subscription = self.listeners.subscribe(Arc::clone(&listener));
        let session = self.current_session();
        listener.on_auth_state_change(AuthEvent::InitialSession, session.as_ref());
        subscription
    }
}

// =============================================================================
// HELPERS
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
    error_code: Option<String>,
}

/// Map a GoTrue error response to an [`AuthError`].
///
/// GoTrue has used several body shapes over time; the first non-empty of
/// `msg`, `message`, `error_description`, `error` wins. An unreadable body
/// yields an empty message.
fn parse_error_body(status: u16, body: &str) -> AuthError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = [parsed.msg, parsed.message, parsed.error_description, parsed.error]
        .into_iter()
        .flatten()
        .find(|m| !m.is_empty())
        .unwrap_or_default();
    AuthError { message, status: Some(status), code: parsed.error_code }
}

#[derive(Debug, Default)]
struct UrlSessionParams {
    access_token: Option<String>,
    refresh_token: Option<String>,
    token_type: Option<String>,
    expires_in: Option<i64>,
    expires_at: Option<i64>,
    kind: Option<String>,
    error_description: Option<String>,
    error_code: Option<String>,
}

impl UrlSessionParams {
    /// Read session parameters from the fragment, and errors from either the
    /// fragment or the query string.
    fn parse(raw: &str) -> Result<Self, AuthError> {
        let url = Url::parse(raw).map_err(|e| AuthError::new(format!("invalid URL: {e}")))?;
        let mut params = Self::default();

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "error_description" => params.error_description = Some(value.into_owned()),
                "error_code" => params.error_code = Some(value.into_owned()),
                _ => {}
            }
        }

        let Some(fragment) = url.fragment() else {
            return Ok(params);
        };
        // Reuse the query decoder for the fragment's `k=v&k=v` payload.
        let mut as_query = url.clone();
        as_query.set_fragment(None);
        as_query.set_query(Some(fragment));
        for (key, value) in as_query.query_pairs() {
            let value = value.into_owned();
            match key.as_ref() {
                "access_token" => params.access_token = Some(value),
                "refresh_token" => params.refresh_token = Some(value),
                "token_type" => params.token_type = Some(value),
                "expires_in" => params.expires_in = value.parse().ok(),
                "expires_at" => params.expires_at = value.parse().ok(),
                "type" => params.kind = Some(value),
                "error_description" => params.error_description = Some(value),
                "error_code" => params.error_code = Some(value),
                _ => {}
            }
        }
        Ok(params)
    }
}

/// `sb-<first host label>-auth-token`, matching the browser SDK's key.
fn storage_key_for(url: &Url) -> String {
    let project_ref = url
        .host_str()
        .and_then(|host| host.split('.').next())
        .unwrap_or("local");
    format!("sb-{project_ref}-auth-token")
}

fn is_rejection(err: &AuthError) -> bool {
    matches!(err.status, Some(400..=499))
}

fn now_unix() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

fn duration_secs(d: Duration) -> i64 {
    i64::try_from(d.as_secs()).unwrap_or(i64::MAX)
}

#[cfg(test)]
#[path = "gotrue_test.rs"]
mod tests;
