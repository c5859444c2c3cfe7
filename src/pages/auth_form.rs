//! Sign-in / register form.
//!
//! DESIGN
//! ======
//! All mutable form state lives in [`FormState`]; what the page shows is
//! derived from it by [`render`]. The state sits behind a shared lock, so the
//! host can render the busy label while a submission is still awaiting the
//! provider. A submission validates locally, makes one provider call, and
//! always ends with the submit control enabled again, even if the flow
//! panics.

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::FutureExt;

use super::Navigator;
use crate::auth::AuthClient;
use crate::validation::{is_valid_email, validate_password};

/// Pause between a successful sign-in message and leaving the page.
pub const REDIRECT_DELAY: Duration = Duration::from_millis(1500);
pub const HOME_PATH: &str = "/";

const MSG_EMPTY_FIELDS: &str = "Please fill in all fields";
const MSG_INVALID_EMAIL: &str = "Please enter a valid email address";
const MSG_SIGN_IN_OK: &str = "Login successful! Redirecting...";
const MSG_SIGN_UP_OK: &str = "Account created! Check your email to verify.";
const MSG_SIGN_IN_FAILED: &str = "Login failed";
const MSG_SIGN_UP_FAILED: &str = "Registration failed";
const MSG_UNEXPECTED: &str = "An unexpected error occurred";

// =============================================================================
// STATE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormMode {
    SignIn,
    #[default]
    SignUp,
}

impl FormMode {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::SignIn => Self::SignUp,
            Self::SignUp => Self::SignIn,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Error,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormMessage {
    pub text: String,
    pub kind: MessageKind,
}

impl FormMessage {
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self { text: text.into(), kind: MessageKind::Error }
    }

    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self { text: text.into(), kind: MessageKind::Success }
    }

    /// CSS class list of the message element.
    #[must_use]
    pub fn class_name(&self) -> &'static str {
        match self.kind {
            MessageKind::Error => "form-message error",
            MessageKind::Success => "form-message success",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub mode: FormMode,
    /// `None` means the message element is hidden and empty.
    pub message: Option<FormMessage>,
    /// A submission is in flight; the submit control is disabled.
    pub busy: bool,
}

// =============================================================================
// RENDER
// =============================================================================

/// Everything the form shows, derived from [`FormState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub submit_label: &'static str,
    pub submit_disabled: bool,
    pub toggle_text: &'static str,
    pub toggle_link: &'static str,
    /// `autocomplete` hint of the password field.
    pub password_autocomplete: &'static str,
    pub message: Option<FormMessage>,
}

#[must_use]
pub fn render(state: &FormState) -> FormView {
    let (title, subtitle, toggle_text, toggle_link, password_autocomplete) = match state.mode {
        FormMode::SignIn => (
            "Welcome Back",
            "Sign in to continue your journey",
            "Don't have an account? ",
            "Register",
            "current-password",
        ),
        FormMode::SignUp => (
            "Create Account",
            "Begin your journey with Innerlight",
            "Already have an account? ",
            "Sign In",
            "new-password",
        ),
    };
    let submit_label = match (state.mode, state.busy) {
        (FormMode::SignIn, false) => "Sign In",
        (FormMode::SignIn, true) => "Signing in...",
        (FormMode::SignUp, false) => "Register",
        (FormMode::SignUp, true) => "Creating account...",
    };
    FormView {
        title,
        subtitle,
        submit_label,
        submit_disabled: state.busy,
        toggle_text,
        toggle_link,
        password_autocomplete,
        message: state.message.clone(),
    }
}

// =============================================================================
// CONTROLLER
// =============================================================================

/// How a call to [`AuthForm::submit`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A submission was already in flight.
    Ignored,
    /// Local validation failed; the provider was not called.
    Rejected,
    /// The provider reported an error.
    Failed,
    /// Signed in; navigation home is scheduled.
    SignedIn,
    /// Account created; confirmation email pending.
    SignedUp,
    /// The flow panicked and was contained.
    Crashed,
}

#[derive(Clone)]
pub struct AuthForm {
    state: Arc<Mutex<FormState>>,
    auth: AuthClient,
    navigator: Arc<dyn Navigator>,
}

impl AuthForm {
    #[must_use]
    pub fn new(auth: AuthClient, navigator: Arc<dyn Navigator>) -> Self {
        Self { state: Arc::default(), auth, navigator }
    }

    fn lock(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> FormState {
        self.lock().clone()
    }

    #[must_use]
    pub fn view(&self) -> FormView {
        render(&self.lock())
    }

    /// Switch between sign-in and register.
    pub fn toggle_mode(&self) {
        let mut state = self.lock();
        state.mode = state.mode.toggled();
        state.message = None;
    }

    pub fn show_message(&self, message: FormMessage) {
        self.lock().message = Some(message);
    }

    pub fn clear_message(&self) {
        self.lock().message = None;
    }

    /// Run the submission protocol. The email is trimmed; the password is
    /// used exactly as typed. A submit while another is in flight is
    /// ignored.
    pub async fn submit(&self, email: &str, password: &str) -> SubmitOutcome {
        let email = email.trim();
        let mode = {
            let mut state = self.lock();
            if state.busy {
                return SubmitOutcome::Ignored;
            }
            if let Err(reason) = check_credentials(state.mode, email, password) {
                state.message = Some(FormMessage::error(reason));
                return SubmitOutcome::Rejected;
            }
            state.busy = true;
            state.mode
        };

        let attempt = AssertUnwindSafe(self.attempt(mode, email, password))
            .catch_unwind()
            .await;
        let outcome = attempt.unwrap_or_else(|panic| {
            tracing::error!(panic = panic_message(panic.as_ref()), ?mode, "auth submit failed unexpectedly");
            self.show_message(FormMessage::error(MSG_UNEXPECTED));
            SubmitOutcome::Crashed
        });
        self.lock().busy = false;
        outcome
    }

    async fn attempt(&self, mode: FormMode, email: &str, password: &str) -> SubmitOutcome {
        match mode {
            FormMode::SignIn => match self.auth.sign_in(email, password).await {
                Ok(_) => {
                    self.show_message(FormMessage::success(MSG_SIGN_IN_OK));
                    self.schedule_redirect();
                    SubmitOutcome::SignedIn
                }
                Err(e) => {
                    tracing::info!(error = %e, status = ?e.status, "sign-in rejected");
                    self.show_message(FormMessage::error(or_fallback(e.message, MSG_SIGN_IN_FAILED)));
                    SubmitOutcome::Failed
                }
            },
            FormMode::SignUp => match self.auth.sign_up(email, password).await {
                Ok(_) => {
                    self.show_message(FormMessage::success(MSG_SIGN_UP_OK));
                    SubmitOutcome::SignedUp
                }
                Err(e) => {
                    tracing::info!(error = %e, status = ?e.status, "sign-up rejected");
                    self.show_message(FormMessage::error(or_fallback(e.message, MSG_SIGN_UP_FAILED)));
                    SubmitOutcome::Failed
                }
            },
        }
    }

    fn schedule_redirect(&self) {
        let navigator = Arc::clone(&self.navigator);
        tokio::spawn(async move {
            tokio::time::sleep(REDIRECT_DELAY).await;
            navigator.navigate(HOME_PATH);
        });
    }
}

/// Local checks, in order: both fields present, email shape, and (when
/// registering) password strength.
fn check_credentials(mode: FormMode, email: &str, password: &str) -> Result<(), &'static str> {
    if email.is_empty() || password.is_empty() {
        return Err(MSG_EMPTY_FIELDS);
    }
    if !is_valid_email(email) {
        return Err(MSG_INVALID_EMAIL);
    }
    if mode == FormMode::SignUp {
        let check = validate_password(password);
        if !check.valid {
            return Err(check.message);
        }
    }
    Ok(())
}

fn or_fallback(message: String, fallback: &str) -> String {
    if message.is_empty() { fallback.to_owned() } else { message }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
#[path = "auth_form_test.rs"]
mod tests;
