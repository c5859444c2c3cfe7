use super::*;
use crate::auth::test_helpers::MockProvider;
use crate::auth::{AuthError, AuthResponse};
use crate::pages::test_helpers::RecordingNavigator;

fn form_with(provider: &Arc<MockProvider>, navigator: &Arc<RecordingNavigator>) -> AuthForm {
    let auth = AuthClient::with_provider(provider.clone(), "https://innerlight.test");
    AuthForm::new(auth, navigator.clone())
}

fn sign_in_form(provider: &Arc<MockProvider>, navigator: &Arc<RecordingNavigator>) -> AuthForm {
    let form = form_with(provider, navigator);
    form.toggle_mode();
    assert_eq!(form.state().mode, FormMode::SignIn);
    form
}

// =============================================================================
// render / toggle
// =============================================================================

#[test]
fn initial_mode_is_sign_up() {
    let view = render(&FormState::default());
    assert_eq!(view.title, "Create Account");
    assert_eq!(view.subtitle, "Begin your journey with Innerlight");
    assert_eq!(view.submit_label, "Register");
    assert_eq!(view.toggle_text, "Already have an account? ");
    assert_eq!(view.toggle_link, "Sign In");
    assert_eq!(view.password_autocomplete, "new-password");
    assert!(!view.submit_disabled);
    assert!(view.message.is_none());
}

#[test]
fn sign_in_labels() {
    let view = render(&FormState { mode: FormMode::SignIn, ..FormState::default() });
    assert_eq!(view.title, "Welcome Back");
    assert_eq!(view.subtitle, "Sign in to continue your journey");
    assert_eq!(view.submit_label, "Sign In");
    assert_eq!(view.toggle_text, "Don't have an account? ");
    assert_eq!(view.toggle_link, "Register");
    assert_eq!(view.password_autocomplete, "current-password");
}

#[test]
fn busy_labels_disable_submit() {
    let view = render(&FormState { mode: FormMode::SignIn, busy: true, message: None });
    assert_eq!(view.submit_label, "Signing in...");
    assert!(view.submit_disabled);
    let view = render(&FormState { mode: FormMode::SignUp, busy: true, message: None });
    assert_eq!(view.submit_label, "Creating account...");
}

#[test]
fn toggle_twice_restores_labels() {
    let provider = Arc::new(MockProvider::default());
    let navigator = Arc::new(RecordingNavigator::default());
    let form = form_with(&provider, &navigator);
    let original = form.view();
    form.toggle_mode();
    assert_ne!(form.view(), original);
    form.toggle_mode();
    assert_eq!(form.view(), original);
}

#[test]
fn toggle_clears_message() {
    let provider = Arc::new(MockProvider::default());
    let navigator = Arc::new(RecordingNavigator::default());
    let form = form_with(&provider, &navigator);
    form.show_message(FormMessage::error("boom"));
    form.toggle_mode();
    assert!(form.view().message.is_none());
}

#[test]
fn new_message_replaces_old() {
    let provider = Arc::new(MockProvider::default());
    let navigator = Arc::new(RecordingNavigator::default());
    let form = form_with(&provider, &navigator);
    form.show_message(FormMessage::error("first"));
    form.show_message(FormMessage::success("second"));
    let message = form.view().message.unwrap();
    assert_eq!(message.text, "second");
    assert_eq!(message.class_name(), "form-message success");
}

// =============================================================================
// Validation guards
// =============================================================================

#[tokio::test]
async fn empty_fields_rejected_without_network() {
    let provider = Arc::new(MockProvider::default());
    let navigator = Arc::new(RecordingNavigator::default());
    let form = form_with(&provider, &navigator);

    let outcome = form.submit("", "").await;
    assert_eq!(outcome, SubmitOutcome::Rejected);
    assert_eq!(form.view().message, Some(FormMessage::error("Please fill in all fields")));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn whitespace_email_counts_as_empty() {
    let provider = Arc::new(MockProvider::default());
    let navigator = Arc::new(RecordingNavigator::default());
    let form = form_with(&provider, &navigator);

    form.submit("   ", "Valid123").await;
    assert_eq!(form.view().message.unwrap().text, "Please fill in all fields");
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn invalid_email_rejected_before_password_check() {
    let provider = Arc::new(MockProvider::default());
    let navigator = Arc::new(RecordingNavigator::default());
    let form = form_with(&provider, &navigator);

    let outcome = form.submit("bad-email", "Valid123").await;
    assert_eq!(outcome, SubmitOutcome::Rejected);
    let view = form.view();
    assert_eq!(view.message, Some(FormMessage::error("Please enter a valid email address")));
    assert!(!view.submit_disabled);
    assert_eq!(view.submit_label, "Register");
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn weak_password_rejected_when_registering() {
    let provider = Arc::new(MockProvider::default());
    let navigator = Arc::new(RecordingNavigator::default());
    let form = form_with(&provider, &navigator);

    form.submit("a@b.com", "alllowercase1").await;
    assert_eq!(form.view().message.unwrap().text, "Password must contain an uppercase letter");
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn weak_password_allowed_when_signing_in() {
    let provider = Arc::new(MockProvider::failing_sign_in("Invalid login credentials"));
    let navigator = Arc::new(RecordingNavigator::default());
    let form = sign_in_form(&provider, &navigator);

    form.submit("a@b.com", "x").await;
    assert_eq!(provider.call_count(), 1);
}

// =============================================================================
// Provider outcomes
// =============================================================================

#[tokio::test]
async fn sign_in_error_shows_provider_message() {
    let provider = Arc::new(MockProvider::failing_sign_in("Invalid login credentials"));
    let navigator = Arc::new(RecordingNavigator::default());
    let form = sign_in_form(&provider, &navigator);

    let outcome = form.submit("a@b.com", "x").await;
    assert_eq!(outcome, SubmitOutcome::Failed);
    let view = form.view();
    assert_eq!(view.message, Some(FormMessage::error("Invalid login credentials")));
    assert!(!view.submit_disabled);
    assert_eq!(view.submit_label, "Sign In");
}

#[tokio::test]
async fn sign_in_error_without_message_uses_fallback() {
    let provider = Arc::new(MockProvider::failing_sign_in(""));
    let navigator = Arc::new(RecordingNavigator::default());
    let form = sign_in_form(&provider, &navigator);

    form.submit("a@b.com", "x").await;
    assert_eq!(form.view().message.unwrap().text, "Login failed");
}

#[tokio::test]
async fn sign_up_error_without_message_uses_fallback() {
    let provider = Arc::new(MockProvider::default());
    *provider.sign_up_result.lock().unwrap() = Some(Err(AuthError::new("")));
    let navigator = Arc::new(RecordingNavigator::default());
    let form = form_with(&provider, &navigator);

    let outcome = form.submit("a@b.com", "Valid123pass").await;
    assert_eq!(outcome, SubmitOutcome::Failed);
    assert_eq!(form.view().message, Some(FormMessage::error("Registration failed")));
}

#[tokio::test]
async fn unconfigured_auth_shows_not_configured() {
    let navigator = Arc::new(RecordingNavigator::default());
    let form = AuthForm::new(AuthClient::disabled("https://innerlight.test"), navigator);

    let outcome = form.submit("a@b.com", "Valid123pass").await;
    assert_eq!(outcome, SubmitOutcome::Failed);
    assert_eq!(form.view().message, Some(FormMessage::error("Auth not configured")));
    assert!(!form.view().submit_disabled);
}

#[tokio::test]
async fn sign_up_success_stays_on_page() {
    let provider = Arc::new(MockProvider::default());
    *provider.sign_up_result.lock().unwrap() = Some(Ok(AuthResponse::default()));
    let navigator = Arc::new(RecordingNavigator::default());
    let form = form_with(&provider, &navigator);

    let outcome = form.submit("  a@b.com  ", "Valid123pass").await;
    assert_eq!(outcome, SubmitOutcome::SignedUp);
    assert_eq!(
        form.view().message,
        Some(FormMessage::success("Account created! Check your email to verify."))
    );
    assert_eq!(form.view().submit_label, "Register");

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(navigator.visits().is_empty());
}

#[tokio::test(start_paused = true)]
async fn sign_in_success_redirects_home_after_delay() {
    let provider = Arc::new(MockProvider::default());
    let navigator = Arc::new(RecordingNavigator::default());
    let form = sign_in_form(&provider, &navigator);

    let outcome = form.submit("a@b.com", "whatever").await;
    assert_eq!(outcome, SubmitOutcome::SignedIn);
    assert_eq!(
        form.view().message,
        Some(FormMessage::success("Login successful! Redirecting..."))
    );
    assert!(!form.view().submit_disabled);

    tokio::time::sleep(Duration::from_millis(1400)).await;
    assert!(navigator.visits().is_empty());
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(navigator.visits(), vec!["/".to_owned()]);
}

#[tokio::test]
async fn busy_state_is_visible_while_provider_pending() {
    let gate = Arc::new(tokio::sync::Notify::new());
    let provider = Arc::new(MockProvider::gated(&gate));
    let navigator = Arc::new(RecordingNavigator::default());
    let form = sign_in_form(&provider, &navigator);

    let (first, (mid_flight, second)) = tokio::join!(form.submit("a@b.com", "x"), async {
        tokio::task::yield_now().await;
        let view = form.view();
        let second = form.submit("a@b.com", "x").await;
        gate.notify_one();
        (view, second)
    });

    assert_eq!(mid_flight.submit_label, "Signing in...");
    assert!(mid_flight.submit_disabled);
    assert_eq!(second, SubmitOutcome::Ignored);
    assert_eq!(first, SubmitOutcome::SignedIn);
    assert_eq!(provider.call_count(), 1);

    let view = form.view();
    assert!(!view.submit_disabled);
    assert_eq!(view.submit_label, "Sign In");
}

#[tokio::test]
async fn host_clone_sees_same_state() {
    let gate = Arc::new(tokio::sync::Notify::new());
    let provider = Arc::new(MockProvider::gated(&gate));
    let navigator = Arc::new(RecordingNavigator::default());
    let form = form_with(&provider, &navigator);
    let host = form.clone();

    let (outcome, mid_flight) = tokio::join!(form.submit("a@b.com", "Valid123pass"), async {
        tokio::task::yield_now().await;
        let state = host.state();
        gate.notify_one();
        state
    });

    assert!(mid_flight.busy);
    assert_eq!(render(&mid_flight).submit_label, "Creating account...");
    assert_eq!(outcome, SubmitOutcome::SignedUp);
    assert!(!host.state().busy);
}

#[tokio::test]
async fn panic_in_provider_is_contained() {
    let provider = Arc::new(MockProvider::panicking());
    let navigator = Arc::new(RecordingNavigator::default());
    let form = sign_in_form(&provider, &navigator);

    let outcome = form.submit("a@b.com", "x").await;
    assert_eq!(outcome, SubmitOutcome::Crashed);
    let view = form.view();
    assert_eq!(view.message, Some(FormMessage::error("An unexpected error occurred")));
    assert!(!view.submit_disabled);
    assert_eq!(view.submit_label, "Sign In");
}

#[tokio::test]
async fn password_is_not_trimmed() {
    let provider = Arc::new(MockProvider::default());
    let navigator = Arc::new(RecordingNavigator::default());
    let form = form_with(&provider, &navigator);

    // Long enough only because of the surrounding spaces.
    let outcome = form.submit("a@b.com", " Abcd1 ").await;
    assert_eq!(outcome, SubmitOutcome::Rejected);
    let outcome = form.submit("a@b.com", "  Abcd1 ").await;
    assert_eq!(outcome, SubmitOutcome::SignedUp);
}

#[test]
fn panic_message_reads_string_payloads() {
    let boxed: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
    assert_eq!(panic_message(boxed.as_ref()), "owned");
    let boxed: Box<dyn std::any::Any + Send> = Box::new("static");
    assert_eq!(panic_message(boxed.as_ref()), "static");
    let boxed: Box<dyn std::any::Any + Send> = Box::new(7_u8);
    assert_eq!(panic_message(boxed.as_ref()), "non-string panic payload");
}
