use super::*;
use crate::auth::test_helpers::{MockProvider, dummy_user};
use crate::storage::MemoryStorage;

fn disabled_auth() -> AuthClient {
    AuthClient::disabled("https://innerlight.test")
}

fn seeded_storage(line: &str) -> MemoryStorage {
    let storage = MemoryStorage::new();
    storage.set_item(ONE_LINE_KEY, line);
    storage
}

// =============================================================================
// initial_response
// =============================================================================

#[test]
fn initial_response_pain_branch() {
    assert!(initial_response("I'm so SAD lately").starts_with("I hear you."));
    assert!(initial_response("it hurts").starts_with("I hear you."));
}

#[test]
fn initial_response_anxious_branch() {
    assert_eq!(
        initial_response("I feel anxious today"),
        "Anxiety can feel overwhelming. You're safe here. What's weighing on your heart?"
    );
}

#[test]
fn initial_response_joy_branch() {
    assert!(initial_response("Feeling grateful").starts_with("It's beautiful"));
}

#[test]
fn initial_response_earlier_group_wins() {
    // Both "sad" and "happy" present: the pain group is checked first.
    assert!(initial_response("happy but sad").starts_with("I hear you."));
}

#[test]
fn initial_response_default() {
    assert!(initial_response("just a day").starts_with("Thank you for sharing"));
}

#[test]
fn initial_response_empty() {
    assert!(initial_response("").starts_with("Sometimes silence"));
}

#[test]
fn placeholder_response_is_from_fixed_list() {
    let mut rng = rand::rng();
    for _ in 0..50 {
        assert!(PLACEHOLDER_REPLIES.contains(&placeholder_response(&mut rng)));
    }
}

#[test]
fn role_classes() {
    assert_eq!(ChatRole::User.class_name(), "message user");
    assert_eq!(ChatRole::Assistant.class_name(), "message assistant");
}

// =============================================================================
// load
// =============================================================================

#[tokio::test(start_paused = true)]
async fn load_consumes_landing_line_and_replies_later() {
    let storage = seeded_storage("I feel anxious today");
    let page = ChatPage::load(&storage, &disabled_auth()).await;

    assert_eq!(page.messages(), vec![ChatMessage::user("I feel anxious today")]);
    assert!(storage.get_item(ONE_LINE_KEY).is_none());

    tokio::time::sleep(REPLY_DELAY + Duration::from_millis(10)).await;
    assert_eq!(
        page.messages(),
        vec![
            ChatMessage::user("I feel anxious today"),
            ChatMessage::assistant("Anxiety can feel overwhelming. You're safe here. What's weighing on your heart?"),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn load_without_line_shows_welcome_only() {
    let storage = MemoryStorage::new();
    let page = ChatPage::load(&storage, &disabled_auth()).await;

    tokio::time::sleep(REPLY_DELAY * 2).await;
    assert_eq!(page.messages(), vec![ChatMessage::assistant(WELCOME)]);
}

#[tokio::test(start_paused = true)]
async fn load_with_empty_line_shows_welcome_and_leaves_it() {
    let storage = seeded_storage("");
    let page = ChatPage::load(&storage, &disabled_auth()).await;

    tokio::time::sleep(REPLY_DELAY * 2).await;
    assert_eq!(page.messages(), vec![ChatMessage::assistant(WELCOME)]);
    assert_eq!(storage.get_item(ONE_LINE_KEY).as_deref(), Some(""));
}

#[tokio::test]
async fn load_asks_auth_for_current_user() {
    let provider = Arc::new(MockProvider::default());
    *provider.user.lock().unwrap() = Some(dummy_user());
    let auth = AuthClient::with_provider(provider.clone(), "https://innerlight.test");

    let _page = ChatPage::load(&MemoryStorage::new(), &auth).await;
    assert_eq!(provider.call_count(), 1);
}

// =============================================================================
// send / key_down
// =============================================================================

#[tokio::test(start_paused = true)]
async fn send_appends_trimmed_text_and_a_reply() {
    let mut page = ChatPage::load(&MemoryStorage::new(), &disabled_auth()).await;
    page.set_input("  hello there  ");

    assert!(page.send());
    assert_eq!(page.input(), "");
    assert_eq!(page.messages().last(), Some(&ChatMessage::user("hello there")));
    assert_eq!(page.log().len(), 2);

    tokio::time::sleep(REPLY_DELAY + Duration::from_millis(10)).await;
    let messages = page.messages();
    assert_eq!(messages.len(), 3);
    let reply = messages.last().unwrap();
    assert_eq!(reply.role, ChatRole::Assistant);
    assert!(PLACEHOLDER_REPLIES.contains(&reply.text.as_str()));
}

#[tokio::test(start_paused = true)]
async fn send_blank_input_is_noop() {
    let mut page = ChatPage::load(&MemoryStorage::new(), &disabled_auth()).await;
    page.set_input("   ");

    assert!(!page.send());
    tokio::time::sleep(REPLY_DELAY * 2).await;
    assert_eq!(page.messages().len(), 1);
    assert_eq!(page.input(), "   ");
}

#[tokio::test(start_paused = true)]
async fn enter_sends_shift_enter_does_not() {
    let mut page = ChatPage::load(&MemoryStorage::new(), &disabled_auth()).await;
    page.set_input("line one");

    assert!(!page.key_down("Enter", true));
    assert_eq!(page.log().len(), 1);

    assert!(!page.key_down("a", false));
    assert_eq!(page.log().len(), 1);

    assert!(page.key_down("Enter", false));
    assert_eq!(page.log().len(), 2);
}
