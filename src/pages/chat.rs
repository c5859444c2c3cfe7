//! Chat page: message list with canned assistant replies.
//!
//! Replies are placeholders until a real response backend exists. Each one
//! is appended by a spawned task after [`REPLY_DELAY`], so the log is shared
//! between the page and those tasks.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rand::Rng;

use crate::auth::AuthClient;
use crate::storage::Storage;

/// Tab storage key the landing page leaves its one line under.
pub const ONE_LINE_KEY: &str = "innerlight_one_line";
pub const REPLY_DELAY: Duration = Duration::from_secs(1);

pub const WELCOME: &str = "Welcome. I'm here to listen, whenever you're ready to share.";
const SILENCE_REPLY: &str = "Sometimes silence speaks its own truth. I'm here whenever you need.";
const DEFAULT_REPLY: &str =
    "Thank you for sharing that with me. I'm listening. Would you like to explore this feeling together?";

/// Keyword groups checked in order; the first group with a hit picks the reply.
const MOOD_REPLIES: &[(&[&str], &str)] = &[
    (
        &["sad", "hurt", "pain"],
        "I hear you. Pain has a way of making everything feel heavy. Would you like to tell me more about what you're experiencing?",
    ),
    (
        &["anxious", "worried", "scared"],
        "Anxiety can feel overwhelming. You're safe here. What's weighing on your heart?",
    ),
    (
        &["happy", "grateful", "blessed"],
        "It's beautiful that you can recognize these moments of light. What's bringing you joy today?",
    ),
];

pub const PLACEHOLDER_REPLIES: [&str; 5] = [
    "I'm here with you. Take your time.",
    "That sounds meaningful. Would you like to share more?",
    "Sometimes the hardest part is just being present with our feelings.",
    "You're not alone in this journey.",
    "Every step forward, no matter how small, is still progress.",
];

// =============================================================================
// MESSAGES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    /// CSS class of a message bubble.
    #[must_use]
    pub fn class_name(self) -> &'static str {
        match self {
            Self::User => "message user",
            Self::Assistant => "message assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub text: String,
    pub role: ChatRole,
}

impl ChatMessage {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self { text: text.into(), role: ChatRole::User }
    }

    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self { text: text.into(), role: ChatRole::Assistant }
    }
}

/// Ordered, append-only message list shared with pending reply tasks.
#[derive(Debug, Clone, Default)]
pub struct ChatLog {
    messages: Arc<Mutex<Vec<ChatMessage>>>,
}

impl ChatLog {
    pub fn push(&self, message: ChatMessage) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// PAGE
// =============================================================================

pub struct ChatPage {
    log: ChatLog,
    input: String,
}

impl ChatPage {
    /// Open the chat page.
    ///
    /// A non-empty line left by the landing page is consumed from `storage`
    /// and answered. Otherwise the page opens with a welcome message and an
    /// empty line stays where it is. Must run
    /// inside a Tokio runtime, which carries the delayed reply.
    pub async fn load(storage: &dyn Storage, auth: &AuthClient) -> Self {
        let user = auth.get_current_user().await;
        tracing::debug!(user = ?user.as_ref().map(|u| u.id.as_str()), "chat page loaded");

        let page = Self { log: ChatLog::default(), input: String::new() };
        match storage.get_item(ONE_LINE_KEY).filter(|line| !line.is_empty()) {
            Some(line) => {
                storage.remove_item(ONE_LINE_KEY);
                let reply = initial_response(&line);
                page.log.push(ChatMessage::user(line));
                page.reply_later(reply);
            }
            None => page.log.push(ChatMessage::assistant(WELCOME)),
        }
        page
    }

    #[must_use]
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.log.snapshot()
    }

    #[must_use]
    pub fn log(&self) -> &ChatLog {
        &self.log
    }

    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Send the current input. Returns `false` when there was nothing to send.
    pub fn send(&mut self) -> bool {
        let text = self.input.trim();
        if text.is_empty() {
            return false;
        }
        self.log.push(ChatMessage::user(text));
        self.input.clear();
        self.reply_later(placeholder_response(&mut rand::rng()));
        true
    }

    /// Keyboard handler for the chat input. Enter sends, Shift+Enter does
    /// not. Returns whether the default key action should be suppressed.
    pub fn key_down(&mut self, key: &str, shift: bool) -> bool {
        if key == "Enter" && !shift {
            self.send();
            return true;
        }
        false
    }

    fn reply_later(&self, text: &'static str) {
        let log = self.log.clone();
        tokio::spawn(async move {
            tokio::time::sleep(REPLY_DELAY).await;
            log.push(ChatMessage::assistant(text));
        });
    }
}

// =============================================================================
// CANNED REPLIES
// =============================================================================

/// Reply to the landing page's line, picked by mood keywords.
#[must_use]
pub fn initial_response(message: &str) -> &'static str {
    if message.is_empty() {
        return SILENCE_REPLY;
    }
    let message = message.to_lowercase();
    MOOD_REPLIES
        .iter()
        .find(|(words, _)| words.iter().any(|w| message.contains(*w)))
        .map_or(DEFAULT_REPLY, |&(_, reply)| reply)
}

/// One of [`PLACEHOLDER_REPLIES`], uniformly at random.
pub fn placeholder_response(rng: &mut impl Rng) -> &'static str {
    PLACEHOLDER_REPLIES[rng.random_range(0..PLACEHOLDER_REPLIES.len())]
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
