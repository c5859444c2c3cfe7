//! Landing page: one line of text, then on to the chat.

use std::sync::Arc;

use super::Navigator;
use super::chat::ONE_LINE_KEY;
use crate::storage::Storage;

pub const CHAT_PATH: &str = "/pages/chat.html";

pub struct LandingPage {
    input: String,
    storage: Arc<dyn Storage>,
    navigator: Arc<dyn Navigator>,
}

impl LandingPage {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, navigator: Arc<dyn Navigator>) -> Self {
        Self { input: String::new(), storage, navigator }
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Hand the trimmed line to the chat page and go there. An empty line is
    /// stored too; the chat page decides what to do with it.
    pub fn go(&self) {
        let line = self.input.trim();
        self.storage.set_item(ONE_LINE_KEY, line);
        tracing::debug!(chars = line.chars().count(), "continuing to chat");
        self.navigator.navigate(CHAT_PATH);
    }

    /// Enter in the landing input continues.
    pub fn key_down(&self, key: &str) {
        if key == "Enter" {
            self.go();
        }
    }
}

#[cfg(test)]
#[path = "landing_test.rs"]
mod tests;
