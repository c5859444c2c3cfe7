//! String key/value storage with browser `Storage` semantics.
//!
//! DESIGN
//! ======
//! Pages hand data to each other through tab-scoped storage, and the auth
//! client keeps its persisted session in the same kind of store. Both talk
//! to the [`Storage`] trait so a host can back it with `sessionStorage`,
//! `localStorage`, or (in tests and the native build) [`MemoryStorage`].

use std::collections::HashMap;
use std::sync::Mutex;

pub trait Storage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str);
    fn remove_item(&self, key: &str);
}

/// Process-local storage. Contents live as long as the value does, which is
/// the native equivalent of a browser tab's lifetime.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn items(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map.
        self.items.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        self.items().insert(key.to_owned(), value.to_owned());
    }

    fn remove_item(&self, key: &str) {
        self.items().remove(key);
    }
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;
