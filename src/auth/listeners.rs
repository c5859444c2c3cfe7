//! Auth state observers.
//!
//! DESIGN
//! ======
//! Listeners are stored behind `Arc` in an id-keyed map. Registering returns
//! a [`Subscription`] token; consuming it with [`Subscription::unsubscribe`]
//! removes the listener, so a listener can only be removed once. Dispatch
//! snapshots the listener list before calling out, so a listener may
//! subscribe or unsubscribe from inside its callback.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use super::types::{AuthEvent, Session};

/// Receives every session transition observed by the provider.
pub trait AuthStateListener: Send + Sync {
    fn on_auth_state_change(&self, event: AuthEvent, session: Option<&Session>);
}

impl<F> AuthStateListener for F
where
    F: Fn(AuthEvent, Option<&Session>) + Send + Sync,
{
    fn on_auth_state_change(&self, event: AuthEvent, session: Option<&Session>) {
        self(event, session);
    }
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: BTreeMap<u64, Arc<dyn AuthStateListener>>,
}

/// Shared set of listeners owned by a provider.
#[derive(Clone, Default)]
pub struct ListenerSet {
    inner: Arc<Mutex<Registry>>,
}

impl ListenerSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registry> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a listener. Dropping the returned token keeps it registered.
    pub fn subscribe(&self, listener: Arc<dyn AuthStateListener>) -> Subscription {
        let mut registry = self.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.insert(id, listener);
        Subscription { target: Some((Arc::downgrade(&self.inner), id)) }
    }

    /// Deliver an event to every registered listener, in registration order.
    pub fn emit(&self, event: AuthEvent, session: Option<&Session>) {
        let listeners: Vec<_> = self.lock().listeners.values().cloned().collect();
        tracing::debug!(%event, listeners = listeners.len(), "auth state change");
        for listener in listeners {
            listener.on_auth_state_change(event, session);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().listeners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Token returned by a subscription. Unsubscribing consumes it.
#[must_use = "dropping the token leaves the listener registered"]
pub struct Subscription {
    target: Option<(Weak<Mutex<Registry>>, u64)>,
}

impl Subscription {
    /// A token that is not attached to anything; unsubscribing does nothing.
    pub fn inert() -> Self {
        Self { target: None }
    }

    #[must_use]
    pub fn is_inert(&self) -> bool {
        self.target.is_none()
    }

    pub fn unsubscribe(self) {
        let Some((registry, id)) = self.target else {
            return;
        };
        if let Some(registry) = registry.upgrade() {
            registry
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .listeners
                .remove(&id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.target.as_ref().map(|(_, id)| *id))
            .finish()
    }
}

#[cfg(test)]
#[path = "listeners_test.rs"]
mod tests;
