//! Page controllers.
//!
//! DESIGN
//! ======
//! Each page is a plain state object driven by its host: the host forwards
//! user input (submit, click, keypress) and renders what the controller
//! exposes. Controllers never touch markup. Side effects leave through
//! narrow seams: [`Navigator`] for page changes, [`Storage`](crate::storage::Storage)
//! for tab-scoped hand-off, [`AuthClient`](crate::auth::AuthClient) for the
//! identity provider.

pub mod auth_form;
pub mod chat;
pub mod landing;
pub mod year;

/// Moves the browsing context to another page.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}
