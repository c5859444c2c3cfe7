//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! carries the parsed site config and the auth facade; both are cheap to
//! clone.

use std::path::Path;
use std::sync::Arc;

use crate::auth::AuthClient;
use crate::config::SiteConfig;

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<SiteConfig>,
    pub auth: AuthClient,
}

impl AppState {
    #[must_use]
    pub fn new(config: SiteConfig, auth: AuthClient) -> Self {
        Self { config: Arc::new(config), auth }
    }

    #[must_use]
    pub fn site_dir(&self) -> &Path {
        &self.config.site_dir
    }
}
