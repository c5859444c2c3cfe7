//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The site is a set of static HTML entry points plus their assets. Entry
//! points are read from disk per request and get the footer year stamped in;
//! everything else under the site directory is served as-is.

pub mod pages;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::routing::get;
use serde::Serialize;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Full site router: entry points, health check, then static assets.
pub fn app(state: AppState) -> Router {
    let assets = ServeDir::new(state.site_dir()).append_index_html_on_directories(false);

    Router::new()
        .route("/", get(pages::index))
        .route("/index.html", get(pages::index))
        .route("/pages/{file}", get(pages::page))
        .route("/healthz", get(healthz))
        .fallback_service(assets)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub ok: bool,
    /// Whether identity-provider credentials were supplied at startup.
    pub auth: bool,
}

async fn healthz(State(state): State<AppState>) -> Json<Health> {
    Json(Health { ok: true, auth: state.auth.is_configured() })
}

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;
