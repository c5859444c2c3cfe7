//! HTML entry points.

use std::io::ErrorKind;
use std::path::Path as FsPath;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::pages::year::{current_year, stamp_year};
use crate::state::AppState;

/// Named entry points and their files relative to the site directory.
pub const ENTRY_POINTS: &[(&str, &str)] = &[
    ("main", "index.html"),
    ("chat", "pages/chat.html"),
    ("about", "pages/about.html"),
    ("privacy", "pages/privacy.html"),
    ("register", "pages/register.html"),
];

/// Resolve a request for `/pages/<file>` to an entry point file.
///
/// Accepts `chat.html` and the extensionless `chat`.
#[must_use]
pub fn entry_for_page(file: &str) -> Option<&'static str> {
    let name = file.strip_suffix(".html").unwrap_or(file);
    ENTRY_POINTS
        .iter()
        .filter(|(entry, _)| *entry != "main")
        .find(|(entry, _)| *entry == name)
        .map(|(_, path)| *path)
}

pub(super) async fn index(State(state): State<AppState>) -> Response {
    serve_entry(state.site_dir(), "index.html").await
}

pub(super) async fn page(State(state): State<AppState>, Path(file): Path<String>) -> Response {
    match entry_for_page(&file) {
        Some(path) => serve_entry(state.site_dir(), path).await,
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn serve_entry(site_dir: &FsPath, relative: &str) -> Response {
    let path = site_dir.join(relative);
    match tokio::fs::read_to_string(&path).await {
        Ok(html) => Html(stamp_year(&html, current_year())).into_response(),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "entry point missing from site directory");
            StatusCode::NOT_FOUND.into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, path = %path.display(), "failed to read entry point");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
