//! Site configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {value:?} is not a port number")]
    InvalidPort { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    /// Supabase project URL. Auth is disabled when absent.
    pub supabase_url: Option<String>,
    /// Supabase public (anon) key. Auth is disabled when absent.
    pub supabase_anon_key: Option<String>,
    /// Public origin of the site, used to build email redirect links.
    pub site_origin: String,
    /// Directory holding the HTML entry points and static assets.
    pub site_dir: PathBuf,
    pub port: u16,
    /// Second listener for the preview build, when set.
    pub preview_port: Option<u16>,
}

impl SiteConfig {
    /// Build typed config from environment variables.
    ///
    /// - `SUPABASE_URL` / `SUPABASE_ANON_KEY`, falling back to the
    ///   `VITE_`-prefixed names used by the old frontend build
    /// - `SITE_ORIGIN`: default `http://localhost:<PORT>`
    /// - `SITE_DIR`: default `site/` next to `Cargo.toml`
    /// - `PORT`: default 3000
    /// - `PREVIEW_PORT`: optional
    ///
    /// Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if a port variable is set but not a valid port.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`SiteConfig::from_env`], reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if a port variable is set but not a valid port.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let port = parse_port("PORT", get("PORT"))?.unwrap_or(DEFAULT_PORT);
        let preview_port = parse_port("PREVIEW_PORT", get("PREVIEW_PORT"))?;
        let site_origin = get("SITE_ORIGIN")
            .unwrap_or_else(|| format!("http://localhost:{port}"))
            .trim_end_matches('/')
            .to_owned();
        let site_dir = get("SITE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("site"));

        Ok(Self {
            supabase_url: get("SUPABASE_URL").or_else(|| get("VITE_SUPABASE_URL")),
            supabase_anon_key: get("SUPABASE_ANON_KEY").or_else(|| get("VITE_SUPABASE_ANON_KEY")),
            site_origin,
            site_dir,
            port,
            preview_port,
        })
    }

    #[must_use]
    pub fn auth_configured(&self) -> bool {
        self.supabase_url.is_some() && self.supabase_anon_key.is_some()
    }
}

fn parse_port(var: &'static str, raw: Option<String>) -> Result<Option<u16>, ConfigError> {
    raw.map(|value| {
        value
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort { var, value })
    })
    .transpose()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
