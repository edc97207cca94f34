//! Graph API credentials.
//!
//! Resolved from a TOML file first; only when that file is missing or
//! incomplete are environment variables consulted (after loading `.env`).
//! Absent credentials are not an error: API-sourced sections simply degrade.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{InsightsError, Result};

/// Graph API base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://graph.facebook.com/v21.0";

/// Opaque credential bundle for one page.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub page_id: String,
    pub page_token: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

// Keep the token out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("page_id", &self.page_id)
            .field("page_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

#[derive(Deserialize)]
struct ConfigFile {
    graph: Credentials,
}

impl Credentials {
    /// Resolve credentials from `config_path`, falling back to the
    /// environment. Returns `None` when neither source is usable.
    pub fn resolve(config_path: &Path) -> Option<Self> {
        match Self::from_toml_file(config_path) {
            Ok(creds) => return Some(creds),
            Err(e) => debug!("credentials file unavailable: {}", e),
        }

        if let Err(e) = dotenvy::dotenv() {
            debug!("no .env loaded: {}", e);
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the `[graph]` table of a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| InsightsError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse the `[graph]` table from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let parsed: ConfigFile =
            toml::from_str(content).map_err(|e| InsightsError::Config(e.to_string()))?;
        parsed.graph.validated()
    }

    /// Build from `PAGE_ID`, `PAGE_TOKEN` and optional `BASE_URL` as returned
    /// by `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let creds = Self {
            page_id: lookup("PAGE_ID")?,
            page_token: lookup("PAGE_TOKEN")?,
            base_url: lookup("BASE_URL")
                .filter(|u| !u.trim().is_empty())
                .unwrap_or_else(default_base_url),
        };
        creds.validated().ok()
    }

    fn validated(mut self) -> Result<Self> {
        self.page_id = self.page_id.trim().to_string();
        self.page_token = self.page_token.trim().to_string();
        self.base_url = self.base_url.trim().trim_end_matches('/').to_string();
        if self.page_id.is_empty() {
            return Err(InsightsError::Config("page_id is empty".to_string()));
        }
        if self.page_token.is_empty() {
            return Err(InsightsError::Config("page_token is empty".to_string()));
        }
        if self.base_url.is_empty() {
            self.base_url = default_base_url();
        }
        Ok(self)
    }
}
