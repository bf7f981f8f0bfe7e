//! Runtime configuration for the dashboard client. Values come from CLI flags or
//! their `REFDASH_*` environment variables; nothing here is secret. The storage
//! directory is split per API origin so two backends never share a session.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "https://habe-ico-api.zip2box.com/api";
pub const DEFAULT_REFERRAL_BASE_URL: &str = "https://habe-ico.zip2box.com/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("invalid {name}: {source}")]
    InvalidUrl {
        name: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("unsupported scheme for {name}: {scheme}")]
    UnsupportedScheme { name: &'static str, scheme: String },
}

/// Client configuration shared by the API client, the session store and the screens.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_base_url: String,
    pub storage_dir: PathBuf,
    pub referral_base_url: String,
    pub request_timeout: Option<Duration>,
}

impl AppConfig {
    /// Builds a config for the given backend and storage root.
    ///
    /// # Errors
    /// Returns an error if the API URL is empty, unparsable or not http(s).
    pub fn new(api_base_url: &str, storage_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let api_base_url = normalize_value(api_base_url).ok_or(ConfigError::Empty("api url"))?;
        let parsed = Url::parse(&api_base_url).map_err(|source| ConfigError::InvalidUrl {
            name: "api url",
            source,
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme {
                name: "api url",
                scheme: parsed.scheme().to_string(),
            });
        }

        Ok(Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            storage_dir: storage_dir.into(),
            referral_base_url: DEFAULT_REFERRAL_BASE_URL.to_string(),
            request_timeout: None,
        })
    }

    #[must_use]
    pub fn with_referral_base_url(mut self, value: &str) -> Self {
        if let Some(value) = normalize_value(value) {
            self.referral_base_url = value;
        }
        self
    }

    /// Zero disables the timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout = (seconds > 0).then(|| Duration::from_secs(seconds));
        self
    }

    /// Default storage root: the platform data directory, or the temp dir when none exists.
    #[must_use]
    pub fn default_storage_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(env!("CARGO_PKG_NAME"))
    }

    /// Origin of the backend, e.g. `https://habe-ico-api.zip2box.com`.
    #[must_use]
    pub fn api_origin(&self) -> String {
        Url::parse(&self.api_base_url)
            .map(|url| url.origin().ascii_serialization())
            .unwrap_or_else(|_| self.api_base_url.clone())
    }

    /// Directory holding local state for this backend origin.
    #[must_use]
    pub fn origin_storage_dir(&self) -> PathBuf {
        origin_dir(&self.storage_dir, &self.api_origin())
    }
}

fn origin_dir(root: &Path, origin: &str) -> PathBuf {
    let name: String = origin
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    root.join(name)
}

pub(crate) fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
