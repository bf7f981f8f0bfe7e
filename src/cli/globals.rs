use crate::{
    api::ApiClient,
    config::AppConfig,
    storage::{FileStorage, SessionStore},
};
use anyhow::{Context, Result};
use std::{path::PathBuf, sync::Arc};

/// Arguments shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub api_url: String,
    pub storage_dir: PathBuf,
    pub referral_base_url: String,
    pub timeout_seconds: u64,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(api_url: String) -> Self {
        Self {
            api_url,
            storage_dir: AppConfig::default_storage_dir(),
            referral_base_url: crate::config::DEFAULT_REFERRAL_BASE_URL.to_string(),
            timeout_seconds: 0,
        }
    }

    /// # Errors
    /// Returns an error if the API URL is invalid.
    pub fn config(&self) -> Result<AppConfig> {
        let config = AppConfig::new(&self.api_url, &self.storage_dir)
            .context("invalid --api-url")?
            .with_referral_base_url(&self.referral_base_url)
            .with_request_timeout(self.timeout_seconds);
        Ok(config)
    }

    /// API client over the file-backed session store for this backend.
    ///
    /// # Errors
    /// Returns an error if the config is invalid or the HTTP client can not be built.
    pub fn client(&self) -> Result<(AppConfig, ApiClient)> {
        let config = self.config()?;
        let storage = FileStorage::new(config.origin_storage_dir());
        let store = SessionStore::new(Arc::new(storage));
        let api = ApiClient::new(&config, store).context("failed to build HTTP client")?;
        Ok((config, api))
    }
}
