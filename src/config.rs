//! Client configuration for NCBI E-utilities.
//!
//! Defaults identify the tool the way NCBI asks (`tool` + `email`), and can be
//! overridden from the environment or the command line.

use crate::error::{FetcherError, Result};
use std::time::Duration;
use tracing::debug;

/// E-utilities base URL
pub const DEFAULT_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// Tool name reported to NCBI
pub const DEFAULT_TOOL: &str = "PubMedFetcher";

/// Contact email reported to NCBI
pub const DEFAULT_EMAIL: &str = "user@example.com";

/// Maximum PMIDs per EFetch request
pub const DEFAULT_BATCH_SIZE: usize = 250;

/// Environment variable overriding the contact email
pub const ENV_EMAIL: &str = "NCBI_EMAIL";

/// Environment variable carrying an NCBI API key
pub const ENV_API_KEY: &str = "NCBI_API_KEY";

/// Environment variable overriding the base URL
pub const ENV_BASE_URL: &str = "PUBMED_BASE_URL";

/// Settings for [`crate::pubmed::PubMedClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PubMedConfig {
    /// E-utilities endpoint root, without trailing slash
    pub base_url: String,
    pub tool: String,
    pub email: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    /// PMIDs per EFetch call
    pub batch_size: usize,
}

impl Default for PubMedConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            tool: DEFAULT_TOOL.to_string(),
            email: DEFAULT_EMAIL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl PubMedConfig {
    /// Defaults overlaid with `NCBI_EMAIL`, `NCBI_API_KEY` and `PUBMED_BASE_URL`
    pub fn from_env() -> Self {
        Self::default().with_env_vars(|key| std::env::var(key).ok())
    }

    fn with_env_vars<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(email) = non_empty(ENV_EMAIL) {
            debug!(email = %email, "Using contact email from environment");
            self.email = email;
        }
        if let Some(key) = non_empty(ENV_API_KEY) {
            debug!("Using NCBI API key from environment");
            self.api_key = Some(key);
        }
        if let Some(url) = non_empty(ENV_BASE_URL) {
            debug!(base_url = %url, "Using base URL from environment");
            self = self.with_base_url(url);
        }
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Reject settings the client cannot work with
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.base_url).map_err(|e| {
            FetcherError::Config(format!("Invalid base URL {}: {}", self.base_url, e))
        })?;
        if self.batch_size == 0 {
            return Err(FetcherError::Config("batch_size must be at least 1".to_string()));
        }
        if self.tool.trim().is_empty() {
            return Err(FetcherError::Config("tool name must not be empty".to_string()));
        }
        Ok(())
    }

    /// Identification parameters appended to every E-utilities request
    pub(crate) fn identity_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("tool", self.tool.clone()), ("email", self.email.clone())];
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.clone()));
        }
        params
    }
}
