use crate::{env_or_default, env_parsed, ConfigError, FromEnv};
use std::time::Duration;

/// Default remote inventory service
pub const DEFAULT_INVENTORY_API_URL: &str = "https://inv-be.vercel.app";

/// Connection settings for the remote inventory service
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InventoryApiConfig {
    /// Base URL without trailing slash, e.g. `https://inv-be.vercel.app`
    pub base_url: String,
    /// Per-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl InventoryApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Absolute URL for a path such as `/v1/inventory`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn normalize_base_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}

impl FromEnv for InventoryApiConfig {
    /// Reads from environment variables:
    /// - INVENTORY_API_URL: defaults to the hosted inventory service
    /// - INVENTORY_API_TIMEOUT_SECS: optional, whole seconds
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = env_or_default("INVENTORY_API_URL", DEFAULT_INVENTORY_API_URL);
        let timeout = env_parsed::<u64>("INVENTORY_API_TIMEOUT_SECS")?.map(Duration::from_secs);

        Ok(Self {
            base_url: normalize_base_url(base_url),
            timeout,
        })
    }
}

impl Default for InventoryApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INVENTORY_API_URL)
    }
}
