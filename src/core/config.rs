//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Production API root
pub const DEFAULT_BASE_URL: &str = "http://www.onehourtranslation.com/api/2";

/// Sandbox API root
pub const DEFAULT_SANDBOX_URL: &str = "http://sandbox.onehourtranslation.com/api/2";

/// Configuration for the OHT client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OhtConfig {
    /// Public API key, sent with every call
    pub public_key: String,
    /// Secret API key, sent with authenticated calls
    pub secret_key: String,
    /// Send requests to `sandbox_url` instead of `base_url`
    pub sandbox: bool,
    /// Production API root
    pub base_url: String,
    /// Sandbox API root
    pub sandbox_url: String,
    /// Timeout for API calls
    pub timeout_ms: u64,
    /// Timeout for the availability probe only
    pub probe_timeout_ms: u64,
}

impl Default for OhtConfig {
    fn default() -> Self {
        Self {
            public_key: std::env::var("OHT_PUBLIC_KEY").unwrap_or_default(),
            secret_key: std::env::var("OHT_SECRET_KEY").unwrap_or_default(),
            sandbox: false,
            base_url: DEFAULT_BASE_URL.to_string(),
            sandbox_url: DEFAULT_SANDBOX_URL.to_string(),
            timeout_ms: 30000,
            probe_timeout_ms: 10000,
        }
    }
}

impl OhtConfig {
    /// Create a configuration from explicit credentials
    pub fn new(public_key: impl Into<String>, secret_key: impl Into<String>, sandbox: bool) -> Self {
        Self {
            public_key: public_key.into(),
            secret_key: secret_key.into(),
            sandbox,
            ..Default::default()
        }
    }

    /// Load configuration from environment variables
    ///
    /// Unset variables keep their defaults, including the keys, which may
    /// still be supplied by the caller; `validate` checks they are present.
    /// A value that is set but cannot be parsed is an error.
    pub fn from_env() -> anyhow::Result<Self> {
        // Default already picks up OHT_PUBLIC_KEY and OHT_SECRET_KEY.
        let defaults = Self::default();

        let sandbox = match std::env::var("OHT_SANDBOX") {
            Ok(v) => parse_flag(&v)
                .ok_or_else(|| anyhow::anyhow!("OHT_SANDBOX must be a boolean, got {:?}", v))?,
            Err(_) => defaults.sandbox,
        };

        let base_url = std::env::var("OHT_BASE_URL").unwrap_or(defaults.base_url);
        let sandbox_url = std::env::var("OHT_SANDBOX_URL").unwrap_or(defaults.sandbox_url);

        let timeout_ms = env_millis("OHT_TIMEOUT_MS", defaults.timeout_ms)?;
        let probe_timeout_ms = env_millis("OHT_PROBE_TIMEOUT_MS", defaults.probe_timeout_ms)?;

        Ok(Self {
            public_key: defaults.public_key,
            secret_key: defaults.secret_key,
            sandbox,
            base_url,
            sandbox_url,
            timeout_ms,
            probe_timeout_ms,
        })
    }

    /// Load from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.public_key.is_empty() {
            return Err(anyhow::anyhow!("Public key is required"));
        }

        if self.secret_key.is_empty() {
            // Language discovery works with the public key alone.
            warn!("No secret key configured, only public endpoints will succeed");
        }

        if self.base_url.is_empty() || self.sandbox_url.is_empty() {
            return Err(anyhow::anyhow!("API URLs must not be empty"));
        }

        if self.timeout_ms == 0 || self.probe_timeout_ms == 0 {
            return Err(anyhow::anyhow!("Timeouts must be greater than 0"));
        }

        Ok(())
    }

    /// URL that requests are sent to
    pub fn work_url(&self) -> &str {
        if self.sandbox {
            &self.sandbox_url
        } else {
            &self.base_url
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

fn env_millis(name: &str, default: u64) -> anyhow::Result<u64> {
    match std::env::var(name) {
        Ok(v) => v
            .trim()
            .parse::<u64>()
            .map_err(|e| anyhow::anyhow!("{} must be a number of milliseconds, got {:?}: {}", name, v, e)),
        Err(_) => Ok(default),
    }
}
