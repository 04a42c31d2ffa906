//! Client configuration.
//!
//! A configuration is the secret key plus the base URL. Both are held per
//! client instance, so one process can talk to several accounts or
//! environments at once.

use url::Url;

use crate::credential::SecretKey;
use crate::error::ConfigError;

/// Production API origin.
pub const DEFAULT_BASE_URL: &str = "https://api.paystack.co";

pub const SECRET_KEY_ENV: &str = "PAYSTACK_SECRET_KEY";
pub const BASE_URL_ENV: &str = "PAYSTACK_BASE_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub(crate) secret_key: SecretKey,
    pub(crate) base_url: String,
}

impl ClientConfig {
    /// A configuration targeting the production API.
    ///
    /// The key is not checked here; it is validated before every request.
    pub fn new(secret_key: impl Into<SecretKey>) -> Self {
        Self {
            secret_key: secret_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client at another origin, e.g. a local mock server.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    /// Read `PAYSTACK_SECRET_KEY` and, if set, `PAYSTACK_BASE_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let secret_key = lookup(SECRET_KEY_ENV).ok_or(ConfigError::MissingEnv(SECRET_KEY_ENV))?;
        let config = Self::new(secret_key);
        match lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            Some(base_url) => config.with_base_url(&base_url),
            None => Ok(config),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn parse_base_url(raw: &str) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme `{}`", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(raw.trim_end_matches('/').to_string())
}
