//! Client configuration.
//!
//! # Design
//! Everything a call needs is fixed at construction: endpoint, credentials,
//! deadline and the diagnostic dump toggle. There is no global state, so two
//! clients with different settings can run side by side.

use std::time::Duration;

use crate::error::ApiError;
use crate::types::Credentials;

/// Production endpoint of the registrar API.
pub const DEFAULT_BASE_URL: &str = "https://api.reg.ru/api/regru2";

/// Hard client-side deadline covering connect and response.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub credentials: Credentials,
    pub timeout: Duration,
    /// Print and capture raw requests and responses, credentials included.
    pub dump_request_response: bool,
}

impl ClientConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials,
            timeout: DEFAULT_TIMEOUT,
            dump_request_response: false,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_dump_request_response(mut self, enabled: bool) -> Self {
        self.dump_request_response = enabled;
        self
    }

    /// Read `REGRU_USERNAME`, `REGRU_PASSWORD`, `REGRU_BASE_URL`,
    /// `REGRU_TIMEOUT_SECS` and `REGRU_DUMP` from the process environment.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an arbitrary variable source.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ApiError::InvalidRequest(format!("{key} is not set")))
        };

        let mut config = Self::new(Credentials::new(required("REGRU_USERNAME")?, required("REGRU_PASSWORD")?));

        if let Some(base_url) = lookup("REGRU_BASE_URL") {
            config = config.with_base_url(&base_url);
        }
        if let Some(secs) = lookup("REGRU_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|_| ApiError::InvalidRequest(format!("REGRU_TIMEOUT_SECS is not a number: {secs}")))?;
            if secs == 0 {
                return Err(ApiError::InvalidRequest("REGRU_TIMEOUT_SECS must be at least 1".to_string()));
            }
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(flag) = lookup("REGRU_DUMP") {
            config = config.with_dump_request_response(parse_flag(&flag)?);
        }

        Ok(config)
    }
}

fn parse_flag(value: &str) -> Result<bool, ApiError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "" | "0" | "false" | "no" => Ok(false),
        other => Err(ApiError::InvalidRequest(format!("REGRU_DUMP is not a boolean: {other}"))),
    }
}
