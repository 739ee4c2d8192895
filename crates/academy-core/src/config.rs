//! Deployment Configuration

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::CheckoutMode;

pub const ENV_API_BASE_URL: &str = "ACADEMY_API_BASE_URL";
pub const ENV_CHECKOUT_MODE: &str = "ACADEMY_CHECKOUT_MODE";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "ACADEMY_REQUEST_TIMEOUT_SECS";
pub const ENV_HOSTED_DEBOUNCE_MS: &str = "ACADEMY_HOSTED_DEBOUNCE_MS";

/// Checkout configuration, fixed per deployment
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// Backend base URL, without trailing slash
    pub api_base_url: String,

    /// Active checkout path
    pub mode: CheckoutMode,

    /// Transport timeout, enforced by the HTTP client where the platform allows
    pub request_timeout_secs: u64,

    /// Quiet period before hosted-widget configuration is requested
    pub hosted_debounce_ms: u64,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".into(),
            mode: CheckoutMode::default(),
            request_timeout_secs: 30,
            hosted_debounce_ms: 500,
        }
    }
}

impl CheckoutConfig {
    /// Read from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through an arbitrary lookup.
    ///
    /// Unset or unparsable numbers keep their defaults; an unknown mode is an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let api_base_url = lookup(ENV_API_BASE_URL)
            .filter(|v| !v.trim().is_empty())
            .map_or(defaults.api_base_url, |v| v.trim().trim_end_matches('/').to_string());

        let mode = match lookup(ENV_CHECKOUT_MODE).filter(|v| !v.trim().is_empty()) {
            Some(raw) => raw.parse()?,
            None => defaults.mode,
        };

        let request_timeout_secs = lookup(ENV_REQUEST_TIMEOUT_SECS)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.request_timeout_secs);

        let hosted_debounce_ms = lookup(ENV_HOSTED_DEBOUNCE_MS)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.hosted_debounce_ms);

        Ok(Self {
            api_base_url,
            mode,
            request_timeout_secs,
            hosted_debounce_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::error::CheckoutError;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = CheckoutConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, CheckoutConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = CheckoutConfig::from_lookup(lookup_from(&[
            (ENV_API_BASE_URL, "https://api.bhaijaanacademy.com/"),
            (ENV_CHECKOUT_MODE, "redirect"),
            (ENV_REQUEST_TIMEOUT_SECS, "10"),
            (ENV_HOSTED_DEBOUNCE_MS, "not-a-number"),
        ]))
        .unwrap();

        assert_eq!(config.api_base_url, "https://api.bhaijaanacademy.com");
        assert_eq!(config.mode, CheckoutMode::RedirectCheckout);
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.hosted_debounce_ms, 500);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let result = CheckoutConfig::from_lookup(lookup_from(&[(ENV_CHECKOUT_MODE, "crypto")]));
        assert!(matches!(result, Err(CheckoutError::Config(_))));
    }
}
