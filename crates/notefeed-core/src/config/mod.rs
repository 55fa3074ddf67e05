//! Client configuration.
//!
//! `ClientConfig` carries everything the API adapter and stores need to talk to
//! a notes backend. Values come from a profile file, the environment, or both.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::util::{normalize_base_url, normalize_text_option};

pub const API_URL_ENV: &str = "NOTEFEED_API_URL";
pub const PAGE_SIZE_ENV: &str = "NOTEFEED_PAGE_SIZE";

const DEFAULT_PAGE_SIZE: u32 = 10;
const DEFAULT_TOAST_TTL_MS: u64 = 3000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_BYPASS_HEADER_NAME: &str = "ngrok-skip-browser-warning";
const DEFAULT_BYPASS_HEADER_VALUE: &str = "true";

/// Extra header attached to every outbound request.
///
/// Tunnelled development backends interpose an interstitial page unless the
/// request opts out with a well-known header.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BypassHeader {
    pub name: String,
    pub value: String,
}

impl Default for BypassHeader {
    fn default() -> Self {
        Self {
            name: DEFAULT_BYPASS_HEADER_NAME.to_string(),
            value: DEFAULT_BYPASS_HEADER_VALUE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub api_base_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_bypass_header")]
    pub bypass_header: Option<BypassHeader>,
    #[serde(default = "default_toast_ttl_ms")]
    pub toast_ttl_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

const fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

#[allow(clippy::unnecessary_wraps)]
fn default_bypass_header() -> Option<BypassHeader> {
    Some(BypassHeader::default())
}

const fn default_toast_ttl_ms() -> u64 {
    DEFAULT_TOAST_TTL_MS
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl ClientConfig {
    /// Builds a config for `api_base_url` with every other value defaulted.
    pub fn new(api_base_url: impl Into<String>) -> Result<Self, String> {
        Self {
            api_base_url: api_base_url.into(),
            page_size: DEFAULT_PAGE_SIZE,
            bypass_header: default_bypass_header(),
            toast_ttl_ms: DEFAULT_TOAST_TTL_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
        .validated()
    }

    /// Parses a JSON config document and validates it.
    pub fn from_json(raw: &str) -> Result<Self, String> {
        let config: Self =
            serde_json::from_str(raw).map_err(|error| format!("invalid client config: {error}"))?;
        config.validated()
    }

    /// Applies `NOTEFEED_API_URL` / `NOTEFEED_PAGE_SIZE` on top of `self`.
    pub fn with_env_overrides(self) -> Result<Self, String> {
        self.with_overrides(
            std::env::var(API_URL_ENV).ok(),
            std::env::var(PAGE_SIZE_ENV).ok(),
        )
    }

    /// Applies explicit overrides; blank values are ignored.
    pub fn with_overrides(
        mut self,
        api_base_url: Option<String>,
        page_size: Option<String>,
    ) -> Result<Self, String> {
        if let Some(url) = normalize_text_option(api_base_url) {
            self.api_base_url = url;
        }
        if let Some(raw) = normalize_text_option(page_size) {
            self.page_size = raw
                .parse()
                .map_err(|error| format!("invalid page size '{raw}': {error}"))?;
        }
        self.validated()
    }

    pub fn validated(mut self) -> Result<Self, String> {
        self.api_base_url = normalize_base_url(&self.api_base_url)?;
        if self.page_size == 0 {
            return Err("page_size must be greater than zero".to_string());
        }
        if let Some(header) = &self.bypass_header {
            if header.name.trim().is_empty() {
                return Err("bypass_header.name must not be empty".to_string());
            }
        }
        Ok(self)
    }

    pub const fn toast_ttl(&self) -> Duration {
        Duration::from_millis(self.toast_ttl_ms)
    }

    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_applies_defaults() {
        let config = ClientConfig::new("https://notes.example.com/api/").unwrap();
        assert_eq!(config.api_base_url, "https://notes.example.com/api");
        assert_eq!(config.page_size, 10);
        assert_eq!(config.toast_ttl(), Duration::from_millis(3000));
        assert_eq!(config.bypass_header, Some(BypassHeader::default()));
    }

    #[test]
    fn from_json_rejects_unknown_fields() {
        let error = ClientConfig::from_json(
            r#"{ "api_base_url": "https://notes.example.com", "unexpected": true }"#,
        )
        .unwrap_err();
        assert!(error.contains("unknown field"));
    }

    #[test]
    fn from_json_allows_disabling_bypass_header() {
        let config = ClientConfig::from_json(
            r#"{ "api_base_url": "https://notes.example.com", "bypass_header": null }"#,
        )
        .unwrap();
        assert!(config.bypass_header.is_none());
    }

    #[test]
    fn overrides_replace_url_and_page_size() {
        let config = ClientConfig::new("https://a.example.com")
            .unwrap()
            .with_overrides(
                Some(" https://b.example.com/ ".to_string()),
                Some("25".to_string()),
            )
            .unwrap();
        assert_eq!(config.api_base_url, "https://b.example.com");
        assert_eq!(config.page_size, 25);
    }

    #[test]
    fn overrides_reject_zero_page_size() {
        let error = ClientConfig::new("https://a.example.com")
            .unwrap()
            .with_overrides(None, Some("0".to_string()))
            .unwrap_err();
        assert!(error.contains("page_size"));
    }

    #[test]
    fn new_requires_http_scheme() {
        assert!(ClientConfig::new("notes.example.com").is_err());
    }
}
