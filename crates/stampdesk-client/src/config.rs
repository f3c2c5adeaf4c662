//! Stamp service client configuration.
//!
//! Configures the base URL and request timeout. Defaults point to a local
//! development server. Override via environment variables or explicit
//! construction for staging/testing.

use url::Url;

/// Default base URL when `STAMPDESK_API_BASE_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8081/api";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for connecting to the stamp service.
///
/// The bearer token is deliberately NOT part of the configuration: it is
/// obtained at login and owned by [`crate::SessionManager`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL every endpoint path is resolved against. Always ends in `/`.
    pub base_url: Url,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl GatewayConfig {
    /// Build a configuration for an explicit base URL with the default
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if `base_url` does not parse or
    /// cannot carry a path (e.g. `mailto:`).
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("base_url", base_url)?,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// Override the request timeout.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `STAMPDESK_API_BASE_URL` (default: `http://127.0.0.1:8081/api`)
    /// - `STAMPDESK_TIMEOUT_SECS` (default: 30, must be a positive integer)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var("STAMPDESK_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let timeout_secs = match std::env::var("STAMPDESK_TIMEOUT_SECS") {
            Ok(value) => parse_timeout_secs("STAMPDESK_TIMEOUT_SECS", &value)?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };
        Ok(Self {
            base_url: parse_base_url("STAMPDESK_API_BASE_URL", &raw)?,
            timeout_secs,
        })
    }

    /// Resolve an endpoint path (e.g. `auth/login`) against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ConfigError::InvalidUrl(path.to_string(), e.to_string()))
    }
}

/// Parse a base URL and make sure its path ends in `/`, so that relative
/// joins append to the path instead of replacing its last segment.
fn parse_base_url(source: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidUrl(source.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl(
            source.to_string(),
            "URL cannot be used as a base".to_string(),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Parse a timeout in whole seconds. Zero would fail every request
/// immediately and is rejected.
fn parse_timeout_secs(source: &str, raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidTimeout(
            source.to_string(),
            "must be at least 1 second".to_string(),
        )),
        Ok(secs) => Ok(secs),
        Err(e) => Err(ConfigError::InvalidTimeout(source.to_string(), e.to_string())),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid timeout for {0}: {1}")]
    InvalidTimeout(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_appends_trailing_slash() {
        let cfg = GatewayConfig::new("https://stamps.example.com/api").unwrap();
        assert_eq!(cfg.base_url.as_str(), "https://stamps.example.com/api/");
        assert_eq!(cfg.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn new_keeps_existing_trailing_slash() {
        let cfg = GatewayConfig::new("https://stamps.example.com/api/").unwrap();
        assert_eq!(cfg.base_url.as_str(), "https://stamps.example.com/api/");
    }

    #[test]
    fn endpoint_appends_to_base_path() {
        let cfg = GatewayConfig::new("http://127.0.0.1:9000/api").unwrap();
        assert_eq!(
            cfg.endpoint("passkit/add-points").unwrap().as_str(),
            "http://127.0.0.1:9000/api/passkit/add-points"
        );
        assert_eq!(
            cfg.endpoint("/auth/login").unwrap().as_str(),
            "http://127.0.0.1:9000/api/auth/login"
        );
    }

    #[test]
    fn endpoint_on_bare_host() {
        let cfg = GatewayConfig::new("http://127.0.0.1:9000").unwrap();
        assert_eq!(
            cfg.endpoint("auth/login").unwrap().as_str(),
            "http://127.0.0.1:9000/auth/login"
        );
    }

    #[test]
    fn new_rejects_invalid_url() {
        assert!(matches!(
            GatewayConfig::new("not a url"),
            Err(ConfigError::InvalidUrl(..))
        ));
        assert!(GatewayConfig::new("mailto:staff@example.com").is_err());
    }

    #[test]
    fn timeout_must_be_a_positive_integer() {
        assert_eq!(parse_timeout_secs("T", " 12 ").unwrap(), 12);
        assert!(matches!(
            parse_timeout_secs("T", "0"),
            Err(ConfigError::InvalidTimeout(..))
        ));
        assert!(matches!(
            parse_timeout_secs("T", "ten"),
            Err(ConfigError::InvalidTimeout(..))
        ));
        assert!(parse_timeout_secs("T", "-5").is_err());
        assert!(parse_timeout_secs("T", "").is_err());
    }

    #[test]
    fn with_timeout_overrides_default() {
        let cfg = GatewayConfig::new("http://localhost").unwrap().with_timeout_secs(5);
        assert_eq!(cfg.timeout_secs, 5);
    }
}
