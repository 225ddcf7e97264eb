//! Validated newtype wrappers for configuration values.
//!
//! Each wrapper validates its contents on construction. Credentials mask
//! their value in `Debug` output.

use crate::error::ConfigError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fmt;

/// A validated Constructor.io API key.
///
/// Sent as the `key` query parameter on every request.
///
/// # Example
///
/// ```rust
/// use constructorio::ApiKey;
///
/// let key = ApiKey::new("key-abc123").unwrap();
/// assert_eq!(key.as_ref(), "key-abc123");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Creates a new validated API key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiKey`] if the key is empty or blank.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for ApiKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated Constructor.io API token.
///
/// Required by catalog, task and pod-listing endpoints. The `Debug`
/// implementation masks the value.
///
/// ```rust
/// use constructorio::ApiToken;
///
/// let token = ApiToken::new("tok_secret").unwrap();
/// assert_eq!(format!("{:?}", token), "ApiToken(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Creates a new validated API token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiToken`] if the token is empty.
    pub fn new(token: impl Into<String>) -> Result<Self, ConfigError> {
        let token = token.into();
        if token.is_empty() {
            return Err(ConfigError::EmptyApiToken);
        }
        Ok(Self(token))
    }

    /// Returns the `Authorization` header value: `Basic base64("<token>:")`.
    #[must_use]
    pub fn basic_auth_header(&self) -> String {
        format!("Basic {}", STANDARD.encode(format!("{}:", self.0)))
    }
}

impl AsRef<str> for ApiToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(*****)")
    }
}

/// A security token sent as the `x-cnstrc-token` header.
#[derive(Clone, PartialEq, Eq)]
pub struct SecurityToken(String);

impl SecurityToken {
    /// Creates a new validated security token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptySecurityToken`] if the token is empty.
    pub fn new(token: impl Into<String>) -> Result<Self, ConfigError> {
        let token = token.into();
        if token.is_empty() {
            return Err(ConfigError::EmptySecurityToken);
        }
        Ok(Self(token))
    }
}

impl AsRef<str> for SecurityToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecurityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecurityToken(*****)")
    }
}

/// A validated service base URL.
///
/// Normalization rules:
/// - a bare host (`ac.cnstrc.com`) gets an `https://` scheme
/// - an explicit `http://` or `https://` scheme is kept
/// - trailing slashes are stripped
///
/// # Example
///
/// ```rust
/// use constructorio::ServiceUrl;
///
/// let url = ServiceUrl::new("ac.cnstrc.com/").unwrap();
/// assert_eq!(url.as_ref(), "https://ac.cnstrc.com");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceUrl(String);

impl ServiceUrl {
    /// Default base URL for search, browse, autocomplete, recommendations,
    /// catalog, tasks and tracking.
    pub const DEFAULT: &'static str = "https://ac.cnstrc.com";

    /// Default base URL for quizzes.
    pub const QUIZZES_DEFAULT: &'static str = "https://quizzes.cnstrc.com";

    /// Creates a new normalized service URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidServiceUrl`] if the value is empty, has
    /// no host, or contains whitespace.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = url.into();
        let trimmed = raw.trim();

        let (scheme, rest) = if let Some(rest) = trimmed.strip_prefix("https://") {
            ("https", rest)
        } else if let Some(rest) = trimmed.strip_prefix("http://") {
            ("http", rest)
        } else {
            ("https", trimmed)
        };
        let rest = rest.trim_end_matches('/');

        if rest.is_empty() || rest.contains("://") || rest.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidServiceUrl { url: raw });
        }

        Ok(Self(format!("{scheme}://{rest}")))
    }

    /// Returns the default service URL.
    #[must_use]
    pub fn default_service() -> Self {
        Self(Self::DEFAULT.to_string())
    }

    /// Returns the default quizzes service URL.
    #[must_use]
    pub fn default_quizzes() -> Self {
        Self(Self::QUIZZES_DEFAULT.to_string())
    }

    /// Joins a path (with or without a leading slash) onto this base URL.
    #[must_use]
    pub fn join(&self, path: &str) -> String {
        format!("{}/{}", self.0, path.trim_start_matches('/'))
    }
}

impl AsRef<str> for ServiceUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_rejects_empty() {
        assert!(matches!(ApiKey::new(""), Err(ConfigError::EmptyApiKey)));
        assert!(matches!(ApiKey::new("   "), Err(ConfigError::EmptyApiKey)));
    }

    #[test]
    fn test_api_token_debug_is_masked() {
        let token = ApiToken::new("super-secret").unwrap();
        let debug = format!("{token:?}");
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_api_token_basic_auth_header() {
        let token = ApiToken::new("tok").unwrap();
        // base64("tok:") == "dG9rOg=="
        assert_eq!(token.basic_auth_header(), "Basic dG9rOg==");
    }

    #[test]
    fn test_security_token_debug_is_masked() {
        let token = SecurityToken::new("cnstrc").unwrap();
        assert_eq!(format!("{token:?}"), "SecurityToken(*****)");
    }

    #[test]
    fn test_service_url_adds_https_to_bare_host() {
        assert_eq!(
            ServiceUrl::new("ac.cnstrc.com").unwrap().as_ref(),
            "https://ac.cnstrc.com"
        );
        assert_eq!(
            ServiceUrl::new("http://localhost:3000").unwrap().as_ref(),
            "http://localhost:3000"
        );
        assert_eq!(
            ServiceUrl::new("https://ac.cnstrc.com").unwrap().as_ref(),
            "https://ac.cnstrc.com"
        );
    }

    #[test]
    fn test_service_url_strips_trailing_slash() {
        assert_eq!(
            ServiceUrl::new("https://ac.cnstrc.com///").unwrap().as_ref(),
            "https://ac.cnstrc.com"
        );
    }

    #[test]
    fn test_service_url_keeps_port() {
        assert_eq!(
            ServiceUrl::new("127.0.0.1:8080").unwrap().as_ref(),
            "https://127.0.0.1:8080"
        );
    }

    #[test]
    fn test_service_url_rejects_garbage() {
        assert!(ServiceUrl::new("").is_err());
        assert!(ServiceUrl::new("https://").is_err());
        assert!(ServiceUrl::new("ftp://host").is_err());
        assert!(ServiceUrl::new("bad host").is_err());
    }

    #[test]
    fn test_service_url_join() {
        let url = ServiceUrl::default_service();
        assert_eq!(url.join("/search/shoes"), "https://ac.cnstrc.com/search/shoes");
        assert_eq!(url.join("v1/tasks"), "https://ac.cnstrc.com/v1/tasks");
    }
}
