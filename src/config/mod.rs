//! Configuration types for the Constructor.io client.
//!
//! # Overview
//!
//! - [`ConstructorConfig`]: immutable client options shared by every module
//! - [`ConstructorConfigBuilder`]: builder for [`ConstructorConfig`]
//! - [`NetworkParameters`]: timeout and custom headers, at client or call level
//! - [`ApiKey`], [`ApiToken`], [`SecurityToken`], [`ServiceUrl`]: validated newtypes
//!
//! # Example
//!
//! ```rust
//! use constructorio::{ApiKey, ApiToken, ConstructorConfig};
//! use std::time::Duration;
//!
//! let config = ConstructorConfig::builder()
//!     .api_key(ApiKey::new("key-abc").unwrap())
//!     .api_token(ApiToken::new("tok-xyz").unwrap())
//!     .timeout(Duration::from_secs(5))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.service_url().as_ref(), "https://ac.cnstrc.com");
//! ```

mod newtypes;

pub use newtypes::{ApiKey, ApiToken, SecurityToken, ServiceUrl};

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::clients::{FetchError, Fetcher, ReqwestFetcher};
use crate::error::ConfigError;

/// Crate version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Timeout and custom headers for requests.
///
/// Set once on the config and optionally per call. Resolution rules:
/// the per-call `timeout` replaces the config `timeout`; `headers` are
/// merged with per-call entries winning on conflicting keys.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NetworkParameters {
    /// Abort the request after this long.
    pub timeout: Option<Duration>,
    /// Extra headers to send.
    pub headers: BTreeMap<String, String>,
}

impl NetworkParameters {
    /// Creates parameters with only a timeout.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            headers: BTreeMap::new(),
        }
    }

    /// Resolves per-call parameters against client-level ones.
    ///
    /// Header names are lowercased, so a per-call header overrides a
    /// client-level one regardless of case.
    #[must_use]
    pub fn resolve(&self, per_call: Option<&Self>) -> Self {
        let per_call_headers = per_call.map(|p| &p.headers).into_iter().flatten();
        let headers = self
            .headers
            .iter()
            .chain(per_call_headers)
            .map(|(k, v)| (k.to_ascii_lowercase(), v.clone()))
            .collect();
        Self {
            timeout: per_call.and_then(|p| p.timeout).or(self.timeout),
            headers,
        }
    }
}

/// Client options for the Constructor.io API.
///
/// Immutable after [`ConstructorConfigBuilder::build`]. Share it by
/// wrapping in an [`Arc`]; [`ConstructorIO`](crate::ConstructorIO) does so.
#[derive(Clone, Debug)]
pub struct ConstructorConfig {
    api_key: ApiKey,
    api_token: Option<ApiToken>,
    security_token: Option<SecurityToken>,
    service_url: ServiceUrl,
    quizzes_service_url: ServiceUrl,
    version: String,
    fetcher: Arc<dyn Fetcher>,
    network_parameters: NetworkParameters,
    enable_catalog_and_tracking: bool,
}

impl ConstructorConfig {
    /// Creates a new builder for constructing a `ConstructorConfig`.
    #[must_use]
    pub fn builder() -> ConstructorConfigBuilder {
        ConstructorConfigBuilder::new()
    }

    /// Returns the default client version tag: `cio-rust-<crate version>`.
    #[must_use]
    pub fn default_version() -> String {
        format!("cio-rust-{SDK_VERSION}")
    }

    /// Returns the API key.
    #[must_use]
    pub const fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// Returns the API token, if configured.
    #[must_use]
    pub const fn api_token(&self) -> Option<&ApiToken> {
        self.api_token.as_ref()
    }

    /// Returns the security token, if configured.
    #[must_use]
    pub const fn security_token(&self) -> Option<&SecurityToken> {
        self.security_token.as_ref()
    }

    /// Returns the service URL.
    #[must_use]
    pub const fn service_url(&self) -> &ServiceUrl {
        &self.service_url
    }

    /// Returns the quizzes service URL.
    #[must_use]
    pub const fn quizzes_service_url(&self) -> &ServiceUrl {
        &self.quizzes_service_url
    }

    /// Returns the client version tag sent as `c`.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the transport.
    #[must_use]
    pub fn fetcher(&self) -> &Arc<dyn Fetcher> {
        &self.fetcher
    }

    /// Returns the client-level network parameters.
    #[must_use]
    pub const fn network_parameters(&self) -> &NetworkParameters {
        &self.network_parameters
    }

    /// Returns whether the catalog, tasks and tracker modules are available.
    #[must_use]
    pub const fn enable_catalog_and_tracking(&self) -> bool {
        self.enable_catalog_and_tracking
    }
}

// Verify ConstructorConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ConstructorConfig>();
};

/// Builder for [`ConstructorConfig`].
///
/// `api_key` is required. Defaults:
///
/// - `service_url`: `https://ac.cnstrc.com`
/// - `quizzes_service_url`: `https://quizzes.cnstrc.com`
/// - `version`: `cio-rust-<crate version>`
/// - `fetcher`: [`ReqwestFetcher`]
/// - `enable_catalog_and_tracking`: `true`
#[derive(Debug, Default)]
pub struct ConstructorConfigBuilder {
    api_key: Option<ApiKey>,
    api_token: Option<ApiToken>,
    security_token: Option<SecurityToken>,
    service_url: Option<ServiceUrl>,
    quizzes_service_url: Option<ServiceUrl>,
    version: Option<String>,
    fetcher: Option<Arc<dyn Fetcher>>,
    network_parameters: NetworkParameters,
    enable_catalog_and_tracking: Option<bool>,
}

impl ConstructorConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key (required).
    #[must_use]
    pub fn api_key(mut self, key: ApiKey) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Sets the API token used by catalog, tasks and pod listing.
    #[must_use]
    pub fn api_token(mut self, token: ApiToken) -> Self {
        self.api_token = Some(token);
        self
    }

    /// Sets the `x-cnstrc-token` security token.
    #[must_use]
    pub fn security_token(mut self, token: SecurityToken) -> Self {
        self.security_token = Some(token);
        self
    }

    /// Overrides the service URL.
    #[must_use]
    pub fn service_url(mut self, url: ServiceUrl) -> Self {
        self.service_url = Some(url);
        self
    }

    /// Overrides the quizzes service URL.
    #[must_use]
    pub fn quizzes_service_url(mut self, url: ServiceUrl) -> Self {
        self.quizzes_service_url = Some(url);
        self
    }

    /// Overrides the client version tag sent as `c`.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Injects a transport.
    #[must_use]
    pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Sets the default request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.network_parameters.timeout = Some(timeout);
        self
    }

    /// Adds a header sent with every request.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.network_parameters
            .headers
            .insert(key.into(), value.into());
        self
    }

    /// Replaces the client-level network parameters.
    #[must_use]
    pub fn network_parameters(mut self, parameters: NetworkParameters) -> Self {
        self.network_parameters = parameters;
        self
    }

    /// Enables or disables the catalog, tasks and tracker modules.
    #[must_use]
    pub const fn enable_catalog_and_tracking(mut self, enabled: bool) -> Self {
        self.enable_catalog_and_tracking = Some(enabled);
        self
    }

    /// Builds the [`ConstructorConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `api_key` is not set,
    /// or [`ConfigError::TransportUnavailable`] if no fetcher was injected and
    /// the default transport cannot be initialized.
    pub fn build(self) -> Result<ConstructorConfig, ConfigError> {
        let api_key = self
            .api_key
            .ok_or(ConfigError::MissingRequiredField { field: "api_key" })?;

        let fetcher = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(ReqwestFetcher::try_new().map_err(|e: FetchError| {
                ConfigError::TransportUnavailable {
                    reason: e.to_string(),
                }
            })?),
        };

        Ok(ConstructorConfig {
            api_key,
            api_token: self.api_token,
            security_token: self.security_token,
            service_url: self.service_url.unwrap_or_else(ServiceUrl::default_service),
            quizzes_service_url: self
                .quizzes_service_url
                .unwrap_or_else(ServiceUrl::default_quizzes),
            version: self.version.unwrap_or_else(ConstructorConfig::default_version),
            fetcher,
            network_parameters: self.network_parameters,
            enable_catalog_and_tracking: self.enable_catalog_and_tracking.unwrap_or(true),
        })
    }
}
