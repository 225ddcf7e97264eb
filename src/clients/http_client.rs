//! Request dispatcher for the Constructor.io API.
//!
//! [`HttpClient`] takes a fully built [`HttpRequest`], attaches headers,
//! applies the resolved timeout, hands the request to the configured
//! [`Fetcher`](crate::clients::Fetcher), and translates the outcome.

use std::collections::HashMap;
use std::sync::Arc;

use crate::clients::errors::{HttpError, HttpResponseError};
use crate::clients::fetcher::{FetchRequest, RequestBody};
use crate::clients::http_request::{AuthMode, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::config::{ConstructorConfig, NetworkParameters};
use crate::error::ValidationError;
use crate::user::UserContext;

/// Dispatcher shared by every module.
///
/// The client handles:
/// - header assembly (content type, custom headers, security token,
///   API token, user context headers)
/// - per-call timeouts that abort the in-flight request
/// - uniform error translation for non-2xx responses
///
/// No request is ever retried.
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync` and cheap to clone.
#[derive(Clone, Debug)]
pub struct HttpClient {
    config: Arc<ConstructorConfig>,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a dispatcher over a shared configuration.
    #[must_use]
    pub const fn new(config: Arc<ConstructorConfig>) -> Self {
        Self { config }
    }

    /// Returns the configuration this client dispatches with.
    #[must_use]
    pub fn config(&self) -> &ConstructorConfig {
        &self.config
    }

    /// Checks that an API token is configured.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingApiToken`] if none is set.
    pub fn require_token(&self) -> Result<(), ValidationError> {
        self.config
            .api_token()
            .map(|_| ())
            .ok_or(ValidationError::MissingApiToken)
    }

    /// Assembles the header set for a request.
    ///
    /// Precedence, lowest first: defaults, client custom headers, per-call
    /// custom headers, request headers, `x-cnstrc-token`, `authorization`,
    /// then user context headers. Names are lowercased so a later source
    /// replaces an earlier one regardless of case.
    #[must_use]
    pub fn build_headers(
        &self,
        request: &HttpRequest,
        user: Option<&UserContext>,
        network: &NetworkParameters,
    ) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        headers.insert("accept".to_string(), "application/json".to_string());
        if matches!(request.body, Some(RequestBody::Json(_))) {
            headers.insert("content-type".to_string(), "application/json".to_string());
        }

        for (key, value) in &network.headers {
            headers.insert(key.to_ascii_lowercase(), value.clone());
        }
        if let Some(extra) = &request.extra_headers {
            for (key, value) in extra {
                headers.insert(key.to_ascii_lowercase(), value.clone());
            }
        }

        if let Some(token) = self.config.security_token() {
            headers.insert("x-cnstrc-token".to_string(), token.as_ref().to_string());
        }
        if request.auth == AuthMode::Token {
            if let Some(token) = self.config.api_token() {
                headers.insert("authorization".to_string(), token.basic_auth_header());
            }
        }

        if let Some(user) = user {
            for (key, value) in user.headers() {
                headers.insert(key.to_ascii_lowercase(), value.to_string());
            }
        }

        headers
    }

    /// Sends a request.
    ///
    /// `network` holds per-call parameters; they are resolved against the
    /// client-level ones (timeout override, header merge).
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if:
    /// - the request fails validation (`InvalidRequest`)
    /// - the resolved timeout expires (`Aborted`)
    /// - the transport fails (`Transport`)
    /// - a non-2xx response is received (`Response`)
    pub async fn dispatch(
        &self,
        request: HttpRequest,
        user: Option<&UserContext>,
        network: Option<&NetworkParameters>,
    ) -> Result<HttpResponse, HttpError> {
        request.verify()?;

        let network = self.config.network_parameters().resolve(network);
        if network.timeout != self.config.network_parameters().timeout {
            tracing::debug!("Per-call timeout {:?} overrides client timeout", network.timeout);
        }
        let headers = self.build_headers(&request, user, &network);

        tracing::debug!(
            "Dispatching {} {}",
            request.http_method,
            redact_key(&request.url, self.config.api_key().as_ref())
        );

        let fetch = self.config.fetcher().fetch(FetchRequest {
            method: request.http_method,
            url: request.url,
            headers,
            body: request.body,
        });

        let res = match network.timeout {
            Some(timeout) => tokio::time::timeout(timeout, fetch)
                .await
                .map_err(|_| HttpError::Aborted { timeout })??,
            None => fetch.await?,
        };

        let body = if res.body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&res.body).unwrap_or(serde_json::Value::Null)
        };

        let response = HttpResponse::new(res.status, res.status_text, res.url, res.headers, body);
        if response.is_ok() {
            return Ok(response);
        }

        Err(HttpError::Response(Self::response_error(response)))
    }

    /// Builds the error for a non-2xx response.
    fn response_error(response: HttpResponse) -> HttpResponseError {
        let message = response
            .body
            .get("message")
            .and_then(serde_json::Value::as_str)
            .map_or_else(
                || HttpResponseError::fallback_message(response.code, &response.status_text),
                ToString::to_string,
            );

        HttpResponseError {
            message,
            status: response.code,
            status_text: response.status_text,
            url: response.url,
            headers: response.headers,
        }
    }
}

/// Replaces the API key in a URL for logging.
fn redact_key(url: &str, key: &str) -> String {
    url.replace(&format!("key={key}"), "key=***")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::http_request::HttpMethod;
    use crate::config::{ApiKey, ApiToken, SecurityToken};
    use crate::test_support::{MockFetcher, MockReply};
    use serde_json::json;
    use std::time::Duration;

    fn client_with(fetcher: Arc<MockFetcher>, token: bool) -> HttpClient {
        let mut builder = ConstructorConfig::builder()
            .api_key(ApiKey::new("key-test").unwrap())
            .security_token(SecurityToken::new("sec").unwrap())
            .header("X-Client", "client")
            .header("X-Both", "client")
            .fetcher(fetcher);
        if token {
            builder = builder.api_token(ApiToken::new("tok").unwrap());
        }
        HttpClient::new(Arc::new(builder.build().unwrap()))
    }

    #[test]
    fn test_header_precedence() {
        let client = client_with(Arc::new(MockFetcher::new()), true);
        let request = HttpRequest::builder(HttpMethod::Put, "https://x/v2/items")
            .json(json!({"items": []}))
            .auth(AuthMode::Token)
            .build()
            .unwrap();
        let mut per_call = NetworkParameters::default();
        per_call.headers.insert("X-Both".to_string(), "call".to_string());
        per_call.headers.insert("User-Agent".to_string(), "call-agent".to_string());
        let user = UserContext {
            user_ip: Some("10.0.0.1".to_string()),
            user_agent: Some("user-agent".to_string()),
            ..Default::default()
        };

        let network = client.config().network_parameters().resolve(Some(&per_call));
        let headers = client.build_headers(&request, Some(&user), &network);

        assert_eq!(headers.get("content-type").map(String::as_str), Some("application/json"));
        assert_eq!(headers.get("x-client").map(String::as_str), Some("client"));
        assert_eq!(headers.get("x-both").map(String::as_str), Some("call"));
        assert_eq!(headers.get("x-cnstrc-token").map(String::as_str), Some("sec"));
        assert_eq!(headers.get("authorization").map(String::as_str), Some("Basic dG9rOg=="));
        assert_eq!(headers.get("x-forwarded-for").map(String::as_str), Some("10.0.0.1"));
        assert_eq!(headers.get("user-agent").map(String::as_str), Some("user-agent"));
    }

    #[test]
    fn test_header_precedence_ignores_name_case() {
        let client = client_with(Arc::new(MockFetcher::new()), true);
        let request = HttpRequest::builder(HttpMethod::Put, "https://x/v2/items")
            .json(json!({"items": []}))
            .build()
            .unwrap();
        let mut per_call = NetworkParameters::default();
        per_call.headers.insert("x-both".to_string(), "call".to_string());
        per_call.headers.insert("user-agent".to_string(), "call-agent".to_string());
        per_call.headers.insert("content-type".to_string(), "text/plain".to_string());
        let user = UserContext {
            user_agent: Some("user-agent".to_string()),
            ..Default::default()
        };

        let network = client.config().network_parameters().resolve(Some(&per_call));
        let headers = client.build_headers(&request, Some(&user), &network);

        let named = |name: &str| {
            headers
                .iter()
                .filter(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
                .collect::<Vec<_>>()
        };
        assert_eq!(named("user-agent"), ["user-agent"]);
        assert_eq!(named("x-both"), ["call"]);
        assert_eq!(named("content-type"), ["text/plain"]);
    }

    #[test]
    fn test_no_authorization_for_key_only_requests() {
        let client = client_with(Arc::new(MockFetcher::new()), true);
        let request = HttpRequest::builder(HttpMethod::Get, "https://x/search/a")
            .build()
            .unwrap();
        let headers = client.build_headers(&request, None, &NetworkParameters::default());
        assert!(!headers.contains_key("authorization"));
        assert!(!headers.contains_key("content-type"));
    }

    #[test]
    fn test_require_token() {
        let client = client_with(Arc::new(MockFetcher::new()), false);
        assert_eq!(client.require_token(), Err(ValidationError::MissingApiToken));
    }

    #[tokio::test]
    async fn test_dispatch_returns_parsed_body() {
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.push(MockReply::json(200, json!({"ok": true})));
        let client = client_with(fetcher.clone(), false);

        let request = HttpRequest::builder(HttpMethod::Get, "https://x/search/a?key=key-test")
            .build()
            .unwrap();
        let response = client.dispatch(request, None, None).await.unwrap();

        assert_eq!(response.body, json!({"ok": true}));
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_translates_error_body() {
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.push(MockReply::json(400, json!({"message": "Bad filter"})));
        let client = client_with(fetcher, false);

        let request = HttpRequest::builder(HttpMethod::Get, "https://x/search/a")
            .build()
            .unwrap();
        let err = client.dispatch(request, None, None).await.unwrap_err();

        match err {
            HttpError::Response(e) => {
                assert_eq!(e.message, "Bad filter");
                assert_eq!(e.status, 400);
                assert_eq!(e.status_text, "Bad Request");
                assert_eq!(e.url, "https://x/search/a");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dispatch_falls_back_on_unparseable_error_body() {
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.push(MockReply::raw(503, b"<html>down</html>".to_vec()));
        let client = client_with(fetcher, false);

        let request = HttpRequest::builder(HttpMethod::Get, "https://x/search/a")
            .build()
            .unwrap();
        let err = client.dispatch(request, None, None).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Request failed with status 503 Service Unavailable"
        );
    }

    #[tokio::test]
    async fn test_dispatch_aborts_after_timeout() {
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.push(MockReply::json(200, json!({})).delayed(Duration::from_secs(5)));
        let client = client_with(fetcher, false);

        let request = HttpRequest::builder(HttpMethod::Get, "https://x/search/a")
            .build()
            .unwrap();
        let network = NetworkParameters::with_timeout(Duration::from_millis(10));
        let err = client
            .dispatch(request, None, Some(&network))
            .await
            .unwrap_err();

        assert!(matches!(err, HttpError::Aborted { .. }));
    }

    #[test]
    fn test_redact_key() {
        assert_eq!(
            redact_key("https://x/search/a?c=v&key=abc&i=1", "abc"),
            "https://x/search/a?c=v&key=***&i=1"
        );
    }
}
