//! Pluggable transport for outgoing requests.
//!
//! Every request the client makes goes through a [`Fetcher`]. The default
//! implementation, [`ReqwestFetcher`], is backed by [`reqwest`]; tests and
//! callers with special transport needs can inject their own.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::clients::http_request::HttpMethod;

/// A single file part of a multipart upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilePart {
    /// The form field name (`items`, `variations`, `item_groups`).
    pub field_name: String,
    /// The file name reported to the server.
    pub file_name: String,
    /// The raw file contents.
    pub contents: Vec<u8>,
}

/// The body of an outgoing request.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
    /// A JSON document.
    Json(serde_json::Value),
    /// A `multipart/form-data` upload.
    Multipart(Vec<FilePart>),
}

/// A fully assembled request, ready to hand to a transport.
#[derive(Clone, Debug)]
pub struct FetchRequest {
    /// The HTTP method.
    pub method: HttpMethod,
    /// The fully qualified URL, query string included.
    pub url: String,
    /// Headers to send. Keys are sent as given.
    pub headers: HashMap<String, String>,
    /// The request body, if any.
    pub body: Option<RequestBody>,
}

/// The raw result of a transport call.
#[derive(Clone, Debug)]
pub struct FetchResponse {
    /// HTTP status code.
    pub status: u16,
    /// Canonical reason phrase (`Not Found`, ...), possibly empty.
    pub status_text: String,
    /// The final URL of the response.
    pub url: String,
    /// Response headers, lowercased names.
    pub headers: HashMap<String, Vec<String>>,
    /// The raw body bytes.
    pub body: Vec<u8>,
}

/// Error raised by a transport when no HTTP response was obtained.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct FetchError {
    /// Human-readable failure description.
    pub message: String,
    /// The underlying cause, if any.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl FetchError {
    /// Creates a transport error without an underlying cause.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        Self {
            message: format!("Network error: {error}"),
            source: Some(Box::new(error)),
        }
    }
}

/// Transport abstraction used by [`HttpClient`](crate::clients::HttpClient).
///
/// Implementations only move bytes: status handling, timeouts and error
/// translation happen in the dispatcher.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use constructorio::clients::{FetchError, FetchRequest, FetchResponse, Fetcher};
/// use std::collections::HashMap;
///
/// #[derive(Debug)]
/// struct AlwaysEmpty;
///
/// #[async_trait]
/// impl Fetcher for AlwaysEmpty {
///     async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, FetchError> {
///         Ok(FetchResponse {
///             status: 200,
///             status_text: "OK".to_string(),
///             url: request.url,
///             headers: HashMap::new(),
///             body: b"{}".to_vec(),
///         })
///     }
/// }
/// ```
#[async_trait]
pub trait Fetcher: Send + Sync + std::fmt::Debug {
    /// Sends the request and returns the raw response.
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, FetchError>;
}

/// Default [`Fetcher`] backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Wraps an existing reqwest client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Creates a fetcher with a rustls-backed client.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the TLS backend cannot be initialized.
    pub fn try_new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().use_rustls_tls().build()?;
        Ok(Self { client })
    }

    fn build_form(parts: Vec<FilePart>) -> Result<reqwest::multipart::Form, FetchError> {
        let mut form = reqwest::multipart::Form::new();
        for part in parts {
            let file = reqwest::multipart::Part::bytes(part.contents)
                .file_name(part.file_name)
                .mime_str("text/csv")?;
            form = form.part(part.field_name, file);
        }
        Ok(form)
    }
}

#[async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, FetchError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        builder = match request.body {
            Some(RequestBody::Json(body)) => builder.body(body.to_string()),
            Some(RequestBody::Multipart(parts)) => builder.multipart(Self::build_form(parts)?),
            None => builder,
        };

        let res = builder.send().await?;

        let status = res.status();
        let url = res.url().to_string();
        let mut headers: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in res.headers() {
            let value = value.to_str().unwrap_or_default().to_string();
            headers
                .entry(name.as_str().to_lowercase())
                .or_default()
                .push(value);
        }
        let body = res.bytes().await?.to_vec();

        Ok(FetchResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            url,
            headers,
            body,
        })
    }
}
