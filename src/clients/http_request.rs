//! HTTP request types for the Constructor.io client.
//!
//! This module provides the [`HttpRequest`] type and its builder. A request
//! carries a fully built URL; the dispatcher only adds headers.

use std::collections::HashMap;
use std::fmt;

use crate::clients::errors::InvalidHttpRequestError;
use crate::clients::fetcher::{FilePart, RequestBody};

/// HTTP methods used by the Constructor.io API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET.
    Get,
    /// HTTP POST.
    Post,
    /// HTTP PUT.
    Put,
    /// HTTP PATCH.
    Patch,
    /// HTTP DELETE.
    Delete,
}

impl HttpMethod {
    /// Returns the method name as sent on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which credential header a request needs beyond the `key` query parameter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthMode {
    /// Only the `key` query parameter.
    #[default]
    KeyOnly,
    /// `Authorization: Basic base64("<apiToken>:")` is required.
    Token,
}

/// An HTTP request to be dispatched.
///
/// # Example
///
/// ```rust
/// use constructorio::clients::{HttpMethod, HttpRequest};
/// use serde_json::json;
///
/// let request = HttpRequest::builder(HttpMethod::Put, "https://ac.cnstrc.com/v2/items?key=k")
///     .json(json!({"items": []}))
///     .build()
///     .unwrap();
/// assert!(request.body.is_some());
/// ```
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// The HTTP method for this request.
    pub http_method: HttpMethod,
    /// The fully qualified URL including its query string.
    pub url: String,
    /// The request body, if any.
    pub body: Option<RequestBody>,
    /// Credential requirements.
    pub auth: AuthMode,
    /// Additional headers to include in the request.
    pub extra_headers: Option<HashMap<String, String>>,
}

impl HttpRequest {
    /// Creates a new builder for constructing an `HttpRequest`.
    #[must_use]
    pub fn builder(method: HttpMethod, url: impl Into<String>) -> HttpRequestBuilder {
        HttpRequestBuilder::new(method, url)
    }

    /// Validates the request.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if:
    /// - the URL is empty
    /// - a GET request carries a body
    /// - a POST, PUT or PATCH request has no body
    pub fn verify(&self) -> Result<(), InvalidHttpRequestError> {
        if self.url.is_empty() {
            return Err(InvalidHttpRequestError::EmptyUrl);
        }

        if self.http_method == HttpMethod::Get && self.body.is_some() {
            return Err(InvalidHttpRequestError::UnexpectedBody {
                method: self.http_method.to_string(),
            });
        }

        if matches!(
            self.http_method,
            HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch
        ) && self.body.is_none()
        {
            return Err(InvalidHttpRequestError::MissingBody {
                method: self.http_method.to_string(),
            });
        }

        Ok(())
    }
}

/// Builder for [`HttpRequest`].
#[derive(Debug)]
pub struct HttpRequestBuilder {
    http_method: HttpMethod,
    url: String,
    body: Option<RequestBody>,
    auth: AuthMode,
    extra_headers: Option<HashMap<String, String>>,
}

impl HttpRequestBuilder {
    fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            http_method: method,
            url: url.into(),
            body: None,
            auth: AuthMode::KeyOnly,
            extra_headers: None,
        }
    }

    /// Sets a JSON body.
    #[must_use]
    pub fn json(mut self, body: impl Into<serde_json::Value>) -> Self {
        self.body = Some(RequestBody::Json(body.into()));
        self
    }

    /// Sets a multipart body.
    #[must_use]
    pub fn multipart(mut self, parts: Vec<FilePart>) -> Self {
        self.body = Some(RequestBody::Multipart(parts));
        self
    }

    /// Marks the request as requiring the API token.
    #[must_use]
    pub const fn auth(mut self, auth: AuthMode) -> Self {
        self.auth = auth;
        self
    }

    /// Adds a single extra header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Builds the [`HttpRequest`], validating it in the process.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if the request fails validation.
    pub fn build(self) -> Result<HttpRequest, InvalidHttpRequestError> {
        let request = HttpRequest {
            http_method: self.http_method,
            url: self.url,
            body: self.body,
            auth: self.auth,
            extra_headers: self.extra_headers,
        };
        request.verify()?;
        Ok(request)
    }
}
