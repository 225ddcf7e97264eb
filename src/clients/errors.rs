//! HTTP-specific error types for the Constructor.io client.
//!
//! # Error Handling
//!
//! - [`HttpResponseError`]: non-2xx HTTP responses from the API
//! - [`InvalidHttpRequestError`]: a request failed validation before sending
//! - [`HttpError`]: unified error type for dispatch, including timeouts
//!
//! # Example
//!
//! ```rust,ignore
//! use constructorio::clients::HttpError;
//!
//! match client.dispatch(request, None, None).await {
//!     Ok(response) => println!("Success: {}", response.body),
//!     Err(HttpError::Response(e)) => println!("API error {}: {}", e.status, e.message),
//!     Err(HttpError::Aborted { timeout }) => println!("gave up after {timeout:?}"),
//!     Err(other) => println!("{other}"),
//! }
//! ```

use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;

use crate::clients::fetcher::FetchError;

/// Error returned when a request receives a non-successful response.
///
/// The message comes from the `message` field of the JSON error body, or a
/// generic fallback naming the status when the body has none.
///
/// ```rust
/// use constructorio::clients::HttpResponseError;
/// use std::collections::HashMap;
///
/// let error = HttpResponseError {
///     message: "Invalid key".to_string(),
///     status: 401,
///     status_text: "Unauthorized".to_string(),
///     url: "https://ac.cnstrc.com/search/a".to_string(),
///     headers: HashMap::new(),
/// };
/// assert_eq!(error.to_string(), "Invalid key");
/// ```
#[derive(Debug, Error, Clone)]
#[error("{message}")]
pub struct HttpResponseError {
    /// Human-readable message from the response body.
    pub message: String,
    /// The HTTP status code.
    pub status: u16,
    /// The HTTP status text.
    pub status_text: String,
    /// The response URL.
    pub url: String,
    /// The response headers.
    pub headers: HashMap<String, Vec<String>>,
}

impl HttpResponseError {
    /// Builds the fallback message used when the error body carries no `message`.
    #[must_use]
    pub fn fallback_message(status: u16, status_text: &str) -> String {
        if status_text.is_empty() {
            format!("Request failed with status {status}")
        } else {
            format!("Request failed with status {status} {status_text}")
        }
    }
}

/// Error returned when a request fails validation before sending.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// No URL was given.
    #[error("Cannot send a request without a URL.")]
    EmptyUrl,

    /// A POST, PUT or PATCH request was made without a body.
    #[error("Cannot use {method} without specifying data.")]
    MissingBody {
        /// The HTTP method that requires a body.
        method: String,
    },

    /// A body was attached to a method that does not take one.
    #[error("Cannot send a body with {method}.")]
    UnexpectedBody {
        /// The offending HTTP method.
        method: String,
    },
}

/// Unified error type for all HTTP-related errors.
#[derive(Debug, Error)]
pub enum HttpError {
    /// An HTTP response error (non-2xx status code).
    #[error(transparent)]
    Response(#[from] HttpResponseError),

    /// The request did not complete within its timeout and was aborted.
    #[error("The request was aborted after {timeout:?}")]
    Aborted {
        /// The timeout that expired.
        timeout: Duration,
    },

    /// Request validation failed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// The transport failed before an HTTP response was received.
    #[error(transparent)]
    Transport(#[from] FetchError),
}

impl HttpError {
    /// Returns the HTTP status code, when the error carries one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Response(e) => Some(e.status),
            _ => None,
        }
    }
}
