//! HTTP plumbing for Constructor.io API communication.
//!
//! This module provides the transport layer shared by every API module.
//! It handles header assembly, per-call timeouts, and translation of
//! non-2xx responses into errors.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`HttpClient`]: the dispatcher used by every module
//! - [`HttpRequest`]: a request with a fully built URL
//! - [`HttpResponse`]: a parsed response
//! - [`HttpMethod`]: supported HTTP methods
//! - [`Fetcher`]: the pluggable transport trait
//! - [`ReqwestFetcher`]: the default transport
//!
//! # Example
//!
//! ```rust,no_run
//! use constructorio::clients::{HttpClient, HttpMethod, HttpRequest};
//! use constructorio::{ApiKey, ConstructorConfig};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConstructorConfig::builder()
//!     .api_key(ApiKey::new("key-abc")?)
//!     .build()?;
//! let client = HttpClient::new(Arc::new(config));
//!
//! let request = HttpRequest::builder(
//!     HttpMethod::Get,
//!     "https://ac.cnstrc.com/search/shoes?key=key-abc",
//! )
//! .build()?;
//!
//! let response = client.dispatch(request, None, None).await?;
//! println!("{}", response.body);
//! # Ok(())
//! # }
//! ```
//!
//! # Retry Behavior
//!
//! The dispatcher never retries. A timeout aborts the in-flight request and
//! surfaces as [`HttpError::Aborted`].

mod errors;
mod fetcher;
mod http_client;
mod http_request;
mod http_response;

pub use errors::{HttpError, HttpResponseError, InvalidHttpRequestError};
pub use fetcher::{FetchError, FetchRequest, FetchResponse, Fetcher, FilePart, RequestBody, ReqwestFetcher};
pub use http_client::HttpClient;
pub use http_request::{AuthMode, HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::HttpResponse;
