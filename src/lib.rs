//! # Constructor.io API client
//!
//! An async Rust client for the Constructor.io search, browse,
//! autocomplete, recommendations, quizzes, catalog, tasks and behavioral
//! tracking APIs.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`ConstructorConfig`] and [`ConstructorConfigBuilder`]
//! - Validated newtypes for credentials and service URLs
//! - URL builders that assemble query strings in a stable order
//! - A request dispatcher with per-call timeouts and uniform error translation
//! - Response shape checks that stamp `result_id` onto each result
//! - Fire-and-forget event tracking with PII suppression
//! - A pluggable transport ([`clients::Fetcher`]) for tests and custom stacks
//!
//! ## Quick Start
//!
//! ```rust
//! use constructorio::{ApiKey, ConstructorConfig, ConstructorIO};
//!
//! let client = ConstructorIO::new(
//!     ConstructorConfig::builder()
//!         .api_key(ApiKey::new("key-abc").unwrap())
//!         .build()
//!         .unwrap(),
//! );
//! ```
//!
//! ## Searching
//!
//! ```rust,no_run
//! use constructorio::modules::search::SearchParameters;
//! use constructorio::{ApiKey, ConstructorConfig, ConstructorIO, UserContext};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ConstructorIO::new(
//!     ConstructorConfig::builder()
//!         .api_key(ApiKey::new("key-abc")?)
//!         .build()?,
//! );
//!
//! let user = UserContext::new("client-1", 3);
//! let params = SearchParameters {
//!     page: Some(2),
//!     results_per_page: Some(24),
//!     ..Default::default()
//! };
//!
//! let response = client
//!     .search()
//!     .get_search_results("red shoes", &params, Some(&user), None)
//!     .await?;
//! println!("{}", response["response"]["total_num_results"]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Timeouts
//!
//! A timeout set on the config applies to every call; one passed as
//! [`NetworkParameters`] applies to a single call and takes precedence.
//! An expired timeout aborts the request and yields an error for which
//! [`ConstructorError::is_aborted`] returns `true`.
//!
//! ## Tracking
//!
//! Tracking calls return as soon as the event is accepted. Outcomes are
//! published on a broadcast channel; see [`modules::tracker`].
//!
//! ## Design Principles
//!
//! - **No global state**: every module receives the shared config
//! - **Fail fast**: missing arguments are rejected before any request
//! - **No retries**: a failed call is re-issued by the caller, with fresh
//!   timestamps
//! - **Thread-safe**: all public types are `Send + Sync`
//! - **Async-first**: designed for use with the Tokio runtime

mod client;
pub mod clients;
pub mod config;
pub mod encoding;
pub mod error;
pub mod modules;
pub mod normalize;
mod user;

#[cfg(test)]
mod test_support;

// Re-export public types at crate root for convenience
pub use client::ConstructorIO;
pub use config::{
    ApiKey, ApiToken, ConstructorConfig, ConstructorConfigBuilder, NetworkParameters,
    SecurityToken, ServiceUrl,
};
pub use error::{ConfigError, ConstructorError, TrackerError, ValidationError};
pub use user::UserContext;

// Re-export HTTP client types
pub use clients::{Fetcher, HttpError, HttpResponseError};

// Re-export tracker types for convenience
pub use modules::tracker::{Tracker, TrackerEvent};
