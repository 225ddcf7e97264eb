//! Error types for the Constructor.io client.
//!
//! This module contains the configuration, validation and operation-level
//! error types used throughout the crate.
//!
//! # Error Handling
//!
//! - [`ConfigError`]: raised while building a [`ConstructorConfig`](crate::ConstructorConfig)
//! - [`ValidationError`]: raised before any network activity when a required
//!   argument is missing or malformed
//! - [`ConstructorError`]: returned by every module operation
//! - [`TrackerError`]: returned when a tracking event cannot be accepted
//!
//! Validation messages are stable strings; callers may match on them.
//!
//! # Example
//!
//! ```rust
//! use constructorio::{ApiKey, ConfigError};
//!
//! let result = ApiKey::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyApiKey)));
//! ```

use thiserror::Error;

use crate::clients::HttpError;

/// Errors that can occur while configuring the client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// API key cannot be empty.
    #[error("API key cannot be empty. Please provide a valid Constructor.io API key.")]
    EmptyApiKey,

    /// API token cannot be empty when provided.
    #[error("API token cannot be empty. Omit it or provide a valid Constructor.io API token.")]
    EmptyApiToken,

    /// Security token cannot be empty when provided.
    #[error("Security token cannot be empty.")]
    EmptySecurityToken,

    /// Service URL is invalid.
    #[error("Invalid service URL '{url}'. Expected a host such as 'ac.cnstrc.com' or 'https://ac.cnstrc.com'.")]
    InvalidServiceUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// The default HTTP transport could not be created.
    #[error("Failed to initialize the HTTP transport: {reason}")]
    TransportUnavailable {
        /// The underlying failure.
        reason: String,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },
}

/// A pre-flight validation failure.
///
/// Raised synchronously by URL builders and tracking calls before any
/// request is attempted. The rendered messages are part of the public
/// contract.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required argument is missing, empty, or of the wrong shape.
    #[error("{field} is a required parameter of type {expected}")]
    RequiredParameter {
        /// The camelCase parameter name.
        field: &'static str,
        /// The expected type (`string`, `array`, `number`, `object`).
        expected: &'static str,
    },

    /// A required user parameter is missing.
    #[error("{field} is a required user parameter of type {expected}")]
    RequiredUserParameter {
        /// The camelCase user parameter name.
        field: &'static str,
        /// The expected type.
        expected: &'static str,
    },

    /// `variationId` was supplied to a recommendations call without any `itemIds`.
    #[error("itemIds is a required parameter for variationId")]
    VariationWithoutItems,

    /// The operation needs an API token but none is configured.
    #[error("apiToken is required for this operation")]
    MissingApiToken,

    /// A parameter value is present but cannot be sent as-is.
    #[error("{field} is invalid: {reason}")]
    InvalidParameter {
        /// The camelCase parameter name.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::RequiredParameter`].
    #[must_use]
    pub const fn required(field: &'static str, expected: &'static str) -> Self {
        Self::RequiredParameter { field, expected }
    }
}

/// Error returned by module operations.
#[derive(Debug, Error)]
pub enum ConstructorError {
    /// The call was rejected before any request was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The request failed at the transport or HTTP level.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The response body did not have the shape expected for the operation.
    #[error("{operation} response data is malformed")]
    MalformedResponse {
        /// The camelCase operation name, e.g. `getBrowseResults`.
        operation: &'static str,
    },

    /// The response body could not be decoded into the requested type.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ConstructorError {
    /// Returns `true` if the request was cancelled by its timeout.
    #[must_use]
    pub const fn is_aborted(&self) -> bool {
        matches!(self, Self::Http(HttpError::Aborted { .. }))
    }
}

/// Error returned when a tracking event is not accepted.
///
/// Failures of the request itself are never returned; they are reported
/// through [`TrackerEvent::Error`](crate::modules::tracker::TrackerEvent).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrackerError {
    /// The event is missing a user or event parameter.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Tracking was called outside a Tokio runtime.
    #[error("Tracking requires a running Tokio runtime")]
    NoRuntime,
}
