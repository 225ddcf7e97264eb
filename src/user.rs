//! Per-call user context.
//!
//! A [`UserContext`] describes the end user a request is made on behalf of.
//! Identity fields are folded into the query string; network fields (IP,
//! user agent, language, referer) become request headers.

use std::collections::BTreeMap;

use crate::error::ValidationError;

/// The end user a request is made on behalf of.
///
/// All fields are optional. The tracker requires `session_id` and
/// `client_id`.
///
/// # Example
///
/// ```rust
/// use constructorio::UserContext;
///
/// let user = UserContext {
///     client_id: Some("c".to_string()),
///     session_id: Some(2),
///     ..Default::default()
/// };
/// assert!(user.require_identity().is_ok());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
    /// Session number (`s`).
    pub session_id: Option<u64>,
    /// Client identifier (`i`).
    pub client_id: Option<String>,
    /// Logged-in user identifier (`ui`).
    pub user_id: Option<String>,
    /// User segments (`us`, repeated).
    pub segments: Option<Vec<String>>,
    /// A/B test cells, sent as `ef-<name>=<cell>`.
    pub test_cells: Option<BTreeMap<String, String>>,
    /// Sent as `X-Forwarded-For`.
    pub user_ip: Option<String>,
    /// Sent as `User-Agent`.
    pub user_agent: Option<String>,
    /// Sent as `Accept-Language`.
    pub accept_language: Option<String>,
    /// Sent as `Referer`.
    pub referer: Option<String>,
    /// The page that referred the user (`origin_referrer`).
    pub origin_referrer: Option<String>,
}

impl UserContext {
    /// Creates an identity-only context.
    #[must_use]
    pub fn new(client_id: impl Into<String>, session_id: u64) -> Self {
        Self {
            client_id: Some(client_id.into()),
            session_id: Some(session_id),
            ..Self::default()
        }
    }

    /// Checks the identity tracking requires.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::RequiredUserParameter`] when `session_id`
    /// or a non-empty `client_id` is missing.
    pub fn require_identity(&self) -> Result<(u64, &str), ValidationError> {
        let session_id = self
            .session_id
            .ok_or(ValidationError::RequiredUserParameter {
                field: "sessionId",
                expected: "number",
            })?;
        let client_id = self
            .client_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or(ValidationError::RequiredUserParameter {
                field: "clientId",
                expected: "string",
            })?;
        Ok((session_id, client_id))
    }

    /// Returns the request headers derived from this context.
    #[must_use]
    pub fn headers(&self) -> Vec<(&'static str, &str)> {
        let mut headers = Vec::new();
        if let Some(ip) = self.user_ip.as_deref() {
            headers.push(("X-Forwarded-For", ip));
        }
        if let Some(agent) = self.user_agent.as_deref() {
            headers.push(("User-Agent", agent));
        }
        if let Some(language) = self.accept_language.as_deref() {
            headers.push(("Accept-Language", language));
        }
        if let Some(referer) = self.referer.as_deref() {
            headers.push(("Referer", referer));
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_identity_missing_session() {
        let user = UserContext {
            client_id: Some("c".to_string()),
            ..Default::default()
        };
        let err = user.require_identity().unwrap_err();
        assert_eq!(
            err.to_string(),
            "sessionId is a required user parameter of type number"
        );
    }

    #[test]
    fn test_require_identity_missing_client() {
        let user = UserContext {
            session_id: Some(1),
            client_id: Some("  ".to_string()),
            ..Default::default()
        };
        let err = user.require_identity().unwrap_err();
        assert_eq!(
            err.to_string(),
            "clientId is a required user parameter of type string"
        );
    }

    #[test]
    fn test_headers_only_include_present_fields() {
        let user = UserContext {
            user_ip: Some("127.0.0.1".to_string()),
            referer: Some("https://shop.example/".to_string()),
            ..Default::default()
        };
        assert_eq!(
            user.headers(),
            vec![
                ("X-Forwarded-For", "127.0.0.1"),
                ("Referer", "https://shop.example/"),
            ]
        );
    }

    #[test]
    fn test_deserializes_camel_case() {
        let user: UserContext = serde_json::from_value(serde_json::json!({
            "clientId": "abc",
            "sessionId": 4,
            "testCells": {"algo": "v2"}
        }))
        .unwrap();
        assert_eq!(user.client_id.as_deref(), Some("abc"));
        assert_eq!(user.session_id, Some(4));
        assert_eq!(user.test_cells.unwrap().get("algo").map(String::as_str), Some("v2"));
    }
}
