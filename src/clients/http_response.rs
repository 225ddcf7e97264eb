//! HTTP response types for the Constructor.io client.

use std::collections::HashMap;

/// A parsed response from the Constructor.io API.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// The reason phrase reported with the status.
    pub status_text: String,
    /// The final response URL.
    pub url: String,
    /// Response headers (headers may have multiple values).
    pub headers: HashMap<String, Vec<String>>,
    /// The parsed response body; `Null` for empty bodies.
    pub body: serde_json::Value,
}

impl HttpResponse {
    /// Creates a new `HttpResponse`.
    #[must_use]
    pub fn new(
        code: u16,
        status_text: impl Into<String>,
        url: impl Into<String>,
        headers: HashMap<String, Vec<String>>,
        body: serde_json::Value,
    ) -> Self {
        Self {
            code,
            status_text: status_text.into(),
            url: url.into(),
            headers,
            body,
        }
    }

    /// Returns `true` if the response status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Returns the first value of a header, by lowercase name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_ok_returns_true_for_2xx() {
        for code in 200..=299 {
            let response = HttpResponse::new(code, "", "", HashMap::new(), json!({}));
            assert!(response.is_ok(), "Expected is_ok() to be true for code {code}");
        }
    }

    #[test]
    fn test_is_ok_returns_false_for_4xx_and_5xx() {
        for code in [400, 401, 404, 429, 500, 503] {
            let response = HttpResponse::new(code, "", "", HashMap::new(), json!({}));
            assert!(!response.is_ok());
        }
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let mut headers = HashMap::new();
        headers.insert("x-request-id".to_string(), vec!["abc-123".to_string()]);

        let response = HttpResponse::new(200, "OK", "", headers, json!({}));
        assert_eq!(response.header("X-Request-Id"), Some("abc-123"));
    }
}
