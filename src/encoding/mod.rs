//! Parameter encoding helpers.
//!
//! Everything that turns caller-supplied values into wire text lives here:
//! whitespace normalization, RFC 3986 component encoding, camelCase to
//! snake_case conversion, and the ordered [`QueryParams`] builder.

mod query;

pub use query::QueryParams;

use serde_json::{Map, Value};

/// Replaces every Unicode whitespace character (non-breaking space
/// included) with a regular space, then trims both ends.
///
/// ```rust
/// use constructorio::encoding::normalize_whitespace;
///
/// assert_eq!(normalize_whitespace("\u{a0}red\u{a0}shoes\t"), "red shoes");
/// ```
#[must_use]
pub fn normalize_whitespace(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Percent-encodes a URI component per RFC 3986.
///
/// Only unreserved characters (`A-Z a-z 0-9 - . _ ~`) pass through;
/// `!'()*` are encoded too.
#[must_use]
pub fn encode_uri_component(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Encodes a search or autocomplete term for use as a path segment.
///
/// Whitespace is normalized and a leading `/` becomes `|` before encoding.
#[must_use]
pub fn encode_term_segment(term: &str) -> String {
    let normalized = normalize_whitespace(term);
    let routed = normalized
        .strip_prefix('/')
        .map_or_else(|| normalized.clone(), |rest| format!("|{rest}"));
    encode_uri_component(&routed)
}

/// Encodes an identifier for use as a path segment.
#[must_use]
pub fn encode_path_segment(value: &str) -> String {
    encode_uri_component(&normalize_whitespace(value))
}

/// Converts a camelCase identifier to snake_case.
///
/// Already snake_cased identifiers are returned unchanged.
///
/// ```rust
/// use constructorio::encoding::to_snake_case;
///
/// assert_eq!(to_snake_case("variationId"), "variation_id");
/// assert_eq!(to_snake_case("numResultsViewed"), "num_results_viewed");
/// assert_eq!(to_snake_case("item_id"), "item_id");
/// ```
#[must_use]
pub fn to_snake_case(identifier: &str) -> String {
    let mut out = String::with_capacity(identifier.len() + 4);
    for (index, c) in identifier.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if index > 0 && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Recursively snake_cases every object key in a JSON value.
#[must_use]
pub fn snake_case_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (to_snake_case(&k), snake_case_keys(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(snake_case_keys).collect()),
        other => other,
    }
}

/// Returns the current epoch time in milliseconds, for `_dt`.
#[must_use]
pub fn timestamp_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
