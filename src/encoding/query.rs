//! Ordered query-string builder.

use serde_json::{Map, Value};

use crate::encoding::{encode_uri_component, normalize_whitespace, timestamp_millis};

/// An ordered collection of query parameters.
///
/// Values are kept as JSON until [`to_query_string`](Self::to_query_string)
/// flattens them:
///
/// - `null` values are never inserted
/// - strings are whitespace-normalized
/// - arrays become repeated keys: `a=1&a=2`
/// - objects become bracketed keys: `filters%5Bsize%5D=M`
/// - numbers print in plain decimal
///
/// # Example
///
/// ```rust
/// use constructorio::encoding::QueryParams;
/// use serde_json::json;
///
/// let mut params = QueryParams::new();
/// params.insert("page", 2);
/// params.insert("filters", json!({"size": ["M", "L"]}));
/// params.insert_opt("section", None::<String>);
///
/// assert_eq!(
///     params.to_query_string(),
///     "page=2&filters%5Bsize%5D=M&filters%5Bsize%5D=L"
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryParams {
    pairs: Vec<(String, Value)>,
}

impl QueryParams {
    /// Creates an empty parameter list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter. `null` values are dropped.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let value = value.into();
        if !value.is_null() {
            self.pairs.push((key.into(), value));
        }
    }

    /// Appends a parameter when `value` is `Some`.
    pub fn insert_opt<V: Into<Value>>(&mut self, key: impl Into<String>, value: Option<V>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    /// Appends a value serialized as a JSON string (`variations_map`,
    /// `pre_filter_expression`, `qs`).
    pub fn insert_json_string(&mut self, key: impl Into<String>, value: Option<&Value>) {
        if let Some(value) = value.filter(|v| !v.is_null()) {
            self.pairs.push((key.into(), Value::String(value.to_string())));
        }
    }

    /// Appends `_dt` with the current epoch milliseconds.
    pub fn insert_timestamp(&mut self) {
        self.insert("_dt", timestamp_millis());
    }

    /// Appends every parameter of `other`, keeping its order.
    pub fn extend(&mut self, other: &Self) {
        self.pairs.extend(other.pairs.iter().cloned());
    }

    /// Returns the first value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Returns `true` if no parameters are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Flattens the parameters into encoded `(key, value)` pairs.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for (key, value) in &self.pairs {
            flatten(key, value, &mut out);
        }
        out
    }

    /// Renders the parameters as an encoded query string (no leading `?`).
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.to_pairs()
            .iter()
            .map(|(k, v)| format!("{}={}", encode_uri_component(k), encode_uri_component(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Appends the query string to a base URL.
    #[must_use]
    pub fn to_url(&self, base: &str) -> String {
        if self.is_empty() {
            base.to_string()
        } else {
            format!("{base}?{}", self.to_query_string())
        }
    }
}

fn flatten(key: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push((key.to_string(), b.to_string())),
        Value::Number(n) => out.push((key.to_string(), format_number(n))),
        Value::String(s) => out.push((key.to_string(), normalize_whitespace(s))),
        Value::Array(items) => {
            for item in items {
                flatten(key, item, out);
            }
        }
        Value::Object(map) => flatten_object(key, map, out),
    }
}

fn flatten_object(key: &str, map: &Map<String, Value>, out: &mut Vec<(String, String)>) {
    for (sub_key, sub_value) in map {
        flatten(&format!("{key}[{sub_key}]"), sub_value, out);
    }
}

fn format_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        // f64 Display never uses exponent notation.
        n.as_f64().map_or_else(|| n.to_string(), |f| f.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_values_are_dropped() {
        let mut params = QueryParams::new();
        params.insert("a", Value::Null);
        params.insert_opt("b", None::<u32>);
        params.insert("c", json!({"x": null}));
        assert_eq!(params.to_query_string(), "");
    }

    #[test]
    fn test_arrays_repeat_keys_without_indices() {
        let mut params = QueryParams::new();
        params.insert("us", json!(["a", "b"]));
        assert_eq!(params.to_query_string(), "us=a&us=b");
    }

    #[test]
    fn test_nested_objects_use_brackets() {
        let mut params = QueryParams::new();
        params.insert("fmt_options", json!({"groups_max_depth": 3}));
        params.insert("filters", json!({"Products": {"color": "red"}}));
        assert_eq!(
            params.to_pairs(),
            vec![
                ("fmt_options[groups_max_depth]".to_string(), "3".to_string()),
                ("filters[Products][color]".to_string(), "red".to_string()),
            ]
        );
    }

    #[test]
    fn test_strings_are_whitespace_normalized() {
        let mut params = QueryParams::new();
        params.insert("term", "\u{a0}red\u{a0}shoes ");
        params.insert("filters", json!({"brand": ["New\u{a0}Balance"]}));
        assert_eq!(
            params.to_pairs(),
            vec![
                ("term".to_string(), "red shoes".to_string()),
                ("filters[brand]".to_string(), "New Balance".to_string()),
            ]
        );
    }

    #[test]
    fn test_numbers_are_plain_decimal() {
        let mut params = QueryParams::new();
        params.insert("big", 1e21_f64);
        params.insert("whole", 5.0_f64);
        params.insert("frac", 0.25_f64);
        params.insert("neg", -3_i64);
        assert_eq!(
            params.to_query_string(),
            "big=1000000000000000000000&whole=5&frac=0.25&neg=-3"
        );
    }

    #[test]
    fn test_booleans() {
        let mut params = QueryParams::new();
        params.insert("force", true);
        assert_eq!(params.to_query_string(), "force=true");
    }

    #[test]
    fn test_json_string_values() {
        let mut params = QueryParams::new();
        params.insert_json_string("variations_map", Some(&json!({"dtype": "array"})));
        params.insert_json_string("qs", None);
        assert_eq!(
            params.to_pairs(),
            vec![(
                "variations_map".to_string(),
                r#"{"dtype":"array"}"#.to_string()
            )]
        );
    }

    #[test]
    fn test_timestamp_is_inserted() {
        let mut params = QueryParams::new();
        params.insert_timestamp();
        let dt = params.get("_dt").and_then(Value::as_i64).unwrap();
        assert!(dt > 1_600_000_000_000);
    }

    #[test]
    fn test_to_url() {
        let mut params = QueryParams::new();
        assert_eq!(params.to_url("https://x/y"), "https://x/y");
        params.insert("key", "k");
        assert_eq!(params.to_url("https://x/y"), "https://x/y?key=k");
    }

    #[test]
    fn test_extend_keeps_order() {
        let mut first = QueryParams::new();
        first.insert("c", "v");
        let mut second = QueryParams::new();
        second.insert("section", "Products");
        second.insert("force", true);
        first.extend(&second);
        assert_eq!(first.to_query_string(), "c=v&section=Products&force=true");
    }

    #[test]
    fn test_keys_are_encoded() {
        let mut params = QueryParams::new();
        params.insert("ef-test cell", "on");
        assert_eq!(params.to_query_string(), "ef-test%20cell=on");
    }
}
