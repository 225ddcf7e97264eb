//! Response shape validation and `result_id` propagation.
//!
//! Every read endpoint hands its parsed body to [`normalize`] together with
//! the [`ResponseShape`] it expects. Bodies that match are decorated and
//! returned; bodies that do not match fail with
//! `"<operation> response data is malformed"`.

use serde_json::Value;

use crate::error::ConstructorError;

/// The minimum structure a response must have.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseShape {
    /// `sections` map of result lists (autocomplete).
    Sections,
    /// `response.results` list, or a `response.redirect` pass-through.
    Results,
    /// `response.groups` (browse groups).
    Groups,
    /// `response.facets` (browse facets, facet options).
    Facets,
    /// `pods` list (recommendation pod listing).
    Pods,
    /// `quiz_version_id` present (quizzes); results are stamped when present.
    Quiz,
    /// No structural requirement.
    Any,
}

/// Validates `body` against `shape` and stamps `result_id` onto result items.
///
/// # Errors
///
/// Returns [`ConstructorError::MalformedResponse`] naming `operation` when
/// the body does not match the shape.
///
/// # Example
///
/// ```rust
/// use constructorio::normalize::{normalize, ResponseShape};
/// use serde_json::json;
///
/// let body = json!({"result_id": "r1", "response": {"results": [{"value": "a"}]}});
/// let body = normalize("getSearchResults", ResponseShape::Results, body).unwrap();
/// assert_eq!(body["response"]["results"][0]["result_id"], "r1");
/// ```
pub fn normalize(
    operation: &'static str,
    shape: ResponseShape,
    mut body: Value,
) -> Result<Value, ConstructorError> {
    let malformed = || ConstructorError::MalformedResponse { operation };

    match shape {
        ResponseShape::Results => {
            let response = body.get("response").ok_or_else(malformed)?;
            if response.get("results").is_some_and(Value::is_array) {
                stamp_results(&mut body);
            } else if response.get("redirect").is_none() {
                return Err(malformed());
            }
        }
        ResponseShape::Sections => {
            if !body.get("sections").is_some_and(Value::is_object) {
                return Err(malformed());
            }
            stamp_sections(&mut body);
        }
        ResponseShape::Groups => require_nested(&body, "groups").ok_or_else(malformed)?,
        ResponseShape::Facets => require_nested(&body, "facets").ok_or_else(malformed)?,
        ResponseShape::Pods => {
            if !body.get("pods").is_some_and(Value::is_array) {
                return Err(malformed());
            }
        }
        ResponseShape::Quiz => {
            if body.get("quiz_version_id").is_none() {
                return Err(malformed());
            }
            stamp_results(&mut body);
        }
        ResponseShape::Any => {}
    }

    Ok(body)
}

fn require_nested(body: &Value, field: &str) -> Option<()> {
    body.get("response")?.get(field).map(|_| ())
}

fn result_id(body: &Value) -> Option<Value> {
    body.get("result_id").filter(|id| !id.is_null()).cloned()
}

fn stamp_items(items: &mut [Value], result_id: &Value) {
    for item in items {
        if let Value::Object(fields) = item {
            fields.insert("result_id".to_string(), result_id.clone());
        }
    }
}

fn stamp_results(body: &mut Value) {
    let Some(result_id) = result_id(body) else {
        return;
    };
    if let Some(Value::Array(results)) = body.pointer_mut("/response/results") {
        stamp_items(results, &result_id);
    }
}

fn stamp_sections(body: &mut Value) {
    let Some(result_id) = result_id(body) else {
        return;
    };
    if let Some(Value::Object(sections)) = body.get_mut("sections") {
        for list in sections.values_mut() {
            if let Value::Array(items) = list {
                stamp_items(items, &result_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_every_result_gets_result_id() {
        let body = json!({
            "result_id": "abc",
            "response": {"results": [{"data": {"id": 1}}, {"data": {"id": 2}}, {"data": {"id": 3}}]}
        });
        let body = normalize("getBrowseResults", ResponseShape::Results, body).unwrap();
        let results = body["response"]["results"].as_array().unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r["result_id"] == "abc"));
        assert_eq!(results[1]["data"]["id"], 2);
    }

    #[test]
    fn test_results_without_result_id_are_untouched() {
        let body = json!({"response": {"results": [{"value": "x"}]}});
        let out = normalize("getSearchResults", ResponseShape::Results, body.clone()).unwrap();
        assert_eq!(out, body);
    }

    #[test]
    fn test_redirect_passes_through() {
        let body = json!({
            "result_id": "abc",
            "response": {"redirect": {"data": {"url": "/sale"}}}
        });
        let out = normalize("getSearchResults", ResponseShape::Results, body.clone()).unwrap();
        assert_eq!(out, body);
    }

    #[test]
    fn test_missing_results_and_redirect_is_malformed() {
        let err = normalize(
            "getBrowseResults",
            ResponseShape::Results,
            json!({"response": {}}),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "getBrowseResults response data is malformed");

        let err = normalize("getBrowseResults", ResponseShape::Results, json!({})).unwrap_err();
        assert_eq!(err.to_string(), "getBrowseResults response data is malformed");
    }

    #[test]
    fn test_sections_are_stamped() {
        let body = json!({
            "result_id": "r9",
            "sections": {
                "Products": [{"value": "a"}],
                "Search Suggestions": [{"value": "b"}, {"value": "c"}]
            }
        });
        let body = normalize("getAutocompleteResults", ResponseShape::Sections, body).unwrap();
        for list in body["sections"].as_object().unwrap().values() {
            for item in list.as_array().unwrap() {
                assert_eq!(item["result_id"], "r9");
            }
        }
    }

    #[test]
    fn test_missing_sections_is_malformed() {
        let err = normalize(
            "getAutocompleteResults",
            ResponseShape::Sections,
            json!({"result_id": "x"}),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "getAutocompleteResults response data is malformed"
        );
    }

    #[test]
    fn test_stamping_overwrites_only_result_id() {
        let body = json!({
            "result_id": "new",
            "response": {"results": [{"result_id": "old", "value": "kept"}]}
        });
        let body = normalize("getRecommendations", ResponseShape::Results, body).unwrap();
        assert_eq!(body["response"]["results"][0]["result_id"], "new");
        assert_eq!(body["response"]["results"][0]["value"], "kept");
    }

    #[test]
    fn test_groups_facets_pods_quiz_shapes() {
        assert!(normalize("getBrowseGroups", ResponseShape::Groups, json!({"response": {"groups": []}})).is_ok());
        assert!(normalize("getBrowseGroups", ResponseShape::Groups, json!({"response": {}})).is_err());
        assert!(normalize("getBrowseFacets", ResponseShape::Facets, json!({"response": {"facets": []}})).is_ok());
        assert!(normalize("getRecommendationPods", ResponseShape::Pods, json!({"pods": []})).is_ok());
        assert!(normalize("getQuizResults", ResponseShape::Quiz, json!({"quiz_version_id": "v"})).is_ok());
        assert!(normalize("getQuizResults", ResponseShape::Quiz, json!({})).is_err());
        assert!(normalize("getAllTasks", ResponseShape::Any, Value::Null).is_ok());
    }
}
