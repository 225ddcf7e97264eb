//! One-way synonyms, synonym groups and redirect rules.

use serde::Deserialize;
use serde_json::{json, Value};

use super::{segment, Catalog, ListParameters};
use crate::clients::HttpMethod;
use crate::config::NetworkParameters;
use crate::encoding::QueryParams;
use crate::error::{ConstructorError, ValidationError};
use crate::modules::require_list;

/// Parameters for [`Catalog::get_redirect_rules`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RedirectRulesParameters {
    /// Page number, 1-based.
    pub page: Option<u32>,
    /// `num_results_per_page`.
    #[serde(alias = "num_results_per_page", alias = "resultsPerPage")]
    pub num_results_per_page: Option<u32>,
    /// Restrict to rules matching this query.
    pub query: Option<String>,
    /// Restrict by status: `current`, `pending` or `expired`.
    pub status: Option<String>,
}

fn list_query(parameters: &ListParameters) -> QueryParams {
    let mut query = QueryParams::new();
    parameters.apply(&mut query);
    query
}

impl Catalog {
    /// Adds a one-way synonym (`POST /v1/one_way_synonyms/{phrase}`).
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `phrase` is blank, `child_phrases` is
    /// empty, no API token is configured, or on HTTP failure.
    pub async fn add_one_way_synonym<S: AsRef<str> + Sync>(
        &self,
        phrase: &str,
        child_phrases: &[S],
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let path = format!("v1/one_way_synonyms/{}", segment(phrase, "phrase")?);
        let body = child_phrase_body(child_phrases)?;
        self.send(HttpMethod::Post, &path, &QueryParams::new(), Some(body), network)
            .await
    }

    /// Replaces the children of a one-way synonym
    /// (`PUT /v1/one_way_synonyms/{phrase}`).
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `phrase` is blank, `child_phrases` is
    /// empty, no API token is configured, or on HTTP failure.
    pub async fn modify_one_way_synonym<S: AsRef<str> + Sync>(
        &self,
        phrase: &str,
        child_phrases: &[S],
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let path = format!("v1/one_way_synonyms/{}", segment(phrase, "phrase")?);
        let body = child_phrase_body(child_phrases)?;
        self.send(HttpMethod::Put, &path, &QueryParams::new(), Some(body), network)
            .await
    }

    /// Retrieves one one-way synonym.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `phrase` is blank, no API token is
    /// configured, or on HTTP failure.
    pub async fn get_one_way_synonym(
        &self,
        phrase: &str,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let path = format!("v1/one_way_synonyms/{}", segment(phrase, "phrase")?);
        self.get(&path, &QueryParams::new(), network).await
    }

    /// Lists one-way synonyms.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if no API token is configured or on HTTP
    /// failure.
    pub async fn get_one_way_synonyms(
        &self,
        parameters: &ListParameters,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        self.get("v1/one_way_synonyms", &list_query(parameters), network)
            .await
    }

    /// Removes one one-way synonym.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `phrase` is blank, no API token is
    /// configured, or on HTTP failure.
    pub async fn remove_one_way_synonym(
        &self,
        phrase: &str,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let path = format!("v1/one_way_synonyms/{}", segment(phrase, "phrase")?);
        self.send(HttpMethod::Delete, &path, &QueryParams::new(), None, network)
            .await
    }

    /// Removes every one-way synonym.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if no API token is configured or on HTTP
    /// failure.
    pub async fn remove_one_way_synonyms(
        &self,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        self.send(HttpMethod::Delete, "v1/one_way_synonyms", &QueryParams::new(), None, network)
            .await
    }

    /// Adds a synonym group (`POST /v1/synonym_groups`).
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `synonyms` is empty, no API token is
    /// configured, or on HTTP failure.
    pub async fn add_synonym_group<S: AsRef<str> + Sync>(
        &self,
        synonyms: &[S],
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let body = json!({ "synonyms": require_list(synonyms, "synonyms")? });
        self.send(HttpMethod::Post, "v1/synonym_groups", &QueryParams::new(), Some(body), network)
            .await
    }

    /// Replaces the phrases of a synonym group
    /// (`PUT /v1/synonym_groups/{id}`).
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `id` is blank, `synonyms` is empty, no
    /// API token is configured, or on HTTP failure.
    pub async fn modify_synonym_group<S: AsRef<str> + Sync>(
        &self,
        id: &str,
        synonyms: &[S],
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let path = format!("v1/synonym_groups/{}", segment(id, "id")?);
        let body = json!({ "synonyms": require_list(synonyms, "synonyms")? });
        self.send(HttpMethod::Put, &path, &QueryParams::new(), Some(body), network)
            .await
    }

    /// Retrieves one synonym group.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `id` is blank, no API token is
    /// configured, or on HTTP failure.
    pub async fn get_synonym_group(
        &self,
        id: &str,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let path = format!("v1/synonym_groups/{}", segment(id, "id")?);
        self.get(&path, &QueryParams::new(), network).await
    }

    /// Lists synonym groups, optionally restricted to those holding `phrase`.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if no API token is configured or on HTTP
    /// failure.
    pub async fn get_synonym_groups(
        &self,
        phrase: Option<&str>,
        parameters: &ListParameters,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let mut query = QueryParams::new();
        query.insert_opt("phrase", phrase);
        parameters.apply(&mut query);
        self.get("v1/synonym_groups", &query, network).await
    }

    /// Removes one synonym group.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `id` is blank, no API token is
    /// configured, or on HTTP failure.
    pub async fn remove_synonym_group(
        &self,
        id: &str,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let path = format!("v1/synonym_groups/{}", segment(id, "id")?);
        self.send(HttpMethod::Delete, &path, &QueryParams::new(), None, network)
            .await
    }

    /// Removes every synonym group.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if no API token is configured or on HTTP
    /// failure.
    pub async fn remove_synonym_groups(
        &self,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        self.send(HttpMethod::Delete, "v1/synonym_groups", &QueryParams::new(), None, network)
            .await
    }

    /// Adds a redirect rule (`POST /v1/redirect_rules`).
    ///
    /// `rule` must carry `url` and a non-empty `matches` list.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `rule` lacks `url` or `matches`, no
    /// API token is configured, or on HTTP failure.
    pub async fn add_redirect_rule(
        &self,
        rule: Value,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        validate_redirect_rule(&rule)?;
        self.send(HttpMethod::Post, "v1/redirect_rules", &QueryParams::new(), Some(rule), network)
            .await
    }

    /// Replaces a redirect rule (`PUT /v1/redirect_rules/{id}`).
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `id` is blank, `rule` lacks `url` or
    /// `matches`, no API token is configured, or on HTTP failure.
    pub async fn update_redirect_rule(
        &self,
        id: &str,
        rule: Value,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let path = format!("v1/redirect_rules/{}", segment(id, "id")?);
        validate_redirect_rule(&rule)?;
        self.send(HttpMethod::Put, &path, &QueryParams::new(), Some(rule), network)
            .await
    }

    /// Partially updates a redirect rule (`PATCH /v1/redirect_rules/{id}`).
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `id` is blank, no API token is
    /// configured, or on HTTP failure.
    pub async fn modify_redirect_rule(
        &self,
        id: &str,
        changes: Value,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let path = format!("v1/redirect_rules/{}", segment(id, "id")?);
        self.send(HttpMethod::Patch, &path, &QueryParams::new(), Some(changes), network)
            .await
    }

    /// Retrieves one redirect rule.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `id` is blank, no API token is
    /// configured, or on HTTP failure.
    pub async fn get_redirect_rule(
        &self,
        id: &str,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let path = format!("v1/redirect_rules/{}", segment(id, "id")?);
        self.get(&path, &QueryParams::new(), network).await
    }

    /// Lists redirect rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if no API token is configured or on HTTP
    /// failure.
    pub async fn get_redirect_rules(
        &self,
        parameters: &RedirectRulesParameters,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let mut query = QueryParams::new();
        query.insert_opt("num_results_per_page", parameters.num_results_per_page);
        query.insert_opt("page", parameters.page);
        query.insert_opt("query", parameters.query.clone());
        query.insert_opt("status", parameters.status.clone());
        self.get("v1/redirect_rules", &query, network).await
    }

    /// Removes one redirect rule.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `id` is blank, no API token is
    /// configured, or on HTTP failure.
    pub async fn remove_redirect_rule(
        &self,
        id: &str,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let path = format!("v1/redirect_rules/{}", segment(id, "id")?);
        self.send(HttpMethod::Delete, &path, &QueryParams::new(), None, network)
            .await
    }
}

fn child_phrase_body<S: AsRef<str>>(child_phrases: &[S]) -> Result<Value, ValidationError> {
    let phrases = require_list(child_phrases, "childPhrases")?;
    let children: Vec<Value> = phrases
        .into_iter()
        .map(|phrase| json!({ "phrase": phrase }))
        .collect();
    Ok(json!({ "child_phrases": children }))
}

fn validate_redirect_rule(rule: &Value) -> Result<(), ValidationError> {
    if !rule
        .get("url")
        .and_then(Value::as_str)
        .is_some_and(|url| !url.trim().is_empty())
    {
        return Err(ValidationError::required("url", "string"));
    }
    if !rule
        .get("matches")
        .and_then(Value::as_array)
        .is_some_and(|matches| !matches.is_empty())
    {
        return Err(ValidationError::required("matches", "array"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::tests::catalog;
    use super::*;
    use crate::clients::RequestBody;
    use crate::test_support::{query_value, MockFetcher};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_add_one_way_synonym_body() {
        let fetcher = Arc::new(MockFetcher::new());
        catalog(fetcher.clone())
            .add_one_way_synonym("spices", &["pepper", "cumin"], None)
            .await
            .unwrap();

        let request = &fetcher.requests()[0];
        assert_eq!(request.method, HttpMethod::Post);
        assert!(request
            .url
            .starts_with("https://ac.cnstrc.com/v1/one_way_synonyms/spices?"));
        assert_eq!(
            request.body,
            Some(RequestBody::Json(json!({
                "child_phrases": [{"phrase": "pepper"}, {"phrase": "cumin"}]
            })))
        );
    }

    #[tokio::test]
    async fn test_synonym_validation() {
        let fetcher = Arc::new(MockFetcher::new());
        let catalog = catalog(fetcher.clone());
        let none: [&str; 0] = [];

        let err = catalog.add_one_way_synonym("", &["x"], None).await.unwrap_err();
        assert_eq!(err.to_string(), "phrase is a required parameter of type string");

        let err = catalog.add_synonym_group(&none, None).await.unwrap_err();
        assert_eq!(err.to_string(), "synonyms is a required parameter of type array");
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_get_synonym_groups_query() {
        let fetcher = Arc::new(MockFetcher::new());
        let params = ListParameters {
            page: Some(2),
            ..Default::default()
        };
        catalog(fetcher.clone())
            .get_synonym_groups(Some("shirt"), &params, None)
            .await
            .unwrap();
        let url = fetcher.last_url();
        assert_eq!(query_value(&url, "phrase").as_deref(), Some("shirt"));
        assert_eq!(query_value(&url, "page").as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_redirect_rule_requires_url_and_matches() {
        let fetcher = Arc::new(MockFetcher::new());
        let catalog = catalog(fetcher.clone());

        let err = catalog
            .add_redirect_rule(json!({"matches": [{"pattern": "sale"}]}), None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "url is a required parameter of type string");

        let err = catalog
            .add_redirect_rule(json!({"url": "/sale", "matches": []}), None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "matches is a required parameter of type array");
        assert_eq!(fetcher.calls(), 0);

        catalog
            .add_redirect_rule(
                json!({"url": "/sale", "matches": [{"pattern": "sale", "match_type": "EXACT"}]}),
                None,
            )
            .await
            .unwrap();
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_modify_redirect_rule_uses_patch() {
        let fetcher = Arc::new(MockFetcher::new());
        catalog(fetcher.clone())
            .modify_redirect_rule("7", json!({"url": "/new"}), None)
            .await
            .unwrap();
        let request = &fetcher.requests()[0];
        assert_eq!(request.method, HttpMethod::Patch);
        assert!(request.url.starts_with("https://ac.cnstrc.com/v1/redirect_rules/7?"));
    }
}
