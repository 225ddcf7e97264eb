//! Recommendation pods.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::clients::{AuthMode, HttpClient};
use crate::config::NetworkParameters;
use crate::encoding::encode_path_segment;
use crate::error::{ConstructorError, ValidationError};
use crate::modules::{get_normalized, identity_params, merge_fmt_options, require_string, Filters};
use crate::normalize::ResponseShape;
use crate::user::UserContext;

/// Parameters for [`Recommendations::get_recommendations`].
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecommendationsParameters {
    /// Seed items, sent as repeated `item_id`.
    #[serde(alias = "item_ids", alias = "item_id", alias = "itemId")]
    pub item_ids: Option<Vec<String>>,
    /// Seed variation; requires `item_ids`.
    #[serde(alias = "variation_id")]
    pub variation_id: Option<String>,
    /// Number of results (`num_results`).
    #[serde(alias = "num_results")]
    pub num_results: Option<u32>,
    /// Index section.
    pub section: Option<String>,
    /// Seed search term, for query-based pods.
    pub term: Option<String>,
    /// Facet filters.
    pub filters: Option<Filters>,
    /// `fmt_options[<name>]`.
    #[serde(alias = "fmt_options")]
    pub fmt_options: Option<Map<String, Value>>,
    /// `fmt_options[hidden_fields]`.
    #[serde(alias = "hidden_fields")]
    pub hidden_fields: Option<Vec<String>>,
    /// Variation grouping rules, sent as a JSON string.
    #[serde(alias = "variations_map")]
    pub variations_map: Option<Value>,
    /// Pre-filter expression, sent as a JSON string.
    #[serde(alias = "pre_filter_expression")]
    pub pre_filter_expression: Option<Value>,
}

/// Parameters for [`Recommendations::get_recommendation_pods`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecommendationPodsParameters {
    /// Index section.
    pub section: Option<String>,
}

/// Recommendations module.
#[derive(Clone, Debug)]
pub struct Recommendations {
    client: HttpClient,
}

impl Recommendations {
    pub(crate) const fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Builds the URL for a recommendation pod.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if `pod_id` is blank, or if
    /// `variation_id` is set without any `item_ids`.
    pub fn create_recommendations_url(
        &self,
        pod_id: &str,
        parameters: &RecommendationsParameters,
        user: Option<&UserContext>,
    ) -> Result<String, ValidationError> {
        let pod_id = require_string(pod_id, "podId")?;
        let item_ids = parameters
            .item_ids
            .as_ref()
            .filter(|ids| !ids.is_empty());
        if parameters.variation_id.is_some() && item_ids.is_none() {
            return Err(ValidationError::VariationWithoutItems);
        }

        let config = self.client.config();
        let mut params = identity_params(config, user);
        params.insert_opt("item_id", item_ids.cloned());
        params.insert_opt("variation_id", parameters.variation_id.clone());
        params.insert_opt("num_results", parameters.num_results);
        params.insert_opt("section", parameters.section.clone());
        params.insert_opt("term", parameters.term.clone());
        params.insert_opt("filters", parameters.filters.clone());
        params.insert_opt(
            "fmt_options",
            merge_fmt_options(
                parameters.fmt_options.as_ref(),
                parameters.hidden_fields.as_deref(),
                None,
            ),
        );
        params.insert_json_string("variations_map", parameters.variations_map.as_ref());
        params.insert_json_string("pre_filter_expression", parameters.pre_filter_expression.as_ref());
        params.insert_timestamp();

        let base = config
            .service_url()
            .join(&format!("recommendations/v1/pods/{}", encode_path_segment(pod_id)));
        Ok(params.to_url(&base))
    }

    /// Retrieves recommendations from a pod.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] on validation failure, HTTP failure, or a
    /// malformed body.
    pub async fn get_recommendations(
        &self,
        pod_id: &str,
        parameters: &RecommendationsParameters,
        user: Option<&UserContext>,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let url = self.create_recommendations_url(pod_id, parameters, user)?;
        get_normalized(
            &self.client,
            url,
            AuthMode::KeyOnly,
            user,
            network,
            "getRecommendations",
            ResponseShape::Results,
        )
        .await
    }

    /// Builds the URL listing the index's recommendation pods.
    #[must_use]
    pub fn create_recommendation_pods_url(&self, parameters: &RecommendationPodsParameters) -> String {
        let config = self.client.config();
        let mut params = identity_params(config, None);
        params.insert_opt("section", parameters.section.clone());
        params.insert_timestamp();
        params.to_url(&config.service_url().join("v1/recommendation_pods"))
    }

    /// Lists the index's recommendation pods. Requires an API token.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if no API token is configured, on HTTP
    /// failure, or for a body without `pods`.
    pub async fn get_recommendation_pods(
        &self,
        parameters: &RecommendationPodsParameters,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        self.client.require_token()?;
        let url = self.create_recommendation_pods_url(parameters);
        get_normalized(
            &self.client,
            url,
            AuthMode::Token,
            None,
            network,
            "getRecommendationPods",
            ResponseShape::Pods,
        )
        .await
    }
}
