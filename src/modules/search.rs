//! Keyword and natural-language search.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::clients::{AuthMode, HttpClient};
use crate::config::NetworkParameters;
use crate::encoding::encode_term_segment;
use crate::error::{ConstructorError, ValidationError};
use crate::modules::{get_normalized, identity_params, merge_fmt_options, require_string, ResultParameters};
use crate::normalize::ResponseShape;
use crate::user::UserContext;

/// Parameters for [`Search::get_search_results`].
pub type SearchParameters = ResultParameters;

/// Parameters for [`Search::get_voice_search_results`].
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VoiceSearchParameters {
    /// Page number, 1-based.
    pub page: Option<u32>,
    /// Result offset.
    pub offset: Option<u32>,
    /// `num_results_per_page`.
    #[serde(alias = "num_results_per_page", alias = "numResultsPerPage")]
    pub results_per_page: Option<u32>,
    /// Index section.
    pub section: Option<String>,
    /// `fmt_options[<name>]`.
    #[serde(alias = "fmt_options")]
    pub fmt_options: Option<Map<String, Value>>,
    /// `fmt_options[hidden_fields]`.
    #[serde(alias = "hidden_fields")]
    pub hidden_fields: Option<Vec<String>>,
    /// `fmt_options[hidden_facets]`.
    #[serde(alias = "hidden_facets")]
    pub hidden_facets: Option<Vec<String>>,
    /// Variation grouping rules, sent as a JSON string.
    #[serde(alias = "variations_map")]
    pub variations_map: Option<Value>,
}

/// Search module.
#[derive(Clone, Debug)]
pub struct Search {
    client: HttpClient,
}

impl Search {
    pub(crate) const fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Builds the URL for a search request.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if `query` is blank.
    pub fn create_search_url(
        &self,
        query: &str,
        parameters: &SearchParameters,
        user: Option<&UserContext>,
    ) -> Result<String, ValidationError> {
        let term = require_string(query, "query")?;
        let config = self.client.config();

        let mut params = identity_params(config, user);
        parameters.apply(&mut params);
        params.insert_timestamp();

        let base = config
            .service_url()
            .join(&format!("search/{}", encode_term_segment(term)));
        Ok(params.to_url(&base))
    }

    /// Retrieves search results.
    ///
    /// The response either carries `response.results`, each stamped with the
    /// top-level `result_id`, or a `response.redirect` passed through as-is.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] on validation failure, HTTP failure, or a
    /// malformed body.
    pub async fn get_search_results(
        &self,
        query: &str,
        parameters: &SearchParameters,
        user: Option<&UserContext>,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let url = self.create_search_url(query, parameters, user)?;
        get_normalized(
            &self.client,
            url,
            AuthMode::KeyOnly,
            user,
            network,
            "getSearchResults",
            ResponseShape::Results,
        )
        .await
    }

    /// Builds the URL for a natural-language search request.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if `query` is blank.
    pub fn create_voice_search_url(
        &self,
        query: &str,
        parameters: &VoiceSearchParameters,
        user: Option<&UserContext>,
    ) -> Result<String, ValidationError> {
        let term = require_string(query, "query")?;
        let config = self.client.config();

        let mut params = identity_params(config, user);
        params.insert_opt("page", parameters.page);
        params.insert_opt("offset", parameters.offset);
        params.insert_opt("num_results_per_page", parameters.results_per_page);
        params.insert_opt("section", parameters.section.clone());
        params.insert_opt(
            "fmt_options",
            merge_fmt_options(
                parameters.fmt_options.as_ref(),
                parameters.hidden_fields.as_deref(),
                parameters.hidden_facets.as_deref(),
            ),
        );
        params.insert_json_string("variations_map", parameters.variations_map.as_ref());
        params.insert_timestamp();

        let base = config
            .service_url()
            .join(&format!("search/natural_language/{}", encode_term_segment(term)));
        Ok(params.to_url(&base))
    }

    /// Retrieves results for a natural-language query.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] on validation failure, HTTP failure, or a
    /// malformed body.
    pub async fn get_voice_search_results(
        &self,
        query: &str,
        parameters: &VoiceSearchParameters,
        user: Option<&UserContext>,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let url = self.create_voice_search_url(query, parameters, user)?;
        get_normalized(
            &self.client,
            url,
            AuthMode::KeyOnly,
            user,
            network,
            "getVoiceSearchResults",
            ResponseShape::Results,
        )
        .await
    }
}
