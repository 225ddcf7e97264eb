//! Sectioned autocomplete suggestions.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::clients::{AuthMode, HttpClient};
use crate::config::NetworkParameters;
use crate::encoding::encode_term_segment;
use crate::error::{ConstructorError, ValidationError};
use crate::modules::{get_normalized, identity_params, merge_fmt_options, require_string, Filters};
use crate::normalize::ResponseShape;
use crate::user::UserContext;

/// Parameters for [`Autocomplete::get_autocomplete_results`].
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutocompleteParameters {
    /// Total number of suggestions across sections (`num_results`).
    #[serde(alias = "num_results")]
    pub num_results: Option<u32>,
    /// Facet filters applied to every section.
    pub filters: Option<Filters>,
    /// Per-section result counts, sent as `num_results_<section>`.
    #[serde(alias = "results_per_section")]
    pub results_per_section: Option<BTreeMap<String, u32>>,
    /// Per-section filters, sent as `filters[<section>][<name>]`.
    #[serde(alias = "filters_per_section")]
    pub filters_per_section: Option<BTreeMap<String, Filters>>,
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
    /// Opaque query state, sent as a JSON string under `qs`.
    #[serde(alias = "qs")]
    pub qs_param: Option<Value>,
}

/// Autocomplete module.
#[derive(Clone, Debug)]
pub struct Autocomplete {
    client: HttpClient,
}

impl Autocomplete {
    pub(crate) const fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Builds the URL for an autocomplete request.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if `query` is blank.
    pub fn create_autocomplete_url(
        &self,
        query: &str,
        parameters: &AutocompleteParameters,
        user: Option<&UserContext>,
    ) -> Result<String, ValidationError> {
        let term = require_string(query, "query")?;
        let config = self.client.config();

        let mut params = identity_params(config, user);
        params.insert_opt("num_results", parameters.num_results);
        if let Some(per_section) = &parameters.results_per_section {
            for (section, count) in per_section {
                params.insert(format!("num_results_{section}"), *count);
            }
        }

        let mut filters = parameters.filters.clone().unwrap_or_default();
        if let Some(per_section) = &parameters.filters_per_section {
            for (section, section_filters) in per_section {
                filters.insert(section.clone(), Value::Object(section_filters.clone()));
            }
        }
        if !filters.is_empty() {
            params.insert("filters", filters);
        }

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
        params.insert_json_string("qs", parameters.qs_param.as_ref());
        params.insert_timestamp();

        let base = config
            .service_url()
            .join(&format!("autocomplete/{}", encode_term_segment(term)));
        Ok(params.to_url(&base))
    }

    /// Retrieves autocomplete suggestions.
    ///
    /// Every item of every `sections` list is stamped with the top-level
    /// `result_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] on validation failure, HTTP failure, or a
    /// body without `sections`.
    pub async fn get_autocomplete_results(
        &self,
        query: &str,
        parameters: &AutocompleteParameters,
        user: Option<&UserContext>,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let url = self.create_autocomplete_url(query, parameters, user)?;
        get_normalized(
            &self.client,
            url,
            AuthMode::KeyOnly,
            user,
            network,
            "getAutocompleteResults",
            ResponseShape::Sections,
        )
        .await
    }
}
