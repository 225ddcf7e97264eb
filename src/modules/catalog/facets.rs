//! Facet configurations, facet option configurations and searchabilities.

use serde::Deserialize;
use serde_json::{json, Value};

use super::{require_documents, segment, Catalog, ListParameters};
use crate::clients::HttpMethod;
use crate::config::NetworkParameters;
use crate::encoding::QueryParams;
use crate::error::{ConstructorError, ValidationError};

/// Parameters for [`Catalog::retrieve_searchabilities`].
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchabilitiesParameters {
    /// Restrict to a single searchability by name.
    pub name: Option<String>,
    /// Restrict to searchable (`true`) or non-searchable fields.
    pub searchable: Option<bool>,
    /// Page number, 1-based.
    pub page: Option<u32>,
    /// Result offset.
    pub offset: Option<u32>,
    /// `num_results_per_page`.
    #[serde(alias = "num_results_per_page", alias = "resultsPerPage")]
    pub num_results_per_page: Option<u32>,
    /// `sort_by`.
    #[serde(alias = "sort_by")]
    pub sort_by: Option<String>,
    /// `sort_order`.
    #[serde(alias = "sort_order")]
    pub sort_order: Option<String>,
    /// Index section.
    pub section: Option<String>,
}

fn section_query(section: Option<&str>) -> QueryParams {
    let mut query = QueryParams::new();
    query.insert_opt("section", section);
    query
}

fn facet_path(facet_name: &str) -> Result<String, ValidationError> {
    Ok(format!("v1/facets/{}", segment(facet_name, "facetName")?))
}

fn facet_options_path(facet_name: &str) -> Result<String, ValidationError> {
    Ok(format!("{}/options", facet_path(facet_name)?))
}

fn facet_option_path(facet_name: &str, value: &str) -> Result<String, ValidationError> {
    Ok(format!(
        "{}/{}",
        facet_options_path(facet_name)?,
        segment(value, "value")?
    ))
}

/// Requires a non-blank `name` in a facet configuration document.
fn require_name(configuration: &Value) -> Result<&str, ValidationError> {
    configuration
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.trim().is_empty())
        .ok_or(ValidationError::required("name", "string"))
}

impl Catalog {
    /// Adds a facet configuration (`POST /v1/facets`).
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `configuration` has no `name`, no API
    /// token is configured, or on HTTP failure.
    pub async fn add_facet_configuration(
        &self,
        configuration: Value,
        section: Option<&str>,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        require_name(&configuration)?;
        self.send(
            HttpMethod::Post,
            "v1/facets",
            &section_query(section),
            Some(configuration),
            network,
        )
        .await
    }

    /// Lists facet configurations.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if no API token is configured or on HTTP
    /// failure.
    pub async fn get_facet_configurations(
        &self,
        parameters: &ListParameters,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let mut query = QueryParams::new();
        parameters.apply(&mut query);
        self.get("v1/facets", &query, network).await
    }

    /// Retrieves one facet configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `facet_name` is blank, no API token is
    /// configured, or on HTTP failure.
    pub async fn get_facet_configuration(
        &self,
        facet_name: &str,
        section: Option<&str>,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        self.get(&facet_path(facet_name)?, &section_query(section), network)
            .await
    }

    /// Partially updates several facet configurations (`PATCH /v1/facets`).
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `configurations` is empty, no API token
    /// is configured, or on HTTP failure.
    pub async fn modify_facet_configurations(
        &self,
        configurations: Vec<Value>,
        section: Option<&str>,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        require_documents(&configurations, "facetConfigurations")?;
        self.send(
            HttpMethod::Patch,
            "v1/facets",
            &section_query(section),
            Some(Value::Array(configurations)),
            network,
        )
        .await
    }

    /// Replaces one facet configuration (`PUT /v1/facets/{name}`).
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `configuration` has no `name`, no API
    /// token is configured, or on HTTP failure.
    pub async fn replace_facet_configuration(
        &self,
        configuration: Value,
        section: Option<&str>,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let path = facet_path(require_name(&configuration)?)?;
        self.send(HttpMethod::Put, &path, &section_query(section), Some(configuration), network)
            .await
    }

    /// Partially updates one facet configuration (`PATCH /v1/facets/{name}`).
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `configuration` has no `name`, no API
    /// token is configured, or on HTTP failure.
    pub async fn modify_facet_configuration(
        &self,
        configuration: Value,
        section: Option<&str>,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let path = facet_path(require_name(&configuration)?)?;
        self.send(HttpMethod::Patch, &path, &section_query(section), Some(configuration), network)
            .await
    }

    /// Removes one facet configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `facet_name` is blank, no API token is
    /// configured, or on HTTP failure.
    pub async fn remove_facet_configuration(
        &self,
        facet_name: &str,
        section: Option<&str>,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        self.send(
            HttpMethod::Delete,
            &facet_path(facet_name)?,
            &section_query(section),
            None,
            network,
        )
        .await
    }

    /// Adds a facet option configuration
    /// (`POST /v1/facets/{facet}/options`).
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `facet_name` is blank, no API token is
    /// configured, or on HTTP failure.
    pub async fn add_facet_option_configuration(
        &self,
        facet_name: &str,
        configuration: Value,
        section: Option<&str>,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        self.send(
            HttpMethod::Post,
            &facet_options_path(facet_name)?,
            &section_query(section),
            Some(configuration),
            network,
        )
        .await
    }

    /// Adds or updates several facet option configurations
    /// (`PATCH /v1/facets/{facet}/options`).
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `facet_name` is blank, `configurations`
    /// is empty, no API token is configured, or on HTTP failure.
    pub async fn add_or_modify_facet_option_configurations(
        &self,
        facet_name: &str,
        configurations: Vec<Value>,
        section: Option<&str>,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let path = facet_options_path(facet_name)?;
        require_documents(&configurations, "facetOptionConfigurations")?;
        self.send(
            HttpMethod::Patch,
            &path,
            &section_query(section),
            Some(json!({ "facet_options": configurations })),
            network,
        )
        .await
    }

    /// Lists the option configurations of a facet.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `facet_name` is blank, no API token is
    /// configured, or on HTTP failure.
    pub async fn get_facet_option_configurations(
        &self,
        facet_name: &str,
        parameters: &ListParameters,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let mut query = QueryParams::new();
        parameters.apply(&mut query);
        self.get(&facet_options_path(facet_name)?, &query, network)
            .await
    }

    /// Retrieves one facet option configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `facet_name` or `value` is blank, no
    /// API token is configured, or on HTTP failure.
    pub async fn get_facet_option_configuration(
        &self,
        facet_name: &str,
        value: &str,
        section: Option<&str>,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        self.get(
            &facet_option_path(facet_name, value)?,
            &section_query(section),
            network,
        )
        .await
    }

    /// Replaces one facet option configuration
    /// (`PUT /v1/facets/{facet}/options/{value}`).
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `facet_name` or `value` is blank, no
    /// API token is configured, or on HTTP failure.
    pub async fn replace_facet_option_configuration(
        &self,
        facet_name: &str,
        value: &str,
        configuration: Value,
        section: Option<&str>,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        self.send(
            HttpMethod::Put,
            &facet_option_path(facet_name, value)?,
            &section_query(section),
            Some(configuration),
            network,
        )
        .await
    }

    /// Partially updates one facet option configuration
    /// (`PATCH /v1/facets/{facet}/options/{value}`).
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `facet_name` or `value` is blank, no
    /// API token is configured, or on HTTP failure.
    pub async fn modify_facet_option_configuration(
        &self,
        facet_name: &str,
        value: &str,
        configuration: Value,
        section: Option<&str>,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        self.send(
            HttpMethod::Patch,
            &facet_option_path(facet_name, value)?,
            &section_query(section),
            Some(configuration),
            network,
        )
        .await
    }

    /// Removes one facet option configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `facet_name` or `value` is blank, no
    /// API token is configured, or on HTTP failure.
    pub async fn remove_facet_option_configuration(
        &self,
        facet_name: &str,
        value: &str,
        section: Option<&str>,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        self.send(
            HttpMethod::Delete,
            &facet_option_path(facet_name, value)?,
            &section_query(section),
            None,
            network,
        )
        .await
    }

    /// Lists searchability settings (`GET /v1/searchabilities`).
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if no API token is configured or on HTTP
    /// failure.
    pub async fn retrieve_searchabilities(
        &self,
        parameters: &SearchabilitiesParameters,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let mut query = QueryParams::new();
        query.insert_opt("name", parameters.name.clone());
        query.insert_opt("searchable", parameters.searchable);
        query.insert_opt("page", parameters.page);
        query.insert_opt("offset", parameters.offset);
        query.insert_opt("num_results_per_page", parameters.num_results_per_page);
        query.insert_opt("sort_by", parameters.sort_by.clone());
        query.insert_opt("sort_order", parameters.sort_order.clone());
        query.insert_opt("section", parameters.section.clone());
        self.get("v1/searchabilities", &query, network).await
    }

    /// Updates searchability settings (`PATCH /v1/searchabilities`).
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `searchabilities` is empty, no API
    /// token is configured, or on HTTP failure.
    pub async fn patch_searchabilities(
        &self,
        searchabilities: Vec<Value>,
        section: Option<&str>,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        require_documents(&searchabilities, "searchabilities")?;
        self.send(
            HttpMethod::Patch,
            "v1/searchabilities",
            &section_query(section),
            Some(json!({ "searchabilities": searchabilities })),
            network,
        )
        .await
    }
}
