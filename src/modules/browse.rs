//! Browse results, item lookups, groups and facets.
//!
//! Browse groups and browse facets are served from cache upstream and do
//! not carry `_dt`; every other browse URL does.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::clients::{AuthMode, HttpClient};
use crate::config::NetworkParameters;
use crate::encoding::{encode_path_segment, QueryParams};
use crate::error::{ConstructorError, ValidationError};
use crate::modules::{
    get_normalized, identity_params, require_list, require_string, Filters, ResultParameters,
};
use crate::normalize::ResponseShape;
use crate::user::UserContext;

/// Parameters for browse results and item-id lookups.
pub type BrowseParameters = ResultParameters;

/// Parameters for [`Browse::get_browse_groups`].
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrowseGroupsParameters {
    /// Facet filters; `group_id` narrows to a subtree.
    pub filters: Option<Filters>,
    /// Index section.
    pub section: Option<String>,
    /// `fmt_options[<name>]`, e.g. `groups_max_depth`.
    #[serde(alias = "fmt_options")]
    pub fmt_options: Option<Map<String, Value>>,
}

/// Parameters for [`Browse::get_browse_facets`].
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrowseFacetsParameters {
    /// Page number, 1-based.
    pub page: Option<u32>,
    /// Result offset.
    pub offset: Option<u32>,
    /// `num_results_per_page`.
    #[serde(alias = "num_results_per_page", alias = "numResultsPerPage")]
    pub results_per_page: Option<u32>,
    /// Index section.
    pub section: Option<String>,
    /// `fmt_options[<name>]`, e.g. `show_hidden_facets`.
    #[serde(alias = "fmt_options")]
    pub fmt_options: Option<Map<String, Value>>,
}

/// Parameters for [`Browse::get_browse_facet_options`].
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrowseFacetOptionsParameters {
    /// Index section.
    pub section: Option<String>,
    /// `fmt_options[<name>]`.
    #[serde(alias = "fmt_options")]
    pub fmt_options: Option<Map<String, Value>>,
}

/// Browse module.
#[derive(Clone, Debug)]
pub struct Browse {
    client: HttpClient,
}

impl Browse {
    pub(crate) const fn new(client: HttpClient) -> Self {
        Self { client }
    }

    fn url(&self, path: &str, params: &QueryParams) -> String {
        params.to_url(&self.client.config().service_url().join(path))
    }

    /// Builds the URL for browse results under a filter.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if `filter_name` or `filter_value` is blank.
    pub fn create_browse_url(
        &self,
        filter_name: &str,
        filter_value: &str,
        parameters: &BrowseParameters,
        user: Option<&UserContext>,
    ) -> Result<String, ValidationError> {
        let name = require_string(filter_name, "filterName")?;
        let value = require_string(filter_value, "filterValue")?;

        let mut params = identity_params(self.client.config(), user);
        parameters.apply(&mut params);
        params.insert_timestamp();

        Ok(self.url(
            &format!(
                "browse/{}/{}",
                encode_path_segment(name),
                encode_path_segment(value)
            ),
            &params,
        ))
    }

    /// Retrieves browse results for a filter name and value.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] on validation failure, HTTP failure, or a
    /// body with neither `response.results` nor `response.redirect`.
    pub async fn get_browse_results(
        &self,
        filter_name: &str,
        filter_value: &str,
        parameters: &BrowseParameters,
        user: Option<&UserContext>,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let url = self.create_browse_url(filter_name, filter_value, parameters, user)?;
        get_normalized(
            &self.client,
            url,
            AuthMode::KeyOnly,
            user,
            network,
            "getBrowseResults",
            ResponseShape::Results,
        )
        .await
    }

    /// Builds the URL for browse results restricted to item ids.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if `item_ids` is empty.
    pub fn create_browse_items_url<S: AsRef<str>>(
        &self,
        item_ids: &[S],
        parameters: &BrowseParameters,
        user: Option<&UserContext>,
    ) -> Result<String, ValidationError> {
        let ids = require_list(item_ids, "itemIds")?;

        let mut params = identity_params(self.client.config(), user);
        params.insert("ids", ids);
        parameters.apply(&mut params);
        params.insert_timestamp();

        Ok(self.url("browse/items", &params))
    }

    /// Retrieves browse results for a list of item ids.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] on validation failure, HTTP failure, or a
    /// malformed body.
    pub async fn get_browse_results_for_item_ids<S: AsRef<str> + Sync>(
        &self,
        item_ids: &[S],
        parameters: &BrowseParameters,
        user: Option<&UserContext>,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let url = self.create_browse_items_url(item_ids, parameters, user)?;
        get_normalized(
            &self.client,
            url,
            AuthMode::KeyOnly,
            user,
            network,
            "getBrowseResultsForItemIds",
            ResponseShape::Results,
        )
        .await
    }

    /// Builds the URL for the browse group tree.
    #[must_use]
    pub fn create_browse_groups_url(
        &self,
        parameters: &BrowseGroupsParameters,
        user: Option<&UserContext>,
    ) -> String {
        let mut params = identity_params(self.client.config(), user);
        params.insert_opt("filters", parameters.filters.clone());
        params.insert_opt("section", parameters.section.clone());
        params.insert_opt("fmt_options", parameters.fmt_options.clone());
        self.url("browse/groups", &params)
    }

    /// Retrieves the browse group tree.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] on HTTP failure or a body without
    /// `response.groups`.
    pub async fn get_browse_groups(
        &self,
        parameters: &BrowseGroupsParameters,
        user: Option<&UserContext>,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let url = self.create_browse_groups_url(parameters, user);
        get_normalized(
            &self.client,
            url,
            AuthMode::KeyOnly,
            user,
            network,
            "getBrowseGroups",
            ResponseShape::Groups,
        )
        .await
    }

    /// Builds the URL for the browse facet list.
    #[must_use]
    pub fn create_browse_facets_url(
        &self,
        parameters: &BrowseFacetsParameters,
        user: Option<&UserContext>,
    ) -> String {
        let mut params = identity_params(self.client.config(), user);
        params.insert_opt("page", parameters.page);
        params.insert_opt("offset", parameters.offset);
        params.insert_opt("num_results_per_page", parameters.results_per_page);
        params.insert_opt("section", parameters.section.clone());
        params.insert_opt("fmt_options", parameters.fmt_options.clone());
        self.url("browse/facets", &params)
    }

    /// Retrieves the browse facet list.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] on HTTP failure or a body without
    /// `response.facets`.
    pub async fn get_browse_facets(
        &self,
        parameters: &BrowseFacetsParameters,
        user: Option<&UserContext>,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let url = self.create_browse_facets_url(parameters, user);
        get_normalized(
            &self.client,
            url,
            AuthMode::KeyOnly,
            user,
            network,
            "getBrowseFacets",
            ResponseShape::Facets,
        )
        .await
    }

    /// Builds the URL for the options of one facet.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if `facet_name` is blank.
    pub fn create_browse_facet_options_url(
        &self,
        facet_name: &str,
        parameters: &BrowseFacetOptionsParameters,
        user: Option<&UserContext>,
    ) -> Result<String, ValidationError> {
        let name = require_string(facet_name, "facetName")?;

        let mut params = identity_params(self.client.config(), user);
        params.insert("facet_name", name);
        params.insert_opt("section", parameters.section.clone());
        params.insert_opt("fmt_options", parameters.fmt_options.clone());
        params.insert_timestamp();

        Ok(self.url("browse/facet_options", &params))
    }

    /// Retrieves the options of one facet.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] on validation failure, HTTP failure, or a
    /// body without `response.facets`.
    pub async fn get_browse_facet_options(
        &self,
        facet_name: &str,
        parameters: &BrowseFacetOptionsParameters,
        user: Option<&UserContext>,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let url = self.create_browse_facet_options_url(facet_name, parameters, user)?;
        get_normalized(
            &self.client,
            url,
            AuthMode::KeyOnly,
            user,
            network,
            "getBrowseFacetOptions",
            ResponseShape::Facets,
        )
        .await
    }
}
