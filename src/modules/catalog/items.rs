//! Items, variations and item groups.

use serde::Deserialize;
use serde_json::{json, Value};

use super::{require_documents, segment, Catalog, CatalogOptions, ListParameters};
use crate::clients::HttpMethod;
use crate::config::NetworkParameters;
use crate::encoding::QueryParams;
use crate::error::ConstructorError;

/// Parameters for [`Catalog::retrieve_items`] and
/// [`Catalog::retrieve_variations`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetrieveParameters {
    /// Restrict to these ids, sent as repeated `id`.
    pub ids: Option<Vec<String>>,
    /// Restrict variations to one parent item (`item_id`).
    #[serde(alias = "item_id")]
    pub item_id: Option<String>,
    /// Index section.
    pub section: Option<String>,
    /// Page number, 1-based.
    pub page: Option<u32>,
    /// `num_results_per_page`.
    #[serde(alias = "num_results_per_page", alias = "resultsPerPage")]
    pub num_results_per_page: Option<u32>,
}

impl RetrieveParameters {
    fn query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        query.insert_opt("id", self.ids.clone());
        query.insert_opt("item_id", self.item_id.clone());
        query.insert_opt("section", self.section.clone());
        query.insert_opt("page", self.page);
        query.insert_opt("num_results_per_page", self.num_results_per_page);
        query
    }
}

fn options_query(options: &CatalogOptions) -> QueryParams {
    let mut query = QueryParams::new();
    options.apply(&mut query);
    query
}

impl Catalog {
    async fn write_documents(
        &self,
        method: HttpMethod,
        path: &str,
        field: &'static str,
        documents: Vec<Value>,
        options: &CatalogOptions,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        require_documents(&documents, field)?;
        let body = json!({ field: documents });
        self.send(method, path, &options_query(options), Some(body), network)
            .await
    }

    /// Creates or replaces items (`PUT /v2/items`).
    ///
    /// Items are processed asynchronously; the response carries a task id.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `items` is empty, no API token is
    /// configured, or on HTTP failure.
    pub async fn create_or_replace_items(
        &self,
        items: Vec<Value>,
        options: &CatalogOptions,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        self.write_documents(HttpMethod::Put, "v2/items", "items", items, options, network)
            .await
    }

    /// Partially updates items (`PATCH /v2/items`).
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `items` is empty, no API token is
    /// configured, or on HTTP failure.
    pub async fn update_items(
        &self,
        items: Vec<Value>,
        options: &CatalogOptions,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        self.write_documents(HttpMethod::Patch, "v2/items", "items", items, options, network)
            .await
    }

    /// Deletes items by id (`DELETE /v2/items`).
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `items` is empty, no API token is
    /// configured, or on HTTP failure.
    pub async fn delete_items(
        &self,
        items: Vec<Value>,
        options: &CatalogOptions,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        self.write_documents(HttpMethod::Delete, "v2/items", "items", items, options, network)
            .await
    }

    /// Retrieves items (`GET /v2/items`).
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if no API token is configured or on HTTP
    /// failure.
    pub async fn retrieve_items(
        &self,
        parameters: &RetrieveParameters,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        self.get("v2/items", &parameters.query(), network).await
    }

    /// Creates or replaces variations (`PUT /v2/variations`).
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `variations` is empty, no API token is
    /// configured, or on HTTP failure.
    pub async fn create_or_replace_variations(
        &self,
        variations: Vec<Value>,
        options: &CatalogOptions,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        self.write_documents(
            HttpMethod::Put,
            "v2/variations",
            "variations",
            variations,
            options,
            network,
        )
        .await
    }

    /// Partially updates variations (`PATCH /v2/variations`).
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `variations` is empty, no API token is
    /// configured, or on HTTP failure.
    pub async fn update_variations(
        &self,
        variations: Vec<Value>,
        options: &CatalogOptions,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        self.write_documents(
            HttpMethod::Patch,
            "v2/variations",
            "variations",
            variations,
            options,
            network,
        )
        .await
    }

    /// Deletes variations by id (`DELETE /v2/variations`).
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `variations` is empty, no API token is
    /// configured, or on HTTP failure.
    pub async fn delete_variations(
        &self,
        variations: Vec<Value>,
        options: &CatalogOptions,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        self.write_documents(
            HttpMethod::Delete,
            "v2/variations",
            "variations",
            variations,
            options,
            network,
        )
        .await
    }

    /// Retrieves variations (`GET /v2/variations`).
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if no API token is configured or on HTTP
    /// failure.
    pub async fn retrieve_variations(
        &self,
        parameters: &RetrieveParameters,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        self.get("v2/variations", &parameters.query(), network).await
    }

    /// Adds item groups (`POST /v1/item_groups`).
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `item_groups` is empty, no API token is
    /// configured, or on HTTP failure.
    pub async fn add_item_groups(
        &self,
        item_groups: Vec<Value>,
        options: &CatalogOptions,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        self.write_documents(
            HttpMethod::Post,
            "v1/item_groups",
            "item_groups",
            item_groups,
            options,
            network,
        )
        .await
    }

    /// Adds item groups or updates existing ones (`PATCH /v1/item_groups`).
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `item_groups` is empty, no API token is
    /// configured, or on HTTP failure.
    pub async fn add_or_update_item_groups(
        &self,
        item_groups: Vec<Value>,
        options: &CatalogOptions,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        self.write_documents(
            HttpMethod::Patch,
            "v1/item_groups",
            "item_groups",
            item_groups,
            options,
            network,
        )
        .await
    }

    /// Lists item groups (`GET /v1/item_groups`).
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if no API token is configured or on HTTP
    /// failure.
    pub async fn get_item_groups(
        &self,
        parameters: &ListParameters,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let mut query = QueryParams::new();
        parameters.apply(&mut query);
        self.get("v1/item_groups", &query, network).await
    }

    /// Retrieves one item group (`GET /v1/item_groups/{id}`).
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `id` is blank, no API token is
    /// configured, or on HTTP failure.
    pub async fn get_item_group(
        &self,
        id: &str,
        section: Option<&str>,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let path = format!("v1/item_groups/{}", segment(id, "id")?);
        let mut query = QueryParams::new();
        query.insert_opt("section", section);
        self.get(&path, &query, network).await
    }

    /// Replaces one item group (`PUT /v1/item_groups/{id}`).
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `id` is blank, no API token is
    /// configured, or on HTTP failure.
    pub async fn modify_item_group(
        &self,
        id: &str,
        item_group: Value,
        options: &CatalogOptions,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let path = format!("v1/item_groups/{}", segment(id, "id")?);
        self.send(HttpMethod::Put, &path, &options_query(options), Some(item_group), network)
            .await
    }

    /// Removes every item group in the section (`DELETE /v1/item_groups`).
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if no API token is configured or on HTTP
    /// failure.
    pub async fn remove_item_groups(
        &self,
        options: &CatalogOptions,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        self.send(HttpMethod::Delete, "v1/item_groups", &options_query(options), None, network)
            .await
    }
}
