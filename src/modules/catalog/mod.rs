//! Catalog management.
//!
//! Every catalog call requires an API token and sends it as
//! `Authorization: Basic`. Reads carry `_dt`; writes never do.
//!
//! Operations are grouped by resource:
//!
//! - items, variations and item groups (`items`)
//! - one-way synonyms, synonym groups and redirect rules (`rules`)
//! - facet configurations, facet option configurations and
//!   searchabilities (`facets`)
//! - bulk CSV uploads (`csv`)
//!
//! # Example
//!
//! ```rust,no_run
//! use constructorio::modules::catalog::CatalogOptions;
//! use constructorio::{ApiKey, ApiToken, ConstructorConfig, ConstructorIO};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ConstructorIO::new(
//!     ConstructorConfig::builder()
//!         .api_key(ApiKey::new("key-abc")?)
//!         .api_token(ApiToken::new("tok-xyz")?)
//!         .build()?,
//! );
//! let catalog = client.catalog().expect("catalog enabled");
//!
//! catalog
//!     .create_or_replace_items(
//!         vec![json!({"id": "sku-1", "name": "Red Shoe", "data": {"url": "/p/sku-1"}})],
//!         &CatalogOptions::default(),
//!         None,
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod csv;
mod facets;
mod items;
mod rules;

pub use csv::CatalogFiles;
pub use facets::SearchabilitiesParameters;
pub use items::RetrieveParameters;
pub use rules::RedirectRulesParameters;

use serde::Deserialize;
use serde_json::Value;

use crate::clients::{AuthMode, HttpClient, HttpError, HttpMethod, HttpRequest};
use crate::config::NetworkParameters;
use crate::encoding::{encode_path_segment, QueryParams};
use crate::error::{ConstructorError, ValidationError};
use crate::modules::{identity_params, require_string};

/// Query options shared by catalog writes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogOptions {
    /// Index section; the API defaults to `Products`.
    pub section: Option<String>,
    /// Process the request even if it would invalidate a large share of
    /// the catalog.
    pub force: Option<bool>,
    /// Address notified when an asynchronous task fails.
    #[serde(alias = "notification_email")]
    pub notification_email: Option<String>,
    /// Behavior for items missing from an update: `FAIL`, `IGNORE` or
    /// `CREATE`.
    #[serde(alias = "on_missing")]
    pub on_missing: Option<String>,
}

impl CatalogOptions {
    /// Options targeting a single section.
    #[must_use]
    pub fn section(section: impl Into<String>) -> Self {
        Self {
            section: Some(section.into()),
            ..Self::default()
        }
    }

    pub(crate) fn apply(&self, query: &mut QueryParams) {
        query.insert_opt("section", self.section.clone());
        query.insert_opt("force", self.force);
        query.insert_opt("notification_email", self.notification_email.clone());
        query.insert_opt("on_missing", self.on_missing.clone());
    }
}

/// Paging parameters for catalog listings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListParameters {
    /// Page number, 1-based.
    pub page: Option<u32>,
    /// `num_results_per_page`.
    #[serde(alias = "num_results_per_page", alias = "resultsPerPage")]
    pub num_results_per_page: Option<u32>,
    /// Index section.
    pub section: Option<String>,
}

impl ListParameters {
    pub(crate) fn apply(&self, query: &mut QueryParams) {
        query.insert_opt("page", self.page);
        query.insert_opt("num_results_per_page", self.num_results_per_page);
        query.insert_opt("section", self.section.clone());
    }
}

/// Catalog module.
#[derive(Clone, Debug)]
pub struct Catalog {
    client: HttpClient,
}

impl Catalog {
    pub(crate) const fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Builds a catalog URL.
    ///
    /// `path` is joined onto the service URL; `query` follows the `c` and
    /// `key` parameters. `_dt` is appended when `timestamp` is set.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if `path` is blank.
    pub fn create_catalog_url(
        &self,
        path: &str,
        query: &QueryParams,
        timestamp: bool,
    ) -> Result<String, ValidationError> {
        if path.trim().trim_matches('/').is_empty() {
            return Err(ValidationError::required("path", "string"));
        }
        let config = self.client.config();

        let mut params = identity_params(config, None);
        params.extend(query);
        if timestamp {
            params.insert_timestamp();
        }
        Ok(params.to_url(&config.service_url().join(path)))
    }

    /// Sends an authenticated catalog request and returns the JSON body.
    ///
    /// An empty response body yields `Value::Null`.
    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        query: &QueryParams,
        body: Option<Value>,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        self.client.require_token()?;
        let url = self.create_catalog_url(path, query, method == HttpMethod::Get)?;

        let mut builder = HttpRequest::builder(method, url).auth(AuthMode::Token);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let request = builder.build().map_err(HttpError::from)?;

        let response = self.client.dispatch(request, None, network).await?;
        Ok(response.body)
    }

    async fn get(
        &self,
        path: &str,
        query: &QueryParams,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        self.send(HttpMethod::Get, path, query, None, network).await
    }
}

/// Encodes a caller-supplied identifier as a path segment.
fn segment(value: &str, field: &'static str) -> Result<String, ValidationError> {
    require_string(value, field).map(encode_path_segment)
}

/// Rejects an empty list of entity documents.
fn require_documents(documents: &[Value], field: &'static str) -> Result<(), ValidationError> {
    if documents.is_empty() {
        return Err(ValidationError::required(field, "array"));
    }
    Ok(())
}
