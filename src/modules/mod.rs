//! Constructor.io API modules.
//!
//! Each module pairs pure URL builders (`create_*_url`) with async
//! operations that dispatch the built request and normalize the response.
//! URL builders validate their arguments and fail before any network
//! activity.
//!
//! - [`search::Search`]: keyword and natural-language search
//! - [`browse::Browse`]: browse results, item lookups, groups and facets
//! - [`autocomplete::Autocomplete`]: sectioned suggestions
//! - [`recommendations::Recommendations`]: recommendation pods
//! - [`quizzes::Quizzes`]: quiz questions and results
//! - [`tasks::Tasks`]: background task status
//! - [`catalog::Catalog`]: catalog management
//! - [`tracker::Tracker`]: behavioral tracking

pub mod autocomplete;
pub mod browse;
pub mod catalog;
pub mod quizzes;
pub mod recommendations;
pub mod search;
pub mod tasks;
pub mod tracker;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::clients::{AuthMode, HttpClient, HttpMethod, HttpRequest};
use crate::config::{ConstructorConfig, NetworkParameters};
use crate::encoding::{normalize_whitespace, QueryParams};
use crate::error::{ConstructorError, ValidationError};
use crate::normalize::{normalize, ResponseShape};
use crate::user::UserContext;

/// Filter values keyed by facet name. Values are strings, numbers or lists.
pub type Filters = Map<String, Value>;

/// Result-list parameters shared by search and browse.
///
/// Deserializes from camelCase or snake_case keys:
///
/// ```rust
/// use constructorio::modules::ResultParameters;
///
/// let params: ResultParameters = serde_json::from_value(serde_json::json!({
///     "resultsPerPage": 20,
///     "sort_by": "price",
/// }))
/// .unwrap();
/// assert_eq!(params.results_per_page, Some(20));
/// assert_eq!(params.sort_by.as_deref(), Some("price"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResultParameters {
    /// Page number, 1-based (`page`).
    pub page: Option<u32>,
    /// Result offset, an alternative to `page` (`offset`).
    pub offset: Option<u32>,
    /// `num_results_per_page`.
    #[serde(alias = "num_results_per_page", alias = "numResultsPerPage")]
    pub results_per_page: Option<u32>,
    /// Facet filters (`filters[<name>]`).
    pub filters: Option<Filters>,
    /// `sort_by`.
    #[serde(alias = "sort_by")]
    pub sort_by: Option<String>,
    /// `sort_order`, `ascending` or `descending`.
    #[serde(alias = "sort_order")]
    pub sort_order: Option<String>,
    /// Index section, e.g. `Products`.
    pub section: Option<String>,
    /// Formatting options (`fmt_options[<name>]`).
    #[serde(alias = "fmt_options")]
    pub fmt_options: Option<Map<String, Value>>,
    /// Extra fields to return (`fmt_options[hidden_fields]`).
    #[serde(alias = "hidden_fields")]
    pub hidden_fields: Option<Vec<String>>,
    /// Hidden facets to return (`fmt_options[hidden_facets]`).
    #[serde(alias = "hidden_facets")]
    pub hidden_facets: Option<Vec<String>>,
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

impl ResultParameters {
    /// Appends these parameters in wire order.
    pub(crate) fn apply(&self, query: &mut QueryParams) {
        query.insert_opt("page", self.page);
        query.insert_opt("offset", self.offset);
        query.insert_opt("num_results_per_page", self.results_per_page);
        query.insert_opt("filters", self.filters.clone());
        query.insert_opt("sort_by", self.sort_by.clone());
        query.insert_opt("sort_order", self.sort_order.clone());
        query.insert_opt("section", self.section.clone());
        query.insert_opt(
            "fmt_options",
            merge_fmt_options(
                self.fmt_options.as_ref(),
                self.hidden_fields.as_deref(),
                self.hidden_facets.as_deref(),
            ),
        );
        query.insert_json_string("pre_filter_expression", self.pre_filter_expression.as_ref());
        query.insert_json_string("variations_map", self.variations_map.as_ref());
        query.insert_json_string("qs", self.qs_param.as_ref());
    }
}

/// Builds the identity parameters every URL starts with.
///
/// Order: `c`, `key`, then when present `i`, `s`, `ui`, `us`, `ef-<cell>`,
/// `origin_referrer`.
pub(crate) fn identity_params(config: &ConstructorConfig, user: Option<&UserContext>) -> QueryParams {
    let mut query = QueryParams::new();
    query.insert("c", config.version());
    query.insert("key", config.api_key().as_ref());

    let Some(user) = user else {
        return query;
    };
    query.insert_opt("i", user.client_id.clone());
    query.insert_opt("s", user.session_id);
    query.insert_opt("ui", user.user_id.clone());
    query.insert_opt("us", user.segments.clone());
    if let Some(cells) = &user.test_cells {
        for (name, cell) in cells {
            query.insert(format!("ef-{name}"), cell.as_str());
        }
    }
    query.insert_opt("origin_referrer", user.origin_referrer.clone());
    query
}

/// Folds `hidden_fields` and `hidden_facets` into `fmt_options`.
///
/// Existing `fmt_options` entries are kept; hidden lists are appended to
/// any list already present under the same key.
pub(crate) fn merge_fmt_options(
    fmt_options: Option<&Map<String, Value>>,
    hidden_fields: Option<&[String]>,
    hidden_facets: Option<&[String]>,
) -> Option<Value> {
    if fmt_options.is_none() && hidden_fields.is_none() && hidden_facets.is_none() {
        return None;
    }

    let mut merged = fmt_options.cloned().unwrap_or_default();
    for (key, extra) in [("hidden_fields", hidden_fields), ("hidden_facets", hidden_facets)] {
        let Some(extra) = extra else { continue };
        let entry = merged
            .entry(key)
            .or_insert_with(|| Value::Array(Vec::new()));
        match entry {
            Value::Array(list) => list.extend(extra.iter().cloned().map(Value::String)),
            other => {
                let mut list = vec![other.take()];
                list.extend(extra.iter().cloned().map(Value::String));
                *other = Value::Array(list);
            }
        }
    }
    Some(Value::Object(merged))
}

/// Rejects a blank required string argument.
pub(crate) fn require_string<'a>(
    value: &'a str,
    field: &'static str,
) -> Result<&'a str, ValidationError> {
    if normalize_whitespace(value).is_empty() {
        return Err(ValidationError::required(field, "string"));
    }
    Ok(value)
}

/// Rejects an empty required list argument, or one holding a blank entry.
pub(crate) fn require_list<S: AsRef<str>>(
    values: &[S],
    field: &'static str,
) -> Result<Vec<String>, ValidationError> {
    if values.is_empty() || values.iter().any(|v| v.as_ref().trim().is_empty()) {
        return Err(ValidationError::required(field, "array"));
    }
    Ok(values.iter().map(|v| v.as_ref().to_string()).collect())
}

/// Dispatches a GET and normalizes the body.
pub(crate) async fn get_normalized(
    client: &HttpClient,
    url: String,
    auth: AuthMode,
    user: Option<&UserContext>,
    network: Option<&NetworkParameters>,
    operation: &'static str,
    shape: ResponseShape,
) -> Result<Value, ConstructorError> {
    let request = HttpRequest::builder(HttpMethod::Get, url)
        .auth(auth)
        .build()
        .map_err(crate::clients::HttpError::from)?;
    let response = client.dispatch(request, user, network).await?;
    normalize(operation, shape, response.body)
}
