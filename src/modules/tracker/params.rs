//! Event parameters for tracking calls.
//!
//! Each struct serializes to the snake_case body of its behavioral action.
//! Nested item lists are passed as JSON and have their keys snake_cased
//! before sending, so `{"itemId": "a"}` and `{"item_id": "a"}` are
//! equivalent.

use serde::Serialize;
use serde_json::{Map, Value};

/// Parameters for [`Tracker::track_autocomplete_select`](super::Tracker::track_autocomplete_select).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AutocompleteSelectParameters {
    /// What the user had typed when they selected the suggestion.
    pub original_query: String,
    /// The autocomplete section the suggestion came from.
    pub section: String,
    /// Trigger type, e.g. `click`.
    pub tr: Option<String>,
    /// Group the suggestion was scoped to.
    pub group_id: Option<String>,
    /// Display name of that group.
    pub display_name: Option<String>,
    /// Item identifier of the suggestion.
    pub item_id: Option<String>,
    /// Variation identifier of the suggestion.
    pub variation_id: Option<String>,
}

/// Parameters for [`Tracker::track_search_submit`](super::Tracker::track_search_submit).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchSubmitParameters {
    /// What the user had typed when they submitted.
    pub original_query: String,
    /// Group the search was scoped to.
    pub group_id: Option<String>,
    /// Display name of that group.
    pub display_name: Option<String>,
}

/// A product detail page was viewed.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ItemDetailLoadParameters {
    pub item_id: String,
    pub item_name: String,
    pub variation_id: Option<String>,
    pub url: Option<String>,
    pub section: Option<String>,
    pub analytics_tags: Option<Map<String, Value>>,
}

/// Search results were shown.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SearchResultLoadParameters {
    pub search_term: String,
    pub result_count: Option<u32>,
    pub result_page: Option<u32>,
    pub result_id: Option<String>,
    pub items: Option<Vec<Value>>,
    pub url: Option<String>,
    pub section: Option<String>,
    pub analytics_tags: Option<Map<String, Value>>,
}

/// A search result was clicked.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SearchResultClickParameters {
    pub search_term: String,
    pub item_id: String,
    pub item_name: Option<String>,
    pub variation_id: Option<String>,
    pub result_id: Option<String>,
    pub result_position_on_page: Option<u32>,
    pub num_results_per_page: Option<u32>,
    pub selected_filters: Option<Value>,
    pub section: Option<String>,
    pub analytics_tags: Option<Map<String, Value>>,
}

/// An item was added to cart, wishlisted, or converted some other way.
///
/// A blank `search_term` is sent as `TERM_UNKNOWN`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ConversionParameters {
    pub search_term: Option<String>,
    pub item_id: String,
    pub item_name: Option<String>,
    pub variation_id: Option<String>,
    pub revenue: Option<f64>,
    /// Conversion type, e.g. `add_to_cart`.
    #[serde(rename = "type")]
    pub conversion_type: Option<String>,
    pub is_custom_type: Option<bool>,
    pub display_name: Option<String>,
    pub section: Option<String>,
    pub analytics_tags: Option<Map<String, Value>>,
}

/// An order was placed.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PurchaseParameters {
    /// Purchased items, each at least `{"item_id": ..}`.
    pub items: Vec<Value>,
    pub order_id: Option<String>,
    pub revenue: Option<f64>,
    pub section: Option<String>,
    pub analytics_tags: Option<Map<String, Value>>,
}

/// A recommendation pod was shown.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RecommendationResultViewParameters {
    pub pod_id: String,
    pub result_count: Option<u32>,
    pub result_page: Option<u32>,
    pub result_id: Option<String>,
    pub num_results_viewed: Option<u32>,
    pub items: Option<Vec<Value>>,
    pub url: Option<String>,
    pub section: Option<String>,
    pub analytics_tags: Option<Map<String, Value>>,
}

/// A recommendation was clicked.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RecommendationResultClickParameters {
    pub pod_id: String,
    pub item_id: String,
    pub item_name: Option<String>,
    pub variation_id: Option<String>,
    pub strategy_id: Option<String>,
    pub result_id: Option<String>,
    pub result_count: Option<u32>,
    pub result_page: Option<u32>,
    pub result_position_on_page: Option<u32>,
    pub num_results_per_page: Option<u32>,
    pub section: Option<String>,
    pub analytics_tags: Option<Map<String, Value>>,
}

/// Browse results were shown.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BrowseResultLoadParameters {
    pub filter_name: String,
    pub filter_value: String,
    pub result_count: Option<u32>,
    pub result_page: Option<u32>,
    pub result_id: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub selected_filters: Option<Value>,
    pub items: Option<Vec<Value>>,
    pub url: Option<String>,
    pub section: Option<String>,
    pub analytics_tags: Option<Map<String, Value>>,
}

/// A browse result was clicked.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BrowseResultClickParameters {
    pub filter_name: String,
    pub filter_value: String,
    pub item_id: String,
    pub item_name: Option<String>,
    pub variation_id: Option<String>,
    pub result_id: Option<String>,
    pub result_position_on_page: Option<u32>,
    pub num_results_per_page: Option<u32>,
    pub selected_filters: Option<Value>,
    pub section: Option<String>,
    pub analytics_tags: Option<Map<String, Value>>,
}

/// A result was clicked outside search, browse or recommendations.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ResultClickParameters {
    pub item_id: String,
    pub item_name: Option<String>,
    pub variation_id: Option<String>,
    pub section: Option<String>,
    pub analytics_tags: Option<Map<String, Value>>,
}

/// Quiz results were shown.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct QuizResultLoadParameters {
    pub quiz_id: String,
    pub quiz_version_id: String,
    pub quiz_session_id: String,
    pub result_count: Option<u32>,
    pub result_page: Option<u32>,
    pub result_id: Option<String>,
    pub items: Option<Vec<Value>>,
    pub url: Option<String>,
    pub section: Option<String>,
}

/// A quiz result was clicked.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct QuizResultClickParameters {
    pub quiz_id: String,
    pub quiz_version_id: String,
    pub quiz_session_id: String,
    pub item_id: String,
    pub item_name: Option<String>,
    pub variation_id: Option<String>,
    pub result_id: Option<String>,
    pub result_count: Option<u32>,
    pub result_page: Option<u32>,
    pub result_position_on_page: Option<u32>,
    pub num_results_per_page: Option<u32>,
    pub section: Option<String>,
}

/// An item reached from quiz results was converted.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct QuizConversionParameters {
    pub quiz_id: String,
    pub quiz_version_id: String,
    pub quiz_session_id: String,
    pub item_id: String,
    pub item_name: Option<String>,
    pub variation_id: Option<String>,
    pub revenue: Option<f64>,
    #[serde(rename = "type")]
    pub conversion_type: Option<String>,
    pub is_custom_type: Option<bool>,
    pub display_name: Option<String>,
    pub section: Option<String>,
}
