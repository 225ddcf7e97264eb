//! Behavioral event tracking.
//!
//! Tracking calls are fire-and-forget: each method validates its input,
//! builds the request, and spawns it on the current Tokio runtime. The
//! method returns as soon as the event is accepted; the outcome of the
//! request is published to [`Tracker::subscribe`] receivers.
//!
//! Every call requires a [`UserContext`] with `session_id` and `client_id`.
//! Events whose URL or body looks like it carries an email address, a phone
//! number or a payment card number are dropped without being sent.
//!
//! # Example
//!
//! ```rust,no_run
//! use constructorio::modules::tracker::{ConversionParameters, TrackerEvent};
//! use constructorio::{ApiKey, ConstructorConfig, ConstructorIO, UserContext};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ConstructorIO::new(
//!     ConstructorConfig::builder()
//!         .api_key(ApiKey::new("key-abc")?)
//!         .build()?,
//! );
//! let tracker = client.tracker().expect("tracking enabled");
//! let mut events = tracker.subscribe();
//!
//! let user = UserContext::new("client-1", 4);
//! tracker.track_conversion(
//!     &ConversionParameters {
//!         item_id: "sku-1".to_string(),
//!         revenue: Some(19.99),
//!         ..Default::default()
//!     },
//!     &user,
//!     None,
//! )?;
//!
//! if let TrackerEvent::Error { message, .. } = events.recv().await? {
//!     eprintln!("tracking failed: {message}");
//! }
//! # Ok(())
//! # }
//! ```

mod params;
mod pii;

pub use params::{
    AutocompleteSelectParameters, BrowseResultClickParameters, BrowseResultLoadParameters,
    ConversionParameters, ItemDetailLoadParameters, PurchaseParameters,
    QuizConversionParameters, QuizResultClickParameters, QuizResultLoadParameters,
    RecommendationResultClickParameters, RecommendationResultViewParameters,
    ResultClickParameters, SearchResultClickParameters, SearchResultLoadParameters,
    SearchSubmitParameters,
};

use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio::runtime::Handle;
use tokio::sync::broadcast;

use crate::clients::{HttpClient, HttpError, HttpMethod, HttpRequest};
use crate::config::NetworkParameters;
use crate::encoding::{encode_term_segment, snake_case_keys};
use crate::error::{TrackerError, ValidationError};
use crate::modules::{identity_params, require_string};
use crate::user::UserContext;

/// Number of undelivered events a lagging receiver may fall behind by.
const EVENT_CAPACITY: usize = 64;

/// Search term sent with conversions that did not come from a search.
const TERM_UNKNOWN: &str = "TERM_UNKNOWN";

/// Outcome of a dispatched tracking request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackerEvent {
    /// The request completed with a 2xx status.
    Success {
        /// The action name, e.g. `conversion` or `session_start`.
        action: &'static str,
        /// The request URL.
        url: String,
    },
    /// The request failed, timed out, or received a non-2xx status.
    Error {
        /// The action name.
        action: &'static str,
        /// The request URL.
        url: String,
        /// The error message, from the response body when it has one.
        message: String,
        /// The HTTP status, if a response was received.
        status: Option<u16>,
    },
}

/// Tracker module.
///
/// Cloning a `Tracker` shares its event channel.
#[derive(Clone, Debug)]
pub struct Tracker {
    client: HttpClient,
    events: broadcast::Sender<TrackerEvent>,
}

// Verify Tracker is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Tracker>();
};

impl Tracker {
    pub(crate) fn new(client: HttpClient) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { client, events }
    }

    /// Subscribes to request outcomes.
    ///
    /// Only events of requests dispatched after this call are received.
    /// Subscribe before tracking if failures must not go unnoticed.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TrackerEvent> {
        self.events.subscribe()
    }

    /// Tracks the start of a user session.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError`] if the user context lacks identity or no
    /// Tokio runtime is running.
    pub fn track_session_start(
        &self,
        user: &UserContext,
        network: Option<&NetworkParameters>,
    ) -> Result<(), TrackerError> {
        self.track_behavior("session_start", user, network)
    }

    /// Tracks focus on the search input.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError`] if the user context lacks identity or no
    /// Tokio runtime is running.
    pub fn track_input_focus(
        &self,
        user: &UserContext,
        network: Option<&NetworkParameters>,
    ) -> Result<(), TrackerError> {
        self.track_behavior("focus", user, network)
    }

    fn track_behavior(
        &self,
        action: &'static str,
        user: &UserContext,
        network: Option<&NetworkParameters>,
    ) -> Result<(), TrackerError> {
        user.require_identity()?;
        let mut query = identity_params(self.client.config(), Some(user));
        query.insert("action", action);
        query.insert("beacon", true);
        let url = query.to_url(&self.client.config().service_url().join("behavior"));
        self.dispatch(action, HttpMethod::Get, url, None, user, network)
    }

    /// Tracks the selection of an autocomplete suggestion.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError`] if `term`, `original_query` or `section` is
    /// blank, the user context lacks identity, or no Tokio runtime is
    /// running.
    pub fn track_autocomplete_select(
        &self,
        term: &str,
        parameters: &AutocompleteSelectParameters,
        user: &UserContext,
        network: Option<&NetworkParameters>,
    ) -> Result<(), TrackerError> {
        user.require_identity()?;
        let term = require_string(term, "term")?;
        let original_query = require_string(&parameters.original_query, "originalQuery")?;
        let section = require_string(&parameters.section, "section")?;

        let mut query = identity_params(self.client.config(), Some(user));
        query.insert("original_query", original_query);
        query.insert("section", section);
        query.insert_opt("tr", parameters.tr.clone());
        if let Some(group) = group(parameters.group_id.as_ref(), parameters.display_name.as_ref()) {
            query.insert("group", group);
        }
        query.insert_opt("item_id", parameters.item_id.clone());
        query.insert_opt("variation_id", parameters.variation_id.clone());
        query.insert("beacon", true);

        let path = format!("autocomplete/{}/select", encode_term_segment(term));
        let url = query.to_url(&self.client.config().service_url().join(&path));
        self.dispatch("autocomplete_select", HttpMethod::Get, url, None, user, network)
    }

    /// Tracks a search submitted from the search input.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError`] if `term` or `original_query` is blank, the
    /// user context lacks identity, or no Tokio runtime is running.
    pub fn track_search_submit(
        &self,
        term: &str,
        parameters: &SearchSubmitParameters,
        user: &UserContext,
        network: Option<&NetworkParameters>,
    ) -> Result<(), TrackerError> {
        user.require_identity()?;
        let term = require_string(term, "term")?;
        let original_query = require_string(&parameters.original_query, "originalQuery")?;

        let mut query = identity_params(self.client.config(), Some(user));
        query.insert("original_query", original_query);
        if let Some(group) = group(parameters.group_id.as_ref(), parameters.display_name.as_ref()) {
            query.insert("group", group);
        }
        query.insert("beacon", true);

        let path = format!("autocomplete/{}/search", encode_term_segment(term));
        let url = query.to_url(&self.client.config().service_url().join(&path));
        self.dispatch("search_submit", HttpMethod::Get, url, None, user, network)
    }

    /// Tracks a product detail page view.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError`] if `item_id` or `item_name` is blank, the user
    /// context lacks identity, or no Tokio runtime is running.
    pub fn track_item_detail_load(
        &self,
        parameters: &ItemDetailLoadParameters,
        user: &UserContext,
        network: Option<&NetworkParameters>,
    ) -> Result<(), TrackerError> {
        user.require_identity()?;
        require_string(&parameters.item_id, "itemId")?;
        require_string(&parameters.item_name, "itemName")?;
        self.track_action("item_detail_load", parameters, user, network)
    }

    /// Tracks search results being shown.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError`] if `search_term` is blank, the user context
    /// lacks identity, or no Tokio runtime is running.
    pub fn track_search_result_load(
        &self,
        parameters: &SearchResultLoadParameters,
        user: &UserContext,
        network: Option<&NetworkParameters>,
    ) -> Result<(), TrackerError> {
        user.require_identity()?;
        require_string(&parameters.search_term, "searchTerm")?;
        self.track_action("search_result_load", parameters, user, network)
    }

    /// Tracks a click on a search result.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError`] if `search_term` or `item_id` is blank, the
    /// user context lacks identity, or no Tokio runtime is running.
    pub fn track_search_result_click(
        &self,
        parameters: &SearchResultClickParameters,
        user: &UserContext,
        network: Option<&NetworkParameters>,
    ) -> Result<(), TrackerError> {
        user.require_identity()?;
        require_string(&parameters.search_term, "searchTerm")?;
        require_string(&parameters.item_id, "itemId")?;
        self.track_action("search_result_click", parameters, user, network)
    }

    /// Tracks a conversion such as add-to-cart.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError`] if `item_id` is blank, the user context lacks
    /// identity, or no Tokio runtime is running.
    pub fn track_conversion(
        &self,
        parameters: &ConversionParameters,
        user: &UserContext,
        network: Option<&NetworkParameters>,
    ) -> Result<(), TrackerError> {
        user.require_identity()?;
        require_string(&parameters.item_id, "itemId")?;

        let search_term = parameters
            .search_term
            .clone()
            .filter(|term| !term.trim().is_empty())
            .unwrap_or_else(|| TERM_UNKNOWN.to_string());
        let parameters = ConversionParameters {
            search_term: Some(search_term),
            ..parameters.clone()
        };
        self.track_action("conversion", &parameters, user, network)
    }

    /// Tracks a completed purchase.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError`] if `items` is empty, the user context lacks
    /// identity, or no Tokio runtime is running.
    pub fn track_purchase(
        &self,
        parameters: &PurchaseParameters,
        user: &UserContext,
        network: Option<&NetworkParameters>,
    ) -> Result<(), TrackerError> {
        user.require_identity()?;
        if parameters.items.is_empty() {
            return Err(ValidationError::required("items", "array").into());
        }
        self.track_action("purchase", parameters, user, network)
    }

    /// Tracks a recommendation pod being shown.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError`] if `pod_id` is blank, the user context lacks
    /// identity, or no Tokio runtime is running.
    pub fn track_recommendation_view(
        &self,
        parameters: &RecommendationResultViewParameters,
        user: &UserContext,
        network: Option<&NetworkParameters>,
    ) -> Result<(), TrackerError> {
        user.require_identity()?;
        require_string(&parameters.pod_id, "podId")?;
        self.track_action("recommendation_result_view", parameters, user, network)
    }

    /// Tracks a click on a recommendation.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError`] if `pod_id` or `item_id` is blank, the user
    /// context lacks identity, or no Tokio runtime is running.
    pub fn track_recommendation_click(
        &self,
        parameters: &RecommendationResultClickParameters,
        user: &UserContext,
        network: Option<&NetworkParameters>,
    ) -> Result<(), TrackerError> {
        user.require_identity()?;
        require_string(&parameters.pod_id, "podId")?;
        require_string(&parameters.item_id, "itemId")?;
        self.track_action("recommendation_result_click", parameters, user, network)
    }

    /// Tracks browse results being shown.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError`] if `filter_name` or `filter_value` is blank,
    /// the user context lacks identity, or no Tokio runtime is running.
    pub fn track_browse_result_load(
        &self,
        parameters: &BrowseResultLoadParameters,
        user: &UserContext,
        network: Option<&NetworkParameters>,
    ) -> Result<(), TrackerError> {
        user.require_identity()?;
        require_string(&parameters.filter_name, "filterName")?;
        require_string(&parameters.filter_value, "filterValue")?;
        self.track_action("browse_result_load", parameters, user, network)
    }

    /// Tracks a click on a browse result.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError`] if `filter_name`, `filter_value` or `item_id`
    /// is blank, the user context lacks identity, or no Tokio runtime is
    /// running.
    pub fn track_browse_result_click(
        &self,
        parameters: &BrowseResultClickParameters,
        user: &UserContext,
        network: Option<&NetworkParameters>,
    ) -> Result<(), TrackerError> {
        user.require_identity()?;
        require_string(&parameters.filter_name, "filterName")?;
        require_string(&parameters.filter_value, "filterValue")?;
        require_string(&parameters.item_id, "itemId")?;
        self.track_action("browse_result_click", parameters, user, network)
    }

    /// Tracks a click on any other result.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError`] if `item_id` is blank, the user context lacks
    /// identity, or no Tokio runtime is running.
    pub fn track_generic_result_click(
        &self,
        parameters: &ResultClickParameters,
        user: &UserContext,
        network: Option<&NetworkParameters>,
    ) -> Result<(), TrackerError> {
        user.require_identity()?;
        require_string(&parameters.item_id, "itemId")?;
        self.track_action("result_click", parameters, user, network)
    }

    /// Tracks quiz results being shown.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError`] if a quiz identifier is blank, the user
    /// context lacks identity, or no Tokio runtime is running.
    pub fn track_quiz_result_load(
        &self,
        parameters: &QuizResultLoadParameters,
        user: &UserContext,
        network: Option<&NetworkParameters>,
    ) -> Result<(), TrackerError> {
        user.require_identity()?;
        require_quiz(
            &parameters.quiz_id,
            &parameters.quiz_version_id,
            &parameters.quiz_session_id,
        )?;
        self.track_action("quiz_result_load", parameters, user, network)
    }

    /// Tracks a click on a quiz result.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError`] if a quiz identifier or `item_id` is blank,
    /// the user context lacks identity, or no Tokio runtime is running.
    pub fn track_quiz_result_click(
        &self,
        parameters: &QuizResultClickParameters,
        user: &UserContext,
        network: Option<&NetworkParameters>,
    ) -> Result<(), TrackerError> {
        user.require_identity()?;
        require_quiz(
            &parameters.quiz_id,
            &parameters.quiz_version_id,
            &parameters.quiz_session_id,
        )?;
        require_string(&parameters.item_id, "itemId")?;
        self.track_action("quiz_result_click", parameters, user, network)
    }

    /// Tracks a conversion of an item reached from quiz results.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError`] if a quiz identifier or `item_id` is blank,
    /// the user context lacks identity, or no Tokio runtime is running.
    pub fn track_quiz_conversion(
        &self,
        parameters: &QuizConversionParameters,
        user: &UserContext,
        network: Option<&NetworkParameters>,
    ) -> Result<(), TrackerError> {
        user.require_identity()?;
        require_quiz(
            &parameters.quiz_id,
            &parameters.quiz_version_id,
            &parameters.quiz_session_id,
        )?;
        require_string(&parameters.item_id, "itemId")?;
        self.track_action("quiz_conversion", parameters, user, network)
    }

    /// Builds the URL of a POST behavioral action.
    #[must_use]
    pub fn create_action_url(&self, action: &str) -> String {
        let config = self.client.config();
        identity_params(config, None).to_url(
            &config
                .service_url()
                .join(&format!("v2/behavioral_action/{action}")),
        )
    }

    /// Builds the body of a POST behavioral action.
    ///
    /// Event fields are snake_cased recursively and `None` fields are left
    /// out. Identity fields come last, test cells as `ef-<name>`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError`] if the user context lacks identity.
    pub fn create_action_body<P: Serialize>(
        &self,
        parameters: &P,
        user: &UserContext,
    ) -> Result<Value, TrackerError> {
        let (session_id, client_id) = user.require_identity()?;
        let config = self.client.config();

        let mut body = match serde_json::to_value(parameters).map(snake_case_keys) {
            Ok(Value::Object(fields)) => strip_nulls(fields),
            _ => Map::new(),
        };

        body.insert("key".to_string(), json!(config.api_key().as_ref()));
        body.insert("c".to_string(), json!(config.version()));
        body.insert("i".to_string(), json!(client_id));
        body.insert("s".to_string(), json!(session_id));
        if let Some(user_id) = &user.user_id {
            body.insert("ui".to_string(), json!(user_id));
        }
        if let Some(segments) = &user.segments {
            body.insert("us".to_string(), json!(segments));
        }
        if let Some(cells) = &user.test_cells {
            for (name, cell) in cells {
                body.insert(format!("ef-{name}"), json!(cell));
            }
        }
        body.insert("beacon".to_string(), Value::Bool(true));
        if let Some(referrer) = &user.origin_referrer {
            body.insert("origin_referrer".to_string(), json!(referrer));
        }
        Ok(Value::Object(body))
    }

    fn track_action<P: Serialize>(
        &self,
        action: &'static str,
        parameters: &P,
        user: &UserContext,
        network: Option<&NetworkParameters>,
    ) -> Result<(), TrackerError> {
        let body = self.create_action_body(parameters, user)?;
        let url = self.create_action_url(action);
        self.dispatch(action, HttpMethod::Post, url, Some(body), user, network)
    }

    /// Drops PII-bearing events, then spawns the request.
    fn dispatch(
        &self,
        action: &'static str,
        method: HttpMethod,
        url: String,
        body: Option<Value>,
        user: &UserContext,
        network: Option<&NetworkParameters>,
    ) -> Result<(), TrackerError> {
        let body_text = body.as_ref().map(Value::to_string).unwrap_or_default();
        if pii::contains_pii(&url) || pii::contains_pii(&body_text) {
            tracing::debug!(action, "Dropping tracking event that appears to contain PII");
            return Ok(());
        }

        let runtime = Handle::try_current().map_err(|_| TrackerError::NoRuntime)?;

        let mut builder = HttpRequest::builder(method, url.clone());
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let request = builder.build().map_err(|error| ValidationError::InvalidParameter {
            field: "request",
            reason: error.to_string(),
        })?;

        let client = self.client.clone();
        let events = self.events.clone();
        let user = user.clone();
        let network = network.cloned();

        runtime.spawn(async move {
            let event = match client.dispatch(request, Some(&user), network.as_ref()).await {
                Ok(_) => TrackerEvent::Success { action, url },
                Err(error) => failure_event(action, url, &error),
            };
            // No receivers is not an error.
            let _ = events.send(event);
        });
        Ok(())
    }
}

fn failure_event(action: &'static str, url: String, error: &HttpError) -> TrackerEvent {
    tracing::warn!(action, %error, "Tracking request failed");
    TrackerEvent::Error {
        action,
        url,
        message: error.to_string(),
        status: error.status(),
    }
}

/// Builds the `group` query object, or `None` when neither field is set.
fn group(group_id: Option<&String>, display_name: Option<&String>) -> Option<Value> {
    if group_id.is_none() && display_name.is_none() {
        return None;
    }
    let mut group = Map::new();
    if let Some(id) = group_id {
        group.insert("group_id".to_string(), json!(id));
    }
    if let Some(name) = display_name {
        group.insert("display_name".to_string(), json!(name));
    }
    Some(Value::Object(group))
}

fn require_quiz(
    quiz_id: &str,
    quiz_version_id: &str,
    quiz_session_id: &str,
) -> Result<(), ValidationError> {
    require_string(quiz_id, "quizId")?;
    require_string(quiz_version_id, "quizVersionId")?;
    require_string(quiz_session_id, "quizSessionId")?;
    Ok(())
}

fn strip_nulls(fields: Map<String, Value>) -> Map<String, Value> {
    fields.into_iter().filter(|(_, v)| !v.is_null()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::RequestBody;
    use crate::test_support::{config_with, query_value, MockFetcher, MockReply};
    use std::sync::Arc;
    use std::time::Duration;

    fn tracker(fetcher: Arc<MockFetcher>) -> Tracker {
        Tracker::new(HttpClient::new(config_with(fetcher)))
    }

    fn user() -> UserContext {
        UserContext::new("client-1", 2)
    }

    async fn next_event(receiver: &mut broadcast::Receiver<TrackerEvent>) -> TrackerEvent {
        tokio::time::timeout(Duration::from_secs(1), receiver.recv())
            .await
            .unwrap()
            .unwrap()
    }

    fn body_of(fetcher: &MockFetcher) -> Value {
        match fetcher.requests().pop().and_then(|r| r.body) {
            Some(RequestBody::Json(body)) => body,
            other => panic!("expected JSON body, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_session_start_url() {
        let fetcher = Arc::new(MockFetcher::new());
        let tracker = tracker(fetcher.clone());
        let mut events = tracker.subscribe();

        tracker.track_session_start(&user(), None).unwrap();
        let event = next_event(&mut events).await;

        let TrackerEvent::Success { action, url } = event else {
            panic!("expected success, got {event:?}");
        };
        assert_eq!(action, "session_start");
        assert!(url.starts_with("https://ac.cnstrc.com/behavior?c=cio-test&key=key-test&i=client-1&s=2"));
        assert_eq!(query_value(&url, "action").as_deref(), Some("session_start"));
        assert_eq!(query_value(&url, "beacon").as_deref(), Some("true"));
        assert!(query_value(&url, "_dt").is_none());
        assert_eq!(fetcher.requests()[0].method, HttpMethod::Get);
    }

    #[tokio::test]
    async fn test_missing_identity_is_rejected_without_fetch() {
        let fetcher = Arc::new(MockFetcher::new());
        let tracker = tracker(fetcher.clone());
        let user = UserContext {
            client_id: Some("client-1".to_string()),
            ..Default::default()
        };

        let err = tracker
            .track_conversion(
                &ConversionParameters {
                    item_id: "sku-1".to_string(),
                    ..Default::default()
                },
                &user,
                None,
            )
            .unwrap_err();
        assert_eq!(err.to_string(), "sessionId is a required user parameter of type number");

        tokio::task::yield_now().await;
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_required_event_parameter() {
        let tracker = tracker(Arc::new(MockFetcher::new()));
        let err = tracker
            .track_recommendation_click(
                &RecommendationResultClickParameters {
                    pod_id: "home".to_string(),
                    ..Default::default()
                },
                &user(),
                None,
            )
            .unwrap_err();
        assert_eq!(err.to_string(), "itemId is a required parameter of type string");
    }

    #[tokio::test]
    async fn test_conversion_body() {
        let fetcher = Arc::new(MockFetcher::new());
        let tracker = tracker(fetcher.clone());
        let mut events = tracker.subscribe();

        tracker
            .track_conversion(
                &ConversionParameters {
                    item_id: "sku-1".to_string(),
                    revenue: Some(12.5),
                    conversion_type: Some("add_to_cart".to_string()),
                    ..Default::default()
                },
                &user(),
                None,
            )
            .unwrap();
        next_event(&mut events).await;

        let request = fetcher.requests().pop().unwrap();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(
            request.url,
            "https://ac.cnstrc.com/v2/behavioral_action/conversion?c=cio-test&key=key-test"
        );

        let body = body_of(&fetcher);
        assert_eq!(body["search_term"], "TERM_UNKNOWN");
        assert_eq!(body["item_id"], "sku-1");
        assert_eq!(body["type"], "add_to_cart");
        assert_eq!(body["revenue"], 12.5);
        assert_eq!(body["i"], "client-1");
        assert_eq!(body["s"], 2);
        assert_eq!(body["beacon"], true);
        assert!(body.get("item_name").is_none());
        assert!(body.get("_dt").is_none());
    }

    #[test]
    fn test_action_body_carries_test_cells() {
        let tracker = tracker(Arc::new(MockFetcher::new()));
        let user = UserContext {
            test_cells: Some(std::collections::BTreeMap::from([
                ("algo".to_string(), "v2".to_string()),
                ("layout".to_string(), "grid".to_string()),
            ])),
            ..user()
        };

        let body = tracker
            .create_action_body(
                &ConversionParameters {
                    item_id: "sku".to_string(),
                    ..Default::default()
                },
                &user,
            )
            .unwrap();
        assert_eq!(body["ef-algo"], "v2");
        assert_eq!(body["ef-layout"], "grid");
        assert_eq!(body["i"], "client-1");
    }

    #[tokio::test]
    async fn test_purchase_items_are_snake_cased() {
        let fetcher = Arc::new(MockFetcher::new());
        let tracker = tracker(fetcher.clone());
        let mut events = tracker.subscribe();

        tracker
            .track_purchase(
                &PurchaseParameters {
                    items: vec![json!({"itemId": "sku-1", "variationId": "sku-1-red"})],
                    order_id: Some("o-9".to_string()),
                    ..Default::default()
                },
                &user(),
                None,
            )
            .unwrap();
        next_event(&mut events).await;

        let body = body_of(&fetcher);
        assert_eq!(body["items"], json!([{"item_id": "sku-1", "variation_id": "sku-1-red"}]));
        assert_eq!(body["order_id"], "o-9");
    }

    #[tokio::test]
    async fn test_purchase_requires_items() {
        let tracker = tracker(Arc::new(MockFetcher::new()));
        let err = tracker
            .track_purchase(&PurchaseParameters::default(), &user(), None)
            .unwrap_err();
        assert_eq!(err.to_string(), "items is a required parameter of type array");
    }

    #[tokio::test]
    async fn test_autocomplete_select_url() {
        let fetcher = Arc::new(MockFetcher::new());
        let tracker = tracker(fetcher.clone());
        let mut events = tracker.subscribe();

        tracker
            .track_autocomplete_select(
                "red shoes",
                &AutocompleteSelectParameters {
                    original_query: "red".to_string(),
                    section: "Search Suggestions".to_string(),
                    tr: Some("click".to_string()),
                    group_id: Some("shoes".to_string()),
                    ..Default::default()
                },
                &user(),
                None,
            )
            .unwrap();
        next_event(&mut events).await;

        let url = fetcher.last_url();
        assert!(url.starts_with("https://ac.cnstrc.com/autocomplete/red%20shoes/select?"));
        assert_eq!(query_value(&url, "original_query").as_deref(), Some("red"));
        assert_eq!(query_value(&url, "section").as_deref(), Some("Search Suggestions"));
        assert_eq!(query_value(&url, "group[group_id]").as_deref(), Some("shoes"));
        assert!(query_value(&url, "group[display_name]").is_none());
    }

    #[tokio::test]
    async fn test_pii_events_are_dropped_silently() {
        let fetcher = Arc::new(MockFetcher::new());
        let tracker = tracker(fetcher.clone());
        let mut events = tracker.subscribe();

        tracker
            .track_search_submit(
                "jane@example.com",
                &SearchSubmitParameters {
                    original_query: "jane@example.com".to_string(),
                    ..Default::default()
                },
                &user(),
                None,
            )
            .unwrap();
        tracker
            .track_search_result_load(
                &SearchResultLoadParameters {
                    search_term: "4111 1111 1111 1111".to_string(),
                    ..Default::default()
                },
                &user(),
                None,
            )
            .unwrap();

        tokio::task::yield_now().await;
        assert_eq!(fetcher.calls(), 0);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_error_event_carries_status_and_message() {
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.push(MockReply::json(400, json!({"message": "Invalid key"})));
        let tracker = tracker(fetcher.clone());
        let mut events = tracker.subscribe();

        tracker.track_input_focus(&user(), None).unwrap();

        assert_eq!(
            next_event(&mut events).await,
            TrackerEvent::Error {
                action: "focus",
                url: fetcher.last_url(),
                message: "Invalid key".to_string(),
                status: Some(400),
            }
        );
    }

    #[tokio::test]
    async fn test_timeout_reports_error_without_status() {
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.push(MockReply::json(200, json!({})).delayed(Duration::from_millis(200)));
        let tracker = tracker(fetcher.clone());
        let mut events = tracker.subscribe();

        tracker
            .track_generic_result_click(
                &ResultClickParameters {
                    item_id: "sku-1".to_string(),
                    ..Default::default()
                },
                &user(),
                Some(&NetworkParameters::with_timeout(Duration::from_millis(10))),
            )
            .unwrap();

        let TrackerEvent::Error { status, .. } = next_event(&mut events).await else {
            panic!("expected error event");
        };
        assert_eq!(status, None);
    }

    #[test]
    fn test_no_runtime_is_an_error() {
        let tracker = tracker(Arc::new(MockFetcher::new()));
        assert_eq!(
            tracker.track_session_start(&user(), None).unwrap_err(),
            TrackerError::NoRuntime
        );
    }

    #[test]
    fn test_quiz_identifiers_required() {
        let tracker = tracker(Arc::new(MockFetcher::new()));
        let err = tracker
            .track_quiz_result_load(
                &QuizResultLoadParameters {
                    quiz_id: "coffee".to_string(),
                    quiz_version_id: "v1".to_string(),
                    ..Default::default()
                },
                &user(),
                None,
            )
            .unwrap_err();
        assert_eq!(err.to_string(), "quizSessionId is a required parameter of type string");
    }
}
