//! Integration tests for behavioral event tracking.

use async_trait::async_trait;
use constructorio::clients::{FetchError, FetchRequest, FetchResponse, Fetcher};
use constructorio::modules::tracker::{
    BrowseResultLoadParameters, ConversionParameters, ItemDetailLoadParameters,
};
use constructorio::{
    ApiKey, ConstructorConfig, ConstructorIO, ServiceUrl, TrackerError, TrackerEvent,
    UserContext, ValidationError,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A transport that only counts calls.
#[derive(Debug, Default)]
struct CountingFetcher {
    calls: AtomicUsize,
}

#[async_trait]
impl Fetcher for CountingFetcher {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(FetchResponse {
            status: 200,
            status_text: "OK".to_string(),
            url: request.url,
            headers: HashMap::new(),
            body: b"{}".to_vec(),
        })
    }
}

fn client_for(server: &MockServer) -> ConstructorIO {
    ConstructorIO::new(
        ConstructorConfig::builder()
            .api_key(ApiKey::new("key-test").unwrap())
            .service_url(ServiceUrl::new(server.uri()).unwrap())
            .build()
            .unwrap(),
    )
}

async fn next_event(events: &mut broadcast::Receiver<TrackerEvent>) -> TrackerEvent {
    tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("no tracking event within 5s")
        .unwrap()
}

fn conversion() -> ConversionParameters {
    ConversionParameters {
        item_id: "sku-1".to_string(),
        revenue: Some(20.0),
        ..Default::default()
    }
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_conversion_without_session_id_never_fetches() {
    let fetcher = Arc::new(CountingFetcher::default());
    let client = ConstructorIO::new(
        ConstructorConfig::builder()
            .api_key(ApiKey::new("key-test").unwrap())
            .fetcher(fetcher.clone())
            .build()
            .unwrap(),
    );
    let user = UserContext {
        client_id: Some("client-1".to_string()),
        ..Default::default()
    };

    let result = client.tracker().unwrap().track_conversion(&conversion(), &user, None);

    assert_eq!(
        result,
        Err(TrackerError::Validation(ValidationError::RequiredUserParameter {
            field: "sessionId",
            expected: "number",
        }))
    );
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_event_parameter_is_rejected() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let err = client
        .tracker()
        .unwrap()
        .track_browse_result_load(
            &BrowseResultLoadParameters {
                filter_name: "group_id".to_string(),
                ..Default::default()
            },
            &UserContext::new("client-1", 1),
            None,
        )
        .unwrap_err();
    assert_eq!(err.to_string(), "filterValue is a required parameter of type string");
}

// ============================================================================
// Observer
// ============================================================================

#[tokio::test]
async fn test_success_event_after_2xx() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/behavioral_action/conversion"))
        .and(query_param("key", "key-test"))
        .and(body_partial_json(json!({
            "item_id": "sku-1",
            "search_term": "TERM_UNKNOWN",
            "i": "client-1",
            "s": 3,
            "beacon": true
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let tracker = client.tracker().unwrap();
    let mut events = tracker.subscribe();

    tracker
        .track_conversion(&conversion(), &UserContext::new("client-1", 3), None)
        .unwrap();

    match next_event(&mut events).await {
        TrackerEvent::Success { action, url } => {
            assert_eq!(action, "conversion");
            assert!(url.contains("/v2/behavioral_action/conversion?"));
        }
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test]
async fn test_error_event_after_non_2xx() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/behavioral_action/item_detail_load"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let tracker = client.tracker().unwrap();
    let mut events = tracker.subscribe();

    tracker
        .track_item_detail_load(
            &ItemDetailLoadParameters {
                item_id: "sku-1".to_string(),
                item_name: "Red Shoe".to_string(),
                ..Default::default()
            },
            &UserContext::new("client-1", 3),
            None,
        )
        .unwrap();

    match next_event(&mut events).await {
        TrackerEvent::Error {
            action,
            message,
            status,
            ..
        } => {
            assert_eq!(action, "item_detail_load");
            assert_eq!(message, "boom");
            assert_eq!(status, Some(500));
        }
        other => panic!("expected error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_pii_event_is_dropped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let tracker = client.tracker().unwrap();
    let mut events = tracker.subscribe();

    let user = UserContext {
        user_id: Some("jane.doe@example.com".to_string()),
        ..UserContext::new("client-1", 3)
    };
    assert!(tracker.track_session_start(&user, None).is_ok());

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(events.try_recv().is_err());
}
