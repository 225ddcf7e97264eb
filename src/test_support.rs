//! In-crate test doubles.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::clients::{FetchError, FetchRequest, FetchResponse, Fetcher};
use crate::config::{ApiKey, ApiToken, ConstructorConfig};

/// A canned reply.
#[derive(Clone, Debug)]
pub struct MockReply {
    status: u16,
    body: Vec<u8>,
    delay: Option<Duration>,
}

impl MockReply {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self::raw(status, body.to_string().into_bytes())
    }

    pub const fn raw(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            body,
            delay: None,
        }
    }

    pub const fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// A [`Fetcher`] that records requests and replays queued replies.
///
/// Answers `200 {}` once the queue is empty.
#[derive(Debug, Default)]
pub struct MockFetcher {
    calls: AtomicUsize,
    requests: Mutex<Vec<FetchRequest>>,
    replies: Mutex<VecDeque<MockReply>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, reply: MockReply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_url(&self) -> String {
        self.requests().last().map(|r| r.url.clone()).unwrap_or_default()
    }
}

fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "",
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let url = request.url.clone();
        self.requests.lock().unwrap().push(request);

        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| MockReply::json(200, serde_json::json!({})));
        if let Some(delay) = reply.delay {
            tokio::time::sleep(delay).await;
        }

        Ok(FetchResponse {
            status: reply.status,
            status_text: status_text(reply.status).to_string(),
            url,
            headers: HashMap::new(),
            body: reply.body,
        })
    }
}

/// Builds a config over `fetcher` with key `key-test` and token `tok`.
pub fn config_with(fetcher: Arc<MockFetcher>) -> Arc<ConstructorConfig> {
    Arc::new(
        ConstructorConfig::builder()
            .api_key(ApiKey::new("key-test").unwrap())
            .api_token(ApiToken::new("tok").unwrap())
            .version("cio-test")
            .fetcher(fetcher)
            .build()
            .unwrap(),
    )
}

/// Returns the decoded query pairs of `url`.
pub fn query_pairs(url: &str) -> Vec<(String, String)> {
    let Some((_, query)) = url.split_once('?') else {
        return Vec::new();
    };
    query
        .split('&')
        .filter(|p| !p.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (
                urlencoding::decode(k).unwrap().into_owned(),
                urlencoding::decode(v).unwrap().into_owned(),
            )
        })
        .collect()
}

/// Returns the first decoded value of `key` in `url`'s query.
pub fn query_value(url: &str, key: &str) -> Option<String> {
    query_pairs(url).into_iter().find(|(k, _)| k == key).map(|(_, v)| v)
}
