//! Shared helpers for the integration tests.
//!
//! Every test spins up its own in-process HTTP server on an ephemeral port
//! and points a client at it, so the suite needs no external service.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode, Uri};
use axum::routing::{any, MethodRouter};
use axum::Router;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use banking_client::{BankingClient, RetryConfig, Settings};

static INIT: Once = Once::new();

/// Initialize logging for tests
pub fn init_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve(router: Router) -> String {
    init_logging();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// A base URL on which nothing is listening.
pub async fn dead_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Settings for `base_url` with instant retries.
pub fn settings(base_url: &str) -> Settings {
    Settings::new(base_url)
        .unwrap()
        .with_timeout(Duration::from_secs(5))
        .with_retry(RetryConfig::default().with_backoff_factor(0.0))
}

/// A client for `base_url` with instant retries and no authentication.
pub fn client(base_url: &str) -> BankingClient {
    BankingClient::new(settings(base_url)).unwrap()
}

/// One request as the mock server saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

impl Recorded {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// A scripted endpoint that counts and records the requests it receives.
#[derive(Clone, Default)]
pub struct Endpoint {
    hits: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<Recorded>>>,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    delay: Duration,
    headers: Vec<(&'static str, &'static str)>,
}

impl Endpoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every reply for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Add `name: value` to every reply.
    pub fn with_header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers.push((name, value));
        self
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Most requests this endpoint was ever handling at once.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// Always answer with `status` and a JSON body.
    pub fn json(&self, status: u16, body: Value) -> MethodRouter {
        self.script(vec![(status, body.to_string())])
    }

    /// Always answer with `status` and a raw body.
    pub fn raw(&self, status: u16, body: &str) -> MethodRouter {
        self.script(vec![(status, body.to_string())])
    }

    /// Answer the n-th request with the n-th reply; the last reply repeats.
    pub fn script(&self, replies: Vec<(u16, String)>) -> MethodRouter {
        assert!(!replies.is_empty());
        let endpoint = self.clone();
        let replies = Arc::new(replies);

        any(move |headers: HeaderMap, uri: Uri, body: String| {
            let endpoint = endpoint.clone();
            let replies = replies.clone();
            async move {
                let n = endpoint.hits.fetch_add(1, Ordering::SeqCst);
                endpoint.requests.lock().unwrap().push(Recorded {
                    query: uri.query().map(str::to_string),
                    authorization: header(&headers, AUTHORIZATION.as_str()),
                    content_type: header(&headers, CONTENT_TYPE.as_str()),
                    body,
                });

                let active = endpoint.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                endpoint.peak.fetch_max(active, Ordering::SeqCst);
                if !endpoint.delay.is_zero() {
                    tokio::time::sleep(endpoint.delay).await;
                }
                endpoint.in_flight.fetch_sub(1, Ordering::SeqCst);

                let mut reply_headers = HeaderMap::new();
                reply_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                for &(name, value) in &endpoint.headers {
                    reply_headers.insert(
                        HeaderName::from_static(name),
                        HeaderValue::from_static(value),
                    );
                }

                let (status, body) = replies[n.min(replies.len() - 1)].clone();
                (StatusCode::from_u16(status).unwrap(), reply_headers, body)
            }
        })
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
