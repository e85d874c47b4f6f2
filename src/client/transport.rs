//! Pooled HTTP transport with retry.
//!
//! [`HttpTransport`] knows nothing about banking. It sends GET/POST
//! requests with a per-attempt timeout, retries transient failures with
//! exponential backoff, and bounds the number of requests in flight.
//! HTTP error statuses are *returned* (after retries are exhausted) so that
//! each caller can map them to its own error; only connection-level
//! failures become [`Error::Network`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, RETRY_AFTER};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Semaphore;
use url::Url;

use super::config::{RetryConfig, Settings};
use crate::{Error, Result};

/// A response whose body has been read in full.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: StatusCode,
    body: String,
}

impl HttpResponse {
    /// HTTP status of the final attempt.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Raw response body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns `true` for a 2xx status.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Parse the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.body)
    }
}

/// Shared HTTP transport.
///
/// Clones share one connection pool and one in-flight bound, so the
/// [`TokenManager`](crate::auth::TokenManager) and the
/// [`BankingClient`](crate::BankingClient) draw on the same resources.
#[derive(Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    retry: RetryConfig,
    permits: Arc<Semaphore>,
    log_bodies: bool,
}

impl HttpTransport {
    /// Build a transport from the client settings.
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(&settings.user_agent)
            .default_headers(headers)
            .pool_max_idle_per_host(settings.connection_pool_size)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            retry: settings.retry.clone(),
            permits: Arc::new(Semaphore::new(in_flight_limit(settings.connection_pool_maxsize))),
            log_bodies: settings.enable_request_logging,
        })
    }

    /// Send a GET request.
    pub async fn get(&self, url: Url, bearer: Option<&str>) -> Result<HttpResponse> {
        self.execute(Method::GET, url, bearer, None, self.log_bodies).await
    }

    /// Send a POST request with a JSON body.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &B,
        bearer: Option<&str>,
    ) -> Result<HttpResponse> {
        let payload = encode(body)?;
        self.execute(Method::POST, url, bearer, Some(payload), self.log_bodies).await
    }

    /// Send a POST request whose body and response must never be logged
    /// (credentials, tokens).
    pub async fn post_json_redacted<B: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &B,
        bearer: Option<&str>,
    ) -> Result<HttpResponse> {
        let payload = encode(body)?;
        self.execute(Method::POST, url, bearer, Some(payload), false).await
    }

    /// Stop accepting requests on this transport and every clone of it.
    ///
    /// Requests already in flight run to completion.
    pub fn close(&self) {
        self.permits.close();
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }

    async fn execute(
        &self,
        method: Method,
        url: Url,
        bearer: Option<&str>,
        payload: Option<Vec<u8>>,
        log_bodies: bool,
    ) -> Result<HttpResponse> {
        let retryable_method = self.retry.should_retry_method(&method);
        let mut attempt = 0u32;

        if log_bodies {
            if let Some(ref payload) = payload {
                tracing::debug!(
                    %method, %url,
                    body = %String::from_utf8_lossy(payload),
                    "Sending request"
                );
            }
        }

        loop {
            let permit = self
                .permits
                .acquire()
                .await
                .map_err(|_| Error::network("transport closed", None))?;

            let request = self.build_request(&method, &url, bearer, payload.as_deref());
            let outcome = request.send().await;

            let delay = match outcome {
                Ok(response) => {
                    let status = response.status();
                    let can_retry = retryable_method
                        && self.retry.should_retry_status(status.as_u16())
                        && attempt < self.retry.max_retries;

                    if !can_retry {
                        let body = response.text().await?;
                        drop(permit);
                        if log_bodies {
                            tracing::debug!(
                                %method, %url,
                                status = status.as_u16(),
                                %body,
                                "Received response"
                            );
                        }
                        return Ok(HttpResponse { status, body });
                    }

                    let delay = retry_after(response.headers())
                        .map(|d| d.min(self.retry.max_backoff))
                        .unwrap_or_else(|| self.retry.backoff_for_attempt(attempt));
                    tracing::warn!(
                        %method, %url,
                        status = status.as_u16(),
                        attempt = attempt + 1,
                        max_retries = self.retry.max_retries,
                        "Retrying after transient status"
                    );
                    delay
                }
                Err(err) => {
                    let transient = err.is_connect() || err.is_timeout();
                    if !(retryable_method && transient && attempt < self.retry.max_retries) {
                        return Err(err.into());
                    }
                    tracing::warn!(
                        %method, %url,
                        error = %err,
                        attempt = attempt + 1,
                        max_retries = self.retry.max_retries,
                        "Retrying after transport failure"
                    );
                    self.retry.backoff_for_attempt(attempt)
                }
            };

            drop(permit);
            attempt += 1;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }

    fn build_request(
        &self,
        method: &Method,
        url: &Url,
        bearer: Option<&str>,
        payload: Option<&[u8]>,
    ) -> RequestBuilder {
        let mut request = self.http.request(method.clone(), url.clone());
        if let Some(token) = bearer {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(payload) = payload {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(payload.to_vec());
        }
        request
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("retry", &self.retry)
            .field("available_permits", &self.permits.available_permits())
            .field("closed", &self.permits.is_closed())
            .finish()
    }
}

/// Permits for the in-flight bound: at least one, at most what tokio allows.
fn in_flight_limit(pool_maxsize: usize) -> usize {
    pool_maxsize.clamp(1, Semaphore::MAX_PERMITS)
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Vec<u8>> {
    serde_json::to_vec(body)
        .map_err(|e| Error::Validation(format!("request body is not serializable: {e}")))
}

/// Delay requested by a `Retry-After` header given in whole seconds.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_after_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(retry_after(&headers), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("3"));
        assert_eq!(retry_after(&headers), Some(Duration::from_secs(3)));

        headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"));
        assert_eq!(retry_after(&headers), None);
    }

    #[test]
    fn test_close_is_shared_between_clones() {
        let transport = HttpTransport::new(&Settings::default()).unwrap();
        let clone = transport.clone();
        assert!(!clone.is_closed());
        transport.close();
        assert!(clone.is_closed());
    }

    #[test]
    fn test_in_flight_limit_is_clamped() {
        assert_eq!(in_flight_limit(0), 1);
        assert_eq!(in_flight_limit(20), 20);
        assert_eq!(in_flight_limit(usize::MAX), Semaphore::MAX_PERMITS);

        let settings = Settings::from_lookup(|key| {
            (key == "CONNECTION_POOL_MAXSIZE").then(|| usize::MAX.to_string())
        })
        .unwrap();
        let transport = HttpTransport::new(&settings).unwrap();
        assert!(!transport.is_closed());
    }

    #[test]
    fn test_http_response_json() {
        let response = HttpResponse {
            status: StatusCode::OK,
            body: r#"{"balance": "12.50"}"#.to_string(),
        };
        assert!(response.is_success());
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["balance"], "12.50");
    }
}
