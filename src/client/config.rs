//! Client configuration.
//!
//! [`Settings`] is resolved once (from defaults, the environment, or a
//! `.env` file) and handed to [`BankingClient`](crate::BankingClient) at
//! construction. It is an ordinary value: there is no process-wide
//! instance.

use std::time::Duration;

use reqwest::Method;
use secrecy::SecretString;
use url::Url;

use crate::models::lenient::parse_bool;
use crate::{Error, Result};

/// Default base URL of the Core Banking API.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8123";

/// Configuration for the banking client.
///
/// # Example
///
/// ```
/// use banking_client::Settings;
/// use std::time::Duration;
///
/// let settings = Settings::new("http://bank.internal:8123")?
///     .with_timeout(Duration::from_secs(10))
///     .with_authentication(true)
///     .with_credentials("teller", "s3cret");
///
/// assert_eq!(
///     settings.transfer_url().as_str(),
///     "http://bank.internal:8123/transfer"
/// );
/// # Ok::<(), banking_client::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL all endpoints are resolved against
    pub base_url: Url,
    /// Per-attempt request timeout
    pub timeout: Duration,
    /// Retry configuration
    pub retry: RetryConfig,
    /// Username posted to the auth endpoint
    pub auth_username: String,
    /// Password posted to the auth endpoint
    pub auth_password: SecretString,
    /// Whether acquired tokens are reused until they near expiry
    pub auth_cache_enabled: bool,
    /// Whether requests carry a bearer token at all
    pub enable_authentication: bool,
    /// Whether request/response bodies are logged at debug level
    pub enable_request_logging: bool,
    /// Idle connections kept alive per host
    pub connection_pool_size: usize,
    /// Maximum number of requests in flight at once
    pub connection_pool_maxsize: usize,
    /// User-Agent header value
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
            auth_username: "admin".to_string(),
            auth_password: SecretString::from("password123".to_string()),
            auth_cache_enabled: true,
            enable_authentication: false,
            enable_request_logging: true,
            connection_pool_size: 10,
            connection_pool_maxsize: 20,
            user_agent: format!("banking-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Settings {
    /// Create settings with default values against the given base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `base_url` is not an absolute
    /// hierarchical URL.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            ..Self::default()
        })
    }

    /// Resolve settings from the process environment.
    ///
    /// Unset variables fall back to their defaults; see the crate-level
    /// documentation for the full list.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load a `.env` file from the working directory (if any), then
    /// resolve settings from the environment.
    ///
    /// Variables already present in the environment win over the file.
    pub fn from_dotenv() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
            Err(err) if err.not_found() => {}
            Err(err) => return Err(Error::Config(format!("failed to read .env file: {err}"))),
        }
        Self::from_env()
    }

    /// Resolve settings through an arbitrary key lookup.
    ///
    /// Keys are the upper-case variable names (`API_BASE_URL`, ...).
    ///
    /// ```
    /// use banking_client::Settings;
    ///
    /// let settings = Settings::from_lookup(|key| match key {
    ///     "API_MAX_RETRIES" => Some("5".to_string()),
    ///     "ENABLE_AUTHENTICATION" => Some("yes".to_string()),
    ///     _ => None,
    /// })?;
    /// assert_eq!(settings.retry.max_retries, 5);
    /// assert!(settings.enable_authentication);
    /// # Ok::<(), banking_client::Error>(())
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let base_url = match var("API_BASE_URL") {
            Some(raw) => parse_base_url(&raw)?,
            None => defaults.base_url,
        };

        let retry = RetryConfig {
            max_retries: parse_var(&var, "API_MAX_RETRIES", defaults.retry.max_retries)?,
            backoff_factor: parse_var(&var, "API_RETRY_BACKOFF", defaults.retry.backoff_factor)?,
            ..defaults.retry
        };
        if !retry.backoff_factor.is_finite() || retry.backoff_factor < 0.0 {
            return Err(Error::Config(format!(
                "API_RETRY_BACKOFF must be a non-negative number, got {}",
                retry.backoff_factor
            )));
        }

        let timeout_secs = parse_var(&var, "API_TIMEOUT", defaults.timeout.as_secs())?;

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            retry,
            auth_username: var("AUTH_USERNAME").unwrap_or(defaults.auth_username),
            auth_password: var("AUTH_PASSWORD")
                .map(SecretString::from)
                .unwrap_or(defaults.auth_password),
            auth_cache_enabled: bool_var(&var, "AUTH_CACHE_ENABLED", defaults.auth_cache_enabled)?,
            enable_authentication: bool_var(
                &var,
                "ENABLE_AUTHENTICATION",
                defaults.enable_authentication,
            )?,
            enable_request_logging: bool_var(
                &var,
                "ENABLE_REQUEST_LOGGING",
                defaults.enable_request_logging,
            )?,
            connection_pool_size: parse_var(
                &var,
                "CONNECTION_POOL_SIZE",
                defaults.connection_pool_size,
            )?,
            connection_pool_maxsize: parse_var(
                &var,
                "CONNECTION_POOL_MAXSIZE",
                defaults.connection_pool_maxsize,
            )?,
            user_agent: defaults.user_agent,
        })
    }

    /// Set the per-attempt request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry configuration.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Set the credentials posted to the auth endpoint.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.auth_username = username.into();
        self.auth_password = SecretString::from(password.into());
        self
    }

    /// Enable or disable bearer authentication.
    pub fn with_authentication(mut self, enabled: bool) -> Self {
        self.enable_authentication = enabled;
        self
    }

    /// Enable or disable token reuse between calls.
    pub fn with_auth_cache(mut self, enabled: bool) -> Self {
        self.auth_cache_enabled = enabled;
        self
    }

    /// Enable or disable debug logging of request/response bodies.
    pub fn with_request_logging(mut self, enabled: bool) -> Self {
        self.enable_request_logging = enabled;
        self
    }

    /// Set the idle pool size and the in-flight request bound.
    pub fn with_pool_sizes(mut self, pool_size: usize, pool_maxsize: usize) -> Self {
        self.connection_pool_size = pool_size;
        self.connection_pool_maxsize = pool_maxsize;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Authentication endpoint.
    pub fn auth_url(&self) -> Url {
        self.endpoint(&["authToken"])
    }

    /// Transfer endpoint.
    pub fn transfer_url(&self) -> Url {
        self.endpoint(&["transfer"])
    }

    /// Account listing endpoint.
    pub fn accounts_url(&self) -> Url {
        self.endpoint(&["accounts"])
    }

    /// Validation endpoint for one account.
    pub fn validate_url(&self, account_id: &str) -> Url {
        self.endpoint(&["accounts", "validate", account_id])
    }

    /// Balance endpoint for one account.
    pub fn balance_url(&self, account_id: &str) -> Url {
        self.endpoint(&["accounts", "balance", account_id])
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // parse_base_url rejects cannot-be-a-base URLs, so this never fails
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// Configuration for automatic retries.
///
/// Responses with a retryable status, and connection or timeout failures,
/// are retried for the configured methods with exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Base delay in seconds; attempt `n` waits `backoff_factor * 2^n`
    pub backoff_factor: f64,
    /// Upper bound on any single delay
    pub max_backoff: Duration,
    /// HTTP status codes to retry on
    pub retry_statuses: Vec<u16>,
    /// HTTP methods that may be retried
    pub retry_methods: Vec<Method>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_factor: 0.5,
            max_backoff: Duration::from_secs(120),
            retry_statuses: vec![429, 500, 502, 503, 504],
            retry_methods: vec![Method::GET, Method::POST],
        }
    }
}

impl RetryConfig {
    /// Create a configuration with no retries.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Set the maximum number of retries.
    pub fn with_max_retries(mut self, max: u32) -> Self {
        self.max_retries = max;
        self
    }

    /// Set the backoff factor (seconds).
    pub fn with_backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = factor;
        self
    }

    /// Set the maximum backoff duration.
    pub fn with_max_backoff(mut self, duration: Duration) -> Self {
        self.max_backoff = duration;
        self
    }

    /// Calculate the backoff duration for a given attempt.
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let secs = self.backoff_factor * 2f64.powi(attempt.min(32) as i32);
        let max_secs = self.max_backoff.as_secs_f64();
        if !secs.is_finite() {
            return self.max_backoff;
        }
        Duration::from_secs_f64(secs.clamp(0.0, max_secs))
    }

    /// Check if a status code should be retried.
    pub fn should_retry_status(&self, status: u16) -> bool {
        self.retry_statuses.contains(&status)
    }

    /// Check if a method is eligible for retries at all.
    pub fn should_retry_method(&self, method: &Method) -> bool {
        self.retry_methods.contains(method)
    }

    /// Check if a response with `status` to a `method` request should be retried.
    pub fn should_retry(&self, method: &Method, status: u16) -> bool {
        self.should_retry_method(method) && self.should_retry_status(status)
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())?;
    if url.cannot_be_a_base() {
        return Err(Error::Config(format!("base URL `{raw}` cannot carry a path")));
    }
    Ok(url)
}

fn parse_var<T, F>(var: &F, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("invalid value for {key} ({raw:?}): {e}"))),
        None => Ok(default),
    }
}

fn bool_var<F>(var: &F, key: &str, default: bool) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => parse_bool(&raw)
            .ok_or_else(|| Error::Config(format!("invalid boolean for {key}: {raw:?}"))),
        None => Ok(default),
    }
}
