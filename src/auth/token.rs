//! Bearer token acquisition and caching.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::client::{HttpTransport, Settings};
use crate::models::lenient::deserialize_timestamp;
use crate::{Error, Result};

/// A held token is refreshed once it is within this many seconds of expiry.
pub const TOKEN_EXPIRY_BUFFER_SECS: i64 = 5 * 60;

/// Claim requested from the auth endpoint.
const TRANSFER_CLAIM: &str = "transfer";

/// A bearer token issued by the auth endpoint.
///
/// Tokens are replaced wholesale on refresh, never mutated.
#[derive(Clone)]
pub struct AuthToken {
    token: SecretString,
    expires_at: Option<DateTime<Utc>>,
    token_type: String,
}

impl AuthToken {
    /// Create a token of type `Bearer`.
    pub fn new(token: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            token: SecretString::from(token.into()),
            expires_at,
            token_type: "Bearer".to_string(),
        }
    }

    /// The token value.
    pub fn secret(&self) -> &SecretString {
        &self.token
    }

    /// When the token expires, if the server said.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Token type reported by the server (`Bearer` unless told otherwise).
    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// Whether the token may still be used at `now`.
    ///
    /// A token without an expiry never goes stale. A token with one is
    /// valid only while `now` plus the five-minute buffer is still before
    /// the expiry, so it is never sent when it could lapse mid-request.
    ///
    /// ```
    /// use banking_client::auth::AuthToken;
    /// use chrono::{Duration, Utc};
    ///
    /// let now = Utc::now();
    /// assert!(AuthToken::new("t", None).is_valid_at(now));
    /// assert!(AuthToken::new("t", Some(now + Duration::hours(1))).is_valid_at(now));
    /// assert!(!AuthToken::new("t", Some(now + Duration::minutes(3))).is_valid_at(now));
    /// ```
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            None => true,
            Some(expires_at) => now + Duration::seconds(TOKEN_EXPIRY_BUFFER_SECS) < expires_at,
        }
    }

    /// Whether the token may still be used right now.
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthToken")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Acquires, caches and refreshes the bearer token.
///
/// # Thread Safety
///
/// The held token sits behind an async mutex that stays locked while a
/// refresh is in flight, so concurrent callers that all find the token
/// stale wait for one acquisition and then share its result.
pub struct TokenManager {
    transport: HttpTransport,
    settings: Arc<Settings>,
    token: Mutex<Option<AuthToken>>,
}

impl TokenManager {
    /// Create a token manager that talks to the auth endpoint through `transport`.
    pub fn new(transport: HttpTransport, settings: Arc<Settings>) -> Self {
        Self {
            transport,
            settings,
            token: Mutex::new(None),
        }
    }

    /// Whether authentication is enabled in the settings.
    pub fn is_enabled(&self) -> bool {
        self.settings.enable_authentication
    }

    /// Get a usable token, acquiring a new one if needed.
    ///
    /// With authentication disabled this returns an empty token without
    /// touching the network. Otherwise the held token is returned while it
    /// is valid, unless `force_refresh` is set or token caching is turned
    /// off, in which case a new token is acquired and replaces it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] if acquisition fails.
    pub async fn get_token(&self, force_refresh: bool) -> Result<SecretString> {
        if !self.is_enabled() {
            tracing::debug!("Authentication is disabled");
            return Ok(SecretString::from(String::new()));
        }

        let mut held = self.token.lock().await;

        if !force_refresh && self.settings.auth_cache_enabled {
            if let Some(token) = held.as_ref().filter(|t| t.is_valid()) {
                tracing::debug!("Using cached authentication token");
                return Ok(token.token.clone());
            }
        }

        tracing::info!("Acquiring new authentication token");
        let fresh = self.acquire_token().await?;
        let secret = fresh.token.clone();
        *held = Some(fresh);
        Ok(secret)
    }

    /// Drop the held token so the next [`get_token`](Self::get_token)
    /// acquires a new one.
    pub async fn invalidate_token(&self) {
        tracing::debug!("Invalidating cached token");
        *self.token.lock().await = None;
    }

    /// A copy of the currently held token, if any.
    pub async fn cached_token(&self) -> Option<AuthToken> {
        self.token.lock().await.clone()
    }

    async fn acquire_token(&self) -> Result<AuthToken> {
        let mut url = self.settings.auth_url();
        url.query_pairs_mut().append_pair("claim", TRANSFER_CLAIM);

        let credentials = Credentials {
            username: &self.settings.auth_username,
            password: self.settings.auth_password.expose_secret(),
        };

        let response = self
            .transport
            .post_json_redacted(url, &credentials, None)
            .await
            .map_err(|e| {
                let message = format!("Network error during authentication: {}", e.message());
                tracing::error!("{}", message);
                Error::authentication(message, e.status_code())
            })?;

        if !response.is_success() {
            let status = response.status().as_u16();
            let message = format!("Authentication failed with status {status}");
            tracing::error!("{}", message);
            return Err(Error::authentication(message, Some(status)));
        }

        let parsed: TokenResponse = response.json().map_err(|e| {
            let message = format!("Invalid authentication response: {e}");
            tracing::error!("{}", message);
            Error::authentication(message, None)
        })?;

        if parsed.token.is_empty() {
            tracing::warn!("Auth endpoint returned an empty token; using it as-is");
        }

        tracing::info!("Successfully acquired authentication token");
        Ok(AuthToken {
            token: SecretString::from(parsed.token),
            expires_at: parsed.expires_at,
            token_type: parsed.token_type.unwrap_or_else(|| "Bearer".to_string()),
        })
    }
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("enabled", &self.settings.enable_authentication)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    #[serde(default)]
    token: String,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    token_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_without_expiry_is_valid() {
        let token = AuthToken::new("test-token", None);
        assert!(token.is_valid());
        assert_eq!(token.token_type(), "Bearer");
    }

    #[test]
    fn test_token_validity_buffer() {
        let now = Utc::now();
        assert!(AuthToken::new("t", Some(now + Duration::hours(1))).is_valid_at(now));
        assert!(!AuthToken::new("t", Some(now - Duration::hours(1))).is_valid_at(now));
        assert!(!AuthToken::new("t", Some(now + Duration::minutes(3))).is_valid_at(now));
        // exactly at the buffer edge is already too late
        assert!(!AuthToken::new("t", Some(now + Duration::minutes(5))).is_valid_at(now));
        assert!(AuthToken::new("t", Some(now + Duration::minutes(6))).is_valid_at(now));
    }

    #[test]
    fn test_token_response_parsing() {
        let parsed: TokenResponse = serde_json::from_str(
            r#"{"token": "abc", "expiresAt": "2030-01-01T00:00:00", "tokenType": "JWT"}"#,
        )
        .unwrap();
        assert_eq!(parsed.token, "abc");
        assert!(parsed.expires_at.is_some());
        assert_eq!(parsed.token_type.as_deref(), Some("JWT"));

        let parsed: TokenResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.token, "");
        assert!(parsed.expires_at.is_none());

        assert!(serde_json::from_str::<TokenResponse>(r#"{"expiresAt": "soon"}"#).is_err());
    }

    #[test]
    fn test_millisecond_expiry_is_not_read_as_seconds() {
        let an_hour_ago = (Utc::now() - Duration::hours(1)).timestamp_millis();
        let parsed: TokenResponse =
            serde_json::from_value(serde_json::json!({"token": "t", "expiresAt": an_hour_ago}))
                .unwrap();

        let expires_at = parsed.expires_at.unwrap();
        assert!(expires_at < Utc::now());
        assert!(!AuthToken::new(parsed.token, Some(expires_at)).is_valid());

        let parsed: TokenResponse =
            serde_json::from_str(r#"{"token": "t", "expiresAt": "2030-01-01"}"#).unwrap();
        assert_eq!(parsed.expires_at.unwrap().to_rfc3339(), "2030-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_token_debug_redacts_secret() {
        let debug_str = format!("{:?}", AuthToken::new("super-secret-token", None));
        assert!(!debug_str.contains("super-secret-token"));
        assert!(debug_str.contains("REDACTED"));
    }
}
