//! Bearer token management for the Core Banking API.
//!
//! When authentication is enabled, every request carries a bearer token
//! obtained from the `authToken` endpoint with the configured username and
//! password. The [`TokenManager`] holds the token, reuses it while it is
//! more than [`TOKEN_EXPIRY_BUFFER_SECS`] seconds from expiry, and acquires
//! a fresh one otherwise.
//!
//! ```no_run
//! use banking_client::{BankingClient, Settings};
//!
//! # async fn example() -> banking_client::Result<()> {
//! let settings = Settings::new("http://localhost:8123")?
//!     .with_authentication(true)
//!     .with_credentials("admin", "password123");
//! let client = BankingClient::new(settings)?;
//!
//! // Tokens are acquired on demand; this forces one up front.
//! client.token_manager().get_token(true).await?;
//! # Ok(())
//! # }
//! ```

mod token;

pub use token::{AuthToken, TokenManager, TOKEN_EXPIRY_BUFFER_SECS};
