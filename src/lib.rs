//! # banking-client
//!
//! An async Rust client for the Core Banking API.
//!
//! The client transfers funds between accounts, validates account ids, and
//! looks up balances and account listings over HTTP/JSON.
//!
//! ## Features
//!
//! - **Transfers**: Local validation of account ids and amounts before anything is sent
//! - **Accounts**: Validation and listing with tolerant parsing of inconsistent field names
//! - **Balances**: Exact decimal balances, never floating point
//! - **Authentication**: Optional bearer tokens, cached and refreshed ahead of expiry
//! - **Transport**: Pooled connections, bounded concurrency, retry with exponential backoff
//! - **Async-first**: Built on Tokio and reqwest
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use banking_client::{BankingClient, Settings};
//! use rust_decimal_macros::dec;
//!
//! #[tokio::main]
//! async fn main() -> banking_client::Result<()> {
//!     let client = BankingClient::new(Settings::from_dotenv()?)?;
//!
//!     let validation = client.validate_account("ACC1000").await?;
//!     println!("ACC1000 valid: {}", validation.valid);
//!
//!     let balance = client.get_balance("ACC1000").await?;
//!     println!("Balance: {balance}");
//!
//!     let response = client.transfer("ACC1000", "ACC1001", dec!(100.00)).await?;
//!     println!("{}: {}", response.status, response.message);
//!
//!     client.close();
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! [`Settings::from_env`] reads the following variables; blank or unset
//! variables keep their defaults.
//!
//! | Variable | Default |
//! |---|---|
//! | `API_BASE_URL` | `http://localhost:8123` |
//! | `API_TIMEOUT` | `30` (seconds) |
//! | `API_MAX_RETRIES` | `3` |
//! | `API_RETRY_BACKOFF` | `0.5` (seconds) |
//! | `AUTH_USERNAME` | `admin` |
//! | `AUTH_PASSWORD` | `password123` |
//! | `AUTH_CACHE_ENABLED` | `true` |
//! | `ENABLE_AUTHENTICATION` | `false` |
//! | `ENABLE_REQUEST_LOGGING` | `true` |
//! | `CONNECTION_POOL_SIZE` | `10` |
//! | `CONNECTION_POOL_MAXSIZE` | `20` |
//!
//! ## Errors
//!
//! Every failure is an [`Error`]; match on the variant or on
//! [`Error::kind`]. A transfer the server declines is not an error: it
//! returns a [`TransferResponse`](models::TransferResponse) whose status is
//! `FAILED`.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod models;

// Re-export primary types at crate root for convenience
pub use error::{Error, ErrorKind, Result};
pub use models::{AccountId, TransferStatus};
pub use client::{BankingClient, RetryConfig, Settings};
pub use auth::{AuthToken, TokenManager};

/// Prelude module for convenient imports.
///
/// ```rust
/// use banking_client::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::models::{
        Account, AccountId, TransferRequest, TransferResponse, TransferStatus,
        ValidationResponse,
    };
    pub use crate::client::{BankingClient, RetryConfig, Settings};
    pub use crate::auth::{AuthToken, TokenManager};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_creation() {
        let account = AccountId::parse("ACC1000").unwrap();
        assert_eq!(account.as_str(), "ACC1000");
    }

    #[test]
    fn test_default_endpoints() {
        let settings = Settings::default();
        assert_eq!(settings.transfer_url().as_str(), "http://localhost:8123/transfer");
        assert_eq!(
            settings.balance_url("ACC1000").as_str(),
            "http://localhost:8123/accounts/balance/ACC1000"
        );
    }

    #[test]
    fn test_client_construction_needs_no_network() {
        let client = BankingClient::new(Settings::default()).unwrap();
        assert!(!client.token_manager().is_enabled());
        assert_eq!(client.settings().timeout, std::time::Duration::from_secs(30));
        client.close();
    }
}
