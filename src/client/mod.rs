//! HTTP client and service layer for the Core Banking API.
//!
//! This module provides the main entry point [`BankingClient`], its
//! [`Settings`], and the [`HttpTransport`] it shares with the token
//! manager.
//!
//! # Example
//!
//! ```no_run
//! use banking_client::{BankingClient, Settings};
//!
//! # async fn example() -> banking_client::Result<()> {
//! let client = BankingClient::new(Settings::new("http://localhost:8123")?)?;
//!
//! let result = client.validate_account("ACC1000").await?;
//! println!("valid: {}", result.valid);
//! # Ok(())
//! # }
//! ```

mod config;
mod http;
mod transport;

pub use config::{RetryConfig, Settings, DEFAULT_BASE_URL};
pub use http::BankingClient;
pub use transport::{HttpResponse, HttpTransport};
pub(crate) use http::ClientInner;
