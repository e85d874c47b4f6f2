//! Accounts service for validation and listing.

use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::Value;

use crate::client::ClientInner;
use crate::models::account::account_entries;
use crate::models::{Account, ValidationResponse};
use crate::{Error, Result};

/// Service for account-related operations.
///
/// # Example
///
/// ```no_run
/// # async fn example(client: banking_client::BankingClient) -> banking_client::Result<()> {
/// let result = client.accounts().validate("ACC1000").await?;
/// println!("ACC1000 valid: {}", result.valid);
///
/// for account in client.accounts().list().await? {
///     println!("{}: {} {}", account.account_id, account.balance, account.currency);
/// }
/// # Ok(())
/// # }
/// ```
pub struct AccountsService {
    inner: Arc<ClientInner>,
}

impl AccountsService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// Check whether an account exists and is valid.
    ///
    /// An unknown account (404) is an ordinary answer here: it comes back
    /// as `valid == false` with the message `"Account not found"`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`] for any other HTTP error status, an
    /// unreadable body, or a connection failure.
    pub async fn validate(&self, account_id: &str) -> Result<ValidationResponse> {
        tracing::debug!(account_id, "Validating account");

        let response = self
            .inner
            .get(self.inner.settings.validate_url(account_id))
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(account_id, "Account not found");
            return Ok(ValidationResponse::not_found(account_id));
        }

        if !response.is_success() {
            let status = response.status().as_u16();
            return Err(Error::network(
                format!("Account validation failed with status {status}"),
                Some(status),
            ));
        }

        let body: Value = response
            .json()
            .map_err(|e| Error::network(format!("Invalid validation response: {e}"), None))?;

        ValidationResponse::from_value(account_id, &body)
            .map_err(|e| Error::network(format!("Invalid validation response: {e}"), None))
    }

    /// List all accounts.
    ///
    /// Entries that cannot be read (no id, a non-numeric balance, not an
    /// object) are left out; the rest are returned in server order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`] for an HTTP error status, a body that is
    /// not JSON, or a connection failure.
    pub async fn list(&self) -> Result<Vec<Account>> {
        let response = self.inner.get(self.inner.settings.accounts_url()).await?;

        if !response.is_success() {
            let status = response.status().as_u16();
            return Err(Error::network(
                format!("Failed to list accounts with status {status}"),
                Some(status),
            ));
        }

        let body: Value = response
            .json()
            .map_err(|e| Error::network(format!("Invalid accounts response: {e}"), None))?;

        let accounts: Vec<Account> = account_entries(&body)
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| match Account::from_value(entry) {
                Ok(account) => Some(account),
                Err(e) => {
                    tracing::warn!(index, error = %e, "Skipping unreadable account entry");
                    None
                }
            })
            .collect();

        tracing::debug!(count = accounts.len(), "Retrieved accounts");
        Ok(accounts)
    }
}
