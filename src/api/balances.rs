//! Balances service.

use std::sync::Arc;

use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::client::ClientInner;
use crate::models::lenient::decimal_from_value;
use crate::{Error, Result};

/// Service for balance lookups.
pub struct BalancesService {
    inner: Arc<ClientInner>,
}

impl BalancesService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// Get the current balance of an account.
    ///
    /// A response without a `balance` field, or with a `null` one, reads
    /// as zero.
    ///
    /// # Errors
    ///
    /// - [`Error::AccountNotFound`] (status 404) for an unknown account.
    /// - [`Error::Network`] for any other HTTP error status, an unreadable
    ///   body, or a connection failure.
    pub async fn get(&self, account_id: &str) -> Result<Decimal> {
        let response = self
            .inner
            .get(self.inner.settings.balance_url(account_id))
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::AccountNotFound {
                message: format!("Account {account_id} not found"),
                status: StatusCode::NOT_FOUND.as_u16(),
            });
        }

        if !response.is_success() {
            let status = response.status().as_u16();
            return Err(Error::network(
                format!("Balance lookup failed with status {status}"),
                Some(status),
            ));
        }

        let body: Value = response
            .json()
            .map_err(|e| Error::network(format!("Invalid balance response: {e}"), None))?;

        let Value::Object(object) = &body else {
            return Err(Error::network(
                format!("Invalid balance response: expected an object, got {body}"),
                None,
            ));
        };

        // a lone null balance reads as zero, unlike in listings
        let balance = match object.get("balance") {
            None | Some(Value::Null) => Decimal::ZERO,
            Some(value) => decimal_from_value(value).ok_or_else(|| {
                Error::network(format!("Invalid balance response: balance is {value}"), None)
            })?,
        };

        tracing::debug!(account_id, %balance, "Retrieved balance");
        Ok(balance)
    }
}
