//! Transfers service.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::client::ClientInner;
use crate::models::{TransferRequest, TransferResponse};
use crate::{Error, Result};

/// Service for moving funds between accounts.
///
/// # Example
///
/// ```no_run
/// # async fn example(client: banking_client::BankingClient) -> banking_client::Result<()> {
/// use rust_decimal::Decimal;
///
/// let response = client
///     .transfers()
///     .create("ACC1000", "ACC1001", Decimal::new(12345, 2))
///     .await?;
///
/// if !response.is_success() {
///     println!("Rejected: {}", response.message);
/// }
/// # Ok(())
/// # }
/// ```
pub struct TransfersService {
    inner: Arc<ClientInner>,
}

impl TransfersService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// Transfer `amount` from one account to another.
    ///
    /// Both ids and the amount are validated before anything is sent. A
    /// transfer the server declines (for example for insufficient funds)
    /// comes back as a response with status `FAILED`, not as an error.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] for a malformed id or amount; no request is made.
    /// - [`Error::Transfer`] for an HTTP error status or an unreadable response.
    /// - [`Error::Network`] if the server cannot be reached.
    /// - [`Error::Authentication`] if a token is needed and cannot be acquired.
    pub async fn create(
        &self,
        from_account: &str,
        to_account: &str,
        amount: Decimal,
    ) -> Result<TransferResponse> {
        let request = TransferRequest::new(from_account, to_account, amount)?;

        tracing::info!(
            from = %request.from_account(),
            to = %request.to_account(),
            amount = %request.amount(),
            "Initiating transfer"
        );

        let response = self
            .inner
            .post(self.inner.settings.transfer_url(), &request)
            .await?;

        if !response.is_success() {
            let status = response.status().as_u16();
            let message = format!("Transfer failed with status {status}: {}", response.body());
            tracing::error!("{}", message);
            return Err(Error::transfer(message, Some(status)));
        }

        let parsed: TransferResponse = response.json().map_err(|e| {
            let message = format!("Invalid transfer response: {e}");
            tracing::error!("{}", message);
            Error::transfer(message, None)
        })?;

        if parsed.is_success() {
            tracing::info!(transaction_id = %parsed.transaction_id, "Transfer completed");
        } else {
            tracing::warn!(
                transaction_id = %parsed.transaction_id,
                reason = %parsed.message,
                "Transfer declined"
            );
        }

        Ok(parsed)
    }
}
