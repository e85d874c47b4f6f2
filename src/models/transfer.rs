//! Transfer request and response models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::enums::TransferStatus;
use super::lenient::deserialize_timestamp;
use super::primitives::{validate_amount, AccountId};
use crate::Result;

/// A validated request to move funds between two accounts.
///
/// On the wire the fields are `fromAccount`, `toAccount` and `amount`, with
/// the amount serialized as a fixed-point string so no precision is lost.
///
/// # Example
///
/// ```
/// use banking_client::models::TransferRequest;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let request = TransferRequest::new("ACC1000", "ACC1001", Decimal::from_str("123.45")?)?;
/// let body = serde_json::to_value(&request).unwrap();
/// assert_eq!(body["fromAccount"], "ACC1000");
/// assert_eq!(body["amount"], "123.45");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    from_account: AccountId,
    to_account: AccountId,
    #[serde(with = "rust_decimal::serde::str")]
    amount: Decimal,
}

impl TransferRequest {
    /// Validate the inputs and build a request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](crate::Error::Validation) if either
    /// account id is not `ACC####`, or the amount is not positive with at
    /// most two decimal places.
    pub fn new(from_account: &str, to_account: &str, amount: Decimal) -> Result<Self> {
        Ok(Self {
            from_account: AccountId::parse(from_account)?,
            to_account: AccountId::parse(to_account)?,
            amount: validate_amount(amount)?,
        })
    }

    /// Source account.
    pub fn from_account(&self) -> &AccountId {
        &self.from_account
    }

    /// Destination account.
    pub fn to_account(&self) -> &AccountId {
        &self.to_account
    }

    /// Amount to move.
    pub fn amount(&self) -> Decimal {
        self.amount
    }
}

/// The server's answer to a transfer request.
///
/// `status` is authoritative: a [`TransferStatus::Failed`] response is a
/// normal return value whose `message` carries the business reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResponse {
    /// Server-assigned transaction identifier
    pub transaction_id: String,
    /// Outcome of the transfer
    pub status: TransferStatus,
    /// Human-readable explanation
    pub message: String,
    /// Source account as echoed by the server
    pub from_account: String,
    /// Destination account as echoed by the server
    pub to_account: String,
    /// Amount as echoed by the server
    pub amount: Decimal,
    /// When the server processed the transfer
    #[serde(
        default,
        deserialize_with = "deserialize_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,
}

impl TransferResponse {
    /// Returns `true` if the server reports the transfer as completed.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}
