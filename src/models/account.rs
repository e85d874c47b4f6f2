//! Account and validation models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient::{
    bool_or_false, decimal_or_zero, first_non_empty_str, string_or, FieldError,
};

/// Account information as returned by the account listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Account identifier
    pub account_id: String,
    /// Name of the account holder
    pub account_holder: String,
    /// Current balance
    pub balance: Decimal,
    /// ISO currency code
    pub currency: String,
    /// Account status (e.g. `ACTIVE`)
    pub status: String,
}

impl Account {
    /// Wire names tried, in order, for the account identifier.
    pub const ID_FIELDS: &'static [&'static str] = &["accountId", "id"];
    /// Holder used when the server omits one.
    pub const DEFAULT_HOLDER: &'static str = "Unknown";
    /// Currency used when the server omits one.
    pub const DEFAULT_CURRENCY: &'static str = "USD";
    /// Status used when the server omits one.
    pub const DEFAULT_STATUS: &'static str = "ACTIVE";

    /// Build an account from one loosely-structured listing entry.
    ///
    /// | Field | Wire names | When absent |
    /// |---|---|---|
    /// | `account_id` | `accountId`, `id` | error |
    /// | `account_holder` | `accountHolder` | `"Unknown"` |
    /// | `balance` | `balance` (number or numeric string) | `0` |
    /// | `currency` | `currency` | `"USD"` |
    /// | `status` | `status` | `"ACTIVE"` |
    ///
    /// A field that is present but `null` is an error, not a default, so
    /// the entry is dropped rather than shown with a made-up value.
    ///
    /// # Example
    ///
    /// ```
    /// use banking_client::models::Account;
    /// use serde_json::json;
    ///
    /// let account = Account::from_value(&json!({"id": "ACC1000", "balance": "250.00"})).unwrap();
    /// assert_eq!(account.account_id, "ACC1000");
    /// assert_eq!(account.account_holder, "Unknown");
    /// assert_eq!(account.currency, "USD");
    /// ```
    pub fn from_value(value: &Value) -> Result<Self, FieldError> {
        let Value::Object(object) = value else {
            return Err(FieldError::Invalid {
                field: "account",
                reason: format!("expected an object, got {value}"),
            });
        };

        let account_id = first_non_empty_str(object, Self::ID_FIELDS)
            .ok_or(FieldError::Missing("accountId"))?
            .to_string();

        Ok(Self {
            account_id,
            account_holder: string_or(object, "accountHolder", Self::DEFAULT_HOLDER)?,
            balance: decimal_or_zero(object, "balance")?,
            currency: string_or(object, "currency", Self::DEFAULT_CURRENCY)?,
            status: string_or(object, "status", Self::DEFAULT_STATUS)?,
        })
    }
}

/// The raw entries of an account listing.
///
/// The server answers either with a bare array or with an object holding
/// an `accounts` array; anything else is treated as an empty listing.
pub(crate) fn account_entries(body: &Value) -> &[Value] {
    match body {
        Value::Array(entries) => entries,
        Value::Object(object) => object
            .get("accounts")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    }
}

/// Result of validating an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    /// The account that was checked
    pub account_id: String,
    /// Whether the server considers the account valid
    pub valid: bool,
    /// Optional explanation from the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationResponse {
    /// Wire names tried, in order, for the validity flag.
    pub const VALID_FIELDS: &'static [&'static str] = &["valid", "isValid"];
    /// Wire names tried, in order, for the explanation.
    pub const MESSAGE_FIELDS: &'static [&'static str] = &["message", "status"];

    /// Build a validation result from the server's response body.
    ///
    /// `valid` comes from the first non-null of `valid` / `isValid`
    /// (absent means `false`); `message` from the first non-empty string of
    /// `message` / `status`.
    pub fn from_value(account_id: impl Into<String>, body: &Value) -> Result<Self, FieldError> {
        let Value::Object(object) = body else {
            return Err(FieldError::Invalid {
                field: "body",
                reason: format!("expected an object, got {body}"),
            });
        };

        Ok(Self {
            account_id: account_id.into(),
            valid: bool_or_false(object, Self::VALID_FIELDS)?,
            message: first_non_empty_str(object, Self::MESSAGE_FIELDS).map(String::from),
        })
    }

    /// The result reported for an account the server does not know.
    pub fn not_found(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            valid: false,
            message: Some("Account not found".to_string()),
        }
    }
}
