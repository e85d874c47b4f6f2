//! Primitive types and newtypes for type-safe API interactions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Required prefix of every account identifier.
pub const ACCOUNT_ID_PREFIX: &str = "ACC";

/// Total length of an account identifier (`ACC` + four digits).
pub const ACCOUNT_ID_LEN: usize = 7;

/// Maximum number of fractional digits in a transfer amount.
pub const MAX_AMOUNT_SCALE: u32 = 2;

/// A validated account identifier of the form `ACC####`.
///
/// # Example
///
/// ```
/// use banking_client::AccountId;
///
/// let account = AccountId::parse("ACC1000")?;
/// assert_eq!(account.as_str(), "ACC1000");
///
/// assert!(AccountId::parse("ACC12").is_err());
/// assert!(AccountId::parse("XYZ1000").is_err());
/// # Ok::<(), banking_client::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    /// Parse and validate an account identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] unless the input is exactly `ACC`
    /// followed by four ASCII digits.
    pub fn parse(s: &str) -> Result<Self> {
        if s.len() != ACCOUNT_ID_LEN {
            return Err(Error::Validation(format!(
                "Account ID must be exactly {ACCOUNT_ID_LEN} characters, got {s:?}"
            )));
        }
        let Some(digits) = s.strip_prefix(ACCOUNT_ID_PREFIX) else {
            return Err(Error::Validation(format!(
                "Account ID must start with '{ACCOUNT_ID_PREFIX}', got {s:?}"
            )));
        };
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::Validation(format!(
                "Account ID must be in format ACC#### where # is a digit, got {s:?}"
            )));
        }
        Ok(Self(s.to_string()))
    }

    /// Get the account id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for AccountId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AccountId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

/// Check that `amount` is a valid transfer amount: strictly positive with
/// at most two fractional digits.
///
/// Trailing zeros do not count against the scale, so `100.000` passes.
pub fn validate_amount(amount: Decimal) -> Result<Decimal> {
    if amount <= Decimal::ZERO {
        return Err(Error::Validation(format!(
            "Transfer amount must be greater than 0, got {amount}"
        )));
    }
    if amount.normalize().scale() > MAX_AMOUNT_SCALE {
        return Err(Error::Validation(format!(
            "Transfer amount must have at most {MAX_AMOUNT_SCALE} decimal places, got {amount}"
        )));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_account_id_valid() {
        let account = AccountId::parse("ACC1000").unwrap();
        assert_eq!(account.as_str(), "ACC1000");
        assert_eq!(account.to_string(), "ACC1000");
        assert_eq!("ACC9999".parse::<AccountId>().unwrap().as_str(), "ACC9999");
    }

    #[test]
    fn test_account_id_invalid() {
        for bad in [
            "", "ACC", "ACC100", "ACC10000", "acc1000", "XYZ1000", "ACC10a0", "ACC-100",
            "ACC１２３", " ACC100",
        ] {
            let err = AccountId::parse(bad).unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_account_id_serde() {
        let id: AccountId = serde_json::from_str("\"ACC1001\"").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"ACC1001\"");
        assert!(serde_json::from_str::<AccountId>("\"BAD\"").is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert_eq!(validate_amount(dec!(100.00)).unwrap(), dec!(100.00));
        assert!(validate_amount(dec!(0.01)).is_ok());
        assert!(validate_amount(dec!(5.100)).is_ok());

        assert!(validate_amount(dec!(0)).is_err());
        assert!(validate_amount(dec!(-10.00)).is_err());
        assert!(validate_amount(dec!(10.001)).is_err());
    }
}
