//! Enumeration types for the banking API.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a transfer as reported by the server.
///
/// `Failed` is a business outcome (insufficient funds, frozen account, ...)
/// and is returned normally, not raised as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferStatus {
    /// Funds were moved
    Success,
    /// The server declined the transfer; see the response message
    Failed,
}

impl TransferStatus {
    /// Returns `true` if the transfer went through.
    pub fn is_success(&self) -> bool {
        matches!(self, TransferStatus::Success)
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferStatus::Success => write!(f, "SUCCESS"),
            TransferStatus::Failed => write!(f, "FAILED"),
        }
    }
}
