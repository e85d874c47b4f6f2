//! Data models for the banking API.
//!
//! - [`primitives`] - `AccountId` and amount validation
//! - [`enums`] - Transfer status
//! - [`transfer`] - Transfer request/response
//! - [`account`] - Account listing entries and validation results
//! - [`lenient`] - Ordered-fallback field resolution for inconsistent responses

pub mod primitives;
pub mod enums;
pub mod transfer;
pub mod account;
pub mod lenient;

pub use primitives::*;
pub use enums::*;
pub use transfer::*;
pub use account::*;
pub use lenient::FieldError;
