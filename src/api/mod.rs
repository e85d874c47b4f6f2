//! API service modules for the Core Banking endpoints.
//!
//! Each service provides methods for interacting with a specific
//! subset of the banking API. Services are cheap handles obtained from
//! [`BankingClient`](crate::BankingClient) and share its transport and token.

mod accounts;
mod balances;
mod transfers;

pub use accounts::AccountsService;
pub use balances::BalancesService;
pub use transfers::TransfersService;
