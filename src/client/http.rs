//! The banking client and its shared request plumbing.

use std::sync::Arc;

use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use url::Url;

use crate::api::{AccountsService, BalancesService, TransfersService};
use crate::auth::TokenManager;
use crate::models::{Account, TransferResponse, ValidationResponse};
use crate::Result;

use super::config::Settings;
use super::transport::{HttpResponse, HttpTransport};

/// The main client for interacting with the Core Banking API.
///
/// The client owns one pooled [`HttpTransport`] and one [`TokenManager`]
/// for its whole lifetime. Both are released when the last handle is
/// dropped, or eagerly through [`close`](Self::close).
///
/// # Example
///
/// ```no_run
/// use banking_client::{BankingClient, Settings};
/// use rust_decimal::Decimal;
///
/// # async fn example() -> banking_client::Result<()> {
/// let client = BankingClient::new(Settings::from_env()?)?;
///
/// let response = client
///     .transfer("ACC1000", "ACC1001", Decimal::new(10000, 2))
///     .await?;
/// println!("Transfer {}: {}", response.transaction_id, response.status);
///
/// for account in client.get_accounts().await? {
///     println!("{} {}", account.account_id, account.balance);
/// }
///
/// client.close();
/// # Ok(())
/// # }
/// ```
pub struct BankingClient {
    pub(crate) inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    pub(crate) transport: HttpTransport,
    pub(crate) tokens: TokenManager,
    pub(crate) settings: Arc<Settings>,
}

impl BankingClient {
    /// Create a client from explicit settings.
    pub fn new(settings: Settings) -> Result<Self> {
        let settings = Arc::new(settings);
        let transport = HttpTransport::new(&settings)?;
        let tokens = TokenManager::new(transport.clone(), settings.clone());

        tracing::info!(
            base_url = %settings.base_url,
            auth_enabled = settings.enable_authentication,
            "Initialized BankingClient"
        );

        Ok(Self {
            inner: Arc::new(ClientInner {
                transport,
                tokens,
                settings,
            }),
        })
    }

    /// Create a client from the process environment.
    ///
    /// This is shorthand for `BankingClient::new(Settings::from_env()?)`.
    pub fn from_env() -> Result<Self> {
        Self::new(Settings::from_env()?)
    }

    /// Get the transfers service.
    pub fn transfers(&self) -> TransfersService {
        TransfersService::new(self.inner.clone())
    }

    /// Get the accounts service.
    pub fn accounts(&self) -> AccountsService {
        AccountsService::new(self.inner.clone())
    }

    /// Get the balances service.
    pub fn balances(&self) -> BalancesService {
        BalancesService::new(self.inner.clone())
    }

    /// Transfer funds between two accounts.
    ///
    /// Shorthand for [`TransfersService::create`].
    pub async fn transfer(
        &self,
        from_account: &str,
        to_account: &str,
        amount: Decimal,
    ) -> Result<TransferResponse> {
        self.transfers().create(from_account, to_account, amount).await
    }

    /// Check whether an account exists and is valid.
    ///
    /// Shorthand for [`AccountsService::validate`].
    pub async fn validate_account(&self, account_id: &str) -> Result<ValidationResponse> {
        self.accounts().validate(account_id).await
    }

    /// List all accounts.
    ///
    /// Shorthand for [`AccountsService::list`].
    pub async fn get_accounts(&self) -> Result<Vec<Account>> {
        self.accounts().list().await
    }

    /// Get the balance of one account.
    ///
    /// Shorthand for [`BalancesService::get`].
    pub async fn get_balance(&self, account_id: &str) -> Result<Decimal> {
        self.balances().get(account_id).await
    }

    /// Get the token manager.
    pub fn token_manager(&self) -> &TokenManager {
        &self.inner.tokens
    }

    /// Get the settings this client was built with.
    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    /// Release the client.
    ///
    /// Closes the transport so no further request can start on it (this
    /// affects every clone of this client), then drops this handle.
    pub fn close(self) {
        tracing::debug!("Closing BankingClient");
        self.inner.transport.close();
    }
}

impl ClientInner {
    /// Bearer token to attach, if authentication is enabled.
    async fn bearer(&self) -> Result<Option<SecretString>> {
        if !self.tokens.is_enabled() {
            return Ok(None);
        }
        self.tokens.get_token(false).await.map(Some)
    }

    /// Make an authenticated GET request.
    pub(crate) async fn get(&self, url: Url) -> Result<HttpResponse> {
        let bearer = self.bearer().await?;
        let response = self
            .transport
            .get(url, bearer.as_ref().map(|t| t.expose_secret()))
            .await?;
        self.observe(&response).await;
        Ok(response)
    }

    /// Make an authenticated POST request with a JSON body.
    pub(crate) async fn post<B: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<HttpResponse> {
        let bearer = self.bearer().await?;
        let response = self
            .transport
            .post_json(url, body, bearer.as_ref().map(|t| t.expose_secret()))
            .await?;
        self.observe(&response).await;
        Ok(response)
    }

    /// A rejected token will not get better; make the next call reacquire.
    async fn observe(&self, response: &HttpResponse) {
        if self.tokens.is_enabled() && response.status() == reqwest::StatusCode::UNAUTHORIZED {
            tracing::warn!("Server rejected the bearer token; it will be reacquired");
            self.tokens.invalidate_token().await;
        }
    }
}

impl Drop for ClientInner {
    fn drop(&mut self) {
        tracing::debug!("Releasing banking client transport and token manager");
        self.transport.close();
    }
}

impl Clone for BankingClient {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl std::fmt::Debug for BankingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BankingClient")
            .field("settings", &self.inner.settings)
            .field("transport", &self.inner.transport)
            .finish()
    }
}
