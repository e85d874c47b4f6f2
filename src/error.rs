//! Error types for the banking client.
//!
//! Every failure surfaced by this crate is an [`Error`]. Each variant maps to
//! one [`ErrorKind`] and carries a human-readable message plus, where the
//! failure came from an HTTP response, the status code.
//!
//! Business-level outcomes are *not* errors: a transfer with status
//! `FAILED` or an account that validates as `valid = false` are ordinary
//! return values.

use std::fmt;

use thiserror::Error;

/// A specialized `Result` type for banking client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for all banking client operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Local input validation failed; no request was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Token acquisition failed (HTTP error, network error, malformed response).
    #[error("Authentication failed: {message}")]
    Authentication {
        /// Human-readable error message
        message: String,
        /// HTTP status code, when the auth endpoint answered
        status: Option<u16>,
    },

    /// A transfer failed at the HTTP or parsing layer.
    #[error("Transfer failed: {message}")]
    Transfer {
        /// Human-readable error message
        message: String,
        /// HTTP status code, when the server answered
        status: Option<u16>,
    },

    /// The requested account does not exist.
    #[error("Account not found: {message}")]
    AccountNotFound {
        /// Human-readable error message
        message: String,
        /// HTTP status code (always 404 today)
        status: u16,
    },

    /// Connection-level failure, or an HTTP error on a read endpoint.
    #[error("Network error: {message}")]
    Network {
        /// Human-readable error message
        message: String,
        /// HTTP status code, when the server answered
        status: Option<u16>,
    },

    /// Configuration could not be resolved.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// The category of an [`Error`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`Error::Validation`]
    Validation,
    /// See [`Error::Authentication`]
    Authentication,
    /// See [`Error::Transfer`]
    Transfer,
    /// See [`Error::AccountNotFound`]
    AccountNotFound,
    /// See [`Error::Network`]
    Network,
    /// See [`Error::Config`]
    Configuration,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Validation => "ValidationError",
            ErrorKind::Authentication => "AuthenticationError",
            ErrorKind::Transfer => "TransferError",
            ErrorKind::AccountNotFound => "AccountNotFoundError",
            ErrorKind::Network => "NetworkError",
            ErrorKind::Configuration => "ConfigurationError",
        };
        f.write_str(name)
    }
}

impl Error {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::Authentication { .. } => ErrorKind::Authentication,
            Error::Transfer { .. } => ErrorKind::Transfer,
            Error::AccountNotFound { .. } => ErrorKind::AccountNotFound,
            Error::Network { .. } => ErrorKind::Network,
            Error::Config(_) => ErrorKind::Configuration,
        }
    }

    /// Returns the HTTP status code attached to this error, if any.
    ///
    /// # Example
    ///
    /// ```
    /// use banking_client::Error;
    ///
    /// let err = Error::AccountNotFound {
    ///     message: "Account ACC9999 not found".into(),
    ///     status: 404,
    /// };
    /// assert_eq!(err.status_code(), Some(404));
    /// ```
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Authentication { status, .. }
            | Error::Transfer { status, .. }
            | Error::Network { status, .. } => *status,
            Error::AccountNotFound { status, .. } => Some(*status),
            Error::Validation(_) | Error::Config(_) => None,
        }
    }

    /// Returns the message carried by this error, without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            Error::Validation(message) | Error::Config(message) => message,
            Error::Authentication { message, .. }
            | Error::Transfer { message, .. }
            | Error::AccountNotFound { message, .. }
            | Error::Network { message, .. } => message,
        }
    }

    /// Returns `true` if this error is potentially transient and the
    /// operation could be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Network { status: None, .. } => true,
            Error::Network {
                status: Some(status),
                ..
            } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is an authentication-related error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Authentication { .. })
    }

    /// Returns `true` if this error indicates a client-side issue
    /// (invalid input, bad request, unknown account, etc.).
    pub fn is_client_error(&self) -> bool {
        match self {
            Error::Validation(_) | Error::Config(_) | Error::AccountNotFound { .. } => true,
            other => matches!(other.status_code(), Some(status) if (400..500).contains(&status)),
        }
    }

    /// Returns `true` if this error indicates a server-side issue.
    pub fn is_server_error(&self) -> bool {
        matches!(self.status_code(), Some(status) if status >= 500)
    }

    pub(crate) fn network(message: impl Into<String>, status: Option<u16>) -> Self {
        Error::Network {
            message: message.into(),
            status,
        }
    }

    pub(crate) fn transfer(message: impl Into<String>, status: Option<u16>) -> Self {
        Error::Transfer {
            message: message.into(),
            status,
        }
    }

    pub(crate) fn authentication(message: impl Into<String>, status: Option<u16>) -> Self {
        Error::Authentication {
            message: message.into(),
            status,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16());
        let message = if err.is_timeout() {
            format!("request timed out: {err}")
        } else if err.is_connect() {
            format!("connection failed: {err}")
        } else {
            err.to_string()
        };
        Error::Network { message, status }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Config(format!("invalid URL: {err}"))
    }
}
