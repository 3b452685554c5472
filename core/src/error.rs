//! Error types for the HTTP client.
//!
//! # Design
//! Two failure kinds only. `Init` covers anything that goes wrong before a
//! transfer can start: global library setup or preparing an easy handle.
//! `Transfer` covers every way an exchange can fail once it has started. The
//! variants do not separate timeouts from DNS or TLS failures.
//! `TransferError` keeps the engine's error as its source, so callers that
//! need finer detail can ask for it without string matching.

use std::fmt;

/// Errors returned by `TransportContext` and `Request`.
#[derive(Debug)]
pub enum Error {
    /// Global initialization or easy-handle setup failed.
    Init(String),

    /// The exchange could not be completed.
    Transfer(TransferError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Init(msg) => write!(f, "initialization failed: {msg}"),
            Error::Transfer(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Init(_) => None,
            Error::Transfer(err) => Some(err),
        }
    }
}

impl From<TransferError> for Error {
    fn from(err: TransferError) -> Self {
        Error::Transfer(err)
    }
}

/// A failed exchange, carrying the most detailed diagnostic the engine had.
#[derive(Debug)]
pub struct TransferError {
    message: String,
    source: curl::Error,
}

impl TransferError {
    /// Wrap an engine error. The per-handle error buffer wins over the
    /// generic code description when it is non-empty.
    pub(crate) fn from_curl(source: curl::Error) -> Self {
        let message = match source.extra_description() {
            Some(extra) if !extra.is_empty() => extra.to_string(),
            _ => source.description().to_string(),
        };
        Self { message, source }
    }

    /// Human-readable diagnostic.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Raw libcurl result code.
    pub fn code(&self) -> u32 {
        self.source.code() as u32
    }

    pub fn is_timeout(&self) -> bool {
        self.source.is_operation_timedout()
    }

    /// Connection refused, or the host name could not be resolved.
    pub fn is_connect(&self) -> bool {
        self.source.is_couldnt_connect() || self.source.is_couldnt_resolve_host()
    }
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transfer failed: {}", self.message)
    }
}

impl std::error::Error for TransferError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}
