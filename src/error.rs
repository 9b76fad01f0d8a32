//! Error taxonomy for dispatch work.
//!
//! Every failure a dispatch can produce collapses into one of five kinds;
//! the gateway converts them into outcome envelopes at its boundary, so
//! callers never see a raw error escape.

use serde::Serialize;

use crate::types::Capability;

/// Errors produced while validating, registering, or executing a dispatch.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// A required inbound field is missing, blank, or malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No adapter is registered for the requested provider tag.
    #[error("Unsupported {capability} provider: {provider}")]
    UnsupportedProvider {
        capability: Capability,
        provider: String,
    },

    /// The provider answered with a non-success status.
    #[error("Provider returned HTTP {status}: {body}")]
    Provider { status: u16, body: String },

    /// The cancellation signal fired before the request settled.
    #[error("Request cancelled")]
    Cancelled,

    /// The exchange failed without producing an HTTP status.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl RelayError {
    /// The stable taxonomy name for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::UnsupportedProvider { .. } => ErrorKind::UnsupportedProvider,
            Self::Provider { .. } => ErrorKind::ProviderError,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Transport(_) => ErrorKind::TransportError,
        }
    }

    /// Shorthand for a missing-field rejection.
    pub fn missing_field(field: &str) -> Self {
        Self::InvalidArgument(format!("missing required field `{field}`"))
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.to_string())
    }
}

/// Taxonomy names as they appear in serialized outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    InvalidArgument,
    UnsupportedProvider,
    ProviderError,
    Cancelled,
    TransportError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "InvalidArgument",
            Self::UnsupportedProvider => "UnsupportedProvider",
            Self::ProviderError => "ProviderError",
            Self::Cancelled => "Cancelled",
            Self::TransportError => "TransportError",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
