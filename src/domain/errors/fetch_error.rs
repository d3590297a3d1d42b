//! Settings fetch error types.

use thiserror::Error;

/// Failure to read the settings record from the configuration store.
///
/// Cloneable so one failed attempt can be handed to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum FetchError {
    #[error("configuration store unreachable: {message}")]
    Network { message: String },

    #[error("configuration store returned {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("settings record not found")]
    NotFound,

    #[error("malformed settings record: {message}")]
    Malformed { message: String },
}

impl FetchError {
    /// Creates network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates rejected error.
    #[must_use]
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Creates malformed record error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Returns whether error is network related.
    #[must_use]
    pub const fn is_network_error(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}
