//! Image optimization error types.

use thiserror::Error;

/// Terminal failure of one optimization call. No partial output exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum OptimizeError {
    #[error("failed to decode image: {message}")]
    Decode { message: String },

    #[error("image surface unavailable: {message}")]
    Environment { message: String },

    #[error("failed to encode image: {message}")]
    Encode { message: String },
}

impl OptimizeError {
    /// Creates decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Creates environment error.
    #[must_use]
    pub fn environment(message: impl Into<String>) -> Self {
        Self::Environment {
            message: message.into(),
        }
    }

    /// Creates encode error.
    #[must_use]
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    /// Returns whether the input itself was at fault, so the user should
    /// pick another file.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}
