//! Object storage and upload error types.

use thiserror::Error;

use super::OptimizeError;

/// Object storage failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum StorageError {
    #[error("object storage unreachable: {message}")]
    Network { message: String },

    #[error("object storage rejected upload ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("invalid object name: {name}")]
    InvalidName { name: String },
}

impl StorageError {
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
}

/// Failures of the validate, optimize, upload workflow.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum UploadError {
    #[error("unsupported file type: {mime_type}")]
    UnsupportedType { mime_type: String },

    #[error(transparent)]
    Optimize(#[from] OptimizeError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl UploadError {
    /// Returns whether the user should be asked for a different file.
    #[must_use]
    pub const fn is_rejected_input(&self) -> bool {
        match self {
            Self::UnsupportedType { .. } => true,
            Self::Optimize(e) => e.is_input_error(),
            Self::Storage(_) => false,
        }
    }
}
