//! Wire types for the REST and storage endpoints.

use serde::Deserialize;

/// Error body returned by the REST and storage endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorResponse {
    /// Human readable message.
    #[serde(default)]
    pub message: Option<String>,
    /// Short error code (storage endpoint).
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorResponse {
    /// Returns the most descriptive text available.
    #[must_use]
    pub fn describe(self) -> Option<String> {
        self.message.or(self.error)
    }
}

/// Successful upload response from the storage endpoint.
#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    /// Bucket-qualified object key, e.g. `images/123-abc.webp`.
    #[serde(rename = "Key", default)]
    pub key: Option<String>,
}
