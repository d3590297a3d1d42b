//! Object storage port definition.

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::errors::StorageError;

/// Port for the public media bucket.
#[async_trait]
pub trait ObjectStoragePort: Send + Sync {
    /// Uploads bytes under `filename` and returns the public URL.
    async fn upload(
        &self,
        bytes: Bytes,
        filename: &str,
        mime_type: &str,
    ) -> Result<String, StorageError>;

    /// Returns the public URL of an object without any I/O.
    fn public_url(&self, filename: &str) -> String;
}
