//! Configuration store port definition.

use async_trait::async_trait;

use crate::domain::entities::SiteSettings;
use crate::domain::errors::FetchError;

/// Port for reading the global settings record.
#[async_trait]
pub trait SettingsStorePort: Send + Sync {
    /// Reads the singleton settings row.
    async fn fetch_settings(&self) -> Result<SiteSettings, FetchError>;
}
