//! Domain layer with core entities, errors, and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use entities::{Dimensions, ImageFile, OptimizeOptions, OutputFormat, SiteSettings};
pub use errors::{FetchError, OptimizeError, StorageError, UploadError};
pub use ports::{ObjectStoragePort, SettingsStorePort};
