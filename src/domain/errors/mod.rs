//! Domain error types.

mod fetch_error;
mod optimize_error;
mod storage_error;

pub use fetch_error::FetchError;
pub use optimize_error::OptimizeError;
pub use storage_error::{StorageError, UploadError};
