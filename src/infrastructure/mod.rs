//! Infrastructure layer with external service adapters.

/// Hosted backend client.
pub mod backend;
/// Application configuration.
pub mod config;
/// Image decoding, optimization and storage URL helpers.
pub mod image;

pub use self::backend::BackendClient;
pub use self::config::{AppConfig, CliArgs, Command, LogLevel, StorageManager};
pub use self::image::{ImageOptimizer, OptimizedImage, image_dimensions, thumbnail_url};
