//! Application layer with services and use cases.

/// Application services.
pub mod services;
/// Use case implementations.
pub mod use_cases;

pub use services::{SettingsCache, format_file_size, is_valid_image_file};
pub use use_cases::{UploadImageUseCase, UploadedImage};
