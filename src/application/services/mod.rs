//! Application services.

mod image_validation;
mod settings_cache;

pub use image_validation::{ALLOWED_IMAGE_TYPES, format_file_size, is_valid_image_file};
pub use settings_cache::{SettingsCache, SettingsResult};
