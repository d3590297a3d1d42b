//! Domain entity definitions.

mod image;
mod site_settings;

pub use image::{
    DEFAULT_MAX_HEIGHT, DEFAULT_MAX_WIDTH, DEFAULT_QUALITY, Dimensions, ImageFile, ImagePreset,
    OptimizeOptions, OutputFormat,
};
pub use site_settings::{SETTINGS_SINGLETON_ID, SiteSettings};
