//! Image handling infrastructure.
//!
//! This module provides:
//! - The decode, resize and re-encode upload optimizer
//! - Storage URL rewriting for server-side transforms

pub mod optimizer;
pub mod storage_url;

pub use optimizer::{ImageOptimizer, OptimizedImage, image_dimensions};
pub use storage_url::{
    ResizeMode, is_storage_url, optimize_storage_url, optimize_storage_url_width, thumbnail_url,
};
