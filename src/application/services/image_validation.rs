//! Upload file checks and display helpers.

use crate::domain::entities::ImageFile;

/// MIME types accepted for upload.
pub const ALLOWED_IMAGE_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/gif",
];

/// Returns true if the declared MIME type is on the upload allow-list.
///
/// Only the declared type is checked; the bytes are not sniffed. Call this
/// before handing a file to the optimizer, which does not re-validate.
#[must_use]
pub fn is_valid_image_file(file: &ImageFile) -> bool {
    ALLOWED_IMAGE_TYPES.contains(&file.mime_type())
}

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Formats a byte count for humans, e.g. `1.5 MB`.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap
)]
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut exponent = 0;
    let mut threshold: u64 = 1024;
    while exponent < SIZE_UNITS.len() - 1 && bytes >= threshold {
        exponent += 1;
        threshold = threshold.saturating_mul(1024);
    }

    let scaled = bytes as f64 / 1024_f64.powi(exponent as i32);
    let rounded = (scaled * 100.0).round() / 100.0;

    format!("{rounded} {}", SIZE_UNITS[exponent])
}
