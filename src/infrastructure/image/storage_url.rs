//! Storage URL rewriting for on-the-fly image transformations.
//!
//! Every helper takes the backend origin (`BackendConfig::url`) so hosted
//! and self-hosted projects are recognized alike.

/// Default transform quality (0-100).
pub const DEFAULT_TRANSFORM_QUALITY: u8 = 60;

/// Edge length of admin media thumbnails.
pub const THUMBNAIL_SIZE: u32 = 400;

const STORAGE_PATH: &str = "/storage/v1/";
const OBJECT_PUBLIC_PATH: &str = "/object/public/";
const RENDER_PUBLIC_PATH: &str = "/render/image/public/";

/// How the transform fits the image into the requested box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResizeMode {
    /// Fill the box, cropping overflow.
    #[default]
    Cover,
    /// Fit inside the box.
    Contain,
    /// Stretch to the box.
    Fill,
}

impl ResizeMode {
    /// Returns the query value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cover => "cover",
            Self::Contain => "contain",
            Self::Fill => "fill",
        }
    }
}

/// Checks if a URL points into the storage API of the backend at `origin`.
#[must_use]
pub fn is_storage_url(origin: &str, url: &str) -> bool {
    let origin = origin.trim().trim_end_matches('/');
    !origin.is_empty()
        && url
            .strip_prefix(origin)
            .is_some_and(|path| path.starts_with(STORAGE_PATH))
}

/// Appends size, resize mode and quality transform parameters.
///
/// Returns the URL unchanged if it is empty or not a storage URL.
#[must_use]
pub fn optimize_storage_url(
    origin: &str,
    url: &str,
    width: u32,
    height: u32,
    resize: ResizeMode,
    quality: u8,
) -> String {
    if !is_storage_url(origin, url) {
        return url.to_string();
    }

    append_query(
        url,
        &format!(
            "width={width}&height={height}&resize={}&quality={quality}",
            resize.as_str()
        ),
    )
}

/// Requests a width only; the transform keeps the aspect ratio.
#[must_use]
pub fn optimize_storage_url_width(origin: &str, url: &str, width: u32) -> String {
    if !is_storage_url(origin, url) {
        return url.to_string();
    }

    append_query(url, &format!("width={width}"))
}

/// Builds a square cover thumbnail URL for the media library.
#[must_use]
pub fn thumbnail_url(origin: &str, url: &str) -> String {
    if !is_storage_url(origin, url) {
        return url.to_string();
    }

    let render_url = url.replacen(OBJECT_PUBLIC_PATH, RENDER_PUBLIC_PATH, 1);
    optimize_storage_url(
        origin,
        &render_url,
        THUMBNAIL_SIZE,
        THUMBNAIL_SIZE,
        ResizeMode::Cover,
        DEFAULT_TRANSFORM_QUALITY,
    )
}

fn append_query(url: &str, query: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{query}")
}
