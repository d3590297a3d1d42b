//! Domain types for the upload image pipeline.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// An in-memory image file: raw bytes plus the name and MIME type the
/// uploader declared for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    name: String,
    mime_type: String,
    bytes: Bytes,
}

impl ImageFile {
    /// Creates a new file from its parts.
    #[must_use]
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Creates a file, declaring its MIME type from the file extension.
    ///
    /// Unknown extensions are declared as `application/octet-stream`.
    #[must_use]
    pub fn from_name(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let name = name.into();
        let mime_type = mime_type_for_name(&name);
        Self::new(name, mime_type, bytes)
    }

    /// Returns the file name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared MIME type.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Returns the raw bytes.
    #[must_use]
    pub const fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Returns the size in bytes.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Returns true if the file holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the name up to the first `.`, or `image` when that is empty.
    #[must_use]
    pub fn base_name(&self) -> &str {
        let stem = self.name.split('.').next().unwrap_or_default();
        if stem.is_empty() { "image" } else { stem }
    }

    /// Returns the extension after the last `.`, lowercased.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
    }
}

fn mime_type_for_name(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Target encoding for an optimized image.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// WebP.
    #[default]
    Webp,
    /// JPEG.
    Jpeg,
    /// PNG.
    Png,
}

impl OutputFormat {
    /// Returns the MIME type of this format.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Webp => "image/webp",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// Returns the file extension of this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Webp => "webp",
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Webp => write!(f, "webp"),
            Self::Jpeg => write!(f, "jpeg"),
            Self::Png => write!(f, "png"),
        }
    }
}

/// Default maximum output width.
pub const DEFAULT_MAX_WIDTH: u32 = 800;
/// Default maximum output height.
pub const DEFAULT_MAX_HEIGHT: u32 = 400;
/// Default encoder quality factor.
pub const DEFAULT_QUALITY: f32 = 0.85;

/// Bounds and encoding parameters for one optimization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizeOptions {
    /// Maximum output width in pixels.
    #[serde(default = "default_max_width")]
    pub max_width: u32,
    /// Maximum output height in pixels.
    #[serde(default = "default_max_height")]
    pub max_height: u32,
    /// Quality factor from 0.0 to 1.0.
    #[serde(default = "default_quality")]
    pub quality: f32,
    /// Output encoding.
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_max_width() -> u32 {
    DEFAULT_MAX_WIDTH
}

fn default_max_height() -> u32 {
    DEFAULT_MAX_HEIGHT
}

fn default_quality() -> f32 {
    DEFAULT_QUALITY
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
            quality: DEFAULT_QUALITY,
            format: OutputFormat::default(),
        }
    }
}

impl OptimizeOptions {
    /// Sets both bounds.
    #[must_use]
    pub const fn with_bounds(mut self, max_width: u32, max_height: u32) -> Self {
        self.max_width = max_width;
        self.max_height = max_height;
        self
    }

    /// Sets the quality factor.
    #[must_use]
    pub const fn with_quality(mut self, quality: f32) -> Self {
        self.quality = quality;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub const fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Returns the quality clamped to `0.0..=1.0`; NaN maps to the default.
    #[must_use]
    pub fn effective_quality(&self) -> f32 {
        if self.quality.is_nan() {
            DEFAULT_QUALITY
        } else {
            self.quality.clamp(0.0, 1.0)
        }
    }
}

/// Named bounds used by the admin screens.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ImagePreset {
    /// Blog covers, service cards and other general uploads.
    #[default]
    General,
    /// Portfolio gallery items.
    Portfolio,
    /// Home page hero banner.
    Hero,
    /// Avatars and testimonial portraits.
    Avatar,
}

impl ImagePreset {
    /// Returns `(max_width, max_height)` for this preset.
    #[must_use]
    pub const fn bounds(self) -> (u32, u32) {
        match self {
            Self::General => (DEFAULT_MAX_WIDTH, DEFAULT_MAX_HEIGHT),
            Self::Portfolio => (1200, 1500),
            Self::Hero => (1920, 1080),
            Self::Avatar => (400, 400),
        }
    }

    /// Returns default options with this preset's bounds.
    #[must_use]
    pub const fn options(self) -> OptimizeOptions {
        let (max_width, max_height) = self.bounds();
        OptimizeOptions {
            max_width,
            max_height,
            quality: DEFAULT_QUALITY,
            format: OutputFormat::Webp,
        }
    }
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Creates new dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns true if both axes are within the bounds.
    #[must_use]
    pub const fn fits_within(self, max_width: u32, max_height: u32) -> bool {
        self.width <= max_width && self.height <= max_height
    }

    /// Returns width divided by height.
    #[must_use]
    pub fn aspect_ratio(self) -> f64 {
        f64::from(self.width) / f64::from(self.height.max(1))
    }

    /// Shrinks to fit the bounds while keeping the aspect ratio.
    ///
    /// Dimensions already within bounds are returned unchanged. Otherwise a
    /// single scale factor is applied to both axes, chosen by the axis that
    /// overflows most, so neither axis exceeds its bound. Each axis is at
    /// least one pixel. Zero bounds are treated as one.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn fit_within(self, max_width: u32, max_height: u32) -> Self {
        let max_width = max_width.max(1);
        let max_height = max_height.max(1);

        if self.fits_within(max_width, max_height) {
            return self;
        }

        let scale = (f64::from(max_width) / f64::from(self.width.max(1)))
            .min(f64::from(max_height) / f64::from(self.height.max(1)));

        let width = (f64::from(self.width) * scale).round() as u32;
        let height = (f64::from(self.height) * scale).round() as u32;

        Self {
            width: width.clamp(1, max_width),
            height: height.clamp(1, max_height),
        }
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
