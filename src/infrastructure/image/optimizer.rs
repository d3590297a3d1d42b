//! Decode, downscale and re-encode pipeline for uploads.
//!
//! Every output is rendered from pixels into a fresh RGBA surface, so
//! nothing but pixel data survives: EXIF, XMP, ICC profiles and any bytes
//! appended to the source are dropped. The EXIF orientation is applied to
//! the pixels before that, so the output is upright.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{
    DynamicImage, ExtendedColorType, ImageDecoder, ImageEncoder, ImageReader, RgbaImage,
};
use tracing::{debug, info};

use crate::domain::entities::{Dimensions, ImageFile, OptimizeOptions, OutputFormat};
use crate::domain::errors::OptimizeError;

/// Largest surface the optimizer will allocate (16384 x 16384).
pub const DEFAULT_MAX_SURFACE_PIXELS: u64 = 16_384 * 16_384;

const RESAMPLE_FILTER: FilterType = FilterType::Lanczos3;

/// Result of an optimization with the geometry that produced it.
#[derive(Debug, Clone)]
pub struct OptimizedImage {
    /// The re-encoded file.
    pub file: ImageFile,
    /// Natural size of the source.
    pub source: Dimensions,
    /// Size of the output.
    pub output: Dimensions,
}

/// Stateless image optimizer. Concurrent calls are independent.
#[derive(Debug, Clone, Copy)]
pub struct ImageOptimizer {
    max_surface_pixels: u64,
}

impl Default for ImageOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageOptimizer {
    /// Creates an optimizer with Lanczos3 resampling.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_surface_pixels: DEFAULT_MAX_SURFACE_PIXELS,
        }
    }

    /// Caps the output surface size in pixels.
    #[must_use]
    pub const fn with_max_surface_pixels(mut self, pixels: u64) -> Self {
        self.max_surface_pixels = pixels;
        self
    }

    /// Optimizes a file for upload.
    ///
    /// The declared MIME type is not checked; validate the file first.
    ///
    /// # Errors
    /// Returns [`OptimizeError::Decode`] if the bytes are not a supported
    /// raster image, [`OptimizeError::Environment`] if no surface can be
    /// prepared, and [`OptimizeError::Encode`] if encoding fails.
    pub async fn optimize(
        &self,
        file: &ImageFile,
        options: &OptimizeOptions,
    ) -> Result<ImageFile, OptimizeError> {
        Ok(self.optimize_detailed(file, options).await?.file)
    }

    /// Like [`ImageOptimizer::optimize`], also reporting source and output size.
    ///
    /// # Errors
    /// See [`ImageOptimizer::optimize`].
    pub async fn optimize_detailed(
        &self,
        file: &ImageFile,
        options: &OptimizeOptions,
    ) -> Result<OptimizedImage, OptimizeError> {
        let optimizer = *self;
        let options = *options;
        let bytes = file.bytes().clone();

        debug!(
            name = %file.name(),
            size = file.len(),
            format = %options.format,
            max_width = options.max_width,
            max_height = options.max_height,
            "Optimizing image"
        );

        let (encoded, source, output) =
            tokio::task::spawn_blocking(move || optimizer.process(&bytes, &options))
                .await
                .map_err(|e| OptimizeError::environment(format!("image worker failed: {e}")))??;

        let name = format!("{}.{}", file.base_name(), options.format.extension());
        let optimized = ImageFile::new(name, options.format.mime_type(), encoded);

        info!(
            name = %optimized.name(),
            source = %source,
            output = %output,
            original_size = file.len(),
            optimized_size = optimized.len(),
            "Image optimized"
        );

        Ok(OptimizedImage {
            file: optimized,
            source,
            output,
        })
    }

    /// Runs the whole pipeline synchronously on the current thread.
    ///
    /// # Errors
    /// See [`ImageOptimizer::optimize`].
    pub fn process(
        &self,
        bytes: &[u8],
        options: &OptimizeOptions,
    ) -> Result<(Vec<u8>, Dimensions, Dimensions), OptimizeError> {
        let decoded = decode(bytes)?;
        let source = Dimensions::new(decoded.width(), decoded.height());
        let target = source.fit_within(options.max_width, options.max_height);

        let surface = self.render(&decoded, source, target)?;
        let encoded = encode(&surface, options)?;

        Ok((encoded, source, target))
    }

    fn render(
        &self,
        decoded: &DynamicImage,
        source: Dimensions,
        target: Dimensions,
    ) -> Result<RgbaImage, OptimizeError> {
        let pixels = u64::from(target.width) * u64::from(target.height);
        if pixels == 0 || pixels > self.max_surface_pixels {
            return Err(OptimizeError::environment(format!(
                "cannot allocate a {target} surface"
            )));
        }

        let rgba = decoded.to_rgba8();
        if target == source {
            return Ok(rgba);
        }

        debug!(from = %source, to = %target, "Resampling image");
        Ok(image::imageops::resize(
            &rgba,
            target.width,
            target.height,
            RESAMPLE_FILTER,
        ))
    }
}

/// Reads the upright size of an image without decoding its pixels.
///
/// Sizes of images whose EXIF orientation is a quarter turn are swapped.
///
/// # Errors
/// Returns [`OptimizeError::Decode`] if the header cannot be read.
pub fn image_dimensions(file: &ImageFile) -> Result<Dimensions, OptimizeError> {
    let mut decoder = open_decoder(file.bytes())?;
    let (width, height) = decoder.dimensions();

    if swaps_axes(read_orientation(&mut decoder)) {
        Ok(Dimensions::new(height, width))
    } else {
        Ok(Dimensions::new(width, height))
    }
}

fn open_decoder(bytes: &[u8]) -> Result<impl ImageDecoder + '_, OptimizeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| OptimizeError::decode(format!("failed to read image: {e}")))?;

    if reader.format().is_none() {
        return Err(OptimizeError::decode("unrecognized image format"));
    }

    reader
        .into_decoder()
        .map_err(|e| OptimizeError::decode(e.to_string()))
}

fn read_orientation(decoder: &mut impl ImageDecoder) -> Orientation {
    decoder.orientation().unwrap_or_else(|e| {
        debug!(error = %e, "Ignoring unreadable orientation");
        Orientation::NoTransforms
    })
}

const fn swaps_axes(orientation: Orientation) -> bool {
    matches!(
        orientation,
        Orientation::Rotate90
            | Orientation::Rotate270
            | Orientation::Rotate90FlipH
            | Orientation::Rotate270FlipH
    )
}

fn decode(bytes: &[u8]) -> Result<DynamicImage, OptimizeError> {
    let mut decoder = open_decoder(bytes)?;
    let orientation = read_orientation(&mut decoder);

    let mut decoded =
        DynamicImage::from_decoder(decoder).map_err(|e| OptimizeError::decode(e.to_string()))?;

    if orientation != Orientation::NoTransforms {
        debug!(?orientation, "Applying EXIF orientation");
        decoded.apply_orientation(orientation);
    }
    Ok(decoded)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn jpeg_quality(quality: f32) -> u8 {
    ((quality * 100.0).round() as u8).clamp(1, 100)
}

fn encode(surface: &RgbaImage, options: &OptimizeOptions) -> Result<Vec<u8>, OptimizeError> {
    let (width, height) = surface.dimensions();
    let encode_error =
        |detail: String| OptimizeError::encode(format!("{} encoder: {detail}", options.format));

    match options.format {
        OutputFormat::Webp => {
            let encoded = webp::Encoder::from_rgba(surface.as_raw(), width, height)
                .encode_simple(false, options.effective_quality() * 100.0)
                .map_err(|e| encode_error(format!("{e:?}")))?;
            Ok(encoded.to_vec())
        }
        OutputFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(surface.clone()).to_rgb8();
            let mut buffer = Vec::new();
            JpegEncoder::new_with_quality(&mut buffer, jpeg_quality(options.effective_quality()))
                .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
                .map_err(|e| encode_error(e.to_string()))?;
            Ok(buffer)
        }
        OutputFormat::Png => {
            let mut buffer = Vec::new();
            PngEncoder::new(&mut buffer)
                .write_image(surface.as_raw(), width, height, ExtendedColorType::Rgba8)
                .map_err(|e| encode_error(e.to_string()))?;
            Ok(buffer)
        }
    }
}
