//! Upload image use case implementation.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::services::is_valid_image_file;
use crate::domain::entities::{Dimensions, ImageFile, OptimizeOptions};
use crate::domain::errors::UploadError;
use crate::domain::ports::ObjectStoragePort;
use crate::infrastructure::image::ImageOptimizer;

const RANDOM_SUFFIX_LEN: usize = 7;

/// Outcome of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    /// Public URL of the stored object.
    pub url: String,
    /// Object name inside the bucket.
    pub object_name: String,
    /// Size of the stored image.
    pub dimensions: Dimensions,
    /// Byte length of the source file.
    pub original_size: u64,
    /// Byte length of the stored file.
    pub optimized_size: u64,
}

/// Generates a collision-resistant object name: `<unix-millis>-<random>.<ext>`.
///
/// The extension is taken from `filename`; names without one get `bin`.
#[must_use]
pub fn generate_object_name(filename: &str) -> String {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
        .unwrap_or("bin")
        .to_ascii_lowercase();

    let random = Uuid::new_v4().simple().to_string();
    let suffix = &random[..RANDOM_SUFFIX_LEN];

    format!("{}-{suffix}.{extension}", Utc::now().timestamp_millis())
}

/// Validates, optimizes and stores an image.
#[derive(Clone)]
pub struct UploadImageUseCase {
    storage: Arc<dyn ObjectStoragePort>,
    optimizer: ImageOptimizer,
}

impl UploadImageUseCase {
    /// Creates new upload use case.
    #[must_use]
    pub const fn new(storage: Arc<dyn ObjectStoragePort>, optimizer: ImageOptimizer) -> Self {
        Self { storage, optimizer }
    }

    /// Executes the upload workflow.
    ///
    /// # Errors
    /// Returns [`UploadError::UnsupportedType`] before any work if the file
    /// type is not allowed, otherwise the optimizer or storage failure.
    pub async fn execute(
        &self,
        file: &ImageFile,
        options: &OptimizeOptions,
    ) -> Result<UploadedImage, UploadError> {
        if !is_valid_image_file(file) {
            warn!(name = %file.name(), mime_type = %file.mime_type(), "Rejected upload");
            return Err(UploadError::UnsupportedType {
                mime_type: file.mime_type().to_string(),
            });
        }

        let optimized = self.optimizer.optimize_detailed(file, options).await?;
        let object_name = generate_object_name(optimized.file.name());

        debug!(object_name = %object_name, "Storing optimized image");

        let url = self
            .storage
            .upload(
                optimized.file.bytes().clone(),
                &object_name,
                optimized.file.mime_type(),
            )
            .await
            .inspect_err(|e| warn!(error = %e, "Upload failed"))?;

        info!(url = %url, dimensions = %optimized.output, "Image uploaded");

        Ok(UploadedImage {
            url,
            object_name,
            dimensions: optimized.output,
            original_size: file.len(),
            optimized_size: optimized.file.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::OutputFormat;
    use crate::domain::errors::StorageError;
    use crate::domain::ports::mocks::MockObjectStorage;
    use image::{ImageFormat, RgbImage};
    use std::io::Cursor;

    fn png_file(width: u32, height: u32) -> ImageFile {
        let img = RgbImage::from_pixel(width, height, image::Rgb([200, 40, 90]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        ImageFile::new("shoot.final.png", "image/png", buf.into_inner())
    }

    fn use_case(storage: &Arc<MockObjectStorage>) -> UploadImageUseCase {
        UploadImageUseCase::new(storage.clone(), ImageOptimizer::new())
    }

    #[test]
    fn test_object_name_shape() {
        let name = generate_object_name("hero.WEBP");

        let (stem, ext) = name.rsplit_once('.').unwrap();
        let (millis, random) = stem.split_once('-').unwrap();
        assert_eq!(ext, "webp");
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(random.len(), 7);
        assert!(random.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_object_names_differ() {
        assert_ne!(generate_object_name("a.png"), generate_object_name("a.png"));
        assert!(generate_object_name("noext").ends_with(".bin"));
    }

    #[tokio::test]
    async fn test_upload_success() {
        let storage = Arc::new(MockObjectStorage::new());
        let file = png_file(64, 32);

        let uploaded = use_case(&storage)
            .execute(&file, &OptimizeOptions::default().with_bounds(32, 32))
            .await
            .unwrap();

        assert_eq!(uploaded.dimensions, Dimensions::new(32, 16));
        assert_eq!(uploaded.original_size, file.len());
        assert!(uploaded.object_name.ends_with(".webp"));
        assert_eq!(
            uploaded.url,
            format!("https://media.test/images/{}", uploaded.object_name)
        );

        let objects = storage.objects();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].filename, uploaded.object_name);
        assert_eq!(objects[0].mime_type, "image/webp");
        assert_eq!(objects[0].bytes.len() as u64, uploaded.optimized_size);
    }

    #[tokio::test]
    async fn test_upload_respects_format() {
        let storage = Arc::new(MockObjectStorage::new());

        let uploaded = use_case(&storage)
            .execute(
                &png_file(16, 16),
                &OptimizeOptions::default().with_format(OutputFormat::Jpeg),
            )
            .await
            .unwrap();

        assert!(uploaded.object_name.ends_with(".jpg"));
        assert_eq!(storage.objects()[0].mime_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_unsupported_types_never_reach_storage() {
        let storage = Arc::new(MockObjectStorage::new());
        let use_case = use_case(&storage);

        for (name, mime) in [("notes.txt", "text/plain"), ("doc.pdf", "application/pdf")] {
            let file = ImageFile::new(name, mime, b"not an image".to_vec());

            let err = use_case
                .execute(&file, &OptimizeOptions::default())
                .await
                .unwrap_err();

            assert!(matches!(err, UploadError::UnsupportedType { ref mime_type } if mime_type == mime));
            assert!(err.is_rejected_input());
        }

        assert!(storage.objects().is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_image_is_optimize_error() {
        let storage = Arc::new(MockObjectStorage::new());
        let file = ImageFile::new("broken.png", "image/png", b"garbage".to_vec());

        let err = use_case(&storage)
            .execute(&file, &OptimizeOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::Optimize(_)));
        assert!(err.is_rejected_input());
        assert!(storage.objects().is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let storage = Arc::new(MockObjectStorage::failing(StorageError::rejected(
            413,
            "Payload too large",
        )));

        let err = use_case(&storage)
            .execute(&png_file(8, 8), &OptimizeOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            UploadError::Storage(StorageError::Rejected { status: 413, .. })
        ));
        assert!(!err.is_rejected_input());
    }
}
