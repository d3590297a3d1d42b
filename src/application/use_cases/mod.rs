//! Use case implementations.

mod upload_image_use_case;

pub use upload_image_use_case::{UploadImageUseCase, UploadedImage, generate_object_name};
