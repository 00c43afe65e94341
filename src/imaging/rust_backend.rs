//! Pure Rust image processing backend.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::image_dimensions` (header only) |
//! | Copy original | `std::fs::copy` |
//! | Decode | `image::ImageReader` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::ResizeParams;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::path::Path;

/// Source extensions the backend decodes.
const SOURCE_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

/// Returns the lowercase source extensions (without the dot) treated as media.
pub fn supported_input_extensions() -> &'static [&'static str] {
    SOURCE_EXTENSIONS
}

/// Backend built on the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

fn save_jpeg(img: &DynamicImage, path: &Path, quality: u32) -> Result<(), BackendError> {
    let file = std::fs::File::create(path)?;
    let writer = std::io::BufWriter::new(file);
    let encoder = JpegEncoder::new_with_quality(writer, quality as u8);
    DynamicImage::ImageRgb8(img.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            BackendError::ProcessingFailed(format!(
                "Failed to read dimensions of {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Dimensions { width, height })
    }

    fn copy_original(&self, source: &Path, output: &Path) -> Result<(), BackendError> {
        std::fs::copy(source, output)?;
        Ok(())
    }

    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError> {
        if params.targets.is_empty() {
            return Ok(());
        }
        let img = load_image(&params.source)?;
        for target in &params.targets {
            let resized = img.resize_exact(target.width, target.height, FilterType::Lanczos3);
            save_jpeg(&resized, &target.output, params.quality.value())?;
        }
        Ok(())
    }
}
