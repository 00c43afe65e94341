//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations the variant
//! cutter needs: identify, copy the original, and resize. The production
//! implementation is [`RustBackend`](super::rust_backend::RustBackend);
//! tests use a recording mock.

use super::params::ResizeParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
pub trait ImageBackend: Sync {
    /// Read image dimensions from the header, without decoding pixels.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Copy the source byte-for-byte, so its fingerprint is preserved.
    fn copy_original(&self, source: &Path, output: &Path) -> Result<(), BackendError>;

    /// Decode the source once and write each resize target.
    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError>;
}
