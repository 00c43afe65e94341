//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how*. They sit between the
//! high-level [`operations`](super::operations) module (which decides which
//! variants to produce) and the [`backend`](super::backend) (which does the
//! pixel work), so a mock backend can stand in during tests.

use std::path::PathBuf;

/// Quality setting for JPEG re-encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// One resized output of a [`ResizeParams`] batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeTarget {
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Decode `source` once and write every target as a JPEG.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams {
    pub source: PathBuf,
    pub targets: Vec<ResizeTarget>,
    pub quality: Quality,
}
