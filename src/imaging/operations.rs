//! High-level image operations.
//!
//! [`cut_variants`] combines the halving plan with backend execution and
//! returns the list of renditions pages use for their `srcset`.

use super::backend::{BackendError, ImageBackend};
use super::calculations::plan_variants;
use super::params::{Quality, ResizeParams, ResizeTarget};
use serde::Serialize;
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// One rendition of a source image, as written to the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedVariant {
    /// `base + suffix + extension`, e.g. `sunset_2.jpg`.
    pub filename: String,
    pub suffix: String,
    pub width: u32,
    pub height: u32,
    /// `srcset` width descriptor, e.g. `250w`.
    pub descriptor: String,
}

/// Produce (or just describe) the renditions of `source`.
///
/// With `meta_only`, only the image header is read: nothing is decoded and
/// nothing is written. This is the path for sources whose output is already
/// up to date but whose variant list is still needed for page layout.
///
/// Otherwise every halved variant is re-encoded from a single decode, then
/// the original is copied byte-for-byte to `base + extension`. The copy's
/// fingerprint is what the next build compares against, so it is written
/// only after all variants exist; a failed resize leaves the item changed
/// and it is recut next time.
pub fn cut_variants(
    backend: &impl ImageBackend,
    source: &Path,
    output_dir: &Path,
    base_name: &str,
    extension: &str,
    meta_only: bool,
    quality: Quality,
) -> Result<Vec<DerivedVariant>> {
    let dims = backend.identify(source)?;
    let variants: Vec<DerivedVariant> = plan_variants(dims.width, dims.height)
        .into_iter()
        .map(|plan| DerivedVariant {
            filename: format!("{}{}{}", base_name, plan.suffix, extension),
            descriptor: format!("{}w", plan.width),
            suffix: plan.suffix,
            width: plan.width,
            height: plan.height,
        })
        .collect();

    if meta_only {
        return Ok(variants);
    }

    let Some((original, resized)) = variants.split_first() else {
        return Ok(variants);
    };
    if !resized.is_empty() {
        backend.resize(&ResizeParams {
            source: source.to_path_buf(),
            targets: resized
                .iter()
                .map(|v| ResizeTarget {
                    output: output_dir.join(&v.filename),
                    width: v.width,
                    height: v.height,
                })
                .collect(),
            quality,
        })?;
    }
    // The original goes last: its fingerprint marks the item as done.
    backend.copy_original(source, &output_dir.join(&original.filename))?;

    Ok(variants)
}
