//! Image processing, pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Copy original** | `std::fs::copy`, bytes untouched |
//! | **Resize → JPEG** | Lanczos3 + `JpegEncoder` |
//!
//! The module is split into:
//! - **Calculations**: the halving plan (unit testable)
//! - **Parameters**: data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: [`cut_variants`], combining the plan with a backend

pub mod backend;
mod calculations;
pub mod operations;
pub mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{MIN_VARIANT_WIDTH, PlannedVariant, plan_variants};
pub use operations::{DerivedVariant, cut_variants};
pub use params::{Quality, ResizeParams, ResizeTarget};
pub use rust_backend::{RustBackend, supported_input_extensions};
