//! digitcount-transform - Image resizing
//!
//! This crate provides the scaling operations used to bring every query
//! image to the fixed feature grid:
//!
//! - Sampling (nearest neighbor)
//! - Linear interpolation (for upscaling)
//! - Area mapping (for downscaling with anti-aliasing)

mod error;
pub mod scale;

pub use error::{TransformError, TransformResult};
pub use scale::{ScaleMethod, scale, scale_by_sampling, scale_square_to_size, scale_to_size};
