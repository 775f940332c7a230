//! digitcount color - Gray conversion and binarization
//!
//! This crate turns decoded rasters into the two-level intensity samples the
//! classifier consumes:
//!
//! - **Color space conversion** ([`colorspace`]): RGB(A) to 8 bpp luminance
//! - **Thresholding** ([`threshold`]): Otsu's method and level mapping

pub mod colorspace;
pub mod error;
pub mod threshold;

// Re-export core types
pub use digitcount_core;

// Re-export error types
pub use error::{ColorError, ColorResult};

pub use colorspace::{pix_convert_to_gray, rgb_to_gray};
pub use threshold::{
    DEFAULT_THRESHOLD, compute_otsu_threshold, otsu_threshold_from_histogram, threshold_otsu,
    threshold_to_binary, threshold_to_levels,
};
