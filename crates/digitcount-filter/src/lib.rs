//! digitcount-filter - Smoothing filters
//!
//! This crate provides the convolution used to soften resized glyphs before
//! thresholding:
//!
//! - Convolution with arbitrary kernels (replicate border)
//! - Separable convolution
//! - Blur operations (box blur, Gaussian blur)

pub mod convolve;
mod error;
pub mod kernel;

pub use convolve::{
    box_blur, convolve_gray, convolve_sep, gaussian_blur, gaussian_blur_sigma, radius_for_sigma,
};
pub use error::{FilterError, FilterResult};
pub use kernel::Kernel;
