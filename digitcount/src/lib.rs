//! digitcount - Count handwritten digits in a set of images
//!
//! Each image is reduced to a 28x28 two-level feature vector and classified
//! against a labelled reference set with inverse-distance weighted k-NN
//! after per-feature z-score normalization.
//!
//! # Overview
//!
//! - Image decoding (PNG, JPEG, BMP, PNM, GIF, TIFF)
//! - Square padding, resizing and Gaussian smoothing
//! - Gray conversion and Otsu binarization
//! - Z-score normalization and k-NN classification
//! - Batch counting with per-image failure reporting
//!
//! # Example
//!
//! ```
//! use digitcount::{Pix, PixelDepth};
//! use digitcount::recog::FeatureExtractor;
//!
//! let pix = Pix::new(20, 28, PixelDepth::Bit8).unwrap();
//! let vector = FeatureExtractor::default().extract_pix(&pix).unwrap();
//! assert_eq!(vector.len(), 784);
//! ```

// Re-export core types (primary data structures used everywhere)
pub use digitcount_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use digitcount_color as color;
pub use digitcount_filter as filter;
pub use digitcount_io as io;
pub use digitcount_recog as recog;
pub use digitcount_transform as transform;

pub use digitcount_recog::{
    BatchReport, DigitCounts, DigitLabel, FeatureVector, ImageSource, Pipeline, PipelineOptions,
    ReferenceSet,
};
