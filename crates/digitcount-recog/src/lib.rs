//! digitcount-recog - Handwritten digit classification
//!
//! This crate turns images into fixed-length feature vectors and classifies
//! them against a labelled reference set:
//!
//! - **Dataset types** ([`dataset`]): feature vectors, labels, reference set
//! - **Normalization** ([`normalize`]): per-feature z-score statistics
//! - **Classification** ([`knn`]): inverse-distance weighted k-NN
//! - **Feature extraction** ([`extract`]): pad, resize, blur, Otsu binarize
//! - **Batch driver** ([`pipeline`]): classify many images, count per class
//!
//! # Quick Start
//!
//! ```no_run
//! use digitcount_recog::{ImageSource, Pipeline, PipelineOptions, ReferenceSet};
//!
//! # fn load_reference() -> (Vec<Vec<f64>>, Vec<u8>) { unimplemented!() }
//! let (rows, labels) = load_reference();
//! let reference = ReferenceSet::from_raw(rows, &labels).unwrap();
//! let pipeline = Pipeline::prepare(&reference, PipelineOptions::default()).unwrap();
//!
//! let report = pipeline
//!     .classify_batch(&[ImageSource::from_path("digits/seven.png")])
//!     .unwrap();
//! println!("{}", report.counts);
//! ```

pub mod dataset;
mod error;
pub mod extract;
pub mod knn;
pub mod normalize;
pub mod pipeline;

pub use error::{RecogError, RecogResult};

// Re-export commonly used types
pub use dataset::{DigitLabel, FeatureVector, MAX_INTENSITY, NUM_CLASSES, ReferenceSet};
pub use extract::{ExtractOptions, FeatureExtractor};
pub use knn::{KnnClassifier, KnnOptions, Prediction};
pub use normalize::ZScore;
pub use pipeline::{
    BatchReport, DigitCounts, ImageFailure, ImageSource, Pipeline, PipelineOptions,
    SUPPORTED_EXTENSIONS, is_supported_image_path,
};

// Re-export core for convenience
pub use digitcount_core;
