//! Error types for digitcount-recog

use thiserror::Error;

/// Errors that can occur during recognition operations
#[derive(Debug, Error)]
pub enum RecogError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] digitcount_core::Error),

    /// Image decoding error
    #[error("io error: {0}")]
    Io(#[from] digitcount_io::IoError),

    /// Transform library error
    #[error("transform error: {0}")]
    Transform(#[from] digitcount_transform::TransformError),

    /// Filter library error
    #[error("filter error: {0}")]
    Filter(#[from] digitcount_filter::FilterError),

    /// Color library error
    #[error("color error: {0}")]
    Color(#[from] digitcount_color::ColorError),

    /// The reference set has no samples
    #[error("reference set is empty")]
    EmptyReference,

    /// A vector does not have the dimensionality of the fitted data
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Vectors and labels differ in count
    #[error("label count mismatch: {vectors} vectors, {labels} labels")]
    LabelCountMismatch { vectors: usize, labels: usize },

    /// Label outside 0..=9
    #[error("invalid label: {0} (expected 0-9)")]
    InvalidLabel(u8),

    /// Invalid parameter provided
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Every image in a batch failed, or the batch was empty
    #[error("no images processed ({failed} failed)")]
    NoImagesProcessed { failed: usize },
}

impl RecogError {
    /// True for failures raised while turning one image into a feature
    /// vector. A batch skips these and keeps going.
    pub fn is_extraction_error(&self) -> bool {
        matches!(
            self,
            RecogError::Core(_)
                | RecogError::Io(_)
                | RecogError::Transform(_)
                | RecogError::Filter(_)
                | RecogError::Color(_)
        )
    }
}

/// Result type for recognition operations
pub type RecogResult<T> = Result<T, RecogError>;
