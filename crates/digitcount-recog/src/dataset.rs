//! Feature vectors, digit labels and the reference set
//!
//! The reference set is the whole "model": a fixed collection of labelled
//! vectors that every query is compared against.

use std::fmt;

use crate::{RecogError, RecogResult};

/// Number of digit classes
pub const NUM_CLASSES: usize = 10;

/// Top of the feature intensity scale
pub const MAX_INTENSITY: u8 = 16;

/// A digit class in `0..=9`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DigitLabel(u8);

impl DigitLabel {
    /// Create a label, rejecting values above 9.
    pub fn new(value: u8) -> RecogResult<Self> {
        if (value as usize) < NUM_CLASSES {
            Ok(Self(value))
        } else {
            Err(RecogError::InvalidLabel(value))
        }
    }

    /// Numeric value of the label
    #[inline]
    pub fn value(self) -> u8 {
        self.0
    }

    /// Slot of the label in a per-class table
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// All labels in ascending order.
    pub fn all() -> impl Iterator<Item = DigitLabel> {
        (0..NUM_CLASSES as u8).map(DigitLabel)
    }
}

impl TryFrom<u8> for DigitLabel {
    type Error = RecogError;

    fn try_from(value: u8) -> RecogResult<Self> {
        Self::new(value)
    }
}

impl fmt::Display for DigitLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fixed-length feature vector
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// Build a vector from quantized intensity levels.
    pub fn from_levels(levels: &[u8]) -> Self {
        Self(levels.iter().map(|&v| v as f64).collect())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }

    /// Euclidean distance to another vector of the same length
    pub fn distance(&self, other: &FeatureVector) -> RecogResult<f64> {
        if self.len() != other.len() {
            return Err(RecogError::DimensionMismatch {
                expected: self.len(),
                actual: other.len(),
            });
        }
        Ok(squared_distance(&self.0, &other.0).sqrt())
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

pub(crate) fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Labelled reference vectors
///
/// Guaranteed non-empty, with one label per vector and every vector of the
/// same non-zero dimensionality.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceSet {
    vectors: Vec<FeatureVector>,
    labels: Vec<DigitLabel>,
    dim: usize,
}

impl ReferenceSet {
    /// Create a reference set from vectors and their labels.
    ///
    /// # Errors
    ///
    /// - [`RecogError::EmptyReference`] when there are no vectors
    /// - [`RecogError::LabelCountMismatch`] when the counts differ
    /// - [`RecogError::DimensionMismatch`] when vector lengths differ
    pub fn new(vectors: Vec<FeatureVector>, labels: Vec<DigitLabel>) -> RecogResult<Self> {
        if vectors.is_empty() {
            return Err(RecogError::EmptyReference);
        }
        if vectors.len() != labels.len() {
            return Err(RecogError::LabelCountMismatch {
                vectors: vectors.len(),
                labels: labels.len(),
            });
        }
        let dim = vectors[0].len();
        if dim == 0 {
            return Err(RecogError::InvalidParameter(
                "feature vectors must not be empty".to_string(),
            ));
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
            return Err(RecogError::DimensionMismatch {
                expected: dim,
                actual: bad.len(),
            });
        }
        Ok(Self {
            vectors,
            labels,
            dim,
        })
    }

    /// Create a reference set from raw rows and numeric labels.
    pub fn from_raw(rows: Vec<Vec<f64>>, labels: &[u8]) -> RecogResult<Self> {
        let labels = labels
            .iter()
            .map(|&l| DigitLabel::new(l))
            .collect::<RecogResult<Vec<_>>>()?;
        Self::new(rows.into_iter().map(FeatureVector::new).collect(), labels)
    }

    /// Create a reference set from rows on a `0..=1` scale.
    ///
    /// Values are multiplied by [`MAX_INTENSITY`] so they share the scale of
    /// extracted image features.
    pub fn from_unit_scale(rows: Vec<Vec<f64>>, labels: &[u8]) -> RecogResult<Self> {
        let scale = MAX_INTENSITY as f64;
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(|v| v * scale).collect())
            .collect();
        Self::from_raw(rows, labels)
    }

    /// Number of samples
    #[inline]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Returns false; construction rejects empty sets.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Dimensionality shared by every vector
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn vectors(&self) -> &[FeatureVector] {
        &self.vectors
    }

    pub fn labels(&self) -> &[DigitLabel] {
        &self.labels
    }

    /// Iterate over `(vector, label)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&FeatureVector, DigitLabel)> {
        self.vectors.iter().zip(self.labels.iter().copied())
    }

    /// Replace the vectors, keeping labels. Used after normalization.
    pub(crate) fn with_vectors(&self, vectors: Vec<FeatureVector>) -> RecogResult<Self> {
        Self::new(vectors, self.labels.clone())
    }
}
