//! Inverse-distance weighted k-nearest-neighbor classification
//!
//! # Algorithm
//!
//! 1. Compute the Euclidean distance from the query to every reference
//!    vector.
//! 2. Stable-sort ascending by distance and keep the first `min(k, n)`.
//! 3. Each neighbor adds `1 / (epsilon + distance)` to its class total.
//! 4. Scan classes 0 to 9 and keep the first strictly larger total, so ties
//!    resolve to the lowest class.

use crate::dataset::squared_distance;
use crate::{DigitLabel, FeatureVector, NUM_CLASSES, RecogError, RecogResult, ReferenceSet};

/// Options for k-NN classification
#[derive(Debug, Clone, PartialEq)]
pub struct KnnOptions {
    /// Number of neighbors that vote (default: 3)
    pub k: usize,
    /// Added to every distance before inverting (default: 1e-6)
    pub epsilon: f64,
}

impl Default for KnnOptions {
    fn default() -> Self {
        Self {
            k: 3,
            epsilon: 1e-6,
        }
    }
}

impl KnnOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of voting neighbors
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Set the distance offset
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Validate options
    pub fn validate(&self) -> RecogResult<()> {
        if self.k == 0 {
            return Err(RecogError::InvalidParameter("k must be at least 1".to_string()));
        }
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(RecogError::InvalidParameter(
                "epsilon must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outcome of classifying one vector
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Winning class
    pub label: DigitLabel,
    /// Weighted vote total per class
    pub votes: [f64; NUM_CLASSES],
}

impl Prediction {
    /// Vote total of the winning class
    pub fn score(&self) -> f64 {
        self.votes[self.label.index()]
    }
}

/// Weighted k-NN classifier over a (normalized) reference set
#[derive(Debug, Clone)]
pub struct KnnClassifier {
    reference: ReferenceSet,
    options: KnnOptions,
}

impl KnnClassifier {
    /// Create a classifier. The reference set must already be in the same
    /// space as the queries.
    pub fn new(reference: ReferenceSet, options: KnnOptions) -> RecogResult<Self> {
        options.validate()?;
        Ok(Self { reference, options })
    }

    pub fn reference(&self) -> &ReferenceSet {
        &self.reference
    }

    pub fn options(&self) -> &KnnOptions {
        &self.options
    }

    /// Classify a query vector.
    pub fn predict(&self, query: &FeatureVector) -> RecogResult<DigitLabel> {
        Ok(self.predict_with_votes(query)?.label)
    }

    /// Classify a query vector and return the per-class vote totals.
    ///
    /// # Errors
    ///
    /// Returns [`RecogError::DimensionMismatch`] when the query length
    /// differs from the reference dimensionality.
    pub fn predict_with_votes(&self, query: &FeatureVector) -> RecogResult<Prediction> {
        let dim = self.reference.dim();
        if query.len() != dim {
            return Err(RecogError::DimensionMismatch {
                expected: dim,
                actual: query.len(),
            });
        }

        let mut neighbors: Vec<(f64, DigitLabel)> = self
            .reference
            .iter()
            .map(|(v, label)| (squared_distance(v.as_slice(), query.as_slice()).sqrt(), label))
            .collect();
        // sort_by is stable: equal distances keep reference order
        neighbors.sort_by(|a, b| a.0.total_cmp(&b.0));

        let kk = self.options.k.min(neighbors.len());
        let mut votes = [0.0f64; NUM_CLASSES];
        for &(distance, label) in &neighbors[..kk] {
            votes[label.index()] += 1.0 / (self.options.epsilon + distance);
        }

        Ok(Prediction {
            label: best_class(&votes),
            votes,
        })
    }
}

/// First class with the strictly largest total.
fn best_class(votes: &[f64; NUM_CLASSES]) -> DigitLabel {
    let mut best = DigitLabel::default();
    let mut best_score = -1.0f64;
    for label in DigitLabel::all() {
        let score = votes[label.index()];
        if score > best_score {
            best_score = score;
            best = label;
        }
    }
    best
}
