//! Per-feature z-score standardization
//!
//! Statistics are fitted once on the reference vectors and then applied
//! unchanged to the reference set and to every query.

use crate::{FeatureVector, RecogError, RecogResult, ReferenceSet};

/// Fitted per-feature mean and standard deviation
///
/// A standard deviation is never stored as zero or NaN: constant features
/// get 1, which maps them to 0 after transformation. Infinite deviations are
/// kept as they are.
#[derive(Debug, Clone, PartialEq)]
pub struct ZScore {
    mean: Vec<f64>,
    std: Vec<f64>,
}

impl ZScore {
    /// Fit statistics on a non-empty set of equal-length vectors.
    ///
    /// The standard deviation uses the sample divisor `max(1, n - 1)`.
    pub fn fit(vectors: &[FeatureVector]) -> RecogResult<Self> {
        let first = vectors.first().ok_or(RecogError::EmptyReference)?;
        let d = first.len();
        if let Some(bad) = vectors.iter().find(|v| v.len() != d) {
            return Err(RecogError::DimensionMismatch {
                expected: d,
                actual: bad.len(),
            });
        }

        let n = vectors.len();
        let mut mean = vec![0.0f64; d];
        for v in vectors {
            for (m, x) in mean.iter_mut().zip(v.as_slice()) {
                *m += x;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n as f64);

        let mut sq = vec![0.0f64; d];
        for v in vectors {
            for ((s, x), m) in sq.iter_mut().zip(v.as_slice()).zip(&mean) {
                let diff = x - m;
                *s += diff * diff;
            }
        }
        let divisor = n.saturating_sub(1).max(1) as f64;
        let std = sq.into_iter().map(|s| nonzero_std((s / divisor).sqrt())).collect();

        Ok(Self { mean, std })
    }

    /// Build statistics from known values.
    ///
    /// Zero and NaN deviations are replaced by 1; infinities are kept.
    pub fn from_stats(mean: Vec<f64>, std: Vec<f64>) -> RecogResult<Self> {
        if mean.len() != std.len() {
            return Err(RecogError::DimensionMismatch {
                expected: mean.len(),
                actual: std.len(),
            });
        }
        let std = std.into_iter().map(nonzero_std).collect();
        Ok(Self { mean, std })
    }

    /// Statistics that leave vectors of length `dim` unchanged.
    pub fn identity(dim: usize) -> Self {
        Self {
            mean: vec![0.0; dim],
            std: vec![1.0; dim],
        }
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn std(&self) -> &[f64] {
        &self.std
    }

    /// Standardize one vector: `(x[j] - mean[j]) / std[j]`.
    pub fn transform_one(&self, vector: &FeatureVector) -> RecogResult<FeatureVector> {
        if vector.len() != self.dim() {
            return Err(RecogError::DimensionMismatch {
                expected: self.dim(),
                actual: vector.len(),
            });
        }
        Ok(vector
            .as_slice()
            .iter()
            .zip(&self.mean)
            .zip(&self.std)
            .map(|((x, m), s)| (x - m) / s)
            .collect::<Vec<_>>()
            .into())
    }

    /// Standardize every vector, returning new vectors.
    pub fn transform(&self, vectors: &[FeatureVector]) -> RecogResult<Vec<FeatureVector>> {
        vectors.iter().map(|v| self.transform_one(v)).collect()
    }

    /// Standardize a reference set, keeping its labels.
    pub fn transform_reference(&self, reference: &ReferenceSet) -> RecogResult<ReferenceSet> {
        reference.with_vectors(self.transform(reference.vectors())?)
    }
}

fn nonzero_std(s: f64) -> f64 {
    if s == 0.0 || s.is_nan() { 1.0 } else { s }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vectors(rows: &[&[f64]]) -> Vec<FeatureVector> {
        rows.iter().map(|r| FeatureVector::new(r.to_vec())).collect()
    }

    #[test]
    fn test_fit_sample_std() {
        let data = vectors(&[&[1.0, 5.0], &[3.0, 5.0]]);
        let z = ZScore::fit(&data).unwrap();
        assert_eq!(z.mean(), &[2.0, 5.0]);
        // sqrt(((1-2)^2 + (3-2)^2) / 1)
        assert!((z.std()[0] - 2.0f64.sqrt()).abs() < 1e-12);
        assert_eq!(z.std()[1], 1.0);
    }

    #[test]
    fn test_single_sample_divisor() {
        let data = vectors(&[&[4.0, 0.0]]);
        let z = ZScore::fit(&data).unwrap();
        assert_eq!(z.std(), &[1.0, 1.0]);
        let t = z.transform_one(&data[0]).unwrap();
        assert_eq!(t.as_slice(), &[0.0, 0.0]);
    }

    #[test]
    fn test_fit_errors() {
        assert!(matches!(ZScore::fit(&[]), Err(RecogError::EmptyReference)));
        let ragged = vectors(&[&[1.0, 2.0], &[1.0]]);
        assert!(matches!(
            ZScore::fit(&ragged),
            Err(RecogError::DimensionMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_transform_is_pure() {
        let data = vectors(&[&[0.0, 2.0], &[4.0, 6.0], &[8.0, 1.0]]);
        let z = ZScore::fit(&data).unwrap();
        let before = data.clone();
        let a = z.transform(&data).unwrap();
        let b = z.transform(&data).unwrap();
        assert_eq!(a, b);
        assert_eq!(data, before);
    }

    #[test]
    fn test_transform_dimension_mismatch() {
        let z = ZScore::identity(3);
        assert!(matches!(
            z.transform_one(&FeatureVector::new(vec![1.0])),
            Err(RecogError::DimensionMismatch { expected: 3, actual: 1 })
        ));
    }

    #[test]
    fn test_from_stats_replaces_zero_std() {
        let z = ZScore::from_stats(vec![1.0, 2.0], vec![0.0, 4.0]).unwrap();
        assert_eq!(z.std(), &[1.0, 4.0]);
        assert!(ZScore::from_stats(vec![1.0], vec![]).is_err());
    }

    #[test]
    fn test_nan_and_infinite_std() {
        let z = ZScore::from_stats(vec![0.0; 3], vec![f64::NAN, f64::INFINITY, -0.0]).unwrap();
        assert_eq!(z.std()[0], 1.0);
        assert_eq!(z.std()[1], f64::INFINITY);
        assert_eq!(z.std()[2], 1.0);
        let out = z.transform_one(&FeatureVector::new(vec![3.0, 3.0, 3.0])).unwrap();
        assert_eq!(out.as_slice(), &[3.0, 0.0, 3.0]);
    }
}
