//! Batch digit classification
//!
//! [`Pipeline::prepare`] fits the z-score statistics on the reference set,
//! normalizes it once and builds the classifier. After that every image is
//! handled independently: decode, extract, normalize, classify. The per-image
//! results are folded into a [`DigitCounts`] table in input order.
//!
//! An image that cannot be decoded or vectorized is skipped with a warning
//! and recorded in [`BatchReport::failures`]. The batch only fails as a
//! whole when no image could be classified.

use std::fmt;
use std::path::{Path, PathBuf};

use digitcount_core::Pix;
use log::{debug, info, warn};
use rayon::prelude::*;

use crate::{
    DigitLabel, ExtractOptions, FeatureExtractor, FeatureVector, KnnClassifier, KnnOptions,
    NUM_CLASSES, Prediction, RecogError, RecogResult, ReferenceSet, ZScore,
};

/// File extensions accepted by [`is_supported_image_path`]
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "tif", "tiff"];

/// True when the path has one of [`SUPPORTED_EXTENSIONS`] (any case).
pub fn is_supported_image_path<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

/// Options for the classification pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    /// Feature extraction settings
    pub extract: ExtractOptions,
    /// Classifier settings
    pub knn: KnnOptions,
    /// Process images on the rayon thread pool (default: true)
    pub parallel: bool,
    /// Number of `(id, label)` pairs kept in the report (default: 20)
    pub preview_limit: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            extract: ExtractOptions::default(),
            knn: KnnOptions::default(),
            parallel: true,
            preview_limit: 20,
        }
    }
}

impl PipelineOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extract(mut self, extract: ExtractOptions) -> Self {
        self.extract = extract;
        self
    }

    pub fn with_knn(mut self, knn: KnnOptions) -> Self {
        self.knn = knn;
        self
    }

    /// Set the number of voting neighbors
    pub fn with_k(mut self, k: usize) -> Self {
        self.knn.k = k;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_preview_limit(mut self, limit: usize) -> Self {
        self.preview_limit = limit;
        self
    }

    /// Validate options
    pub fn validate(&self) -> RecogResult<()> {
        self.extract.validate()?;
        self.knn.validate()
    }
}

/// One image to classify
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// An image file on disk
    Path(PathBuf),
    /// Encoded image bytes with a caller-chosen identifier
    Memory { id: String, data: Vec<u8> },
}

impl ImageSource {
    pub fn from_path<P: Into<PathBuf>>(path: P) -> Self {
        ImageSource::Path(path.into())
    }

    pub fn from_memory<S: Into<String>>(id: S, data: Vec<u8>) -> Self {
        ImageSource::Memory {
            id: id.into(),
            data,
        }
    }

    /// Identifier used in warnings, previews and failures
    pub fn id(&self) -> String {
        match self {
            ImageSource::Path(path) => path.display().to_string(),
            ImageSource::Memory { id, .. } => id.clone(),
        }
    }
}

/// Per-class prediction counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DigitCounts([usize; NUM_CLASSES]);

impl DigitCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one prediction.
    pub fn record(&mut self, label: DigitLabel) {
        self.0[label.index()] += 1;
    }

    pub fn get(&self, label: DigitLabel) -> usize {
        self.0[label.index()]
    }

    pub fn as_array(&self) -> &[usize; NUM_CLASSES] {
        &self.0
    }

    /// Total number of counted images
    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    /// Add another table into this one.
    pub fn merge(&mut self, other: &DigitCounts) {
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a += b;
        }
    }

    /// Render as a two-line CSV: the class header, then the counts.
    pub fn to_csv(&self) -> String {
        let header: Vec<String> = DigitLabel::all().map(|l| l.to_string()).collect();
        let values: Vec<String> = self.0.iter().map(|c| c.to_string()).collect();
        format!("{}\n{}\n", header.join(","), values.join(","))
    }
}

impl FromIterator<DigitLabel> for DigitCounts {
    fn from_iter<I: IntoIterator<Item = DigitLabel>>(iter: I) -> Self {
        let mut counts = DigitCounts::new();
        for label in iter {
            counts.record(label);
        }
        counts
    }
}

impl fmt::Display for DigitCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, "]")
    }
}

/// An image that was skipped
#[derive(Debug)]
pub struct ImageFailure {
    pub id: String,
    pub error: RecogError,
}

impl fmt::Display for ImageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.error)
    }
}

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Predictions per class over the images that succeeded
    pub counts: DigitCounts,
    /// Skipped images, in input order
    pub failures: Vec<ImageFailure>,
    /// First `preview_limit` successful `(id, label)` pairs, in input order
    pub previews: Vec<(String, DigitLabel)>,
}

impl BatchReport {
    /// Number of images that were classified
    pub fn processed(&self) -> usize {
        self.counts.total()
    }

    /// Number of images that were skipped
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Fitted normalizer, normalized reference set and feature extractor
#[derive(Debug, Clone)]
pub struct Pipeline {
    stats: ZScore,
    classifier: KnnClassifier,
    extractor: FeatureExtractor,
    options: PipelineOptions,
}

impl Pipeline {
    /// Fit the statistics on `reference` and build the classifier.
    ///
    /// # Errors
    ///
    /// Fails on invalid options, or when the reference dimensionality does
    /// not match the extractor output (`target_size^2`).
    pub fn prepare(reference: &ReferenceSet, options: PipelineOptions) -> RecogResult<Self> {
        options.validate()?;
        let extractor = FeatureExtractor::new(options.extract.clone())?;
        if reference.dim() != extractor.dim() {
            return Err(RecogError::DimensionMismatch {
                expected: extractor.dim(),
                actual: reference.dim(),
            });
        }

        let stats = ZScore::fit(reference.vectors())?;
        let normalized = stats.transform_reference(reference)?;
        let classifier = KnnClassifier::new(normalized, options.knn.clone())?;
        info!(
            "prepared reference set: n={}, d={}, k={}",
            reference.len(),
            reference.dim(),
            options.knn.k
        );

        Ok(Self {
            stats,
            classifier,
            extractor,
            options,
        })
    }

    pub fn stats(&self) -> &ZScore {
        &self.stats
    }

    pub fn classifier(&self) -> &KnnClassifier {
        &self.classifier
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Normalize a raw feature vector and classify it.
    pub fn classify_vector(&self, vector: &FeatureVector) -> RecogResult<Prediction> {
        let z = self.stats.transform_one(vector)?;
        self.classifier.predict_with_votes(&z)
    }

    /// Classify a decoded image.
    pub fn classify_pix(&self, pix: &Pix) -> RecogResult<Prediction> {
        self.classify_vector(&self.extractor.extract_pix(pix)?)
    }

    /// Decode and classify one image.
    pub fn classify_image(&self, source: &ImageSource) -> RecogResult<Prediction> {
        let vector = match source {
            ImageSource::Path(path) => self.extractor.extract_path(path)?,
            ImageSource::Memory { data, .. } => self.extractor.extract_bytes(data)?,
        };
        self.classify_vector(&vector)
    }

    /// Classify a batch of images.
    ///
    /// Extraction failures are logged with `warn!` and collected in the
    /// report. Any other error aborts the batch.
    ///
    /// # Errors
    ///
    /// Returns [`RecogError::NoImagesProcessed`] when `sources` is empty or
    /// every image failed.
    pub fn classify_batch(&self, sources: &[ImageSource]) -> RecogResult<BatchReport> {
        let results: Vec<RecogResult<Prediction>> = if self.options.parallel {
            sources
                .par_iter()
                .map(|source| self.classify_image(source))
                .collect()
        } else {
            sources
                .iter()
                .map(|source| self.classify_image(source))
                .collect()
        };

        let mut report = BatchReport::default();
        for (source, result) in sources.iter().zip(results) {
            match result {
                Ok(prediction) => {
                    debug!("{} -> {}", source.id(), prediction.label);
                    report.counts.record(prediction.label);
                    if report.previews.len() < self.options.preview_limit {
                        report.previews.push((source.id(), prediction.label));
                    }
                }
                Err(error) if error.is_extraction_error() => {
                    let id = source.id();
                    warn!("Skipped {}: {}", id, error);
                    report.failures.push(ImageFailure { id, error });
                }
                Err(error) => return Err(error),
            }
        }

        info!(
            "classified {} image(s), skipped {}: {}",
            report.processed(),
            report.failed(),
            report.counts
        );
        if report.processed() == 0 {
            return Err(RecogError::NoImagesProcessed {
                failed: report.failed(),
            });
        }
        Ok(report)
    }

    /// Classify image files, processed in sorted path order.
    pub fn classify_paths<I, P>(&self, paths: I) -> RecogResult<BatchReport>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut paths: Vec<PathBuf> = paths.into_iter().map(Into::into).collect();
        paths.sort();
        let sources: Vec<ImageSource> = paths.into_iter().map(ImageSource::Path).collect();
        self.classify_batch(&sources)
    }
}
