//! Image to feature vector conversion
//!
//! Every input image goes through the same steps:
//!
//! 1. Drop alpha and reduce to 8 bpp luminance.
//! 2. Pad with black to a centered square (`max(w, h)` on a side).
//! 3. Resize to `target_size x target_size`, stretching to fill. Steps 2
//!    and 3 run as one resample, so the square canvas is never allocated.
//! 4. Gaussian blur with `blur_sigma`.
//! 5. Pick a global threshold with Otsu's method.
//! 6. Map samples above the threshold to `max_level`, the rest to 0.
//!
//! The output is row-major with `target_size^2` entries.

use std::path::Path;

use digitcount_color::{otsu_threshold_from_histogram, pix_convert_to_gray, threshold_to_levels};
use digitcount_core::Pix;
use digitcount_filter::gaussian_blur_sigma;
use digitcount_transform::scale_square_to_size;
use log::debug;

use crate::{FeatureVector, MAX_INTENSITY, RecogError, RecogResult};

/// Options for feature extraction
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    /// Side of the square the image is resized to (default: 28)
    pub target_size: u32,
    /// Gaussian blur sigma; 0 disables the blur (default: 0.5)
    pub blur_sigma: f32,
    /// Value given to foreground samples (default: 16)
    pub max_level: u8,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            target_size: 28,
            blur_sigma: 0.5,
            max_level: MAX_INTENSITY,
        }
    }
}

impl ExtractOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output side length
    pub fn with_target_size(mut self, size: u32) -> Self {
        self.target_size = size;
        self
    }

    /// Set the blur sigma
    pub fn with_blur_sigma(mut self, sigma: f32) -> Self {
        self.blur_sigma = sigma;
        self
    }

    /// Set the foreground level
    pub fn with_max_level(mut self, level: u8) -> Self {
        self.max_level = level;
        self
    }

    /// Number of features produced
    pub fn dim(&self) -> usize {
        self.target_size as usize * self.target_size as usize
    }

    /// Validate options
    pub fn validate(&self) -> RecogResult<()> {
        if self.target_size == 0 {
            return Err(RecogError::InvalidParameter(
                "target_size must be positive".to_string(),
            ));
        }
        if !self.blur_sigma.is_finite() || self.blur_sigma < 0.0 {
            return Err(RecogError::InvalidParameter(
                "blur_sigma must be finite and non-negative".to_string(),
            ));
        }
        if self.max_level == 0 {
            return Err(RecogError::InvalidParameter(
                "max_level must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Converts decoded or encoded images into feature vectors
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    options: ExtractOptions,
}

impl FeatureExtractor {
    pub fn new(options: ExtractOptions) -> RecogResult<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Length of every extracted vector
    pub fn dim(&self) -> usize {
        self.options.dim()
    }

    /// Run the image steps and return the two-level samples.
    pub fn extract_levels(&self, pix: &Pix) -> RecogResult<Vec<u8>> {
        let size = self.options.target_size;

        let gray = pix_convert_to_gray(pix)?;
        let resized = scale_square_to_size(&gray, gray.black_value(), size, size)?;
        let smoothed = if self.options.blur_sigma > 0.0 {
            gaussian_blur_sigma(&resized, self.options.blur_sigma)?
        } else {
            resized
        };

        let threshold = otsu_threshold_from_histogram(&smoothed.gray_histogram(1)?);
        let samples = smoothed.gray_samples()?;
        debug!(
            "extract: {}x{} -> {}x{}, threshold {}",
            pix.width(),
            pix.height(),
            size,
            size,
            threshold
        );
        Ok(threshold_to_levels(&samples, threshold, self.options.max_level))
    }

    /// Extract a feature vector from a decoded image.
    pub fn extract_pix(&self, pix: &Pix) -> RecogResult<FeatureVector> {
        Ok(FeatureVector::from_levels(&self.extract_levels(pix)?))
    }

    /// Decode an in-memory image and extract its feature vector.
    ///
    /// The header is read first so unreadable metadata and zero dimensions
    /// fail before any pixel data is decoded.
    pub fn extract_bytes(&self, data: &[u8]) -> RecogResult<FeatureVector> {
        let header = digitcount_io::read_image_header_mem(data)?;
        if header.width == 0 || header.height == 0 {
            return Err(digitcount_core::Error::InvalidDimension {
                width: header.width,
                height: header.height,
            }
            .into());
        }
        let pix = digitcount_io::read_image_mem(data)?;
        self.extract_pix(&pix)
    }

    /// Read an image file and extract its feature vector.
    pub fn extract_path<P: AsRef<Path>>(&self, path: P) -> RecogResult<FeatureVector> {
        let data = std::fs::read(path.as_ref()).map_err(digitcount_io::IoError::from)?;
        self.extract_bytes(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use digitcount_core::PixelDepth;

    fn gray(w: u32, h: u32, samples: &[u8]) -> Pix {
        Pix::from_gray_samples(w, h, samples).unwrap()
    }

    #[test]
    fn test_output_length_and_levels() {
        let pix = gray(3, 5, &[0, 255, 0, 0, 255, 0, 0, 255, 0, 0, 255, 0, 0, 255, 0]);
        let levels = FeatureExtractor::default().extract_levels(&pix).unwrap();
        assert_eq!(levels.len(), 784);
        assert!(levels.iter().all(|&v| v == 0 || v == 16));
        assert!(levels.contains(&16));
        assert!(levels.contains(&0));
    }

    #[test]
    fn test_all_white_2x2() {
        let pix = gray(2, 2, &[255; 4]);
        let levels = FeatureExtractor::default().extract_levels(&pix).unwrap();
        assert_eq!(levels, vec![16; 784]);
    }

    #[test]
    fn test_all_black() {
        let pix = gray(5, 3, &[0; 15]);
        let levels = FeatureExtractor::default().extract_levels(&pix).unwrap();
        assert_eq!(levels, vec![0; 784]);
    }

    #[test]
    fn test_long_strip_stays_small() {
        // a 40000 pixel wide strip would pad to 1.6e9 samples
        let pix = gray(40000, 1, &vec![255; 40000]);
        let levels = FeatureExtractor::default().extract_levels(&pix).unwrap();
        assert_eq!(levels.len(), 784);
        assert!(levels.iter().all(|&v| v == 0 || v == 16));
    }

    #[test]
    fn test_custom_target_size() {
        let options = ExtractOptions::default()
            .with_target_size(8)
            .with_blur_sigma(0.0)
            .with_max_level(1);
        let extractor = FeatureExtractor::new(options).unwrap();
        let v = extractor.extract_pix(&gray(4, 4, &[200; 16])).unwrap();
        assert_eq!(extractor.dim(), 64);
        assert_eq!(v.as_slice(), &[1.0; 64]);
    }

    #[test]
    fn test_rgba_input() {
        let mut pm = Pix::new(2, 2, PixelDepth::Bit32).unwrap().to_mut();
        pm.set_spp(4);
        pm.set_all(digitcount_core::color::compose_rgba(255, 255, 255, 0));
        let levels = FeatureExtractor::default().extract_levels(&pm.into()).unwrap();
        assert_eq!(levels, vec![16; 784]);
    }

    #[test]
    fn test_invalid_options() {
        assert!(FeatureExtractor::new(ExtractOptions::default().with_target_size(0)).is_err());
        assert!(FeatureExtractor::new(ExtractOptions::default().with_blur_sigma(-1.0)).is_err());
        assert!(FeatureExtractor::new(ExtractOptions::default().with_max_level(0)).is_err());
    }

    #[test]
    fn test_undecodable_bytes() {
        let err = FeatureExtractor::default()
            .extract_bytes(b"definitely not an image")
            .unwrap_err();
        assert!(err.is_extraction_error());
    }
}
