//! Binary thresholding
//!
//! Provides global threshold selection with Otsu's method and the mapping of
//! 8-bit samples onto two output levels.
//!
//! A sample is foreground when it is strictly greater than the threshold.

use crate::{ColorError, ColorResult, pix_convert_to_gray};
use digitcount_core::{Pix, PixelDepth};

/// Threshold returned when no split of the histogram separates two classes
pub const DEFAULT_THRESHOLD: u8 = 127;

/// Select a global threshold from a 256-bin histogram with Otsu's method
///
/// Candidates are scanned from 0 upward, maximizing the between-class
/// variance `wB * wF * (mB - mF)^2`. Only a strictly larger variance replaces
/// the current choice, so the lowest maximizing candidate wins. Empty
/// leading bins are skipped and the scan stops once the foreground class is
/// empty. A histogram that never yields a positive variance (empty, or a
/// single populated bin) returns [`DEFAULT_THRESHOLD`].
pub fn otsu_threshold_from_histogram(histogram: &[u32; 256]) -> u8 {
    let total: f64 = histogram.iter().map(|&c| c as f64).sum();
    let sum_all: f64 = histogram
        .iter()
        .enumerate()
        .map(|(t, &c)| t as f64 * c as f64)
        .sum();

    let mut threshold = DEFAULT_THRESHOLD;
    let mut max_between = 0.0f64;
    let mut w_b = 0.0f64;
    let mut sum_b = 0.0f64;

    for (t, &count) in histogram.iter().enumerate() {
        w_b += count as f64;
        if w_b == 0.0 {
            continue;
        }
        let w_f = total - w_b;
        if w_f == 0.0 {
            break;
        }

        sum_b += t as f64 * count as f64;
        let m_b = sum_b / w_b;
        let m_f = (sum_all - sum_b) / w_f;
        let between = w_b * w_f * (m_b - m_f) * (m_b - m_f);
        if between > max_between {
            max_between = between;
            threshold = t as u8;
        }
    }

    threshold
}

/// Compute Otsu's threshold for an image
///
/// 32 bpp input is reduced to luminance first.
pub fn compute_otsu_threshold(pix: &Pix) -> ColorResult<u8> {
    let gray = pix_convert_to_gray(pix)?;
    let histogram = gray.gray_histogram(1)?;
    Ok(otsu_threshold_from_histogram(&histogram))
}

/// Map samples onto `{0, max_level}`
///
/// Samples strictly above `threshold` become `max_level`, all others 0.
pub fn threshold_to_levels(samples: &[u8], threshold: u8, max_level: u8) -> Vec<u8> {
    samples
        .iter()
        .map(|&v| if v > threshold { max_level } else { 0 })
        .collect()
}

/// Binarize an 8 bpp image with a fixed threshold
///
/// The result is 8 bpp with foreground 255 and background 0.
pub fn threshold_to_binary(pix: &Pix, threshold: u8) -> ColorResult<Pix> {
    if pix.depth() != PixelDepth::Bit8 {
        return Err(ColorError::UnsupportedDepth {
            expected: "8 bpp grayscale",
            actual: pix.depth().bits(),
        });
    }
    let levels = threshold_to_levels(&pix.gray_samples()?, threshold, 255);
    let mut pm = Pix::from_gray_samples(pix.width(), pix.height(), &levels)?.to_mut();
    pm.set_informat(pix.informat());
    Ok(pm.into())
}

/// Binarize an image with its own Otsu threshold
pub fn threshold_otsu(pix: &Pix) -> ColorResult<Pix> {
    let gray = pix_convert_to_gray(pix)?;
    let threshold = compute_otsu_threshold(&gray)?;
    threshold_to_binary(&gray, threshold)
}
