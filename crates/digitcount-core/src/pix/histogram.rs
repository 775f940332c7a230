//! Histogram generation for Pix images
//!
//! Functions to compute pixel value distributions from images.

use super::{Pix, PixelDepth, get_data_byte};
use crate::error::{Error, Result};

impl Pix {
    /// Get the 256-bin grayscale histogram of an 8 bpp image.
    ///
    /// # Arguments
    ///
    /// * `factor` - Subsampling factor. Use 1 to count all pixels,
    ///   2 to count every other pixel in each direction, etc.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The image depth is not 8 bpp
    /// - The factor is 0
    ///
    /// # Example
    ///
    /// ```
    /// use digitcount_core::{Pix, PixelDepth};
    ///
    /// let pix = Pix::new(10, 10, PixelDepth::Bit8).unwrap();
    /// let hist = pix.gray_histogram(1).unwrap();
    /// assert_eq!(hist[0], 100);
    /// ```
    pub fn gray_histogram(&self, factor: u32) -> Result<[u32; 256]> {
        if factor == 0 {
            return Err(Error::InvalidParameter("factor must be >= 1".to_string()));
        }
        if self.depth() != PixelDepth::Bit8 {
            return Err(Error::UnsupportedDepth(self.depth().bits()));
        }

        let mut histogram = [0u32; 256];
        let mut y = 0;
        while y < self.height() {
            let line = self.row_data(y);
            let mut x = 0;
            while x < self.width() {
                histogram[get_data_byte(line, x) as usize] += 1;
                x += factor;
            }
            y += factor;
        }
        Ok(histogram)
    }
}
