//! Pixel access functions
//!
//! Low-level functions for getting and setting individual pixels.
//!
//! # Pixel packing
//!
//! 8 bpp pixels are packed MSB-to-LSB within each 32-bit word: pixel 0
//! occupies bits 31..24 of the first word. 32 bpp pixels take one word each.

use super::{Pix, PixMut, PixelDepth};
use crate::color;
use crate::error::{Error, Result};

#[inline]
fn read_word(line: &[u32], x: u32, depth: PixelDepth) -> u32 {
    match depth {
        PixelDepth::Bit8 => get_data_byte(line, x),
        PixelDepth::Bit32 => line[x as usize],
    }
}

impl Pix {
    /// Get a pixel value at (x, y).
    ///
    /// Returns `None` if coordinates are out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some(self.get_pixel_unchecked(x, y))
    }

    /// Get a pixel value without bounds checking against the image width.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height` or the word index falls outside the row.
    #[inline]
    pub fn get_pixel_unchecked(&self, x: u32, y: u32) -> u32 {
        read_word(self.row_data(y), x, self.depth())
    }

    /// Get RGBA values at (x, y).
    ///
    /// Only valid for 32-bit images.
    pub fn get_rgba(&self, x: u32, y: u32) -> Option<(u8, u8, u8, u8)> {
        if self.depth() != PixelDepth::Bit32 {
            return None;
        }
        self.get_pixel(x, y).map(color::extract_rgba)
    }
}

impl PixMut {
    /// Get a pixel value at (x, y).
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let wpl = self.inner.wpl as usize;
        let start = y as usize * wpl;
        Some(read_word(
            &self.inner.data[start..start + wpl],
            x,
            self.depth(),
        ))
    }

    /// Set a pixel value at (x, y).
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if coordinates are out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, val: u32) -> Result<()> {
        if x >= self.width() {
            return Err(Error::IndexOutOfBounds {
                index: x as usize,
                len: self.width() as usize,
            });
        }
        if y >= self.height() {
            return Err(Error::IndexOutOfBounds {
                index: y as usize,
                len: self.height() as usize,
            });
        }
        self.set_pixel_unchecked(x, y, val);
        Ok(())
    }

    /// Set a pixel value without bounds checking against the image width.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height` or the word index falls outside the row.
    #[inline]
    pub fn set_pixel_unchecked(&mut self, x: u32, y: u32, val: u32) {
        let depth = self.depth();
        let line = self.row_data_mut(y);
        match depth {
            PixelDepth::Bit8 => set_data_byte(line, x, val),
            PixelDepth::Bit32 => line[x as usize] = val,
        }
    }

    /// Set an RGBA pixel at (x, y).
    ///
    /// Only valid for 32-bit images.
    pub fn set_rgba(&mut self, x: u32, y: u32, r: u8, g: u8, b: u8, a: u8) -> Result<()> {
        if self.depth() != PixelDepth::Bit32 {
            return Err(Error::UnsupportedDepth(self.depth().bits()));
        }
        self.set_pixel(x, y, color::compose_rgba(r, g, b, a))
    }
}

/// Get an 8-bit pixel value from a packed row.
#[inline]
pub fn get_data_byte(line: &[u32], x: u32) -> u32 {
    let word = line[(x >> 2) as usize];
    let shift = 24 - 8 * (x & 3);
    (word >> shift) & 0xff
}

/// Set an 8-bit pixel value in a packed row.
#[inline]
pub fn set_data_byte(line: &mut [u32], x: u32, val: u32) {
    let word = &mut line[(x >> 2) as usize];
    let shift = 24 - 8 * (x & 3);
    *word = (*word & !(0xff << shift)) | ((val & 0xff) << shift);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_packing_is_msb_first() {
        let mut line = [0u32; 2];
        set_data_byte(&mut line, 0, 0xaa);
        set_data_byte(&mut line, 3, 0x11);
        set_data_byte(&mut line, 4, 0xff);
        assert_eq!(line[0], 0xaa00_0011);
        assert_eq!(line[1], 0xff00_0000);
        assert_eq!(get_data_byte(&line, 3), 0x11);
    }

    #[test]
    fn test_set_pixel_out_of_bounds() {
        let mut pm = Pix::new(3, 3, PixelDepth::Bit8).unwrap().to_mut();
        assert!(pm.set_pixel(3, 0, 1).is_err());
        assert!(pm.set_pixel(0, 3, 1).is_err());
        pm.set_pixel(2, 2, 77).unwrap();
        assert_eq!(pm.get_pixel(2, 2), Some(77));
    }

    #[test]
    fn test_rgba_access() {
        let mut pm = Pix::new(2, 1, PixelDepth::Bit32).unwrap().to_mut();
        pm.set_rgba(1, 0, 9, 8, 7, 6).unwrap();
        let pix: Pix = pm.into();
        assert_eq!(pix.get_rgba(1, 0), Some((9, 8, 7, 6)));
        assert_eq!(pix.get_rgba(2, 0), None);
    }
}
