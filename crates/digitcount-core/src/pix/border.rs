//! Border operations for images
//!
//! This module provides functions for adding borders (padding) around
//! images:
//!
//! - General borders (different size per side)
//! - Centering pad to a square canvas

use super::{Pix, PixelDepth};
use crate::error::{Error, Result};

/// Per-side padding that centers a `width x height` image on a square.
///
/// The square side is `max(width, height)`. Left and top take the floor of
/// half the slack; right and bottom take the remainder, so odd differences
/// still land on the exact side length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquarePadding {
    /// Square side length
    pub side: u32,
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl SquarePadding {
    /// Compute the centering padding for the given dimensions.
    pub fn for_size(width: u32, height: u32) -> Self {
        let side = width.max(height).max(1);
        let left = (side - width) / 2;
        let top = (side - height) / 2;
        SquarePadding {
            side,
            left,
            right: side - width - left,
            top,
            bottom: side - height - top,
        }
    }

    /// True when no padding is needed.
    pub fn is_empty(&self) -> bool {
        self.left == 0 && self.right == 0 && self.top == 0 && self.bottom == 0
    }
}

impl Pix {
    /// Add a general border with different sizes per side.
    ///
    /// # Arguments
    ///
    /// * `left` - Left border width
    /// * `right` - Right border width
    /// * `top` - Top border height
    /// * `bot` - Bottom border height
    /// * `val` - Border pixel value
    ///
    /// # Returns
    ///
    /// New image with dimensions `(width + left + right, height + top + bot)`.
    ///
    /// # Errors
    ///
    /// Returns error if dimensions would overflow.
    pub fn add_border_general(
        &self,
        left: u32,
        right: u32,
        top: u32,
        bot: u32,
        val: u32,
    ) -> Result<Pix> {
        let w = self.width();
        let h = self.height();
        let new_w = w
            .checked_add(left)
            .and_then(|v| v.checked_add(right))
            .ok_or_else(|| Error::InvalidParameter("border width overflow".to_string()))?;
        let new_h = h
            .checked_add(top)
            .and_then(|v| v.checked_add(bot))
            .ok_or_else(|| Error::InvalidParameter("border height overflow".to_string()))?;

        let mut out = Pix::new(new_w, new_h, self.depth())?.to_mut();
        out.set_spp(self.spp());
        out.set_informat(self.informat());
        out.set_all(val);

        for y in 0..h {
            for x in 0..w {
                out.set_pixel_unchecked(x + left, y + top, self.get_pixel_unchecked(x, y));
            }
        }

        Ok(out.into())
    }

    /// Pad the image to a square, centering the original content.
    ///
    /// New pixels take `val`. Returns a shared clone when the image is
    /// already square.
    pub fn pad_to_square(&self, val: u32) -> Result<Pix> {
        let pad = SquarePadding::for_size(self.width(), self.height());
        if pad.is_empty() {
            return Ok(self.clone());
        }
        self.add_border_general(pad.left, pad.right, pad.top, pad.bottom, val)
    }

    /// Black value for this depth: 0 gray, or opaque black for RGBA.
    pub fn black_value(&self) -> u32 {
        match self.depth() {
            PixelDepth::Bit8 => 0,
            PixelDepth::Bit32 => crate::color::compose_rgb(0, 0, 0),
        }
    }
}
