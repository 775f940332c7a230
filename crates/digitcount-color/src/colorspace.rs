//! Color space conversion
//!
//! Only the luminance conversion survives here: every image entering the
//! feature pipeline is reduced to one 8-bit channel.

use crate::ColorResult;
use digitcount_core::{Pix, PixelDepth, color};

/// Convert RGB values to grayscale using ITU-R BT.601 luma weights
///
/// Y = 0.299 * R + 0.587 * G + 0.114 * B, rounded to the nearest integer.
pub fn rgb_to_gray(r: u8, g: u8, b: u8) -> u8 {
    let y = 299 * r as u32 + 587 * g as u32 + 114 * b as u32;
    ((y + 500) / 1000) as u8
}

/// Convert an image to 8 bpp grayscale
///
/// 8 bpp input is returned as is (shared data). For 32 bpp input the alpha
/// channel is discarded without compositing and the remaining RGB is reduced
/// with [`rgb_to_gray`].
pub fn pix_convert_to_gray(pix: &Pix) -> ColorResult<Pix> {
    match pix.depth() {
        PixelDepth::Bit8 => Ok(pix.clone()),
        PixelDepth::Bit32 => {
            let w = pix.width();
            let h = pix.height();
            let mut samples = Vec::with_capacity(w as usize * h as usize);
            for y in 0..h {
                samples.extend(pix.row_data(y)[..w as usize].iter().map(|&pixel| {
                    let (r, g, b) = color::extract_rgb(pixel);
                    rgb_to_gray(r, g, b)
                }));
            }
            let mut pm = Pix::from_gray_samples(w, h, &samples)?.to_mut();
            pm.set_informat(pix.informat());
            Ok(pm.into())
        }
    }
}
