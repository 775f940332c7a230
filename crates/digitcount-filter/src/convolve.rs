//! Convolution operations
//!
//! Implements 8 bpp convolution with arbitrary kernels. Pixels outside the
//! image take the value of the nearest edge pixel (replicate border).

use crate::{FilterError, FilterResult, Kernel};
use digitcount_core::{Pix, PixelDepth};

/// Convolve an 8-bit grayscale image with a kernel
///
/// Results are rounded and clamped to 0..=255.
pub fn convolve_gray(pix: &Pix, kernel: &Kernel) -> FilterResult<Pix> {
    check_grayscale(pix)?;

    let w = pix.width() as usize;
    let h = pix.height() as usize;
    let src: Vec<f32> = pix.gray_samples()?.into_iter().map(f32::from).collect();
    let out = apply(&src, w, h, kernel);
    to_pix(pix, &out)
}

/// Convolve with a horizontal kernel then a vertical kernel
///
/// The intermediate result is kept in floating point, so this matches
/// [`convolve_gray`] with the outer product of the two kernels.
pub fn convolve_sep(pix: &Pix, kernel_x: &Kernel, kernel_y: &Kernel) -> FilterResult<Pix> {
    check_grayscale(pix)?;
    if kernel_x.height() != 1 || kernel_y.width() != 1 {
        return Err(FilterError::InvalidKernel(format!(
            "separable kernels must be Nx1 and 1xN, got {}x{} and {}x{}",
            kernel_x.width(),
            kernel_x.height(),
            kernel_y.width(),
            kernel_y.height()
        )));
    }

    let w = pix.width() as usize;
    let h = pix.height() as usize;
    let src: Vec<f32> = pix.gray_samples()?.into_iter().map(f32::from).collect();
    let tmp = apply(&src, w, h, kernel_x);
    let out = apply(&tmp, w, h, kernel_y);
    to_pix(pix, &out)
}

/// Box blur with a `(2 * radius + 1)` square window
pub fn box_blur(pix: &Pix, radius: u32) -> FilterResult<Pix> {
    let kernel = Kernel::box_kernel(2 * radius + 1)?;
    convolve_gray(pix, &kernel)
}

/// Gaussian blur with a `(2 * radius + 1)` window
///
/// Radius 0 returns the image unchanged.
pub fn gaussian_blur(pix: &Pix, radius: u32, sigma: f32) -> FilterResult<Pix> {
    check_grayscale(pix)?;
    if radius == 0 {
        return Ok(pix.clone());
    }
    let kx = Kernel::gaussian_1d(2 * radius + 1, sigma)?;
    let ky = kx.transposed();
    convolve_sep(pix, &kx, &ky)
}

/// Gaussian blur with the window derived from `sigma`
///
/// See [`radius_for_sigma`].
pub fn gaussian_blur_sigma(pix: &Pix, sigma: f32) -> FilterResult<Pix> {
    gaussian_blur(pix, radius_for_sigma(sigma), sigma)
}

/// Window radius covering two standard deviations, at least 1.
pub fn radius_for_sigma(sigma: f32) -> u32 {
    if !sigma.is_finite() || sigma <= 0.0 {
        return 1;
    }
    ((2.0 * sigma).ceil() as u32).max(1)
}

fn apply(src: &[f32], w: usize, h: usize, kernel: &Kernel) -> Vec<f32> {
    let kw = kernel.width() as i64;
    let kh = kernel.height() as i64;
    let kcx = kernel.center_x() as i64;
    let kcy = kernel.center_y() as i64;
    let kdata = kernel.data();

    let mut out = vec![0.0f32; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut sum = 0.0f32;
            for ky in 0..kh {
                // Clamp to image boundaries (replicate border)
                let sy = (y as i64 + ky - kcy).clamp(0, h as i64 - 1) as usize;
                for kx in 0..kw {
                    let sx = (x as i64 + kx - kcx).clamp(0, w as i64 - 1) as usize;
                    sum += src[sy * w + sx] * kdata[(ky * kw + kx) as usize];
                }
            }
            out[y * w + x] = sum;
        }
    }
    out
}

fn to_pix(like: &Pix, values: &[f32]) -> FilterResult<Pix> {
    let samples: Vec<u8> = values
        .iter()
        .map(|v| v.round().clamp(0.0, 255.0) as u8)
        .collect();
    let mut pm = Pix::from_gray_samples(like.width(), like.height(), &samples)?.to_mut();
    pm.set_informat(like.informat());
    Ok(pm.into())
}

fn check_grayscale(pix: &Pix) -> FilterResult<()> {
    if pix.depth() != PixelDepth::Bit8 {
        return Err(FilterError::UnsupportedDepth {
            expected: "8 bpp grayscale",
            actual: pix.depth().bits(),
        });
    }
    Ok(())
}
