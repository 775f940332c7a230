//! Image scaling operations
//!
//! Provides various scaling algorithms including:
//! - Linear interpolation (for upscaling)
//! - Sampling (nearest neighbor)
//! - Area mapping (for downscaling with anti-aliasing)
//!
//! All methods work on 8 bpp gray and 32 bpp RGBA images. Color images are
//! scaled channel by channel, alpha included.

use crate::{TransformError, TransformResult};
use digitcount_core::{Pix, PixelDepth, SquarePadding, color};

/// Scaling method to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleMethod {
    /// Nearest-neighbor sampling (fastest, pixelated results)
    Sampling,
    /// Bilinear interpolation (good for upscaling)
    Linear,
    /// Area mapping (best for downscaling, anti-aliased)
    AreaMap,
    /// Area mapping when shrinking in both directions, linear otherwise
    #[default]
    Auto,
}

/// Interleaved 8-bit channel buffer
///
/// The stored samples may sit inside a larger `width x height` frame at
/// (`left`, `top`); cells outside them read as `fill`.
struct Planes {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<u8>,
    left: usize,
    top: usize,
    data_width: usize,
    data_height: usize,
    fill: [u8; 4],
}

impl Planes {
    fn new(width: usize, height: usize, channels: usize, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            channels,
            data,
            left: 0,
            top: 0,
            data_width: width,
            data_height: height,
            fill: [0; 4],
        }
    }

    fn from_pix(pix: &Pix) -> TransformResult<Self> {
        let (width, height) = (pix.width() as usize, pix.height() as usize);
        let (channels, data) = match pix.depth() {
            PixelDepth::Bit8 => (1, pix.gray_samples()?),
            PixelDepth::Bit32 => {
                let mut data = Vec::with_capacity(width * height * 4);
                for y in 0..pix.height() {
                    for &pixel in &pix.row_data(y)[..width] {
                        let (r, g, b, a) = color::extract_rgba(pixel);
                        data.extend_from_slice(&[r, g, b, a]);
                    }
                }
                (4, data)
            }
        };
        Ok(Self::new(width, height, channels, data))
    }

    /// Place the samples centered on a square frame filled with `fill`.
    fn into_square(mut self, pad: &SquarePadding, fill: u32) -> Self {
        self.fill = if self.channels == 1 {
            [fill as u8; 4]
        } else {
            let (r, g, b, a) = color::extract_rgba(fill);
            [r, g, b, a]
        };
        self.left = pad.left as usize;
        self.top = pad.top as usize;
        self.width = pad.side as usize;
        self.height = pad.side as usize;
        self
    }

    #[inline]
    fn in_cols(&self, x: usize) -> bool {
        x >= self.left && x < self.left + self.data_width
    }

    #[inline]
    fn in_rows(&self, y: usize) -> bool {
        y >= self.top && y < self.top + self.data_height
    }

    #[inline]
    fn at(&self, x: usize, y: usize, c: usize) -> u8 {
        if !self.in_cols(x) || !self.in_rows(y) {
            return self.fill[c];
        }
        let (x, y) = (x - self.left, y - self.top);
        self.data[(y * self.data_width + x) * self.channels + c]
    }

    fn into_pix(self, like: &Pix) -> TransformResult<Pix> {
        let (w, h) = (self.width as u32, self.height as u32);
        if self.channels == 1 {
            let pix = Pix::from_gray_samples(w, h, &self.data)?;
            let mut pm = pix.to_mut();
            pm.set_informat(like.informat());
            return Ok(pm.into());
        }
        let mut pm = Pix::new(w, h, PixelDepth::Bit32)?.to_mut();
        pm.set_spp(like.spp());
        pm.set_informat(like.informat());
        for (i, px) in self.data.chunks_exact(4).enumerate() {
            let (x, y) = ((i % self.width) as u32, (i / self.width) as u32);
            pm.set_pixel_unchecked(x, y, color::compose_rgba(px[0], px[1], px[2], px[3]));
        }
        Ok(pm.into())
    }
}

/// Scale an image by the given factors
///
/// Output dimensions are `round(w * scale_x)` by `round(h * scale_y)`,
/// never less than 1.
///
/// # Arguments
/// * `pix` - Input image
/// * `scale_x` - Horizontal scale factor (e.g., 2.0 = double width)
/// * `scale_y` - Vertical scale factor
/// * `method` - Scaling algorithm to use
pub fn scale(pix: &Pix, scale_x: f32, scale_y: f32, method: ScaleMethod) -> TransformResult<Pix> {
    for s in [scale_x, scale_y] {
        if !s.is_finite() || s <= 0.0 {
            return Err(TransformError::InvalidScaleFactor(format!("{}", s)));
        }
    }
    let width = ((pix.width() as f32 * scale_x).round() as u32).max(1);
    let height = ((pix.height() as f32 * scale_y).round() as u32).max(1);
    resize(pix, width, height, method)
}

/// Scale an image to a specific size
///
/// The aspect ratio is not preserved unless one dimension is 0, in which
/// case it is derived from the other. An image already at the target size
/// is returned unchanged.
///
/// # Arguments
/// * `pix` - Input image
/// * `width` - Target width (0 to maintain aspect ratio)
/// * `height` - Target height (0 to maintain aspect ratio)
pub fn scale_to_size(pix: &Pix, width: u32, height: u32) -> TransformResult<Pix> {
    let (ws, hs) = (pix.width() as f64, pix.height() as f64);
    let (wd, hd) = match (width, height) {
        (0, 0) => {
            return Err(TransformError::InvalidParameters(
                "both target dimensions are 0".to_string(),
            ));
        }
        (0, h) => (((ws * h as f64 / hs).round() as u32).max(1), h),
        (w, 0) => (w, ((hs * w as f64 / ws).round() as u32).max(1)),
        (w, h) => (w, h),
    };
    resize(pix, wd, hd, ScaleMethod::Auto)
}

/// Scale an image centered on a square canvas to `width x height`.
///
/// Produces the same samples as padding with [`Pix::pad_to_square`] and
/// then calling [`scale_to_size`], but never allocates the square canvas,
/// so memory stays proportional to the input.
///
/// # Arguments
/// * `pix` - Input image
/// * `fill` - Pixel value of the padding
/// * `width` - Target width
/// * `height` - Target height
pub fn scale_square_to_size(
    pix: &Pix,
    fill: u32,
    width: u32,
    height: u32,
) -> TransformResult<Pix> {
    if width == 0 || height == 0 {
        return Err(TransformError::InvalidParameters(format!(
            "invalid target size: {}x{}",
            width, height
        )));
    }
    let pad = SquarePadding::for_size(pix.width(), pix.height());
    if pad.is_empty() {
        return resize(pix, width, height, ScaleMethod::Auto);
    }

    let method = if width <= pad.side && height <= pad.side {
        ScaleMethod::AreaMap
    } else {
        ScaleMethod::Linear
    };
    let src = Planes::from_pix(pix)?.into_square(&pad, fill);
    run(&src, width as usize, height as usize, method).into_pix(pix)
}

/// Scale an image using nearest-neighbor sampling
///
/// # Arguments
/// * `pix` - Input image
/// * `scale_x` - Horizontal scale factor
/// * `scale_y` - Vertical scale factor
pub fn scale_by_sampling(pix: &Pix, scale_x: f32, scale_y: f32) -> TransformResult<Pix> {
    scale(pix, scale_x, scale_y, ScaleMethod::Sampling)
}

fn resize(pix: &Pix, width: u32, height: u32, method: ScaleMethod) -> TransformResult<Pix> {
    if width == pix.width() && height == pix.height() {
        return Ok(pix.clone());
    }

    let method = match method {
        ScaleMethod::Auto if width <= pix.width() && height <= pix.height() => {
            ScaleMethod::AreaMap
        }
        ScaleMethod::Auto => ScaleMethod::Linear,
        m => m,
    };

    let src = Planes::from_pix(pix)?;
    run(&src, width as usize, height as usize, method).into_pix(pix)
}

fn run(src: &Planes, wd: usize, hd: usize, method: ScaleMethod) -> Planes {
    match method {
        ScaleMethod::Sampling => sample(src, wd, hd),
        ScaleMethod::Linear => linear(src, wd, hd),
        _ => area_map(src, wd, hd),
    }
}

fn sample(src: &Planes, wd: usize, hd: usize) -> Planes {
    let mut data = Vec::with_capacity(wd * hd * src.channels);
    for y in 0..hd {
        let sy = (y * src.height / hd).min(src.height - 1);
        for x in 0..wd {
            let sx = (x * src.width / wd).min(src.width - 1);
            for c in 0..src.channels {
                data.push(src.at(sx, sy, c));
            }
        }
    }
    Planes::new(wd, hd, src.channels, data)
}

/// Map destination index `i` to a source coordinate with pixel centers aligned.
#[inline]
fn center_map(i: usize, src_len: usize, dst_len: usize) -> (usize, usize, f32) {
    let pos = ((i as f32 + 0.5) * src_len as f32 / dst_len as f32 - 0.5)
        .clamp(0.0, (src_len - 1) as f32);
    let i0 = pos.floor() as usize;
    let i1 = (i0 + 1).min(src_len - 1);
    (i0, i1, pos - i0 as f32)
}

fn linear(src: &Planes, wd: usize, hd: usize) -> Planes {
    let mut data = Vec::with_capacity(wd * hd * src.channels);
    for y in 0..hd {
        let (y0, y1, fy) = center_map(y, src.height, hd);
        for x in 0..wd {
            let (x0, x1, fx) = center_map(x, src.width, wd);
            for c in 0..src.channels {
                let top = src.at(x0, y0, c) as f32 * (1.0 - fx) + src.at(x1, y0, c) as f32 * fx;
                let bot = src.at(x0, y1, c) as f32 * (1.0 - fx) + src.at(x1, y1, c) as f32 * fx;
                let v = top * (1.0 - fy) + bot * fy;
                data.push(v.round().clamp(0.0, 255.0) as u8);
            }
        }
    }
    Planes::new(wd, hd, src.channels, data)
}

/// Coverage of source cells by destination cell `i`: `(index, weight)` pairs.
fn coverage(i: usize, src_len: usize, dst_len: usize) -> Vec<(usize, f64)> {
    let ratio = src_len as f64 / dst_len as f64;
    let start = i as f64 * ratio;
    let end = (i + 1) as f64 * ratio;
    let first = start.floor() as usize;
    let last = (end.ceil() as usize).min(src_len);
    (first..last)
        .filter_map(|s| {
            let w = (end.min((s + 1) as f64) - start.max(s as f64)).max(0.0);
            (w > 0.0).then_some((s, w))
        })
        .collect()
}

/// Area-weighted average; fill cells contribute in bulk.
fn area_map(src: &Planes, wd: usize, hd: usize) -> Planes {
    let cols: Vec<_> = (0..wd).map(|x| coverage(x, src.width, wd)).collect();
    let mut data = Vec::with_capacity(wd * hd * src.channels);
    for y in 0..hd {
        let rows = coverage(y, src.height, hd);
        let row_weight: f64 = rows.iter().map(|&(_, w)| w).sum();
        let rows: Vec<_> = rows.into_iter().filter(|&(sy, _)| src.in_rows(sy)).collect();
        for col in &cols {
            let col_weight: f64 = col.iter().map(|&(_, w)| w).sum();
            let area = row_weight * col_weight;
            for c in 0..src.channels {
                let mut sum = 0.0;
                let mut covered = 0.0;
                for &(sy, wy) in &rows {
                    for &(sx, wx) in col.iter().filter(|&&(sx, _)| src.in_cols(sx)) {
                        sum += src.at(sx, sy, c) as f64 * wx * wy;
                        covered += wx * wy;
                    }
                }
                sum += src.fill[c] as f64 * (area - covered);
                data.push((sum / area).round().clamp(0.0, 255.0) as u8);
            }
        }
    }
    Planes::new(wd, hd, src.channels, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(w: u32, h: u32, samples: &[u8]) -> Pix {
        Pix::from_gray_samples(w, h, samples).unwrap()
    }

    #[test]
    fn test_same_size_is_identity() {
        let pix = gray(2, 2, &[1, 2, 3, 4]);
        let out = scale_to_size(&pix, 2, 2).unwrap();
        assert_eq!(out.gray_samples().unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_area_map_block_average() {
        let pix = gray(4, 2, &[10, 20, 100, 100, 30, 40, 100, 100]);
        let out = scale_to_size(&pix, 2, 1).unwrap();
        assert_eq!(out.gray_samples().unwrap(), vec![25, 100]);
    }

    #[test]
    fn test_area_map_non_integer_ratio() {
        // 3 -> 2: each output covers 1.5 source pixels
        let pix = gray(3, 1, &[0, 90, 180]);
        let out = scale(&pix, 2.0 / 3.0, 1.0, ScaleMethod::AreaMap).unwrap();
        assert_eq!(out.width(), 2);
        assert_eq!(out.gray_samples().unwrap(), vec![30, 150]);
    }

    #[test]
    fn test_linear_upscale_uniform() {
        let pix = gray(2, 2, &[77; 4]);
        let out = scale_to_size(&pix, 28, 28).unwrap();
        assert_eq!((out.width(), out.height()), (28, 28));
        assert!(out.gray_samples().unwrap().iter().all(|&v| v == 77));
    }

    #[test]
    fn test_linear_upscale_interpolates() {
        let pix = gray(2, 1, &[0, 200]);
        let out = scale(&pix, 2.0, 1.0, ScaleMethod::Linear).unwrap();
        // centers: -0.25 -> 0, 0.25, 0.75, 1.25 -> 1
        assert_eq!(out.gray_samples().unwrap(), vec![0, 50, 150, 200]);
    }

    #[test]
    fn test_sampling() {
        let pix = gray(2, 1, &[5, 9]);
        let out = scale_by_sampling(&pix, 2.0, 2.0).unwrap();
        assert_eq!(out.gray_samples().unwrap(), vec![5, 5, 9, 9, 5, 5, 9, 9]);
    }

    #[test]
    fn test_rgba_channels_scaled_independently() {
        let mut pm = Pix::new(2, 1, PixelDepth::Bit32).unwrap().to_mut();
        pm.set_spp(4);
        pm.set_rgba(0, 0, 200, 0, 100, 255).unwrap();
        pm.set_rgba(1, 0, 0, 200, 100, 55).unwrap();
        let pix: Pix = pm.into();

        let out = scale_to_size(&pix, 1, 1).unwrap();
        assert_eq!(out.spp(), 4);
        assert_eq!(out.get_rgba(0, 0), Some((100, 100, 100, 155)));
    }

    #[test]
    fn test_square_matches_padded_canvas() {
        let samples: Vec<u8> = (0..15u8).map(|v| v * 17).collect();
        let pix = gray(3, 5, &samples);
        let padded = pix.pad_to_square(0).unwrap();
        for size in [2, 5, 28] {
            let direct = scale_square_to_size(&pix, 0, size, size).unwrap();
            let reference = scale_to_size(&padded, size, size).unwrap();
            assert_eq!(direct.gray_samples().unwrap(), reference.gray_samples().unwrap());
        }
    }

    #[test]
    fn test_square_nonzero_fill() {
        let pix = gray(1, 3, &[0, 0, 0]);
        let out = scale_square_to_size(&pix, 90, 1, 1).unwrap();
        // two thirds of the square is fill
        assert_eq!(out.gray_samples().unwrap(), vec![60]);
    }

    #[test]
    fn test_square_long_strip() {
        // 20000x20000 square, content rows 9950..10050
        let pix = gray(20000, 100, &vec![255; 2_000_000]);
        let out = scale_square_to_size(&pix, 0, 28, 28).unwrap();
        assert_eq!((out.width(), out.height()), (28, 28));
        let samples = out.gray_samples().unwrap();
        for (y, row) in samples.chunks_exact(28).enumerate() {
            // rows 13 and 14 each hold 50 of roughly 714 source rows
            let expected = if y == 13 || y == 14 { 18 } else { 0 };
            assert!(row.iter().all(|&v| v == expected), "row {}: {:?}", y, row);
        }
    }

    #[test]
    fn test_invalid_arguments() {
        let pix = gray(2, 2, &[0; 4]);
        assert!(scale(&pix, 0.0, 1.0, ScaleMethod::Linear).is_err());
        assert!(scale(&pix, f32::NAN, 1.0, ScaleMethod::Linear).is_err());
        assert!(scale_to_size(&pix, 0, 0).is_err());
        let out = scale_to_size(&pix, 0, 4).unwrap();
        assert_eq!((out.width(), out.height()), (4, 4));
        assert!(scale_square_to_size(&pix, 0, 0, 28).is_err());
    }
}
