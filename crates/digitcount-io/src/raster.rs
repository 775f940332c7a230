//! Conversion of decoded sample buffers into `Pix`

use crate::{IoError, IoResult};
use digitcount_core::{ImageFormat, Pix, PixelDepth, color, set_data_byte};

/// Layout of an interleaved 8-bit sample buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SampleLayout {
    Gray,
    GrayAlpha,
    Rgb,
    Rgba,
}

impl SampleLayout {
    pub(crate) fn channels(self) -> usize {
        match self {
            SampleLayout::Gray => 1,
            SampleLayout::GrayAlpha => 2,
            SampleLayout::Rgb => 3,
            SampleLayout::Rgba => 4,
        }
    }
}

/// Product of header-declared sizes, rejecting overflow.
pub(crate) fn checked_size(factors: &[usize]) -> IoResult<usize> {
    factors
        .iter()
        .try_fold(1usize, |acc, &f| acc.checked_mul(f))
        .ok_or_else(|| IoError::InvalidData(format!("image size overflows: {:?}", factors)))
}

/// Build a `Pix` from interleaved 8-bit samples.
///
/// `Gray` yields 8 bpp; every other layout yields 32 bpp RGBA with spp 4
/// when alpha is present and spp 3 otherwise.
pub(crate) fn pix_from_samples(
    width: u32,
    height: u32,
    layout: SampleLayout,
    samples: &[u8],
    format: ImageFormat,
) -> IoResult<Pix> {
    let channels = layout.channels();
    let row_len = checked_size(&[width as usize, channels])?;
    let expected = checked_size(&[row_len, height as usize])?;
    if samples.len() < expected {
        return Err(IoError::InvalidData(format!(
            "sample buffer too short: need {} bytes, got {}",
            expected,
            samples.len()
        )));
    }

    let depth = if layout == SampleLayout::Gray {
        PixelDepth::Bit8
    } else {
        PixelDepth::Bit32
    };
    let mut pm = Pix::new(width, height, depth)?.to_mut();
    pm.set_informat(format);
    if matches!(layout, SampleLayout::GrayAlpha | SampleLayout::Rgba) {
        pm.set_spp(4);
    }

    for (y, row) in samples[..expected].chunks_exact(row_len).enumerate() {
        let line = pm.row_data_mut(y as u32);
        match layout {
            SampleLayout::Gray => {
                for (x, &v) in row.iter().enumerate() {
                    set_data_byte(line, x as u32, v as u32);
                }
            }
            SampleLayout::GrayAlpha => {
                for (x, px) in row.chunks_exact(2).enumerate() {
                    line[x] = color::compose_rgba(px[0], px[0], px[0], px[1]);
                }
            }
            SampleLayout::Rgb => {
                for (x, px) in row.chunks_exact(3).enumerate() {
                    line[x] = color::compose_rgb(px[0], px[1], px[2]);
                }
            }
            SampleLayout::Rgba => {
                for (x, px) in row.chunks_exact(4).enumerate() {
                    line[x] = color::compose_rgba(px[0], px[1], px[2], px[3]);
                }
            }
        }
    }

    Ok(pm.into())
}

/// Keep the high byte of each big-endian 16-bit sample.
pub(crate) fn high_bytes_be(data: &[u8]) -> Vec<u8> {
    data.chunks_exact(2).map(|s| s[0]).collect()
}

/// Expand packed 1/2/4-bit samples to one byte per sample.
///
/// Rows are padded to a whole byte. Values are left unscaled so callers can
/// use them as palette indices or scale them themselves.
pub(crate) fn unpack_bits(
    data: &[u8],
    width: u32,
    height: u32,
    bits: u8,
    row_bytes: usize,
) -> IoResult<Vec<u8>> {
    if !matches!(bits, 1 | 2 | 4) {
        return Err(IoError::UnsupportedFormat(format!(
            "unsupported packed bit depth: {}",
            bits
        )));
    }
    let needed = row_bytes * height as usize;
    if data.len() < needed {
        return Err(IoError::InvalidData("packed sample data truncated".to_string()));
    }

    let per_byte = 8 / bits as usize;
    let mask = (1u8 << bits) - 1;
    let mut out = Vec::with_capacity(width as usize * height as usize);
    for row in data[..needed].chunks_exact(row_bytes) {
        for x in 0..width as usize {
            let byte = row[x / per_byte];
            let shift = 8 - bits as usize * (x % per_byte + 1);
            out.push((byte >> shift) & mask);
        }
    }
    Ok(out)
}

/// Scale an n-bit gray value to the full 8-bit range.
pub(crate) fn scale_to_8bit(v: u8, bits: u8) -> u8 {
    let max = (1u32 << bits) - 1;
    (v as u32 * 255 / max) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gray_samples_to_8bpp() {
        let pix =
            pix_from_samples(2, 2, SampleLayout::Gray, &[1, 2, 3, 4], ImageFormat::Png).unwrap();
        assert_eq!(pix.depth(), PixelDepth::Bit8);
        assert_eq!(pix.get_pixel(1, 1), Some(4));
        assert_eq!(pix.informat(), ImageFormat::Png);
    }

    #[test]
    fn test_gray_alpha_to_rgba() {
        let pix =
            pix_from_samples(1, 1, SampleLayout::GrayAlpha, &[9, 7], ImageFormat::Png).unwrap();
        assert_eq!(pix.depth(), PixelDepth::Bit32);
        assert_eq!(pix.spp(), 4);
        assert_eq!(pix.get_rgba(0, 0), Some((9, 9, 9, 7)));
    }

    #[test]
    fn test_short_buffer_rejected() {
        assert!(pix_from_samples(2, 2, SampleLayout::Rgb, &[0; 11], ImageFormat::Bmp).is_err());
    }

    #[test]
    fn test_unpack_bits() {
        // 0b1011_0000 -> 1,0,1,1 for 1-bit samples
        let out = unpack_bits(&[0b1011_0000], 4, 1, 1, 1).unwrap();
        assert_eq!(out, vec![1, 0, 1, 1]);
        let out = unpack_bits(&[0x3c], 2, 1, 4, 1).unwrap();
        assert_eq!(out, vec![3, 12]);
        assert_eq!(scale_to_8bit(1, 1), 255);
        assert_eq!(scale_to_8bit(3, 2), 255);
    }
}
