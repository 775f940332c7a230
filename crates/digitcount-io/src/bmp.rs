//! BMP image format support
//!
//! Reads uncompressed Windows Bitmap (BMP) files at 1, 4, 8, 24 and 32 bpp.

use crate::raster::{SampleLayout, checked_size, pix_from_samples};
use crate::{IoError, IoResult, header::ImageHeader};
use digitcount_core::{ImageFormat, Pix};
use std::io::Read;

/// BMP file header size
const BMP_FILE_HEADER_SIZE: usize = 14;

/// BMP info header size (BITMAPINFOHEADER)
const BMP_INFO_HEADER_SIZE: u32 = 40;

fn le_u16(b: &[u8]) -> u16 {
    u16::from_le_bytes([b[0], b[1]])
}

fn le_u32(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

fn le_i32(b: &[u8]) -> i32 {
    i32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

fn skip<R: Read>(reader: &mut R, n: usize) -> IoResult<()> {
    let skipped = std::io::copy(&mut reader.by_ref().take(n as u64), &mut std::io::sink())?;
    if skipped < n as u64 {
        return Err(IoError::InvalidData("BMP stream truncated".to_string()));
    }
    Ok(())
}

/// Read exactly `len` bytes, growing the buffer only as data arrives.
fn read_raster<R: Read>(reader: &mut R, len: usize) -> IoResult<Vec<u8>> {
    let mut raw = Vec::new();
    reader.by_ref().take(len as u64).read_to_end(&mut raw)?;
    if raw.len() < len {
        return Err(IoError::InvalidData(format!(
            "BMP pixel data truncated: need {} bytes, got {}",
            len,
            raw.len()
        )));
    }
    Ok(raw)
}

/// Read BMP header metadata without decoding pixel data
pub fn read_header_bmp(data: &[u8]) -> IoResult<ImageHeader> {
    let info_end = BMP_FILE_HEADER_SIZE + BMP_INFO_HEADER_SIZE as usize;
    if data.len() < info_end || &data[0..2] != b"BM" {
        return Err(IoError::InvalidData("not a BMP file".to_string()));
    }
    let info = &data[BMP_FILE_HEADER_SIZE..info_end];
    let header_size = le_u32(&info[0..4]) as usize;
    let width = le_i32(&info[4..8]).unsigned_abs();
    let height = le_i32(&info[8..12]).unsigned_abs();
    let bits_per_pixel = le_u16(&info[14..16]) as u32;
    let colors_used = le_u32(&info[32..36]) as usize;

    let (depth, spp) = if bits_per_pixel <= 8 {
        let max_colors = 1usize << bits_per_pixel;
        let num_colors = if colors_used == 0 {
            max_colors
        } else {
            colors_used.min(max_colors)
        };
        let start = BMP_FILE_HEADER_SIZE + header_size;
        let palette = data
            .get(start..start + num_colors * 4)
            .ok_or_else(|| IoError::InvalidData("BMP palette truncated".to_string()))?;
        let gray = palette
            .chunks_exact(4)
            .all(|c| c[0] == c[1] && c[1] == c[2]);
        if gray { (8, 1) } else { (32, 3) }
    } else {
        (32, 3)
    };

    Ok(ImageHeader {
        width,
        height,
        depth,
        bps: if bits_per_pixel <= 8 { bits_per_pixel } else { 8 },
        spp,
        format: ImageFormat::Bmp,
    })
}

/// Read a BMP image
///
/// Palette images whose entries are all gray decode to 8 bpp; other
/// palette images and true-color images decode to 32 bpp.
pub fn read_bmp<R: Read>(mut reader: R) -> IoResult<Pix> {
    let mut file_header = [0u8; BMP_FILE_HEADER_SIZE];
    reader.read_exact(&mut file_header)?;

    if &file_header[0..2] != b"BM" {
        return Err(IoError::InvalidData("not a BMP file".to_string()));
    }
    let pixel_offset = le_u32(&file_header[10..14]) as usize;

    let mut info_header = [0u8; BMP_INFO_HEADER_SIZE as usize];
    reader.read_exact(&mut info_header)?;

    let header_size = le_u32(&info_header[0..4]);
    if header_size < BMP_INFO_HEADER_SIZE {
        return Err(IoError::InvalidData(format!(
            "unsupported BMP header size: {}",
            header_size
        )));
    }

    let raw_width = le_i32(&info_header[4..8]);
    let raw_height = le_i32(&info_header[8..12]);
    let planes = le_u16(&info_header[12..14]);
    if planes != 1 {
        return Err(IoError::InvalidData(format!(
            "unsupported number of planes: {}",
            planes
        )));
    }
    let bits_per_pixel = le_u16(&info_header[14..16]);
    let compression = le_u32(&info_header[16..20]);
    let colors_used = le_u32(&info_header[32..36]) as usize;

    // BI_RGB and BI_BITFIELDS only
    if compression != 0 && compression != 3 {
        return Err(IoError::UnsupportedFormat(format!(
            "unsupported BMP compression: {}",
            compression
        )));
    }
    if !matches!(bits_per_pixel, 1 | 4 | 8 | 24 | 32) {
        return Err(IoError::UnsupportedFormat(format!(
            "unsupported BMP bit depth: {}",
            bits_per_pixel
        )));
    }
    if raw_width <= 0 || raw_height == 0 {
        return Err(IoError::InvalidData(format!(
            "invalid BMP dimensions: {}x{}",
            raw_width, raw_height
        )));
    }

    let width = raw_width.unsigned_abs();
    let top_down = raw_height < 0;
    let height = raw_height.unsigned_abs();

    skip(&mut reader, header_size as usize - BMP_INFO_HEADER_SIZE as usize)?;
    let mut consumed = BMP_FILE_HEADER_SIZE + header_size as usize;

    // Palette entries are stored as BGRx
    let palette: Vec<(u8, u8, u8)> = if bits_per_pixel <= 8 {
        let max_colors = 1usize << bits_per_pixel;
        let num_colors = if colors_used == 0 {
            max_colors
        } else {
            colors_used.min(max_colors)
        };
        let mut raw = vec![0u8; num_colors * 4];
        reader.read_exact(&mut raw)?;
        consumed += raw.len();
        raw.chunks_exact(4).map(|c| (c[2], c[1], c[0])).collect()
    } else {
        Vec::new()
    };

    if pixel_offset > consumed {
        skip(&mut reader, pixel_offset - consumed)?;
    }

    // BMP rows are 4-byte aligned
    let row_bits = checked_size(&[width as usize, bits_per_pixel as usize])?;
    let row_stride = checked_size(&[row_bits.div_ceil(32), 4])?;
    let raw = read_raster(&mut reader, checked_size(&[row_stride, height as usize])?)?;

    let gray_palette = !palette.is_empty() && palette.iter().all(|&(r, g, b)| r == g && g == b);
    let layout = if gray_palette {
        SampleLayout::Gray
    } else {
        SampleLayout::Rgb
    };
    let channels = layout.channels();
    let mut samples = vec![0u8; checked_size(&[width as usize, height as usize, channels])?];

    for row in 0..height as usize {
        let src = &raw[row * row_stride..(row + 1) * row_stride];
        let y = if top_down { row } else { height as usize - 1 - row };
        let dst = &mut samples[y * width as usize * channels..(y + 1) * width as usize * channels];

        match bits_per_pixel {
            1 | 4 | 8 => {
                let per_byte = 8 / bits_per_pixel as usize;
                let mask = ((1u16 << bits_per_pixel) - 1) as u8;
                for x in 0..width as usize {
                    let shift = 8 - bits_per_pixel as usize * (x % per_byte + 1);
                    let index = ((src[x / per_byte] >> shift) & mask) as usize;
                    let &(r, g, b) = palette.get(index).ok_or_else(|| {
                        IoError::InvalidData(format!("BMP palette index {} out of range", index))
                    })?;
                    if gray_palette {
                        dst[x] = r;
                    } else {
                        dst[x * 3..x * 3 + 3].copy_from_slice(&[r, g, b]);
                    }
                }
            }
            bpp => {
                let step = bpp as usize / 8;
                for x in 0..width as usize {
                    let px = &src[x * step..x * step + 3];
                    dst[x * 3..x * 3 + 3].copy_from_slice(&[px[2], px[1], px[0]]);
                }
            }
        }
    }

    pix_from_samples(width, height, layout, &samples, ImageFormat::Bmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use digitcount_core::PixelDepth;
    use std::io::Cursor;

    fn bmp_bytes(width: i32, height: i32, bpp: u16, palette: &[[u8; 4]], rows: &[u8]) -> Vec<u8> {
        let offset = 14 + 40 + palette.len() * 4;
        let mut out = Vec::new();
        out.extend_from_slice(b"BM");
        out.extend_from_slice(&((offset + rows.len()) as u32).to_le_bytes());
        out.extend_from_slice(&[0; 4]);
        out.extend_from_slice(&(offset as u32).to_le_bytes());
        out.extend_from_slice(&40u32.to_le_bytes());
        out.extend_from_slice(&width.to_le_bytes());
        out.extend_from_slice(&height.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&bpp.to_le_bytes());
        out.extend_from_slice(&[0; 4]); // compression
        out.extend_from_slice(&(rows.len() as u32).to_le_bytes());
        out.extend_from_slice(&[0; 8]); // resolution
        out.extend_from_slice(&(palette.len() as u32).to_le_bytes());
        out.extend_from_slice(&[0; 4]);
        for entry in palette {
            out.extend_from_slice(entry);
        }
        out.extend_from_slice(rows);
        out
    }

    #[test]
    fn test_read_24bit_bottom_up() {
        // 1x2 image, stored bottom row first: blue, then red (BGR order)
        let rows = [255, 0, 0, 0, 0, 0, 255, 0];
        let pix = read_bmp(Cursor::new(bmp_bytes(1, 2, 24, &[], &rows))).unwrap();
        assert_eq!(pix.depth(), PixelDepth::Bit32);
        assert_eq!(pix.get_rgba(0, 0), Some((255, 0, 0, 255)));
        assert_eq!(pix.get_rgba(0, 1), Some((0, 0, 255, 255)));
    }

    #[test]
    fn test_read_8bit_gray_palette() {
        let palette: Vec<[u8; 4]> = (0..=255u8).map(|v| [v, v, v, 0]).collect();
        let rows = [10, 200, 0, 0]; // 2 pixels + padding
        let pix = read_bmp(Cursor::new(bmp_bytes(2, -1, 8, &palette, &rows))).unwrap();
        assert_eq!(pix.depth(), PixelDepth::Bit8);
        assert_eq!(pix.gray_samples().unwrap(), vec![10, 200]);
    }

    #[test]
    fn test_read_1bit_color_palette() {
        let palette = [[0, 0, 0, 0], [0, 0, 255, 0]];
        let rows = [0b1000_0000, 0, 0, 0];
        let pix = read_bmp(Cursor::new(bmp_bytes(2, 1, 1, &palette, &rows))).unwrap();
        assert_eq!(pix.depth(), PixelDepth::Bit32);
        assert_eq!(pix.get_rgba(0, 0), Some((255, 0, 0, 255)));
        assert_eq!(pix.get_rgba(1, 0), Some((0, 0, 0, 255)));
    }

    #[test]
    fn test_read_header_bmp() {
        let bytes = bmp_bytes(3, -2, 24, &[], &[0u8; 24]);
        let header = read_header_bmp(&bytes).unwrap();
        assert_eq!((header.width, header.height), (3, 2));
        assert_eq!((header.depth, header.spp), (32, 3));
    }

    #[test]
    fn test_truncated_pixels_fail() {
        let mut bytes = bmp_bytes(4, 4, 24, &[], &[0u8; 48]);
        bytes.truncate(bytes.len() - 10);
        assert!(read_bmp(Cursor::new(bytes)).is_err());
    }

    #[test]
    fn test_oversized_dimensions_fail() {
        // header claims 2^31-1 squared at 32 bpp, followed by a single row
        let bytes = bmp_bytes(i32::MAX, i32::MAX, 32, &[], &[0u8; 64]);
        assert!(matches!(
            read_bmp(Cursor::new(bytes)),
            Err(IoError::InvalidData(_))
        ));
    }

    #[test]
    fn test_pixel_offset_past_end_fails() {
        let mut bytes = bmp_bytes(1, 1, 24, &[], &[0u8; 4]);
        bytes[10..14].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(read_bmp(Cursor::new(bytes)).is_err());
    }

    #[test]
    fn test_not_bmp() {
        assert!(read_bmp(Cursor::new(vec![0u8; 64])).is_err());
    }
}
