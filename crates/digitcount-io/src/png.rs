//! PNG image format support

use crate::raster::{SampleLayout, pix_from_samples};
use crate::{IoError, IoResult, header::ImageHeader};
use digitcount_core::{ImageFormat, Pix, PixelDepth, color};
use png::{BitDepth, ColorType, Decoder, Encoder, Transformations};
use std::io::{BufRead, Seek, Write};

/// Read PNG header metadata without decoding pixel data
pub fn read_header_png(data: &[u8]) -> IoResult<ImageHeader> {
    let reader = Decoder::new(std::io::Cursor::new(data))
        .read_info()
        .map_err(|e| IoError::DecodeError(format!("PNG decode error: {}", e)))?;
    let info = reader.info();

    let (depth, spp) = match info.color_type {
        ColorType::Grayscale => (8, 1),
        ColorType::GrayscaleAlpha | ColorType::Rgba => (32, 4),
        ColorType::Rgb => (32, 3),
        ColorType::Indexed if info.trns.is_some() => (32, 4),
        ColorType::Indexed => (32, 3),
    };

    Ok(ImageHeader {
        width: info.width,
        height: info.height,
        depth,
        bps: info.bit_depth as u32,
        spp,
        format: ImageFormat::Png,
    })
}

/// Read a PNG image
///
/// Palette and sub-byte gray images are expanded and 16-bit samples are
/// stripped to their high byte, so the result is always 8 bpp gray or
/// 32 bpp RGBA.
pub fn read_png<R: BufRead + Seek>(reader: R) -> IoResult<Pix> {
    let mut decoder = Decoder::new(reader);
    decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);
    let mut reader = decoder
        .read_info()
        .map_err(|e| IoError::DecodeError(format!("PNG decode error: {}", e)))?;

    let (width, height) = {
        let info = reader.info();
        (info.width, info.height)
    };

    let (color_type, bit_depth) = reader.output_color_type();
    if bit_depth != BitDepth::Eight {
        return Err(IoError::UnsupportedFormat(format!(
            "unsupported PNG output depth: {:?}",
            bit_depth
        )));
    }
    let layout = match color_type {
        ColorType::Grayscale => SampleLayout::Gray,
        ColorType::GrayscaleAlpha => SampleLayout::GrayAlpha,
        ColorType::Rgb => SampleLayout::Rgb,
        ColorType::Rgba => SampleLayout::Rgba,
        ColorType::Indexed => {
            return Err(IoError::UnsupportedFormat(
                "PNG palette was not expanded".to_string(),
            ));
        }
    };

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("failed to get output buffer size".to_string()))?;
    let mut buf = vec![0; buf_size];
    let output_info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::DecodeError(format!("PNG frame error: {}", e)))?;

    // Rows are tightly packed after the transformations above
    let row_len = width as usize * layout.channels();
    if output_info.line_size != row_len {
        return Err(IoError::DecodeError(format!(
            "unexpected PNG row size {} (expected {})",
            output_info.line_size, row_len
        )));
    }

    pix_from_samples(
        width,
        height,
        layout,
        &buf[..output_info.buffer_size()],
        ImageFormat::Png,
    )
}

/// Write a PNG image
///
/// 8 bpp images are written as 8-bit grayscale. 32 bpp images are written
/// as RGBA when they carry alpha (spp 4) and RGB otherwise.
pub fn write_png<W: Write>(pix: &Pix, writer: W) -> IoResult<()> {
    let width = pix.width();
    let height = pix.height();

    let color_type = match pix.depth() {
        PixelDepth::Bit8 => ColorType::Grayscale,
        PixelDepth::Bit32 if pix.spp() == 4 => ColorType::Rgba,
        PixelDepth::Bit32 => ColorType::Rgb,
    };

    let mut encoder = Encoder::new(writer, width, height);
    encoder.set_color(color_type);
    encoder.set_depth(BitDepth::Eight);

    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::EncodeError(format!("PNG header error: {}", e)))?;

    let data = match color_type {
        ColorType::Grayscale => pix.gray_samples()?,
        ColorType::Rgb => {
            let mut data = Vec::with_capacity(width as usize * height as usize * 3);
            for y in 0..height {
                for &pixel in &pix.row_data(y)[..width as usize] {
                    let (r, g, b) = color::extract_rgb(pixel);
                    data.extend_from_slice(&[r, g, b]);
                }
            }
            data
        }
        _ => {
            let mut data = Vec::with_capacity(width as usize * height as usize * 4);
            for y in 0..height {
                for &pixel in &pix.row_data(y)[..width as usize] {
                    let (r, g, b, a) = color::extract_rgba(pixel);
                    data.extend_from_slice(&[r, g, b, a]);
                }
            }
            data
        }
    };

    writer
        .write_image_data(&data)
        .map_err(|e| IoError::EncodeError(format!("PNG write error: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_png_roundtrip_grayscale() {
        let samples: Vec<u8> = (0..100).map(|i| ((i % 10 + i / 10) * 10) as u8).collect();
        let pix = Pix::from_gray_samples(10, 10, &samples).unwrap();

        let mut buffer = Vec::new();
        write_png(&pix, &mut buffer).unwrap();

        let pix2 = read_png(Cursor::new(buffer)).unwrap();
        assert_eq!(pix2.depth(), PixelDepth::Bit8);
        assert_eq!(pix2.informat(), ImageFormat::Png);
        assert_eq!(pix2.gray_samples().unwrap(), samples);
    }

    #[test]
    fn test_png_roundtrip_rgba() {
        let mut pm = Pix::new(3, 1, PixelDepth::Bit32).unwrap().to_mut();
        pm.set_spp(4);
        pm.set_rgba(0, 0, 255, 0, 0, 255).unwrap();
        pm.set_rgba(1, 0, 0, 255, 0, 128).unwrap();
        pm.set_rgba(2, 0, 0, 0, 255, 0).unwrap();
        let pix: Pix = pm.into();

        let mut buffer = Vec::new();
        write_png(&pix, &mut buffer).unwrap();

        let pix2 = read_png(Cursor::new(buffer)).unwrap();
        assert_eq!(pix2.spp(), 4);
        assert_eq!(pix2.get_rgba(0, 0), Some((255, 0, 0, 255)));
        assert_eq!(pix2.get_rgba(1, 0), Some((0, 255, 0, 128)));
        assert_eq!(pix2.get_rgba(2, 0), Some((0, 0, 255, 0)));
    }

    #[test]
    fn test_png_16bit_gray_keeps_high_byte() {
        let mut buffer = Vec::new();
        {
            let mut encoder = Encoder::new(&mut buffer, 2, 1);
            encoder.set_color(ColorType::Grayscale);
            encoder.set_depth(BitDepth::Sixteen);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[0xAB, 0xCD, 0x12, 0x34]).unwrap();
        }

        let pix = read_png(Cursor::new(buffer)).unwrap();
        assert_eq!(pix.depth(), PixelDepth::Bit8);
        assert_eq!(pix.gray_samples().unwrap(), vec![0xAB, 0x12]);
    }

    #[test]
    fn test_png_palette_expands_to_rgb() {
        let mut buffer = Vec::new();
        {
            let mut encoder = Encoder::new(&mut buffer, 2, 1);
            encoder.set_color(ColorType::Indexed);
            encoder.set_depth(BitDepth::Eight);
            encoder.set_palette(vec![10, 20, 30, 200, 100, 50]);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[1, 0]).unwrap();
        }

        let pix = read_png(Cursor::new(buffer)).unwrap();
        assert_eq!(pix.depth(), PixelDepth::Bit32);
        assert_eq!(pix.get_rgba(0, 0), Some((200, 100, 50, 255)));
        assert_eq!(pix.get_rgba(1, 0), Some((10, 20, 30, 255)));
    }

    #[test]
    fn test_png_header() {
        let pix = Pix::new(7, 5, PixelDepth::Bit8).unwrap();
        let mut buffer = Vec::new();
        write_png(&pix, &mut buffer).unwrap();

        let header = read_header_png(&buffer).unwrap();
        assert_eq!((header.width, header.height), (7, 5));
        assert_eq!((header.depth, header.spp, header.bps), (8, 1, 8));
    }

    #[test]
    fn test_png_truncated_stream_fails() {
        let samples = vec![128u8; 64];
        let pix = Pix::from_gray_samples(8, 8, &samples).unwrap();
        let mut buffer = Vec::new();
        write_png(&pix, &mut buffer).unwrap();
        buffer.truncate(buffer.len() / 2);
        assert!(read_png(Cursor::new(buffer)).is_err());
    }
}
