//! TIFF image format support
//!
//! Reads the first page of a TIFF image. Gray pages decode to 8 bpp; RGB,
//! RGBA and gray+alpha pages decode to 32 bpp.

use crate::raster::{SampleLayout, pix_from_samples, scale_to_8bit, unpack_bits};
use crate::{IoError, IoResult, header::ImageHeader};
use digitcount_core::{ImageFormat, Pix};
use std::io::{Read, Seek};
use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

/// PhotometricInterpretation value for inverted gray
const WHITE_IS_ZERO: u32 = 0;

/// Read TIFF header metadata without decoding pixel data
pub fn read_header_tiff(data: &[u8]) -> IoResult<ImageHeader> {
    let mut decoder = Decoder::new(std::io::Cursor::new(data))
        .map_err(|e| IoError::DecodeError(format!("TIFF decode error: {}", e)))?;
    let (width, height) = decoder
        .dimensions()
        .map_err(|e| IoError::DecodeError(format!("TIFF dimensions: {}", e)))?;
    let color_type = decoder
        .colortype()
        .map_err(|e| IoError::DecodeError(format!("TIFF colortype: {}", e)))?;

    let (depth, spp, bps) = match color_type {
        ColorType::Gray(n) => (8, 1, n as u32),
        ColorType::GrayA(n) | ColorType::RGBA(n) => (32, 4, n as u32),
        ColorType::RGB(n) => (32, 3, n as u32),
        other => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported TIFF color type: {:?}",
                other
            )));
        }
    };

    Ok(ImageHeader {
        width,
        height,
        depth,
        bps,
        spp,
        format: ImageFormat::Tiff,
    })
}

/// Read the first page of a TIFF image
pub fn read_tiff<R: Read + Seek>(reader: R) -> IoResult<Pix> {
    let mut decoder = Decoder::new(reader)
        .map_err(|e| IoError::DecodeError(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| IoError::DecodeError(format!("TIFF dimensions: {}", e)))?;
    let color_type = decoder
        .colortype()
        .map_err(|e| IoError::DecodeError(format!("TIFF colortype: {}", e)))?;
    let white_is_zero = decoder
        .get_tag_u32(Tag::PhotometricInterpretation)
        .is_ok_and(|v| v == WHITE_IS_ZERO);

    let layout = match color_type {
        ColorType::Gray(_) => SampleLayout::Gray,
        ColorType::GrayA(_) => SampleLayout::GrayAlpha,
        ColorType::RGB(_) => SampleLayout::Rgb,
        ColorType::RGBA(_) => SampleLayout::Rgba,
        other => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported TIFF color type: {:?}",
                other
            )));
        }
    };

    let image_data = decoder
        .read_image()
        .map_err(|e| IoError::DecodeError(format!("TIFF image data: {}", e)))?;

    let mut samples = match (image_data, color_type) {
        (DecodingResult::U8(data), ColorType::Gray(bits @ (1 | 2 | 4))) => {
            let row_bytes = (width as usize * bits as usize).div_ceil(8);
            unpack_bits(&data, width, height, bits, row_bytes)?
                .into_iter()
                .map(|v| scale_to_8bit(v, bits))
                .collect()
        }
        (DecodingResult::U8(data), _) => data,
        (DecodingResult::U16(data), _) => data.iter().map(|&v| (v >> 8) as u8).collect(),
        (_, color_type) => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported TIFF sample format for {:?}",
                color_type
            )));
        }
    };

    if white_is_zero && layout == SampleLayout::Gray {
        samples.iter_mut().for_each(|v| *v = 255 - *v);
    }

    pix_from_samples(width, height, layout, &samples, ImageFormat::Tiff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use digitcount_core::PixelDepth;
    use std::io::Cursor;
    use tiff::encoder::TiffEncoder;
    use tiff::encoder::colortype::{Gray8, Gray16, RGB8};

    #[test]
    fn test_read_gray8() {
        let mut cursor = Cursor::new(Vec::new());
        TiffEncoder::new(&mut cursor)
            .unwrap()
            .write_image::<Gray8>(2, 2, &[0, 50, 100, 250])
            .unwrap();

        let pix = read_tiff(Cursor::new(cursor.into_inner())).unwrap();
        assert_eq!(pix.depth(), PixelDepth::Bit8);
        assert_eq!(pix.informat(), ImageFormat::Tiff);
        assert_eq!(pix.gray_samples().unwrap(), vec![0, 50, 100, 250]);
    }

    #[test]
    fn test_read_gray16_keeps_high_byte() {
        let mut cursor = Cursor::new(Vec::new());
        TiffEncoder::new(&mut cursor)
            .unwrap()
            .write_image::<Gray16>(2, 1, &[0x1234, 0xFF00])
            .unwrap();

        let pix = read_tiff(Cursor::new(cursor.into_inner())).unwrap();
        assert_eq!(pix.gray_samples().unwrap(), vec![0x12, 0xFF]);
    }

    #[test]
    fn test_read_header_tiff() {
        let mut cursor = Cursor::new(Vec::new());
        TiffEncoder::new(&mut cursor)
            .unwrap()
            .write_image::<Gray16>(5, 4, &[0u16; 20])
            .unwrap();

        let header = read_header_tiff(cursor.get_ref()).unwrap();
        assert_eq!((header.width, header.height), (5, 4));
        assert_eq!((header.depth, header.spp, header.bps), (8, 1, 16));
    }

    #[test]
    fn test_read_rgb8() {
        let mut cursor = Cursor::new(Vec::new());
        TiffEncoder::new(&mut cursor)
            .unwrap()
            .write_image::<RGB8>(1, 1, &[9, 8, 7])
            .unwrap();

        let pix = read_tiff(Cursor::new(cursor.into_inner())).unwrap();
        assert_eq!(pix.depth(), PixelDepth::Bit32);
        assert_eq!(pix.get_rgba(0, 0), Some((9, 8, 7, 255)));
    }

    #[test]
    fn test_read_garbage_fails() {
        let data = vec![0x49, 0x49, 0x2A, 0x00, 0xFF, 0xFF, 0xFF, 0xFF];
        assert!(read_tiff(Cursor::new(data)).is_err());
    }
}
