//! JPEG image format support
//!
//! Reads JPEG images using the `jpeg-decoder` crate. Grayscale images decode
//! to 8 bpp; RGB and CMYK images decode to 32 bpp.

use crate::raster::{SampleLayout, high_bytes_be, pix_from_samples};
use crate::{IoError, IoResult, header::ImageHeader};
use digitcount_core::{ImageFormat, Pix};
use jpeg_decoder::{Decoder, PixelFormat};
use std::io::Read;

/// Read JPEG header metadata without decoding pixel data
pub fn read_header_jpeg(data: &[u8]) -> IoResult<ImageHeader> {
    let mut decoder = Decoder::new(std::io::Cursor::new(data));
    decoder
        .read_info()
        .map_err(|e| IoError::DecodeError(format!("JPEG decode error: {}", e)))?;
    let info = decoder
        .info()
        .ok_or_else(|| IoError::DecodeError("JPEG info unavailable".to_string()))?;

    let (depth, bps, spp) = match info.pixel_format {
        PixelFormat::L8 => (8, 8, 1),
        PixelFormat::L16 => (8, 16, 1),
        PixelFormat::RGB24 | PixelFormat::CMYK32 => (32, 8, 3),
    };

    Ok(ImageHeader {
        width: info.width as u32,
        height: info.height as u32,
        depth,
        bps,
        spp,
        format: ImageFormat::Jpeg,
    })
}

/// Read a JPEG image from a reader.
pub fn read_jpeg<R: Read>(reader: R) -> IoResult<Pix> {
    let mut decoder = Decoder::new(reader);
    let data = decoder
        .decode()
        .map_err(|e| IoError::DecodeError(format!("JPEG decode error: {}", e)))?;
    let info = decoder
        .info()
        .ok_or_else(|| IoError::DecodeError("JPEG info unavailable".to_string()))?;

    let width = info.width as u32;
    let height = info.height as u32;

    match info.pixel_format {
        PixelFormat::L8 => {
            pix_from_samples(width, height, SampleLayout::Gray, &data, ImageFormat::Jpeg)
        }
        // 16-bit samples are big-endian
        PixelFormat::L16 => pix_from_samples(
            width,
            height,
            SampleLayout::Gray,
            &high_bytes_be(&data),
            ImageFormat::Jpeg,
        ),
        PixelFormat::RGB24 => {
            pix_from_samples(width, height, SampleLayout::Rgb, &data, ImageFormat::Jpeg)
        }
        PixelFormat::CMYK32 => {
            let rgb: Vec<u8> = data.chunks_exact(4).flat_map(cmyk_to_rgb).collect();
            pix_from_samples(width, height, SampleLayout::Rgb, &rgb, ImageFormat::Jpeg)
        }
    }
}

fn cmyk_to_rgb(cmyk: &[u8]) -> [u8; 3] {
    let k = 255 - cmyk[3] as u32;
    let channel = |c: u8| ((255 - c as u32) * k / 255) as u8;
    [channel(cmyk[0]), channel(cmyk[1]), channel(cmyk[2])]
}
