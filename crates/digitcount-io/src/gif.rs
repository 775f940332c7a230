//! GIF image format support
//!
//! Reads the first frame of a GIF image as 32 bpp RGBA.

use crate::raster::{SampleLayout, pix_from_samples};
use crate::{IoError, IoResult, header::ImageHeader};
use digitcount_core::{ImageFormat, Pix};
use gif::{ColorOutput, DecodeOptions};
use std::io::Read;

/// Read GIF header metadata without decoding pixel data
///
/// Reports the logical screen size.
pub fn read_header_gif(data: &[u8]) -> IoResult<ImageHeader> {
    let decoder = DecodeOptions::new()
        .read_info(data)
        .map_err(|e| IoError::DecodeError(format!("GIF decode error: {}", e)))?;
    Ok(ImageHeader {
        width: decoder.width() as u32,
        height: decoder.height() as u32,
        depth: 32,
        bps: 8,
        spp: 4,
        format: ImageFormat::Gif,
    })
}

/// Read a GIF image
///
/// Later frames of an animation are ignored. Transparent palette entries
/// carry alpha 0.
pub fn read_gif<R: Read>(reader: R) -> IoResult<Pix> {
    let mut options = DecodeOptions::new();
    options.set_color_output(ColorOutput::RGBA);

    let mut decoder = options
        .read_info(reader)
        .map_err(|e| IoError::DecodeError(format!("GIF decode error: {}", e)))?;

    let frame = decoder
        .read_next_frame()
        .map_err(|e| IoError::DecodeError(format!("GIF frame error: {}", e)))?
        .ok_or_else(|| IoError::InvalidData("no frames in GIF".to_string()))?;

    pix_from_samples(
        frame.width as u32,
        frame.height as u32,
        SampleLayout::Rgba,
        &frame.buffer,
        ImageFormat::Gif,
    )
}
