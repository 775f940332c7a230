//! Image header reading
//!
//! Provides metadata extraction from image files without decoding pixel data.

use crate::{IoError, IoResult, detect_format_from_bytes};
use digitcount_core::ImageFormat;
use std::fs;
use std::path::Path;

/// Image metadata read without decoding pixel data
///
/// `depth` and `spp` describe the `Pix` the matching decoder will produce,
/// while `bps` is the bits per sample stored in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHeader {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Depth of the decoded image (8 or 32)
    pub depth: u32,
    /// Bits per sample in the file
    pub bps: u32,
    /// Samples per pixel of the decoded image (1, 3 or 4)
    pub spp: u32,
    /// Detected image format
    pub format: ImageFormat,
}

/// Read image metadata from a file path without decoding pixel data
pub fn read_image_header<P: AsRef<Path>>(path: P) -> IoResult<ImageHeader> {
    let data = fs::read(path.as_ref())?;
    read_image_header_mem(&data)
}

/// Read image metadata from bytes without decoding pixel data
pub fn read_image_header_mem(data: &[u8]) -> IoResult<ImageHeader> {
    let format = detect_format_from_bytes(data)?;
    read_header_for_format(data, format)
}

/// Read header for a specific format
fn read_header_for_format(data: &[u8], format: ImageFormat) -> IoResult<ImageHeader> {
    match format {
        #[cfg(feature = "bmp")]
        ImageFormat::Bmp => crate::bmp::read_header_bmp(data),

        #[cfg(feature = "pnm")]
        ImageFormat::Pnm => crate::pnm::read_header_pnm(data),

        #[cfg(feature = "png-format")]
        ImageFormat::Png => crate::png::read_header_png(data),

        #[cfg(feature = "jpeg")]
        ImageFormat::Jpeg => crate::jpeg::read_header_jpeg(data),

        #[cfg(feature = "tiff-format")]
        ImageFormat::Tiff => crate::tiff::read_header_tiff(data),

        #[cfg(feature = "gif-format")]
        ImageFormat::Gif => crate::gif::read_header_gif(data),

        _ => Err(IoError::UnsupportedFormat(format!("{:?}", format))),
    }
}
