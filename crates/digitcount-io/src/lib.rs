//! digitcount-io - Image decoding for the digit pipeline
//!
//! Decodes image files into [`Pix`] rasters. Every decoder normalizes its
//! source layout to one of two depths:
//!
//! - 8 bpp gray for single-channel sources at any bit depth
//! - 32 bpp RGBA for color, gray+alpha, and palette sources
//!
//! # Supported formats
//!
//! | Format | Feature | Read | Write |
//! |---|---|---|---|
//! | PNG | `png-format` | yes | yes |
//! | JPEG | `jpeg` | yes | no |
//! | BMP | `bmp` | yes | no |
//! | PNM (P2/P3/P5/P6) | `pnm` | yes | yes |
//! | GIF (first frame) | `gif-format` | yes | no |
//! | TIFF (first page) | `tiff-format` | yes | no |

#[cfg(feature = "bmp")]
pub mod bmp;
mod error;
pub mod format;
#[cfg(feature = "gif-format")]
pub mod gif;
pub mod header;
#[cfg(feature = "jpeg")]
pub mod jpeg;
#[cfg(feature = "png-format")]
pub mod png;
#[cfg(feature = "pnm")]
pub mod pnm;
mod raster;
#[cfg(feature = "tiff-format")]
pub mod tiff;

pub use digitcount_core::ImageFormat;
pub use error::{IoError, IoResult};
pub use format::{detect_format, detect_format_from_bytes};
pub use header::{ImageHeader, read_image_header, read_image_header_mem};
#[cfg(feature = "png-format")]
pub use png::write_png;
#[cfg(feature = "pnm")]
pub use pnm::write_pnm;

use digitcount_core::Pix;
use std::fs;
use std::path::Path;

/// Read an image from a file path.
///
/// The whole file is read into memory and dispatched on its magic bytes,
/// so the extension is never trusted.
pub fn read_image<P: AsRef<Path>>(path: P) -> IoResult<Pix> {
    let data = fs::read(path.as_ref())?;
    read_image_mem(&data)
}

/// Read an image from an in-memory byte buffer.
pub fn read_image_mem(data: &[u8]) -> IoResult<Pix> {
    let format = detect_format_from_bytes(data)?;
    read_image_format(data, format)
}

/// Decode `data` with the decoder for `format`.
pub fn read_image_format(data: &[u8], format: ImageFormat) -> IoResult<Pix> {
    let cursor = std::io::Cursor::new(data);
    match format {
        #[cfg(feature = "bmp")]
        ImageFormat::Bmp => bmp::read_bmp(cursor),

        #[cfg(feature = "pnm")]
        ImageFormat::Pnm => pnm::read_pnm(cursor),

        #[cfg(feature = "png-format")]
        ImageFormat::Png => png::read_png(cursor),

        #[cfg(feature = "jpeg")]
        ImageFormat::Jpeg => jpeg::read_jpeg(cursor),

        #[cfg(feature = "gif-format")]
        ImageFormat::Gif => gif::read_gif(cursor),

        #[cfg(feature = "tiff-format")]
        ImageFormat::Tiff => tiff::read_tiff(cursor),

        _ => Err(IoError::UnsupportedFormat(format!(
            "{:?} support not enabled",
            format
        ))),
    }
}
