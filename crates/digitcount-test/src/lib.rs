//! digitcount-test - Regression test harness for digitcount
//!
//! This crate provides a small regression harness ([`RegParams`]) plus
//! synthetic fixtures, so the tests of every crate can build digit glyphs
//! and encoded image files without checking binary data into the tree.
//!
//! # Usage
//!
//! ```ignore
//! use digitcount_test::{RegParams, render_digit};
//!
//! let mut rp = RegParams::new("otsu");
//! let pix = render_digit(7, 2).unwrap();
//! rp.compare_values(40.0, pix.width() as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "compare" (default) or "display"

mod error;
mod params;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

use digitcount_core::{Pix, PixelDepth, color};
use std::fs;
use std::path::PathBuf;

/// Width of the glyph design box in design units
pub const GLYPH_WIDTH: u32 = 20;
/// Height of the glyph design box in design units
pub const GLYPH_HEIGHT: u32 = 28;

/// Bytes that look like a PNG but fail to decode
pub const CORRUPT_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0xde, 0xad, 0xbe, 0xef, 0x00, 0x01,
];

/// Seven-segment strokes as `(x0, y0, x1, y1)` half-open boxes in design units
const SEGMENTS: [(u32, u32, u32, u32); 7] = [
    (2, 2, 18, 6),   // a: top
    (14, 2, 18, 14), // b: upper right
    (14, 14, 18, 26), // c: lower right
    (2, 22, 18, 26), // d: bottom
    (2, 14, 6, 26),  // e: lower left
    (2, 2, 6, 14),   // f: upper left
    (2, 12, 18, 16), // g: middle
];

/// Segment masks (bit i = segment i of `SEGMENTS`) for digits 0..=9
const DIGIT_SEGMENTS: [u8; 10] = [
    0b011_1111, // 0: abcdef
    0b000_0110, // 1: bc
    0b101_1011, // 2: abdeg
    0b100_1111, // 3: abcdg
    0b110_0110, // 4: bcfg
    0b110_1101, // 5: acdfg
    0b111_1101, // 6: acdefg
    0b000_0111, // 7: abc
    0b111_1111, // 8: all
    0b110_1111, // 9: abcdfg
];

fn ink_at(mask: u8, ux: u32, uy: u32) -> bool {
    SEGMENTS.iter().enumerate().any(|(i, &(x0, y0, x1, y1))| {
        mask & (1 << i) != 0 && ux >= x0 && ux < x1 && uy >= y0 && uy < y1
    })
}

/// Render a seven-segment digit as a white-on-black 8 bpp image.
///
/// The image is `GLYPH_WIDTH * scale` by `GLYPH_HEIGHT * scale`. Every
/// design unit becomes a `scale x scale` block, so integer down-scaling of a
/// larger rendering reproduces the `scale = 1` rendering exactly.
pub fn render_digit(digit: u8, scale: u32) -> TestResult<Pix> {
    let mask = *DIGIT_SEGMENTS
        .get(digit as usize)
        .ok_or(TestError::UnknownDigit(digit))?;
    let scale = scale.max(1);
    let (w, h) = (GLYPH_WIDTH * scale, GLYPH_HEIGHT * scale);

    let mut samples = Vec::with_capacity((w * h) as usize);
    for y in 0..h {
        for x in 0..w {
            samples.push(if ink_at(mask, x / scale, y / scale) { 255 } else { 0 });
        }
    }
    Ok(Pix::from_gray_samples(w, h, &samples)?)
}

/// Render a seven-segment digit as an opaque 32 bpp RGBA image.
///
/// Ink pixels take `ink`, the background is black.
pub fn render_digit_rgba(digit: u8, scale: u32, ink: (u8, u8, u8)) -> TestResult<Pix> {
    let gray = render_digit(digit, scale)?;
    let mut pm = Pix::new(gray.width(), gray.height(), PixelDepth::Bit32)?.to_mut();
    pm.set_spp(4);
    for y in 0..gray.height() {
        for x in 0..gray.width() {
            let on = gray.get_pixel_unchecked(x, y) != 0;
            let pixel = if on {
                color::compose_rgb(ink.0, ink.1, ink.2)
            } else {
                color::compose_rgb(0, 0, 0)
            };
            pm.set_pixel_unchecked(x, y, pixel);
        }
    }
    Ok(pm.into())
}

/// Build a uniform 8 bpp image.
pub fn solid_gray(width: u32, height: u32, val: u8) -> TestResult<Pix> {
    let mut pm = Pix::new(width, height, PixelDepth::Bit8)?.to_mut();
    pm.set_all(val as u32);
    Ok(pm.into())
}

/// Encode an image as PNG bytes.
pub fn encode_png(pix: &Pix) -> TestResult<Vec<u8>> {
    let mut out = Vec::new();
    digitcount_io::write_png(pix, &mut out).map_err(|e| TestError::Encode {
        format: "png",
        message: e.to_string(),
    })?;
    Ok(out)
}

/// Encode an image as binary PNM (P5/P6) bytes.
pub fn encode_pnm(pix: &Pix) -> TestResult<Vec<u8>> {
    let mut out = Vec::new();
    digitcount_io::write_pnm(pix, &mut out).map_err(|e| TestError::Encode {
        format: "pnm",
        message: e.to_string(),
    })?;
    Ok(out)
}

/// Get the path to the workspace root
fn workspace_root() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    // digitcount-test is at crates/digitcount-test, so go up two directories
    format!("{}/../..", manifest_dir)
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> String {
    format!("{}/tests/regout", workspace_root())
}

/// Write fixture bytes under `regout/<test_name>/<file_name>` and return the path.
pub fn write_fixture(test_name: &str, file_name: &str, data: &[u8]) -> TestResult<PathBuf> {
    let dir = PathBuf::from(regout_dir()).join(test_name);
    fs::create_dir_all(&dir)?;
    let path = dir.join(file_name);
    fs::write(&path, data)?;
    Ok(path)
}
