//! PNM (Portable Any Map) format support
//!
//! Reads PGM (P2 ASCII, P5 binary) and PPM (P3 ASCII, P6 binary) images and
//! writes P5/P6. Samples with a maxval other than 255 are rescaled to 8 bits.

use crate::raster::{SampleLayout, checked_size, pix_from_samples};
use crate::{IoError, IoResult, header::ImageHeader};
use digitcount_core::{ImageFormat, Pix, PixelDepth, color};
use std::io::{Read, Write};

/// Byte cursor over a PNM stream
struct PnmParser<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> PnmParser<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Skip whitespace and `#` comments.
    fn skip_separators(&mut self) {
        while let Some(&b) = self.data.get(self.pos) {
            if b == b'#' {
                while let Some(&c) = self.data.get(self.pos) {
                    self.pos += 1;
                    if c == b'\n' {
                        break;
                    }
                }
            } else if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn next_uint(&mut self) -> IoResult<u32> {
        self.skip_separators();
        let start = self.pos;
        while self.data.get(self.pos).is_some_and(u8::is_ascii_digit) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(IoError::InvalidData(format!(
                "expected integer at byte {} of PNM stream",
                start
            )));
        }
        std::str::from_utf8(&self.data[start..self.pos])
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| IoError::InvalidData("PNM integer out of range".to_string()))
    }
}

/// Parsed PNM header fields
struct PnmHeader {
    layout: SampleLayout,
    binary: bool,
    width: u32,
    height: u32,
    maxval: u32,
    /// Offset just past the maxval token
    end: usize,
}

fn parse_header(data: &[u8]) -> IoResult<PnmHeader> {
    if data.len() < 2 || data[0] != b'P' {
        return Err(IoError::InvalidData("not a PNM file".to_string()));
    }
    let (layout, binary) = match data[1] {
        b'2' => (SampleLayout::Gray, false),
        b'3' => (SampleLayout::Rgb, false),
        b'5' => (SampleLayout::Gray, true),
        b'6' => (SampleLayout::Rgb, true),
        other => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported PNM variant: P{}",
                other as char
            )));
        }
    };

    let mut parser = PnmParser::new(data);
    parser.pos = 2;
    let width = parser.next_uint()?;
    let height = parser.next_uint()?;
    let maxval = parser.next_uint()?;
    if width == 0 || height == 0 {
        return Err(IoError::InvalidData(format!(
            "invalid PNM dimensions: {}x{}",
            width, height
        )));
    }
    if maxval == 0 || maxval > 65535 {
        return Err(IoError::InvalidData(format!("invalid PNM maxval: {}", maxval)));
    }

    Ok(PnmHeader {
        layout,
        binary,
        width,
        height,
        maxval,
        end: parser.pos,
    })
}

/// Read PNM header metadata without decoding pixel data
pub fn read_header_pnm(data: &[u8]) -> IoResult<ImageHeader> {
    let header = parse_header(data)?;
    let (depth, spp) = match header.layout {
        SampleLayout::Gray => (8, 1),
        _ => (32, 3),
    };
    Ok(ImageHeader {
        width: header.width,
        height: header.height,
        depth,
        bps: if header.maxval > 255 { 16 } else { 8 },
        spp,
        format: ImageFormat::Pnm,
    })
}

/// Read a PNM image (P2/P3/P5/P6) from a reader.
///
/// PGM yields 8 bpp, PPM yields 32 bpp.
pub fn read_pnm<R: Read>(mut reader: R) -> IoResult<Pix> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;

    let PnmHeader {
        layout,
        binary,
        width,
        height,
        maxval,
        end,
    } = parse_header(&data)?;

    let count = checked_size(&[width as usize, height as usize, layout.channels()])?;
    let rescale = |v: u32| -> u8 {
        if maxval == 255 {
            v.min(255) as u8
        } else {
            (v.min(maxval) * 255 / maxval) as u8
        }
    };

    let samples: Vec<u8> = if binary {
        // Exactly one whitespace byte separates the header from the raster
        let start = end + 1;
        let bytes_per_sample = if maxval > 255 { 2 } else { 1 };
        let raster = checked_size(&[count, bytes_per_sample])
            .ok()
            .and_then(|len| start.checked_add(len))
            .and_then(|stop| data.get(start..stop))
            .ok_or_else(|| IoError::InvalidData("PNM raster truncated".to_string()))?;
        if bytes_per_sample == 2 {
            raster
                .chunks_exact(2)
                .map(|s| rescale(u16::from_be_bytes([s[0], s[1]]) as u32))
                .collect()
        } else {
            raster.iter().map(|&v| rescale(v as u32)).collect()
        }
    } else {
        // every ASCII sample takes at least one byte
        if count > data.len() - end {
            return Err(IoError::InvalidData("PNM raster truncated".to_string()));
        }
        let mut parser = PnmParser::new(&data);
        parser.pos = end;
        let mut samples = Vec::with_capacity(count);
        for _ in 0..count {
            samples.push(rescale(parser.next_uint()?));
        }
        samples
    };

    pix_from_samples(width, height, layout, &samples, ImageFormat::Pnm)
}

/// Write a `Pix` as binary PNM to a writer.
///
/// 8 bpp images are written as P5, 32 bpp images as P6. Alpha is dropped.
pub fn write_pnm<W: Write>(pix: &Pix, mut writer: W) -> IoResult<()> {
    let (width, height) = (pix.width(), pix.height());
    match pix.depth() {
        PixelDepth::Bit8 => {
            write!(writer, "P5\n{} {}\n255\n", width, height)?;
            writer.write_all(&pix.gray_samples()?)?;
        }
        PixelDepth::Bit32 => {
            write!(writer, "P6\n{} {}\n255\n", width, height)?;
            let mut row = Vec::with_capacity(width as usize * 3);
            for y in 0..height {
                row.clear();
                for &pixel in &pix.row_data(y)[..width as usize] {
                    let (r, g, b) = color::extract_rgb(pixel);
                    row.extend_from_slice(&[r, g, b]);
                }
                writer.write_all(&row)?;
            }
        }
    }
    Ok(())
}
