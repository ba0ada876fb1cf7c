//! PNG serialization with optional palette reduction and Adam7 interlacing.
//!
//! The chunk stream is assembled by hand (signature, IHDR, PLTE/tRNS, IDAT,
//! IEND) over a `flate2` zlib stream. Reduced-color output is written as a
//! real indexed PNG (color type 3) with a tRNS table when any palette entry
//! carries transparency; non-reduced output stays RGBA8 (color type 6).

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::ConvertError;
use crate::models::PngOptions;
use quant_dither::{
    apply_background, has_transparent_pixels, parse_hex_color, quantize, remap, PackFormat,
    Palette,
};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];

/// Adam7 pass origins and strides: (x0, y0, dx, dy).
const ADAM7_PASSES: [(usize, usize, usize, usize); 7] = [
    (0, 0, 8, 8),
    (4, 0, 8, 8),
    (0, 4, 4, 8),
    (2, 0, 4, 4),
    (0, 2, 2, 4),
    (1, 0, 2, 2),
    (0, 1, 1, 2),
];

enum ColorMode {
    /// Truecolor with alpha, 8 bits per channel (color type 6).
    Rgba,
    /// Indexed (color type 3) with a PLTE chunk and an optional tRNS table.
    Indexed { plte: Vec<u8>, trns: Option<Vec<u8>> },
}

impl ColorMode {
    fn color_type(&self) -> u8 {
        match self {
            ColorMode::Rgba => 6,
            ColorMode::Indexed { .. } => 3,
        }
    }

    fn bytes_per_pixel(&self) -> usize {
        match self {
            ColorMode::Rgba => 4,
            ColorMode::Indexed { .. } => 1,
        }
    }
}

/// Encode an RGBA buffer as PNG.
///
/// Sequence: flatten alpha over the background when `preserve_alpha` is
/// off, quantize to an indexed image when `reduce_colors` is on and the
/// requested count is below 256, then serialize (interlaced when asked).
/// Geometry is the orchestrator's contract, matching the GIF encoder.
pub fn encode_png(
    pixels: &[u8],
    width: u32,
    height: u32,
    options: &PngOptions,
) -> Result<Vec<u8>, ConvertError> {
    let mut work = pixels.to_vec();
    if !options.preserve_alpha {
        apply_background(&mut work, parse_hex_color(&options.background_color));
    }

    let (mode, data) = if options.reduce_colors && options.color_count < 256 {
        let keep_alpha = options.preserve_alpha && has_transparent_pixels(&work);
        let format = if keep_alpha {
            PackFormat::Rgba4444 { one_bit_alpha: false }
        } else {
            PackFormat::Rgb565
        };
        let palette = quantize(&work, options.color_count, format)?;
        let indices = remap(&work, &palette);
        let (plte, trns) = palette_chunks(&palette);
        (ColorMode::Indexed { plte, trns }, indices)
    } else {
        (ColorMode::Rgba, work)
    };

    serialize(&mode, &data, width as usize, height as usize, options.interlaced)
}

/// Build PLTE bytes plus a tRNS table trimmed of trailing opaque entries.
fn palette_chunks(palette: &Palette) -> (Vec<u8>, Option<Vec<u8>>) {
    let plte: Vec<u8> = palette
        .colors()
        .iter()
        .flat_map(|c| [c[0], c[1], c[2]])
        .collect();

    let mut trns: Vec<u8> = palette.colors().iter().map(|c| c[3]).collect();
    while trns.last() == Some(&255) {
        trns.pop();
    }
    let trns = if trns.is_empty() { None } else { Some(trns) };
    (plte, trns)
}

fn serialize(
    mode: &ColorMode,
    data: &[u8],
    width: usize,
    height: usize,
    interlaced: bool,
) -> Result<Vec<u8>, ConvertError> {
    let bpp = mode.bytes_per_pixel();

    let raw = if interlaced {
        interlaced_scanlines(data, width, height, bpp)
    } else {
        plain_scanlines(data, width, height, bpp)
    };

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&raw)?;
    let idat = encoder.finish()?;

    let mut out = Vec::with_capacity(idat.len() + 256);
    out.extend_from_slice(&PNG_SIGNATURE);

    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr.push(8); // bit depth
    ihdr.push(mode.color_type());
    ihdr.push(0); // compression
    ihdr.push(0); // filter method
    ihdr.push(if interlaced { 1 } else { 0 });
    write_chunk(&mut out, b"IHDR", &ihdr);

    if let ColorMode::Indexed { plte, trns } = mode {
        write_chunk(&mut out, b"PLTE", plte);
        if let Some(trns) = trns {
            write_chunk(&mut out, b"tRNS", trns);
        }
    }

    write_chunk(&mut out, b"IDAT", &idat);
    write_chunk(&mut out, b"IEND", &[]);
    Ok(out)
}

/// Row-major scanlines, each prefixed with filter type 0 (None).
fn plain_scanlines(data: &[u8], width: usize, height: usize, bpp: usize) -> Vec<u8> {
    let stride = width * bpp;
    let mut raw = Vec::with_capacity(height * (stride + 1));
    for row in 0..height {
        raw.push(0);
        raw.extend_from_slice(&data[row * stride..(row + 1) * stride]);
    }
    raw
}

/// Adam7 pass extraction. Each pass is its own run of filtered scanlines;
/// passes with no pixels at this image size are omitted entirely.
fn interlaced_scanlines(data: &[u8], width: usize, height: usize, bpp: usize) -> Vec<u8> {
    let mut raw = Vec::new();
    for &(x0, y0, dx, dy) in &ADAM7_PASSES {
        if x0 >= width || y0 >= height {
            continue;
        }
        let mut y = y0;
        while y < height {
            raw.push(0);
            let mut x = x0;
            while x < width {
                let i = (y * width + x) * bpp;
                raw.extend_from_slice(&data[i..i + bpp]);
                x += dx;
            }
            y += dy;
        }
    }
    raw
}

fn write_chunk(out: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(data);

    let mut crc = update_crc(u32::MAX, kind);
    crc = update_crc(crc, data);
    out.extend_from_slice(&(crc ^ u32::MAX).to_be_bytes());
}

const CRC_TABLE: [u32; 256] = build_crc_table();

const fn build_crc_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut n = 0;
    while n < 256 {
        let mut c = n as u32;
        let mut k = 0;
        while k < 8 {
            c = if c & 1 != 0 { 0xEDB8_8320 ^ (c >> 1) } else { c >> 1 };
            k += 1;
        }
        table[n] = c;
        n += 1;
    }
    table
}

fn update_crc(mut crc: u32, data: &[u8]) -> u32 {
    for &byte in data {
        crc = CRC_TABLE[((crc ^ byte as u32) & 0xFF) as usize] ^ (crc >> 8);
    }
    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(bytes: &[u8]) -> (png::OutputInfo, Vec<u8>) {
        let mut decoder = png::Decoder::new(std::io::Cursor::new(bytes));
        decoder.set_transformations(png::Transformations::EXPAND);
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        buf.truncate(info.buffer_size());
        (info, buf)
    }

    fn checkerboard(width: usize, height: usize) -> Vec<u8> {
        let mut pixels = Vec::with_capacity(width * height * 4);
        for y in 0..height {
            for x in 0..width {
                if (x + y) % 2 == 0 {
                    pixels.extend_from_slice(&[255, 0, 0, 255]);
                } else {
                    pixels.extend_from_slice(&[0, 0, 255, 255]);
                }
            }
        }
        pixels
    }

    #[test]
    fn crc_matches_the_png_spec_check_value() {
        // CRC-32 of "123456789" is the standard check value
        let crc = update_crc(u32::MAX, b"123456789") ^ u32::MAX;
        assert_eq!(crc, 0xCBF4_3926);
    }

    #[test]
    fn output_round_trips_through_a_reference_decoder() {
        let pixels = checkerboard(5, 3);
        let bytes = encode_png(&pixels, 5, 3, &PngOptions::default()).unwrap();
        let (info, decoded) = decode(&bytes);
        assert_eq!(info.width, 5);
        assert_eq!(info.height, 3);
        assert_eq!(info.color_type, png::ColorType::Rgba);
        assert_eq!(decoded, pixels);
    }

    #[test]
    fn preserve_alpha_keeps_transparent_pixels() {
        let pixels = [
            255u8, 0, 0, 255, 0, 255, 0, 255, // opaque
            0, 0, 0, 0, 0, 0, 0, 0, // transparent
        ];
        let options = PngOptions { preserve_alpha: true, ..Default::default() };
        let bytes = encode_png(&pixels, 2, 2, &options).unwrap();
        let (_, decoded) = decode(&bytes);
        assert_eq!(decoded[11], 0, "alpha of third pixel");
        assert_eq!(decoded[15], 0, "alpha of fourth pixel");
    }

    #[test]
    fn flattening_composites_over_the_background() {
        let pixels = [
            255u8, 0, 0, 255, 0, 255, 0, 255, //
            0, 0, 0, 0, 0, 0, 0, 0,
        ];
        let options = PngOptions {
            preserve_alpha: false,
            background_color: "#0000ff".to_string(),
            ..Default::default()
        };
        let bytes = encode_png(&pixels, 2, 2, &options).unwrap();
        let (_, decoded) = decode(&bytes);
        // formerly-transparent pixels are now opaque blue
        assert_eq!(&decoded[8..12], &[0, 0, 255, 255]);
        assert_eq!(&decoded[12..16], &[0, 0, 255, 255]);
        // opaque pixels are untouched
        assert_eq!(&decoded[0..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn reduced_output_is_an_indexed_png() {
        let pixels = checkerboard(8, 8);
        let options = PngOptions {
            reduce_colors: true,
            color_count: 4,
            ..Default::default()
        };
        let bytes = encode_png(&pixels, 8, 8, &options).unwrap();

        // raw stream carries a PLTE chunk
        assert!(bytes.windows(4).any(|w| w == b"PLTE"));

        // expanded decode reproduces the two source colors exactly
        let (_, decoded) = decode(&bytes);
        assert_eq!(decoded.len() % 3, 0);
        for px in decoded.chunks_exact(3) {
            assert!(
                px == [255, 0, 0] || px == [0, 0, 255],
                "unexpected color {px:?}"
            );
        }
    }

    #[test]
    fn reduced_output_with_alpha_carries_a_trns_table() {
        let mut pixels = checkerboard(4, 4);
        for px in pixels.chunks_exact_mut(4).take(4) {
            px[3] = 0;
        }
        let options = PngOptions {
            reduce_colors: true,
            color_count: 8,
            preserve_alpha: true,
            ..Default::default()
        };
        let bytes = encode_png(&pixels, 4, 4, &options).unwrap();
        assert!(bytes.windows(4).any(|w| w == b"tRNS"));

        let (info, decoded) = decode(&bytes);
        assert_eq!(info.color_type, png::ColorType::Rgba);
        assert_eq!(decoded[3], 0, "first pixel should decode transparent");
        assert_eq!(*decoded.last().unwrap(), 255);
    }

    #[test]
    fn interlaced_output_decodes_to_the_same_pixels() {
        let pixels = checkerboard(13, 7);
        let plain = encode_png(&pixels, 13, 7, &PngOptions::default()).unwrap();
        let interlaced = encode_png(
            &pixels,
            13,
            7,
            &PngOptions { interlaced: true, ..Default::default() },
        )
        .unwrap();
        assert_ne!(plain, interlaced);

        let (_, a) = decode(&plain);
        let (_, b) = decode(&interlaced);
        assert_eq!(a, b);
    }

    #[test]
    fn interlaced_single_pixel_image_is_valid() {
        // only pass 1 has pixels at 1x1
        let bytes = encode_png(
            &[9, 8, 7, 255],
            1,
            1,
            &PngOptions { interlaced: true, ..Default::default() },
        )
        .unwrap();
        let (_, decoded) = decode(&bytes);
        assert_eq!(decoded, vec![9, 8, 7, 255]);
    }

    #[test]
    fn deterministic_output() {
        let pixels = checkerboard(6, 6);
        let options = PngOptions { reduce_colors: true, color_count: 2, ..Default::default() };
        let a = encode_png(&pixels, 6, 6, &options).unwrap();
        let b = encode_png(&pixels, 6, 6, &options).unwrap();
        assert_eq!(a, b);
    }
}
