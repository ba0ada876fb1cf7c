//! Single-frame GIF serialization.
//!
//! The full palette pipeline lives here: flatten or keep alpha, quantize,
//! optionally dither, map to indices, then hand the index buffer to the
//! `gif` crate with transparency and loop metadata wired up.

use std::borrow::Cow;

use gif::{Encoder, Frame, Repeat};

use crate::error::ConvertError;
use crate::models::{Dithering, GifOptions};
use quant_dither::{
    apply_background, floyd_steinberg, has_transparent_pixels, parse_hex_color, quantize, remap,
    PackFormat,
};

/// Encode an RGBA buffer as a single-frame GIF.
///
/// Geometry is the caller's contract: `pixels` must hold `width * height`
/// RGBA pixels and both dimensions must be positive (the orchestrator
/// validates this before dispatch). Dimensions above `u16::MAX` are a GIF
/// container limit and reported as an encode error.
pub fn encode_gif(
    pixels: &[u8],
    width: u32,
    height: u32,
    options: &GifOptions,
) -> Result<Vec<u8>, ConvertError> {
    if width > u16::MAX as u32 || height > u16::MAX as u32 {
        return Err(ConvertError::Encode(format!(
            "{width}x{height} exceeds the GIF dimension limit of {}",
            u16::MAX
        )));
    }

    let mut work = pixels.to_vec();
    let keep_alpha = options.preserve_alpha && has_transparent_pixels(&work);

    let format = if keep_alpha {
        PackFormat::Rgba4444 { one_bit_alpha: true }
    } else {
        apply_background(&mut work, parse_hex_color(&options.background_color));
        PackFormat::Rgb565
    };

    let mut palette = quantize(&work, options.color_count, format)?;

    // Quantization reserves a transparent slot when it saw transparent
    // pixels; this covers the remaining case where alpha preservation was
    // requested against an effectively-opaque image edited into the palette
    // path. Skipped gracefully when the palette is full.
    let mut transparent = palette.transparent_index();
    if keep_alpha && transparent.is_none() {
        transparent = palette.push_transparent();
    }

    let indices = match options.dithering {
        Dithering::None => remap(&work, &palette),
        Dithering::FloydSteinberg => {
            floyd_steinberg(&work, width as usize, height as usize, &palette)
        }
    };

    let palette_rgb: Vec<u8> = palette
        .colors()
        .iter()
        .flat_map(|c| [c[0], c[1], c[2]])
        .collect();

    let mut out = Vec::new();
    {
        let mut encoder = Encoder::new(&mut out, width as u16, height as u16, &palette_rgb)
            .map_err(|e| ConvertError::Encode(e.to_string()))?;

        // In the emitted loop field 0 means infinite, so both "negative"
        // and "zero" requests collapse to Infinite.
        let repeat = if options.loop_count <= 0 {
            Repeat::Infinite
        } else {
            Repeat::Finite(options.loop_count.min(u16::MAX as i32) as u16)
        };
        encoder
            .set_repeat(repeat)
            .map_err(|e| ConvertError::Encode(e.to_string()))?;

        let frame = Frame {
            width: width as u16,
            height: height as u16,
            buffer: Cow::Borrowed(indices.as_slice()),
            transparent: transparent.map(|i| i as u8),
            ..Frame::default()
        };
        encoder
            .write_frame(&frame)
            .map_err(|e| ConvertError::Encode(e.to_string()))?;
    }

    Ok(out)
}
