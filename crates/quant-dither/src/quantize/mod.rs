//! Palette quantization: packed-channel histogram plus weighted median cut.

mod histogram;
mod median_cut;

use crate::color::ensure_color_count;
use crate::error::QuantizeError;
use crate::format::PackFormat;
use crate::palette::Palette;

/// Quantize an RGBA buffer down to at most `color_count` palette entries.
///
/// `color_count` is clamped into `[2, 256]` before use. The returned palette
/// always has at least two entries (degenerate single-color images are
/// padded by repeating the final entry, so index buffers stay valid for
/// encoders that require a minimum table size).
///
/// Under [`PackFormat::Rgba4444`] with `one_bit_alpha`, pixels below 50%
/// opacity are excluded from color statistics; when any were seen, one
/// fully-transparent entry is reserved inside the budget.
///
/// Deterministic: same input and format always produce the same palette
/// (bucket iteration is ordered and splits break ties stably).
///
/// # Errors
///
/// [`QuantizeError::EmptyInput`] when `pixels` is empty.
pub fn quantize(
    pixels: &[u8],
    color_count: u32,
    format: PackFormat,
) -> Result<Palette, QuantizeError> {
    if pixels.is_empty() {
        return Err(QuantizeError::EmptyInput);
    }

    let target = ensure_color_count(color_count);
    let (entries, saw_transparent) = histogram::build_histogram(pixels, format);
    let reserve_transparent = format.one_bit_alpha() && saw_transparent;
    let budget = if reserve_transparent { (target - 1).max(1) } else { target };

    let mut colors: Vec<[u8; 4]> = if entries.is_empty() {
        // Every pixel was transparent; seed with opaque black so the
        // palette still has a usable color entry.
        vec![[0, 0, 0, 255]]
    } else {
        median_cut::median_cut(entries, budget)
            .into_iter()
            .map(round_entry)
            .collect()
    };

    if reserve_transparent {
        colors.push([0, 0, 0, 0]);
    }

    // Encoding formats want at least two entries; pad degenerate palettes.
    while colors.len() < 2 {
        let last = *colors.last().expect("palette seeded above");
        colors.push(last);
    }

    Palette::new(colors, format)
}

fn round_entry(c: [f32; 4]) -> [u8; 4] {
    let mut out = [0u8; 4];
    for (slot, v) in out.iter_mut().zip(c.iter()) {
        *slot = v.round().clamp(0.0, 255.0) as u8;
    }
    out
}
