//! Scalar and pixel-buffer color helpers.
//!
//! These operate on raw RGBA8 buffers (4 bytes per pixel, row-major,
//! unpremultiplied alpha). [`apply_background`] is the only mutating helper
//! and is always run before an encode path that cannot persist alpha.

/// Alpha values at or above this are considered fully opaque.
///
/// A strict `< 255` check would flag JPEG-decoded images whose alpha was
/// slightly perturbed by compression artifacts; 250 leaves headroom.
const NEAR_OPAQUE: u8 = 250;

/// Saturating clamp of `value` into `[min, max]`.
pub fn clamp<T: PartialOrd>(value: T, min: T, max: T) -> T {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Clamp a requested palette size into the supported `[2, 256]` range.
///
/// Out-of-range requests are clamped rather than rejected; palette encoders
/// degrade gracefully instead of failing on bad configuration.
pub fn ensure_color_count(count: u32) -> usize {
    clamp(count, 2, 256) as usize
}

/// Parse a 3- or 6-digit hex color (leading `#` optional) into an RGB triple.
///
/// Any other input (wrong length, non-hex digits) falls back to opaque white
/// `[255, 255, 255]`. This function never fails: background colors come from
/// user-editable settings and a bad value should not abort a conversion.
pub fn parse_hex_color(hex: &str) -> [u8; 3] {
    const FALLBACK: [u8; 3] = [255, 255, 255];

    let normalized = hex.trim().trim_start_matches('#');
    if !normalized.is_ascii() {
        return FALLBACK;
    }

    match normalized.len() {
        3 => {
            let mut out = [0u8; 3];
            for (i, ch) in normalized.chars().enumerate() {
                let Some(digit) = ch.to_digit(16) else {
                    return FALLBACK;
                };
                // "f" expands to 0xff, "4" to 0x44
                out[i] = (digit * 17) as u8;
            }
            out
        }
        6 => {
            let mut out = [0u8; 3];
            for (i, slot) in out.iter_mut().enumerate() {
                match u8::from_str_radix(&normalized[i * 2..i * 2 + 2], 16) {
                    Ok(v) => *slot = v,
                    Err(_) => return FALLBACK,
                }
            }
            out
        }
        _ => FALLBACK,
    }
}

/// Scan the alpha channel for any pixel below the near-opaque threshold.
pub fn has_transparent_pixels(pixels: &[u8]) -> bool {
    pixels.chunks_exact(4).any(|px| px[3] < NEAR_OPAQUE)
}

/// Alpha-composite every pixel over `background` in place and force the
/// result fully opaque.
///
/// Standard over-operator per channel: `out = src * a + bg * (1 - a)`.
/// Already-opaque pixels are left untouched.
pub fn apply_background(pixels: &mut [u8], background: [u8; 3]) {
    for px in pixels.chunks_exact_mut(4) {
        let alpha = px[3] as f32 / 255.0;
        if alpha < 1.0 {
            let inv = 1.0 - alpha;
            for c in 0..3 {
                px[c] = (px[c] as f32 * alpha + background[c] as f32 * inv).round() as u8;
            }
            px[3] = 255;
        }
    }
}
