//! Packed-channel histogram used as median-cut input.
//!
//! Pixels are binned by their packed key, which both caps the number of
//! buckets (at most 65536) and merges perceptually-close colors early. Each
//! bucket carries the mean color of its members so the cut operates on
//! representative colors, not on bucket corners.

use std::collections::BTreeMap;

use crate::format::PackFormat;

/// Alpha below this counts as transparent under one-bit alpha handling.
const OPACITY_THRESHOLD: u8 = 128;

#[derive(Default)]
struct Bucket {
    r_sum: f64,
    g_sum: f64,
    b_sum: f64,
    a_sum: f64,
    count: u64,
}

/// Bin an RGBA buffer into weighted mean-color entries.
///
/// Returns `(entries, saw_transparent)` where each entry is a mean RGBA
/// color plus its pixel-count weight. Under one-bit alpha, pixels below 50%
/// opacity are skipped and only reported through the flag; under
/// [`PackFormat::Rgb565`] alpha is forced opaque so it never splits buckets.
///
/// A `BTreeMap` keyed by the packed value keeps iteration order stable, so
/// the same input always produces the same entry sequence.
pub(crate) fn build_histogram(pixels: &[u8], format: PackFormat) -> (Vec<([f32; 4], f32)>, bool) {
    let one_bit = format.one_bit_alpha();
    let preserves_alpha = format.preserves_alpha();
    let mut buckets: BTreeMap<u16, Bucket> = BTreeMap::new();
    let mut saw_transparent = false;

    for px in pixels.chunks_exact(4) {
        let (r, g, b, mut a) = (px[0], px[1], px[2], px[3]);
        if one_bit && a < OPACITY_THRESHOLD {
            saw_transparent = true;
            continue;
        }
        if !preserves_alpha {
            a = 255;
        }
        let key = format.pack(r, g, b, a);
        let bucket = buckets.entry(key).or_default();
        bucket.r_sum += r as f64;
        bucket.g_sum += g as f64;
        bucket.b_sum += b as f64;
        bucket.a_sum += a as f64;
        bucket.count += 1;
    }

    let entries = buckets
        .into_values()
        .map(|b| {
            let n = b.count as f64;
            (
                [
                    (b.r_sum / n) as f32,
                    (b.g_sum / n) as f32,
                    (b.b_sum / n) as f32,
                    (b.a_sum / n) as f32,
                ],
                b.count as f32,
            )
        })
        .collect();

    (entries, saw_transparent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_identical_pixels_into_one_bucket() {
        let pixels = [7u8, 8, 9, 255].repeat(10);
        let (entries, saw) = build_histogram(&pixels, PackFormat::Rgb565);
        assert_eq!(entries.len(), 1);
        assert!(!saw);
        let (color, weight) = entries[0];
        assert_eq!(weight, 10.0);
        assert_eq!(color[0], 7.0);
    }

    #[test]
    fn one_bit_alpha_skips_transparent_pixels() {
        let mut pixels = [100u8, 100, 100, 255].repeat(3);
        pixels.extend_from_slice(&[1, 2, 3, 10]);
        let format = PackFormat::Rgba4444 { one_bit_alpha: true };
        let (entries, saw) = build_histogram(&pixels, format);
        assert!(saw);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].1, 3.0);
    }

    #[test]
    fn without_one_bit_alpha_translucent_pixels_count() {
        let pixels = [1u8, 2, 3, 10, 100, 100, 100, 255].to_vec();
        let format = PackFormat::Rgba4444 { one_bit_alpha: false };
        let (entries, saw) = build_histogram(&pixels, format);
        assert!(!saw);
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn rgb565_collapses_alpha_variants() {
        let pixels = [50u8, 60, 70, 255, 50, 60, 70, 200].to_vec();
        let (entries, _) = build_histogram(&pixels, PackFormat::Rgb565);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0[3], 255.0);
    }
}
