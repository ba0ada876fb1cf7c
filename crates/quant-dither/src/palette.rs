//! Palette storage and nearest-entry matching.

use crate::error::QuantizeError;
use crate::format::PackFormat;

/// Hard palette size limit imposed by 8-bit index buffers.
pub const MAX_COLORS: usize = 256;

/// An ordered color palette plus the packing format it was built under.
///
/// Entries are stored as RGBA quadruples; under [`PackFormat::Rgb565`] the
/// alpha component is always 255 and does not participate in matching.
/// Carrying the format inside the palette keeps the distance metric used by
/// [`find_nearest`](Palette::find_nearest) consistent with the one used
/// during quantization — a caller cannot remap with the wrong metric.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<[u8; 4]>,
    format: PackFormat,
}

impl Palette {
    /// Build a palette from explicit colors.
    ///
    /// # Errors
    ///
    /// [`QuantizeError::EmptyPalette`] for zero colors,
    /// [`QuantizeError::TooManyColors`] above [`MAX_COLORS`].
    pub fn new(colors: Vec<[u8; 4]>, format: PackFormat) -> Result<Self, QuantizeError> {
        if colors.is_empty() {
            return Err(QuantizeError::EmptyPalette);
        }
        if colors.len() > MAX_COLORS {
            return Err(QuantizeError::TooManyColors { count: colors.len() });
        }
        Ok(Self { colors, format })
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// The packing format this palette was quantized under.
    pub fn format(&self) -> PackFormat {
        self.format
    }

    /// All entries in palette order.
    pub fn colors(&self) -> &[[u8; 4]] {
        &self.colors
    }

    /// Entry at `index`. Panics on out-of-range index.
    pub fn color(&self, index: usize) -> [u8; 4] {
        self.colors[index]
    }

    /// Index of the entry nearest to the given pixel.
    ///
    /// Exhaustive scan with squared Euclidean distance over R, G, B; when
    /// the format preserves alpha, a squared alpha-difference term is added.
    /// O(palette size), which is capped at 256.
    pub fn find_nearest(&self, r: u8, g: u8, b: u8, a: u8) -> usize {
        let with_alpha = self.format.preserves_alpha();
        let mut best = 0;
        let mut best_dist = u32::MAX;
        for (i, c) in self.colors.iter().enumerate() {
            let dr = c[0] as i32 - r as i32;
            let dg = c[1] as i32 - g as i32;
            let db = c[2] as i32 - b as i32;
            let da = if with_alpha { c[3] as i32 - a as i32 } else { 0 };
            let dist = (dr * dr + dg * dg + db * db + da * da) as u32;
            if dist < best_dist {
                best_dist = dist;
                best = i;
            }
        }
        best
    }

    /// Index of the first fully-transparent entry, if any.
    pub fn transparent_index(&self) -> Option<usize> {
        if !self.format.preserves_alpha() {
            return None;
        }
        self.colors.iter().position(|c| c[3] == 0)
    }

    /// Append a fully-transparent entry, returning its index.
    ///
    /// Returns `None` when the palette is already at [`MAX_COLORS`]; the
    /// caller is expected to skip transparency rather than fail.
    pub fn push_transparent(&mut self) -> Option<usize> {
        if self.colors.len() >= MAX_COLORS {
            return None;
        }
        self.colors.push([0, 0, 0, 0]);
        Some(self.colors.len() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb_palette(colors: &[[u8; 3]]) -> Palette {
        let quads = colors.iter().map(|c| [c[0], c[1], c[2], 255]).collect();
        Palette::new(quads, PackFormat::Rgb565).unwrap()
    }

    #[test]
    fn rejects_empty_and_oversized() {
        assert_eq!(
            Palette::new(Vec::new(), PackFormat::Rgb565),
            Err(QuantizeError::EmptyPalette)
        );
        let too_many = vec![[0u8, 0, 0, 255]; 257];
        assert_eq!(
            Palette::new(too_many, PackFormat::Rgb565),
            Err(QuantizeError::TooManyColors { count: 257 })
        );
    }

    #[test]
    fn nearest_ignores_alpha_for_rgb_format() {
        let palette = rgb_palette(&[[0, 0, 0], [255, 255, 255]]);
        // A transparent white pixel still matches white
        assert_eq!(palette.find_nearest(250, 250, 250, 0), 1);
        assert_eq!(palette.find_nearest(10, 5, 0, 0), 0);
    }

    #[test]
    fn nearest_weighs_alpha_for_rgba_format() {
        let palette = Palette::new(
            vec![[0, 0, 0, 0], [0, 0, 0, 255]],
            PackFormat::Rgba4444 { one_bit_alpha: true },
        )
        .unwrap();
        assert_eq!(palette.find_nearest(0, 0, 0, 10), 0);
        assert_eq!(palette.find_nearest(0, 0, 0, 240), 1);
    }

    #[test]
    fn transparent_slot_bookkeeping() {
        let mut palette = Palette::new(
            vec![[1, 2, 3, 255]],
            PackFormat::Rgba4444 { one_bit_alpha: true },
        )
        .unwrap();
        assert_eq!(palette.transparent_index(), None);
        assert_eq!(palette.push_transparent(), Some(1));
        assert_eq!(palette.transparent_index(), Some(1));
    }

    #[test]
    fn push_transparent_skips_when_full() {
        let mut palette = Palette::new(
            (0..=255u8).map(|i| [i, i, i, 255]).collect(),
            PackFormat::Rgba4444 { one_bit_alpha: true },
        )
        .unwrap();
        assert_eq!(palette.len(), 256);
        assert_eq!(palette.push_transparent(), None);
        assert_eq!(palette.len(), 256);
    }

    #[test]
    fn no_transparent_index_without_alpha_format() {
        let palette = Palette::new(vec![[0, 0, 0, 0]], PackFormat::Rgb565).unwrap();
        assert_eq!(palette.transparent_index(), None);
    }
}
