//! Channel packing formats shared by quantizer, remapper and ditherer.

/// How pixel channels participate in quantization and nearest-color search.
///
/// The packing format decides which channels are histogram dimensions, at
/// what precision, and whether alpha survives into the palette. A
/// [`Palette`](crate::Palette) remembers the format it was built with, so
/// remapping and dithering automatically use the matching metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackFormat {
    /// Reduced RGB (5-6-5 bits). Alpha is not persisted; every palette
    /// entry is opaque. Use after background compositing has resolved
    /// transparency.
    Rgb565,

    /// Coarse RGBA (4 bits per channel). Alpha is a quantizable dimension
    /// and palette entries carry it.
    Rgba4444 {
        /// Treat alpha as one-bit: pixels below 50% opacity are excluded
        /// from color statistics and a dedicated fully-transparent palette
        /// slot is reserved for them.
        one_bit_alpha: bool,
    },
}

impl PackFormat {
    /// Whether palette entries built under this format carry alpha.
    pub fn preserves_alpha(&self) -> bool {
        matches!(self, PackFormat::Rgba4444 { .. })
    }

    /// Whether sub-50%-opacity pixels collapse to a single transparent slot.
    pub fn one_bit_alpha(&self) -> bool {
        matches!(self, PackFormat::Rgba4444 { one_bit_alpha: true })
    }

    /// Pack a pixel into its histogram bucket key.
    pub(crate) fn pack(&self, r: u8, g: u8, b: u8, a: u8) -> u16 {
        match self {
            PackFormat::Rgb565 => {
                ((r as u16 >> 3) << 11) | ((g as u16 >> 2) << 5) | (b as u16 >> 3)
            }
            PackFormat::Rgba4444 { .. } => {
                ((r as u16 >> 4) << 12)
                    | ((g as u16 >> 4) << 8)
                    | ((b as u16 >> 4) << 4)
                    | (a as u16 >> 4)
            }
        }
    }
}
