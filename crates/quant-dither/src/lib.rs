//! quant-dither: palette quantization and dithering for RGBA pixel buffers
//!
//! This library reduces full-color RGBA images to small indexed palettes,
//! as required by palette-based output formats (GIF frames, indexed PNG).
//! It provides the whole indexed pipeline:
//!
//! 1. [`quantize()`]: build a palette of 2-256 colors from a pixel buffer
//!    (weighted median cut over a packed-channel histogram)
//! 2. [`floyd_steinberg()`]: optional error diffusion against that palette
//! 3. [`remap()`]: map every pixel to its nearest palette index
//!
//! # Quick Start
//!
//! ```
//! use quant_dither::{quantize, remap, PackFormat};
//!
//! // 2x2 image: two reds, two blues
//! let pixels = [
//!     255u8, 0, 0, 255,   0, 0, 255, 255,
//!     255, 0, 0, 255,     0, 0, 255, 255,
//! ];
//! let palette = quantize(&pixels, 2, PackFormat::Rgb565).unwrap();
//! let indices = remap(&pixels, &palette);
//!
//! assert_eq!(palette.len(), 2);
//! assert_eq!(indices.len(), 4);
//! ```
//!
//! # Channel Packing
//!
//! Quantization, remapping and dithering all share one [`PackFormat`] value
//! describing how channels participate:
//!
//! - [`PackFormat::Rgb565`]: reduced RGB, alpha is not persisted. Used when
//!   transparency has already been resolved by background compositing.
//! - [`PackFormat::Rgba4444`]: coarse 4-bit channels including alpha. With
//!   `one_bit_alpha`, pixels below 50% opacity are treated as fully
//!   transparent and a dedicated transparent palette slot is reserved.
//!
//! Threading the same `PackFormat` through every stage is what keeps the
//! nearest-color metric consistent between quantization and remapping; the
//! type system enforces it because [`Palette`] carries its format along.

pub mod color;
pub mod dither;
pub mod error;
pub mod format;
pub mod palette;
pub mod quantize;
pub mod remap;


pub use color::{apply_background, clamp, ensure_color_count, has_transparent_pixels, parse_hex_color};
pub use dither::floyd_steinberg;
pub use error::QuantizeError;
pub use format::PackFormat;
pub use palette::{Palette, MAX_COLORS};
pub use quantize::quantize;
pub use remap::remap;
