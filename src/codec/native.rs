use std::io::Cursor;
use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder};
use resvg::usvg;
use tiny_skia::Pixmap;

use super::{Codec, LossyFormat};
use crate::error::ConvertError;
use crate::models::RasterImage;
use quant_dither::apply_background;

/// Production codec: raster formats through the `image` crate, SVG through
/// `resvg`, lossy output through the `image` crate's JPEG and WebP encoders.
pub struct NativeCodec {
    /// Font database for SVG text rendering
    fontdb: Arc<fontdb::Database>,
}

impl NativeCodec {
    pub fn new() -> Self {
        let mut fontdb = fontdb::Database::new();
        fontdb.load_system_fonts();
        tracing::debug!(font_count = fontdb.len(), "Loaded fonts for SVG rasterization");

        Self { fontdb: Arc::new(fontdb) }
    }

    /// Parse and rasterize SVG at its intrinsic document size.
    fn rasterize_svg(&self, svg_data: &[u8]) -> Result<RasterImage, ConvertError> {
        let options = usvg::Options {
            fontdb: self.fontdb.clone(),
            ..Default::default()
        };
        let tree = usvg::Tree::from_data(svg_data, &options)
            .map_err(|e| ConvertError::Decode(e.to_string()))?;

        let size = tree.size().to_int_size();
        let (width, height) = (size.width(), size.height());

        let mut pixmap = Pixmap::new(width, height)
            .ok_or(ConvertError::BadGeometry { width, height })?;
        resvg::render(&tree, usvg::Transform::identity(), &mut pixmap.as_mut());

        // tiny-skia stores premultiplied pixels; the pipeline wants straight
        // alpha.
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for px in pixmap.pixels() {
            let c = px.demultiply();
            pixels.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }

        RasterImage::new(width, height, pixels)
    }
}

impl Default for NativeCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for NativeCodec {
    fn decode(&self, bytes: &[u8]) -> Result<RasterImage, ConvertError> {
        if looks_like_svg(bytes) {
            return self.rasterize_svg(bytes);
        }

        let decoded = image::load_from_memory(bytes)?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        RasterImage::new(width, height, rgba.into_raw())
    }

    fn encode_lossy(
        &self,
        image: &RasterImage,
        format: LossyFormat,
        quality: f32,
    ) -> Result<Vec<u8>, ConvertError> {
        let mut out = Cursor::new(Vec::new());
        match format {
            LossyFormat::Jpeg => {
                // JPEG has no alpha channel; flatten over white first.
                let mut pixels = image.pixels_cloned();
                apply_background(&mut pixels, [255, 255, 255]);
                let rgb: Vec<u8> = pixels
                    .chunks_exact(4)
                    .flat_map(|px| [px[0], px[1], px[2]])
                    .collect();

                let q = (quality * 100.0).round().clamp(1.0, 100.0) as u8;
                let encoder = JpegEncoder::new_with_quality(&mut out, q);
                encoder.write_image(
                    &rgb,
                    image.width(),
                    image.height(),
                    ExtendedColorType::Rgb8,
                )?;
            }
            LossyFormat::Webp => {
                // The pure-Rust encoder is lossless only; approximate lossy
                // output below full quality by coarsening the channels
                // before encoding, which lets the lossless entropy coder
                // compress much harder.
                let pixels = if quality < 1.0 {
                    quantize_channels(image.pixels(), quality)
                } else {
                    image.pixels_cloned()
                };

                let encoder = WebPEncoder::new_lossless(&mut out);
                encoder.write_image(
                    &pixels,
                    image.width(),
                    image.height(),
                    ExtendedColorType::Rgba8,
                )?;
            }
        }
        Ok(out.into_inner())
    }
}

/// Sniff an SVG document: XML declaration or an `<svg` root near the start.
fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(1024)];
    let Ok(text) = std::str::from_utf8(head) else {
        return false;
    };
    let trimmed = text.trim_start_matches('\u{feff}').trim_start();
    trimmed.starts_with("<svg") || (trimmed.starts_with("<?xml") && text.contains("<svg"))
}

/// Reduce per-channel precision in proportion to `quality` in (0, 1).
fn quantize_channels(pixels: &[u8], quality: f32) -> Vec<u8> {
    // 1.0 -> 256 levels (identity), 0.05 -> ~14 levels
    let levels = (quality * 256.0).round().max(2.0);
    let step = 255.0 / (levels - 1.0);
    pixels
        .iter()
        .map(|&v| ((v as f32 / step).round() * step).round().clamp(0.0, 255.0) as u8)
        .collect()
}
