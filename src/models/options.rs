//! Output formats and per-format conversion options.
//!
//! Options structs are plain values: the session keeps one default per
//! format and every item gets a clone, so editing an item never aliases the
//! defaults. Partial updates go through the `*Patch` types and
//! [`GifOptions::merged`] / [`PngOptions::merged`], which build a new value
//! instead of mutating in place.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpeg,
    Png,
    Webp,
    Gif,
}

impl OutputFormat {
    /// File extension used for exported files. JPEG conventionally gets
    /// `jpg`, everything else matches the format name.
    pub fn canonical_extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::Webp => "webp",
            OutputFormat::Gif => "gif",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::Webp => "image/webp",
            OutputFormat::Gif => "image/gif",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
            OutputFormat::Webp => "webp",
            OutputFormat::Gif => "gif",
        };
        write!(f, "{name}")
    }
}

/// Dithering mode for palette formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Dithering {
    #[default]
    None,
    FloydSteinberg,
}

impl fmt::Display for Dithering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dithering::None => write!(f, "none"),
            Dithering::FloydSteinberg => write!(f, "floyd-steinberg"),
        }
    }
}

/// GIF conversion options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GifOptions {
    /// Palette size, clamped to [2, 256] during quantization.
    pub color_count: u32,
    pub dithering: Dithering,
    /// Keep transparency; when false, pixels are composited over
    /// `background_color` first.
    pub preserve_alpha: bool,
    /// Hex background used when alpha is flattened.
    pub background_color: String,
    /// Animation loop count: <= 0 means loop forever, n > 0 repeats n times.
    /// Single-frame output carries the extension regardless.
    pub loop_count: i32,
}

impl Default for GifOptions {
    fn default() -> Self {
        Self {
            color_count: 256,
            dithering: Dithering::FloydSteinberg,
            preserve_alpha: true,
            background_color: "#ffffff".to_string(),
            loop_count: 0,
        }
    }
}

/// Partial GIF options for merge-override updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GifOptionsPatch {
    pub color_count: Option<u32>,
    pub dithering: Option<Dithering>,
    pub preserve_alpha: Option<bool>,
    pub background_color: Option<String>,
    pub loop_count: Option<i32>,
}

impl GifOptions {
    /// Copy of `self` with the patch's set fields applied.
    pub fn merged(&self, patch: &GifOptionsPatch) -> GifOptions {
        GifOptions {
            color_count: patch.color_count.unwrap_or(self.color_count),
            dithering: patch.dithering.unwrap_or(self.dithering),
            preserve_alpha: patch.preserve_alpha.unwrap_or(self.preserve_alpha),
            background_color: patch
                .background_color
                .clone()
                .unwrap_or_else(|| self.background_color.clone()),
            loop_count: patch.loop_count.unwrap_or(self.loop_count),
        }
    }
}

/// PNG conversion options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PngOptions {
    /// Palette size when `reduce_colors` is on.
    pub color_count: u32,
    /// Quantize down to `color_count` colors and emit an indexed PNG.
    pub reduce_colors: bool,
    pub preserve_alpha: bool,
    pub background_color: String,
    /// Adam7 interlaced output.
    pub interlaced: bool,
}

impl Default for PngOptions {
    fn default() -> Self {
        Self {
            color_count: 256,
            reduce_colors: false,
            preserve_alpha: true,
            background_color: "#ffffff".to_string(),
            interlaced: false,
        }
    }
}

/// Partial PNG options for merge-override updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PngOptionsPatch {
    pub color_count: Option<u32>,
    pub reduce_colors: Option<bool>,
    pub preserve_alpha: Option<bool>,
    pub background_color: Option<String>,
    pub interlaced: Option<bool>,
}

impl PngOptions {
    /// Copy of `self` with the patch's set fields applied.
    pub fn merged(&self, patch: &PngOptionsPatch) -> PngOptions {
        PngOptions {
            color_count: patch.color_count.unwrap_or(self.color_count),
            reduce_colors: patch.reduce_colors.unwrap_or(self.reduce_colors),
            preserve_alpha: patch.preserve_alpha.unwrap_or(self.preserve_alpha),
            background_color: patch
                .background_color
                .clone()
                .unwrap_or_else(|| self.background_color.clone()),
            interlaced: patch.interlaced.unwrap_or(self.interlaced),
        }
    }
}

/// A complete per-job conversion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum ConversionRequest {
    Jpeg {
        /// Quality in [0, 100].
        #[serde(default = "default_jpeg_quality")]
        quality: u8,
    },
    Png(PngOptions),
    Webp {
        #[serde(default = "default_webp_quality")]
        quality: u8,
    },
    Gif(GifOptions),
}

fn default_jpeg_quality() -> u8 {
    82
}

fn default_webp_quality() -> u8 {
    78
}

impl ConversionRequest {
    pub fn format(&self) -> OutputFormat {
        match self {
            ConversionRequest::Jpeg { .. } => OutputFormat::Jpeg,
            ConversionRequest::Png(_) => OutputFormat::Png,
            ConversionRequest::Webp { .. } => OutputFormat::Webp,
            ConversionRequest::Gif(_) => OutputFormat::Gif,
        }
    }

    /// Default request for a format, using each format's option defaults.
    pub fn for_format(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Jpeg => ConversionRequest::Jpeg { quality: default_jpeg_quality() },
            OutputFormat::Png => ConversionRequest::Png(PngOptions::default()),
            OutputFormat::Webp => ConversionRequest::Webp { quality: default_webp_quality() },
            OutputFormat::Gif => ConversionRequest::Gif(GifOptions::default()),
        }
    }
}

/// Normalize an integer quality in [0, 100] to the float range lossy
/// encoders expect. The 0.05 floor avoids degenerate zero-quality requests
/// some encoders reject.
pub fn quality_to_float(quality: u8) -> f32 {
    (quality.min(100) as f32 / 100.0).clamp(0.05, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn canonical_extensions() {
        assert_eq!(OutputFormat::Jpeg.canonical_extension(), "jpg");
        assert_eq!(OutputFormat::Png.canonical_extension(), "png");
        assert_eq!(OutputFormat::Webp.canonical_extension(), "webp");
        assert_eq!(OutputFormat::Gif.canonical_extension(), "gif");
    }

    #[test]
    fn gif_merge_overrides_only_set_fields() {
        let base = GifOptions::default();
        let patch = GifOptionsPatch {
            color_count: Some(16),
            dithering: Some(Dithering::None),
            ..Default::default()
        };
        let merged = base.merged(&patch);
        assert_eq!(merged.color_count, 16);
        assert_eq!(merged.dithering, Dithering::None);
        assert_eq!(merged.preserve_alpha, base.preserve_alpha);
        assert_eq!(merged.background_color, base.background_color);
        // merging never mutates the defaults
        assert_eq!(base, GifOptions::default());
    }

    #[test]
    fn png_merge_overrides_only_set_fields() {
        let base = PngOptions::default();
        let patch = PngOptionsPatch {
            reduce_colors: Some(true),
            interlaced: Some(true),
            ..Default::default()
        };
        let merged = base.merged(&patch);
        assert!(merged.reduce_colors);
        assert!(merged.interlaced);
        assert_eq!(merged.color_count, base.color_count);
        assert_eq!(base, PngOptions::default());
    }

    #[test]
    fn quality_normalization_has_a_floor() {
        assert_eq!(quality_to_float(0), 0.05);
        assert_eq!(quality_to_float(1), 0.05);
        assert_eq!(quality_to_float(50), 0.5);
        assert_eq!(quality_to_float(100), 1.0);
        assert_eq!(quality_to_float(200), 1.0);
    }

    #[test]
    fn request_deserializes_from_tagged_json() {
        let req: ConversionRequest =
            serde_json::from_str(r#"{"format": "gif", "color_count": 32}"#).unwrap();
        match req {
            ConversionRequest::Gif(opts) => {
                assert_eq!(opts.color_count, 32);
                assert_eq!(opts.dithering, Dithering::FloydSteinberg);
            }
            other => panic!("expected gif request, got {other:?}"),
        }

        let req: ConversionRequest = serde_json::from_str(r#"{"format": "jpeg"}"#).unwrap();
        assert_eq!(req, ConversionRequest::Jpeg { quality: 82 });
    }
}
