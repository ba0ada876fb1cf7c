//! Conversion orchestrator: decode, dispatch by target format, package.

use crate::codec::{Codec, LossyFormat};
use crate::encode::{gif::encode_gif, png::encode_png};
use crate::error::ConvertError;
use crate::models::{quality_to_float, ConversionRequest, OutputFormat};

/// Result of one conversion: encoded bytes plus the source geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutput {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
}

/// Convert one source file according to `request`.
///
/// Decodes through the codec at natural dimensions (no resizing), then
/// routes: GIF and PNG go through the in-crate palette serializers, JPEG
/// and WebP go to the codec's lossy encoder with the quality normalized to
/// its float range. Failures are terminal for this job; the caller decides
/// whether to retry with different settings.
pub fn convert(
    codec: &dyn Codec,
    source: &[u8],
    request: &ConversionRequest,
) -> Result<ConversionOutput, ConvertError> {
    let raster = codec.decode(source)?;
    let (width, height) = (raster.width(), raster.height());
    tracing::debug!(width, height, format = %request.format(), "Decoded source image");

    let bytes = match request {
        ConversionRequest::Gif(options) => {
            encode_gif(raster.pixels(), width, height, options)?
        }
        ConversionRequest::Png(options) => {
            encode_png(raster.pixels(), width, height, options)?
        }
        ConversionRequest::Jpeg { quality } => {
            codec.encode_lossy(&raster, LossyFormat::Jpeg, quality_to_float(*quality))?
        }
        ConversionRequest::Webp { quality } => {
            codec.encode_lossy(&raster, LossyFormat::Webp, quality_to_float(*quality))?
        }
    };

    Ok(ConversionOutput {
        bytes,
        format: request.format(),
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GifOptions, RasterImage};

    /// Codec stub that "decodes" any input to a fixed raster and records
    /// lossy encode calls.
    struct StubCodec {
        raster: RasterImage,
    }

    impl Codec for StubCodec {
        fn decode(&self, bytes: &[u8]) -> Result<RasterImage, ConvertError> {
            if bytes.is_empty() {
                return Err(ConvertError::Decode("empty input".into()));
            }
            Ok(self.raster.clone())
        }

        fn encode_lossy(
            &self,
            _image: &RasterImage,
            format: LossyFormat,
            quality: f32,
        ) -> Result<Vec<u8>, ConvertError> {
            assert!((0.05..=1.0).contains(&quality));
            Ok(match format {
                LossyFormat::Jpeg => vec![0xFF, 0xD8],
                LossyFormat::Webp => b"RIFF".to_vec(),
            })
        }
    }

    fn stub() -> StubCodec {
        StubCodec {
            raster: RasterImage::new(2, 2, vec![128; 16]).unwrap(),
        }
    }

    #[test]
    fn decode_failure_is_terminal() {
        let err = convert(&stub(), &[], &ConversionRequest::for_format(OutputFormat::Png))
            .unwrap_err();
        assert!(matches!(err, ConvertError::Decode(_)));
    }

    #[test]
    fn gif_request_routes_to_the_gif_serializer() {
        let out = convert(
            &stub(),
            b"x",
            &ConversionRequest::Gif(GifOptions::default()),
        )
        .unwrap();
        assert_eq!(out.format, OutputFormat::Gif);
        assert_eq!(&out.bytes[..6], b"GIF89a");
        assert_eq!((out.width, out.height), (2, 2));
    }

    #[test]
    fn jpeg_request_normalizes_quality_for_the_codec() {
        let out = convert(&stub(), b"x", &ConversionRequest::Jpeg { quality: 0 }).unwrap();
        assert_eq!(out.bytes, vec![0xFF, 0xD8]);
        assert_eq!(out.format, OutputFormat::Jpeg);
    }

    #[test]
    fn png_request_produces_png_bytes() {
        let out = convert(&stub(), b"x", &ConversionRequest::for_format(OutputFormat::Png))
            .unwrap();
        assert_eq!(&out.bytes[1..4], b"PNG");
    }
}
