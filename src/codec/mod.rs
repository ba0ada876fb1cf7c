//! Decode and lossy-encode capability behind a trait.
//!
//! The conversion pipeline never talks to an imaging library directly; it
//! goes through [`Codec`], so tests can substitute a stub and the production
//! implementation can be swapped without touching the orchestrator.

mod native;

pub use native::NativeCodec;

use crate::error::ConvertError;
use crate::models::RasterImage;

/// Formats handled by a codec's native lossy encoder. GIF and PNG have
/// their own serializers in [`crate::encode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossyFormat {
    Jpeg,
    Webp,
}

/// Image decode plus lossy encode.
pub trait Codec: Send + Sync {
    /// Decode an image file into an RGBA raster at its natural dimensions.
    fn decode(&self, bytes: &[u8]) -> Result<RasterImage, ConvertError>;

    /// Encode a raster with the codec's own serializer for `format`.
    /// `quality` is in [0.05, 1.0] (see
    /// [`quality_to_float`](crate::models::quality_to_float)).
    fn encode_lossy(
        &self,
        image: &RasterImage,
        format: LossyFormat,
        quality: f32,
    ) -> Result<Vec<u8>, ConvertError>;
}
