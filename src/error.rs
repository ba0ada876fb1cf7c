use thiserror::Error;

/// Errors produced while converting an image from one format to another.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Unsupported dimensions: {width}x{height}")]
    BadGeometry { width: u32, height: u32 },

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Quantization error: {0}")]
    Quantize(#[from] quant_dither::QuantizeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for ConvertError {
    fn from(e: image::ImageError) -> Self {
        match e {
            image::ImageError::Decoding(inner) => ConvertError::Decode(inner.to_string()),
            image::ImageError::Encoding(inner) => ConvertError::Encode(inner.to_string()),
            image::ImageError::IoError(inner) => ConvertError::Io(inner),
            other => ConvertError::Decode(other.to_string()),
        }
    }
}
