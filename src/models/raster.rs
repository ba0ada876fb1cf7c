use crate::error::ConvertError;

/// A decoded image: width x height RGBA8 pixels, row-major, unpremultiplied
/// alpha.
///
/// Produced once per conversion by a codec decode; the conversion pipeline
/// works on private copies, the decoded raster itself is never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterImage {
    /// Wrap a pixel buffer, validating its geometry.
    ///
    /// # Errors
    ///
    /// [`ConvertError::BadGeometry`] for zero dimensions or when the buffer
    /// length does not match `width * height * 4`.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, ConvertError> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(ConvertError::BadGeometry { width, height });
        }
        Ok(Self { width, height, pixels })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Raw RGBA bytes, 4 per pixel.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// A mutable working copy of the pixel buffer.
    pub fn pixels_cloned(&self) -> Vec<u8> {
        self.pixels.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_matching_geometry() {
        let img = RasterImage::new(2, 3, vec![0; 2 * 3 * 4]).unwrap();
        assert_eq!(img.width(), 2);
        assert_eq!(img.height(), 3);
        assert_eq!(img.pixel_count(), 6);
    }

    #[test]
    fn rejects_zero_dimensions() {
        assert!(matches!(
            RasterImage::new(0, 3, Vec::new()),
            Err(ConvertError::BadGeometry { width: 0, height: 3 })
        ));
        assert!(matches!(
            RasterImage::new(3, 0, Vec::new()),
            Err(ConvertError::BadGeometry { .. })
        ));
    }

    #[test]
    fn rejects_mismatched_buffer_length() {
        assert!(matches!(
            RasterImage::new(2, 2, vec![0; 15]),
            Err(ConvertError::BadGeometry { .. })
        ));
    }
}
