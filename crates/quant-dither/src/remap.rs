//! Direct pixel-to-palette index mapping (no error diffusion).

use crate::palette::Palette;

/// Map every RGBA pixel to the index of its nearest palette entry.
///
/// The output has one byte per pixel, in input order. Trailing bytes that do
/// not form a whole pixel are ignored. Use this for the no-dithering path;
/// [`floyd_steinberg`](crate::floyd_steinberg) produces an index buffer with
/// the same shape.
pub fn remap(pixels: &[u8], palette: &Palette) -> Vec<u8> {
    pixels
        .chunks_exact(4)
        .map(|px| palette.find_nearest(px[0], px[1], px[2], px[3]) as u8)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::PackFormat;

    #[test]
    fn maps_to_nearest_entries() {
        let palette = Palette::new(
            vec![[0, 0, 0, 255], [255, 255, 255, 255], [255, 0, 0, 255]],
            PackFormat::Rgb565,
        )
        .unwrap();
        let pixels = [
            5u8, 5, 5, 255, // near black
            250, 250, 250, 255, // near white
            240, 10, 10, 255, // near red
        ];
        assert_eq!(remap(&pixels, &palette), vec![0, 1, 2]);
    }

    #[test]
    fn exact_matches_map_to_themselves() {
        let colors = vec![[10, 20, 30, 255], [200, 100, 50, 255]];
        let palette = Palette::new(colors.clone(), PackFormat::Rgb565).unwrap();
        for (i, c) in colors.iter().enumerate() {
            let px = [c[0], c[1], c[2], c[3]];
            assert_eq!(remap(&px, &palette), vec![i as u8]);
        }
    }

    #[test]
    fn output_length_matches_pixel_count() {
        let palette = Palette::new(vec![[0, 0, 0, 255], [255, 255, 255, 255]], PackFormat::Rgb565)
            .unwrap();
        let pixels = vec![128u8; 4 * 37];
        assert_eq!(remap(&pixels, &palette).len(), 37);
    }
}
