//! Floyd–Steinberg error-diffusion dithering.

use crate::palette::Palette;

/// Pixels at or above this alpha take part in dithering when the palette
/// preserves alpha; anything below maps straight to the transparent slot.
const OPACITY_THRESHOLD: u8 = 128;

/// Dither an RGBA buffer against `palette`, returning one palette index per
/// pixel.
///
/// Classic serpentine-free raster scan: each pixel snaps to its nearest
/// palette entry and the RGB quantization error spreads to the four
/// not-yet-visited neighbors with the standard 7/16, 3/16, 5/16, 1/16
/// weights. Alpha error is never diffused.
///
/// When the palette was built under an alpha-preserving format, pixels below
/// 50% opacity are assigned the palette's transparent entry (when present)
/// and contribute no error. With an alpha-free palette every pixel is
/// treated as opaque.
///
/// `pixels` must hold exactly `width * height` RGBA pixels; extra trailing
/// bytes are ignored, a short buffer only dithers the pixels present.
pub fn floyd_steinberg(pixels: &[u8], width: usize, height: usize, palette: &Palette) -> Vec<u8> {
    let alpha_aware = palette.format().preserves_alpha();
    let transparent = palette.transparent_index();
    let count = (width * height).min(pixels.len() / 4);

    // Working copy in f32 so accumulated error survives between pixels.
    let mut work: Vec<f32> = pixels[..count * 4].iter().map(|&v| v as f32).collect();
    let mut indices = vec![0u8; count];

    for y in 0..height {
        for x in 0..width {
            let i = y * width + x;
            if i >= count {
                break;
            }
            let base = i * 4;
            let r = work[base].round().clamp(0.0, 255.0) as u8;
            let g = work[base + 1].round().clamp(0.0, 255.0) as u8;
            let b = work[base + 2].round().clamp(0.0, 255.0) as u8;
            let a = work[base + 3].round().clamp(0.0, 255.0) as u8;

            if alpha_aware && a < OPACITY_THRESHOLD {
                if let Some(t) = transparent {
                    indices[i] = t as u8;
                    continue;
                }
            }

            let nearest = palette.find_nearest(r, g, b, a);
            indices[i] = nearest as u8;
            let chosen = palette.color(nearest);

            let err = [
                r as f32 - chosen[0] as f32,
                g as f32 - chosen[1] as f32,
                b as f32 - chosen[2] as f32,
            ];

            distribute(&mut work, width, count, x + 1, y, &err, 7.0 / 16.0);
            distribute(&mut work, width, count, x.wrapping_sub(1), y + 1, &err, 3.0 / 16.0);
            distribute(&mut work, width, count, x, y + 1, &err, 5.0 / 16.0);
            distribute(&mut work, width, count, x + 1, y + 1, &err, 1.0 / 16.0);
        }
    }

    indices
}

/// Add weighted RGB error to the pixel at `(x, y)`; silently skips
/// coordinates outside the image.
fn distribute(
    work: &mut [f32],
    width: usize,
    count: usize,
    x: usize,
    y: usize,
    err: &[f32; 3],
    weight: f32,
) {
    if x >= width {
        return;
    }
    let i = y * width + x;
    if i >= count {
        return;
    }
    let base = i * 4;
    for c in 0..3 {
        work[base + c] += err[c] * weight;
    }
}
