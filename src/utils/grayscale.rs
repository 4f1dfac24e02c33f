//! Convert RGBA pixels to luminosity
//! Y = 0.299*R + 0.587*G + 0.114*B (ITU-R BT.601)
//!
//! Rows are converted in parallel with rayon; alpha is ignored.

use rayon::prelude::*;

/// Coefficients for grayscale conversion
const COEF_R: f32 = 0.299;
const COEF_G: f32 = 0.587;
const COEF_B: f32 = 0.114;

/// Luminosity of one pixel, rounded to the nearest level
#[inline]
pub fn luminosity(r: u8, g: u8, b: u8) -> u8 {
    let lum = COEF_R * r as f32 + COEF_G * g as f32 + COEF_B * b as f32;
    lum.round().min(255.0) as u8
}

/// Convert an RGBA buffer into a luminosity plane
pub fn rgba_to_grayscale(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut gray = vec![0u8; width * height];
    rgba_to_grayscale_with_buffer(rgba, width, height, &mut gray);
    gray
}

/// Convert RGBA to grayscale using a pre-allocated buffer (no allocation)
///
/// # Returns
/// Number of pixels written (width * height)
pub fn rgba_to_grayscale_with_buffer(
    rgba: &[u8],
    width: usize,
    height: usize,
    output: &mut [u8],
) -> usize {
    let pixel_count = width * height;
    assert!(output.len() >= pixel_count, "Output buffer too small");
    if pixel_count == 0 {
        return 0;
    }

    output[..pixel_count]
        .par_chunks_mut(width)
        .zip(rgba.par_chunks(width * 4))
        .for_each(|(row, src)| {
            for (dst, px) in row.iter_mut().zip(src.chunks_exact(4)) {
                *dst = luminosity(px[0], px[1], px[2]);
            }
        });

    pixel_count
}
