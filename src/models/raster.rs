use image::{Rgba, RgbaImage};

/// RGBA pixel grid flowing between pipeline stages.
///
/// Stages never mutate their input; each one returns a fresh buffer with the
/// same dimensions.
pub type RasterImage = RgbaImage;

/// Read channel 0 of every pixel into a row-major intensity plane.
///
/// After grayscale conversion R = G = B, so the red channel is the intensity.
pub fn intensity_plane(image: &RasterImage) -> Vec<u8> {
    image.as_raw().chunks_exact(4).map(|px| px[0]).collect()
}

/// Expand an intensity plane into an opaque gray RGBA image.
pub fn from_intensity_plane(width: u32, height: u32, plane: &[u8]) -> RasterImage {
    let mut raw = Vec::with_capacity(plane.len() * 4);
    for &v in plane {
        raw.extend_from_slice(&[v, v, v, 255]);
    }
    RgbaImage::from_raw(width, height, raw).unwrap_or_else(|| RgbaImage::new(width, height))
}

/// Solid image of one color, handy for tests and placeholder pages.
pub fn filled(width: u32, height: u32, color: [u8; 4]) -> RasterImage {
    RgbaImage::from_pixel(width, height, Rgba(color))
}
