//! Binarization of intensity planes into 0 (ink) / 255 (paper)
//!
//! - Adaptive threshold against the local mean (integral image, O(1) per pixel)
//! - Global threshold with a fixed cut
//! - Otsu's method for picking the global cut

use rayon::prelude::*;

/// Ink value in binarized planes
pub const BLACK: u8 = 0;
/// Paper value in binarized planes
pub const WHITE: u8 = 255;

/// Clipped window `[lo, hi]` of half-size `half` around `center` along an axis of `len`
#[inline]
fn window(center: usize, half: usize, len: usize) -> (usize, usize) {
    (center.saturating_sub(half), (center + half).min(len - 1))
}

#[inline]
fn classify(pixel: u8, sum: u64, count: u64, bias: f64) -> u8 {
    let mean = if count > 0 { sum as f64 / count as f64 } else { 128.0 };
    if (pixel as f64) < mean - bias { BLACK } else { WHITE }
}

/// Adaptive threshold by direct window summation, O(width * height * block^2)
///
/// The window is `2 * (block_size / 2) + 1` pixels square, clipped at the
/// image bounds. Kept as the reference for [`adaptive_threshold`].
pub fn adaptive_threshold_reference(
    gray: &[u8],
    width: usize,
    height: usize,
    block_size: u32,
    bias: f64,
) -> Vec<u8> {
    let half = (block_size / 2) as usize;
    let mut out = vec![WHITE; width * height];
    if out.is_empty() {
        return out;
    }

    out.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let (y0, y1) = window(y, half, height);
        for (x, dst) in row.iter_mut().enumerate() {
            let (x0, x1) = window(x, half, width);
            let mut sum = 0u64;
            for ny in y0..=y1 {
                sum += gray[ny * width + x0..=ny * width + x1]
                    .iter()
                    .map(|&v| v as u64)
                    .sum::<u64>();
            }
            let count = ((x1 - x0 + 1) * (y1 - y0 + 1)) as u64;
            *dst = classify(gray[y * width + x], sum, count, bias);
        }
    });

    out
}

/// Adaptive threshold using an integral image
///
/// Window sums are exact integers, so the output is identical to
/// [`adaptive_threshold_reference`].
pub fn adaptive_threshold(
    gray: &[u8],
    width: usize,
    height: usize,
    block_size: u32,
    bias: f64,
) -> Vec<u8> {
    let mut integral = vec![0u64; (width + 1) * (height + 1)];
    let mut out = vec![WHITE; width * height];
    adaptive_threshold_with_buffer(gray, width, height, block_size, bias, &mut integral, &mut out);
    out
}

/// Adaptive threshold into caller-provided buffers
///
/// `integral` needs `(width + 1) * (height + 1)` entries.
pub fn adaptive_threshold_with_buffer(
    gray: &[u8],
    width: usize,
    height: usize,
    block_size: u32,
    bias: f64,
    integral: &mut [u64],
    out: &mut [u8],
) {
    let pixel_count = width * height;
    let stride = width + 1;
    assert!(
        integral.len() >= stride * (height + 1) && out.len() >= pixel_count,
        "Threshold buffers too small"
    );
    if pixel_count == 0 {
        return;
    }

    build_integral(gray, width, height, integral);

    let half = (block_size / 2) as usize;
    let integral = &integral[..stride * (height + 1)];
    out[..pixel_count]
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let (y0, y1) = window(y, half, height);
            for (x, dst) in row.iter_mut().enumerate() {
                let (x0, x1) = window(x, half, width);
                let sum = integral[(y1 + 1) * stride + x1 + 1] + integral[y0 * stride + x0]
                    - integral[y0 * stride + x1 + 1]
                    - integral[(y1 + 1) * stride + x0];
                let count = ((x1 - x0 + 1) * (y1 - y0 + 1)) as u64;
                *dst = classify(gray[y * width + x], sum, count, bias);
            }
        });
}

/// Summed-area table with a zero first row and column
fn build_integral(gray: &[u8], width: usize, height: usize, integral: &mut [u64]) {
    let stride = width + 1;
    integral[..stride].fill(0);
    for y in 0..height {
        integral[(y + 1) * stride] = 0;
        let mut row_sum = 0u64;
        for x in 0..width {
            row_sum += gray[y * width + x] as u64;
            integral[(y + 1) * stride + x + 1] = integral[y * stride + x + 1] + row_sum;
        }
    }
}

/// Simple global threshold binarization
pub fn threshold_binarize(gray: &[u8], threshold: u8) -> Vec<u8> {
    gray.par_iter()
        .map(|&v| if v < threshold { BLACK } else { WHITE })
        .collect()
}

/// Convert grayscale image to binary using Otsu's thresholding method
pub fn otsu_binarize(gray: &[u8]) -> Vec<u8> {
    threshold_binarize(gray, calculate_otsu_threshold(gray))
}

/// Calculate Otsu's optimal threshold
///
/// Pixels strictly below the returned value form the dark class.
pub fn calculate_otsu_threshold(gray: &[u8]) -> u8 {
    let mut histogram = [0u64; 256];
    for &pixel in gray {
        histogram[pixel as usize] += 1;
    }

    let total = gray.len() as f64;
    let total_sum: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &c)| i as f64 * c as f64)
        .sum();

    let mut max_variance = 0.0;
    let mut optimal_threshold = 128u8;
    let mut dark_count = 0.0f64;
    let mut dark_sum = 0.0f64;

    // Candidate threshold t puts intensities 0..t in the dark class
    for t in 1..=255usize {
        dark_count += histogram[t - 1] as f64;
        dark_sum += (t - 1) as f64 * histogram[t - 1] as f64;
        let light_count = total - dark_count;
        if dark_count == 0.0 || light_count == 0.0 {
            continue;
        }

        let dark_mean = dark_sum / dark_count;
        let light_mean = (total_sum - dark_sum) / light_count;
        let variance =
            (dark_count / total) * (light_count / total) * (dark_mean - light_mean).powi(2);

        if variance > max_variance {
            max_variance = variance;
            optimal_threshold = t as u8;
        }
    }

    optimal_threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_with_marks(width: usize, height: usize) -> Vec<u8> {
        // Uneven lighting from left to right with a few dark dots on top
        let mut gray: Vec<u8> = (0..width * height)
            .map(|i| (120 + (i % width) * 120 / width) as u8)
            .collect();
        for (x, y) in [(3, 3), (10, 8), (20, 12), (width - 2, height - 2)] {
            gray[y * width + x] = 30;
        }
        gray
    }

    #[test]
    fn test_threshold_binarize() {
        let gray = vec![100, 150, 200, 50]; // 2x2 image
        assert_eq!(threshold_binarize(&gray, 128), vec![0, 255, 255, 0]);
    }

    #[test]
    fn test_otsu_binarize() {
        // Create a simple two-class image
        let mut gray = vec![50u8; 50]; // Dark class
        gray.extend(vec![200u8; 50]); // Light class

        let threshold = calculate_otsu_threshold(&gray);
        assert!(threshold > 50 && threshold <= 200);

        let binary = otsu_binarize(&gray);
        assert_eq!(binary[0], BLACK);
        assert_eq!(binary[70], WHITE);
    }

    #[test]
    fn test_adaptive_output_is_binary() {
        let (w, h) = (31, 17);
        let out = adaptive_threshold(&gradient_with_marks(w, h), w, h, 7, 10.0);
        assert_eq!(out.len(), w * h);
        assert!(out.iter().all(|&v| v == BLACK || v == WHITE));
    }

    #[test]
    fn test_integral_matches_reference() {
        let (w, h) = (31, 17);
        let gray = gradient_with_marks(w, h);
        for block in [3, 7, 35] {
            assert_eq!(
                adaptive_threshold(&gray, w, h, block, 10.0),
                adaptive_threshold_reference(&gray, w, h, block, 10.0),
                "block {block}"
            );
        }
    }

    #[test]
    fn test_adaptive_finds_marks_under_uneven_light() {
        let (w, h) = (31, 17);
        let out = adaptive_threshold(&gradient_with_marks(w, h), w, h, 7, 10.0);
        assert_eq!(out[3 * w + 3], BLACK);
        assert_eq!(out[12 * w + 20], BLACK);
        assert_eq!(out[(h - 2) * w + w - 2], BLACK);
        // Smooth background stays paper
        assert_eq!(out[5 * w + 15], WHITE);
    }

    #[test]
    fn test_flat_dark_region_is_white() {
        // A pixel equal to its local mean is never below mean - bias
        let gray = vec![10u8; 25];
        assert!(adaptive_threshold(&gray, 5, 5, 3, 10.0).iter().all(|&v| v == WHITE));
    }

    #[test]
    fn test_empty_image() {
        assert!(adaptive_threshold(&[], 0, 0, 35, 10.0).is_empty());
        assert!(adaptive_threshold_reference(&[], 0, 3, 35, 10.0).is_empty());
        assert!(otsu_binarize(&[]).is_empty());
    }
}
