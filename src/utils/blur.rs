//! Gaussian blur with border-aware normalization
//!
//! The kernel has `2 * radius + 1` taps and sigma = radius / 3. Near the image
//! border only in-bounds taps contribute and the result is divided by the
//! weight actually sampled, so edges are not darkened by missing neighbors.

use rayon::prelude::*;

/// 1D Gaussian kernel normalized to sum 1; radius 0 gives the identity.
pub fn gaussian_kernel_1d(radius: u32) -> Vec<f32> {
    if radius == 0 {
        return vec![1.0];
    }
    let sigma = radius as f32 / 3.0;
    let two_sigma_sq = 2.0 * sigma * sigma;
    let r = radius as i32;
    let mut kernel: Vec<f32> = (-r..=r)
        .map(|d| (-((d * d) as f32) / two_sigma_sq).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for k in &mut kernel {
        *k /= sum;
    }
    kernel
}

/// 2D Gaussian kernel (row-major, normalized to sum 1)
pub fn gaussian_kernel_2d(radius: u32) -> Vec<f32> {
    let k = gaussian_kernel_1d(radius);
    let mut kernel = Vec::with_capacity(k.len() * k.len());
    for ky in &k {
        for kx in &k {
            kernel.push(ky * kx);
        }
    }
    kernel
}

/// Direct 2D convolution, O(width * height * kernel area)
///
/// Kept as the reference the separable version is checked against.
pub fn gaussian_blur_reference(src: &[u8], width: usize, height: usize, radius: u32) -> Vec<u8> {
    let kernel = gaussian_kernel_2d(radius);
    let size = 2 * radius as usize + 1;
    let half = radius as isize;
    let mut out = vec![0u8; width * height];
    if out.is_empty() {
        return out;
    }

    out.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        for (x, dst) in row.iter_mut().enumerate() {
            let mut sum = 0.0f32;
            let mut weight_sum = 0.0f32;
            for ky in 0..size {
                let ny = y as isize + ky as isize - half;
                if ny < 0 || ny >= height as isize {
                    continue;
                }
                for kx in 0..size {
                    let nx = x as isize + kx as isize - half;
                    if nx < 0 || nx >= width as isize {
                        continue;
                    }
                    let w = kernel[ky * size + kx];
                    sum += src[ny as usize * width + nx as usize] as f32 * w;
                    weight_sum += w;
                }
            }
            *dst = if weight_sum > 0.0 {
                (sum / weight_sum).round().clamp(0.0, 255.0) as u8
            } else {
                src[y * width + x]
            };
        }
    });

    out
}

/// Separable blur: a horizontal then a vertical 1D pass
///
/// The in-bounds window of the 2D kernel is always a rectangle, so
/// normalizing each pass by its own sampled weight gives the same result as
/// the direct convolution, up to float rounding (at most one gray level).
pub fn gaussian_blur(src: &[u8], width: usize, height: usize, radius: u32) -> Vec<u8> {
    let mut scratch = vec![0f32; width * height];
    let mut out = vec![0u8; width * height];
    gaussian_blur_with_buffer(src, width, height, radius, &mut scratch, &mut out);
    out
}

/// Separable blur into caller-provided buffers (see [`crate::utils::memory_pool`])
pub fn gaussian_blur_with_buffer(
    src: &[u8],
    width: usize,
    height: usize,
    radius: u32,
    scratch: &mut [f32],
    out: &mut [u8],
) {
    let pixel_count = width * height;
    assert!(
        scratch.len() >= pixel_count && out.len() >= pixel_count,
        "Blur buffers too small"
    );
    if pixel_count == 0 {
        return;
    }

    let kernel = gaussian_kernel_1d(radius);
    let half = radius as isize;

    // Horizontal pass
    scratch[..pixel_count]
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let src_row = &src[y * width..(y + 1) * width];
            for (x, dst) in row.iter_mut().enumerate() {
                *dst = weighted_mean(&kernel, half, x, width, |i| src_row[i] as f32);
            }
        });

    // Vertical pass
    let scratch = &scratch[..pixel_count];
    out[..pixel_count]
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, dst) in row.iter_mut().enumerate() {
                let v = weighted_mean(&kernel, half, y, height, |i| scratch[i * width + x]);
                *dst = v.round().clamp(0.0, 255.0) as u8;
            }
        });
}

/// Kernel-weighted mean of the in-bounds samples around `center` along one axis
#[inline]
fn weighted_mean(
    kernel: &[f32],
    half: isize,
    center: usize,
    len: usize,
    sample: impl Fn(usize) -> f32,
) -> f32 {
    let mut sum = 0.0f32;
    let mut weight_sum = 0.0f32;
    for (k, &w) in kernel.iter().enumerate() {
        let i = center as isize + k as isize - half;
        if i < 0 || i >= len as isize {
            continue;
        }
        sum += sample(i as usize) * w;
        weight_sum += w;
    }
    if weight_sum > 0.0 { sum / weight_sum } else { 0.0 }
}
