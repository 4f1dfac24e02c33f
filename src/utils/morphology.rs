//! Grayscale morphology with a square kernel
//!
//! A square max/min filter is separable: filtering rows and then columns
//! gives exactly the same result as scanning the whole square.

use rayon::prelude::*;

/// Dilation: every pixel becomes the maximum of its neighborhood (grows white)
pub fn dilate(src: &[u8], width: usize, height: usize, kernel_size: u32) -> Vec<u8> {
    rank_filter(src, width, height, kernel_size, u8::max)
}

/// Erosion: every pixel becomes the minimum of its neighborhood (grows black)
pub fn erode(src: &[u8], width: usize, height: usize, kernel_size: u32) -> Vec<u8> {
    rank_filter(src, width, height, kernel_size, u8::min)
}

/// Dilation followed by erosion with the same kernel
pub fn close(src: &[u8], width: usize, height: usize, kernel_size: u32) -> Vec<u8> {
    let dilated = dilate(src, width, height, kernel_size);
    erode(&dilated, width, height, kernel_size)
}

fn rank_filter(
    src: &[u8],
    width: usize,
    height: usize,
    kernel_size: u32,
    pick: fn(u8, u8) -> u8,
) -> Vec<u8> {
    let pixel_count = width * height;
    if pixel_count == 0 {
        return Vec::new();
    }
    let half = (kernel_size / 2) as usize;

    let mut rows = vec![0u8; pixel_count];
    rows.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let src_row = &src[y * width..(y + 1) * width];
        for (x, dst) in row.iter_mut().enumerate() {
            let lo = x.saturating_sub(half);
            let hi = (x + half).min(width - 1);
            *dst = src_row[lo..=hi].iter().copied().fold(src_row[x], pick);
        }
    });

    let mut out = vec![0u8; pixel_count];
    out.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let lo = y.saturating_sub(half);
        let hi = (y + half).min(height - 1);
        for (x, dst) in row.iter_mut().enumerate() {
            *dst = (lo..=hi).map(|ny| rows[ny * width + x]).fold(rows[y * width + x], pick);
        }
    });

    out
}
