use crate::error::{OmrError, Result};
use crate::models::{BitMatrix, RasterImage};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fs;
use std::path::{Path, PathBuf};

const DATA_URI_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// Decode encoded image bytes (PNG, JPEG, ...) into an RGBA raster.
///
/// The raster keeps the source resolution; layout coordinates are in its pixels.
pub fn load_from_bytes(bytes: &[u8]) -> Result<RasterImage> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

/// Load an image file as an RGBA raster.
pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<RasterImage> {
    Ok(image::open(path)?.to_rgba8())
}

/// Extract the raw bytes from a `data:<mime>;base64,<payload>` URI.
///
/// A string without the `data:` prefix is decoded as bare base64.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let uri = uri.trim();
    let payload = if uri.starts_with(DATA_URI_PREFIX) {
        let Some(pos) = uri.find(BASE64_MARKER) else {
            return Err(OmrError::data_uri("missing ;base64, marker"));
        };
        &uri[pos + BASE64_MARKER.len()..]
    } else {
        uri
    };
    if payload.is_empty() {
        return Err(OmrError::data_uri("empty payload"));
    }
    STANDARD
        .decode(payload)
        .map_err(|e| OmrError::data_uri(format!("invalid base64: {e}")))
}

/// Decode an image carried in a data URI.
pub fn load_from_data_uri(uri: &str) -> Result<RasterImage> {
    load_from_bytes(&decode_data_uri(uri)?)
}

/// Summary statistics for grayscale data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrayStats {
    /// Minimum grayscale value.
    pub min: u8,
    /// Maximum grayscale value.
    pub max: u8,
    /// Average grayscale value.
    pub avg: u8,
}

/// Summary statistics for a binary matrix.
#[derive(Debug, Clone, Copy)]
pub struct BinaryStats {
    /// Count of black pixels.
    pub black_pixels: usize,
    /// Total pixels in the matrix.
    pub total_pixels: usize,
    /// Ratio of black pixels to total pixels.
    pub black_ratio: f64,
}

/// Compute min/max/avg for grayscale values.
pub fn grayscale_stats(gray: &[u8]) -> GrayStats {
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    let mut sum: u64 = 0;
    for &v in gray {
        min = min.min(v);
        max = max.max(v);
        sum += v as u64;
    }
    if gray.is_empty() {
        return GrayStats { min: 0, max: 0, avg: 0 };
    }
    let avg = (sum / gray.len() as u64) as u8;
    GrayStats { min, max, avg }
}

/// Compute black pixel stats for a binary matrix.
pub fn binary_stats(binary: &BitMatrix) -> BinaryStats {
    let black = binary.count_set();
    let total = binary.width() * binary.height();
    let ratio = if total == 0 {
        0.0
    } else {
        black as f64 / total as f64
    };
    BinaryStats {
        black_pixels: black,
        total_pixels: total,
        black_ratio: ratio,
    }
}

/// Sheet images under `root`, sorted; `root` itself when it is a file.
pub fn sheet_images<P: AsRef<Path>>(root: P) -> Vec<PathBuf> {
    let root = root.as_ref();
    if root.is_file() {
        return vec![root.to_path_buf()];
    }

    let mut stack = vec![root.to_path_buf()];
    let mut images = Vec::new();

    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if let Some(ext) = path.extension() {
                let ext = ext.to_string_lossy().to_lowercase();
                if ext == "png" || ext == "jpg" || ext == "jpeg" || ext == "gif" || ext == "bmp" {
                    images.push(path);
                }
            }
        }
    }

    images.sort();
    images
}
