//! Student QR lookup in known page regions

use image::imageops::crop_imm;
use tracing::{debug, trace};

use crate::decoder::{decode_symbol, parse_student_info};
use crate::models::{RasterImage, Rect, StudentInfo};

/// Finds and parses the student identity code printed on a sheet.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrDetector;

impl QrDetector {
    /// Create a detector.
    pub fn new() -> Self {
        Self
    }

    /// Decode a QR symbol anywhere in `image` and parse its payload.
    pub fn detect_qr_code(&self, image: &RasterImage) -> Option<StudentInfo> {
        let payload = decode_symbol(image)?;
        trace!(len = payload.len(), "decoded QR payload");
        parse_student_info(&payload)
    }

    /// Try each region in order and return the first identity that decodes.
    ///
    /// Regions are clipped to the image; ones falling entirely outside are skipped.
    pub fn detect_in_regions(&self, image: &RasterImage, regions: &[Rect]) -> Option<StudentInfo> {
        for (index, region) in regions.iter().enumerate() {
            let Some(crop) = self.extract_region(image, region) else {
                trace!(index, ?region, "region outside image");
                continue;
            };
            if let Some(info) = self.detect_qr_code(&crop) {
                debug!(index, student_id = %info.student_id, "student QR found");
                return Some(info);
            }
        }
        None
    }

    /// Copy a region into a standalone image, clipped to the page.
    pub fn extract_region(&self, image: &RasterImage, region: &Rect) -> Option<RasterImage> {
        let clipped = region.clip_to(image.width(), image.height())?;
        Some(crop_imm(image, clipped.x, clipped.y, clipped.width, clipped.height).to_image())
    }
}
