//! QR symbol decoding and payload parsing
//!
//! Symbol location and error correction are delegated to `rqrr`; this module
//! feeds it luminance and turns the decoded text into a [`StudentInfo`].
//!
//! [`StudentInfo`]: crate::models::StudentInfo

/// Student identity payload parsing (JSON, pipe, comma, bare id)
pub mod payload;

pub use payload::parse_student_info;

use rqrr::PreparedImage;
use tracing::trace;

use crate::models::RasterImage;
use crate::utils::grayscale::rgba_to_grayscale;

/// Decode the first readable QR symbol in `image`, returning its text.
///
/// Every grid `rqrr` locates is tried in turn; unreadable grids are skipped.
pub fn decode_symbol(image: &RasterImage) -> Option<String> {
    let (width, height) = (image.width() as usize, image.height() as usize);
    if width == 0 || height == 0 {
        return None;
    }
    let gray = rgba_to_grayscale(image.as_raw(), width, height);

    let mut prepared = PreparedImage::prepare_from_greyscale(width, height, |x, y| gray[y * width + x]);
    let grids = prepared.detect_grids();
    trace!(grids = grids.len(), "located QR grids");

    grids.iter().find_map(|grid| match grid.decode() {
        Ok((_meta, content)) => Some(content),
        Err(err) => {
            trace!(%err, "grid did not decode");
            None
        }
    })
}
