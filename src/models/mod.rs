/// Packed dark-pixel matrix
pub mod matrix;
/// RGBA raster helpers
pub mod raster;
/// Pixel rectangles and bubble regions
pub mod region;
/// Grading results
pub mod sheet;

pub use matrix::BitMatrix;
pub use raster::RasterImage;
pub use region::{BubbleRegion, Rect};
pub use sheet::{DetectedAnswer, DetectedBubble, ProcessingResult, StudentInfo, UNKNOWN};
