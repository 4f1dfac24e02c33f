//! rust_omr - Optical mark recognition for bubble answer sheets
//!
//! Grades photographed or scanned multiple-choice sheets: the student is
//! identified from a QR code printed on the page and every question is
//! answered by measuring how dark its bubbles are.
//!
//! ```no_run
//! use rust_omr::{AnswerSheetConfig, OmrProcessor};
//!
//! let mut processor = OmrProcessor::new(AnswerSheetConfig::default());
//! let result = processor.process_path("sheet.jpg", 120)?;
//! println!("{:?}: {:?}", result.student_info, result.answers);
//! # Ok::<(), rust_omr::OmrError>(())
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Sheet, preprocessing and layout configuration
pub mod config;
/// QR symbol decoding and student payload parsing
pub mod decoder;
/// Bubble, blob and QR detection
pub mod detector;
/// Error type shared by the crate
pub mod error;
/// Expected bubble and QR geometry
pub mod layout;
/// Core data structures (regions, results, bit matrix)
pub mod models;
/// End-to-end grading
pub mod pipeline;
/// Grayscale, blur, binarization and cleanup stages
pub mod preprocess;
/// Image loading and stage statistics
pub mod tools;
/// Pixel-level building blocks (grayscale, blur, thresholds, morphology, pools)
pub mod utils;

pub use config::{
    AnswerPolicy, AnswerSheetConfig, ConfigOverrides, LayoutGeometry, OmrConfig, OptionLabels,
    PreprocessConfig, ThresholdMethod, BLANK_ANSWER, MAX_QUESTIONS,
};
pub use detector::{BubbleDetector, QrDetector};
pub use error::{OmrError, Result};
pub use layout::AnswerSheetLayout;
pub use models::{
    BubbleRegion, DetectedAnswer, DetectedBubble, ProcessingResult, RasterImage, Rect,
    StudentInfo, UNKNOWN,
};
pub use pipeline::OmrProcessor;
pub use preprocess::ImagePreprocessor;

/// Grade encoded image bytes with a default processor
///
/// # Arguments
/// * `image` - Encoded image bytes (PNG, JPEG, ...)
/// * `num_questions` - Questions on the sheet, 1 to 150
///
/// # Returns
/// Student identity (if a QR code was found) and one answer per question
pub fn process_answer_sheet(image: &[u8], num_questions: usize) -> Result<ProcessingResult> {
    OmrProcessor::default().process_answer_sheet(image, num_questions)
}
