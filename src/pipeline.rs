//! End-to-end grading of one answer sheet

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use crate::config::{AnswerSheetConfig, ConfigOverrides, OmrConfig};
use crate::detector::{BubbleDetector, QrDetector};
use crate::error::Result;
use crate::layout::AnswerSheetLayout;
use crate::models::{ProcessingResult, RasterImage};
use crate::preprocess::ImagePreprocessor;
use crate::tools::{load_from_bytes, load_from_data_uri, load_from_path};
use crate::utils::memory_pool::BufferPool;

/// Grades answer sheets: identity from the QR code, answers from the bubbles.
///
/// Every grading call takes `&mut self`, so one processor grades one sheet at
/// a time. Give each worker thread its own processor.
pub struct OmrProcessor {
    config: OmrConfig,
    preprocessor: ImagePreprocessor,
    qr_detector: QrDetector,
    layout: AnswerSheetLayout,
    /// Optional buffer pool for memory reuse
    pool: Option<BufferPool>,
}

impl OmrProcessor {
    /// Create a processor for a sheet config with default tuning
    pub fn new(sheet: AnswerSheetConfig) -> Self {
        Self::with_config(OmrConfig::for_sheet(sheet))
    }

    /// Create a processor from a full config
    pub fn with_config(config: OmrConfig) -> Self {
        Self {
            preprocessor: ImagePreprocessor::new(config.preprocess.clone()),
            qr_detector: QrDetector::new(),
            layout: AnswerSheetLayout::with_geometry(config.sheet.clone(), config.layout.clone()),
            pool: None,
            config,
        }
    }

    /// Enable buffer pooling for repeated calls
    pub fn with_pool(mut self) -> Self {
        self.pool = Some(BufferPool::new());
        self
    }

    /// Current sheet configuration
    pub fn config(&self) -> &AnswerSheetConfig {
        self.layout.config()
    }

    /// Merge overrides into the sheet configuration.
    ///
    /// On error nothing changes.
    pub fn update_config(&mut self, overrides: &ConfigOverrides) -> Result<()> {
        self.layout.update_config(overrides)?;
        self.config.sheet = self.layout.config().clone();
        Ok(())
    }

    /// Grade encoded image bytes (PNG, JPEG, ...).
    pub fn process_answer_sheet(&mut self, bytes: &[u8], num_questions: usize) -> Result<ProcessingResult> {
        let start = Instant::now();
        let image = load_from_bytes(bytes)?;
        self.grade(&image, num_questions, start)
    }

    /// Grade an image carried in a `data:image/...;base64,` URI.
    pub fn process_data_uri(&mut self, uri: &str, num_questions: usize) -> Result<ProcessingResult> {
        let start = Instant::now();
        let image = load_from_data_uri(uri)?;
        self.grade(&image, num_questions, start)
    }

    /// Grade an image file.
    pub fn process_path<P: AsRef<Path>>(&mut self, path: P, num_questions: usize) -> Result<ProcessingResult> {
        let start = Instant::now();
        let image = load_from_path(path)?;
        self.grade(&image, num_questions, start)
    }

    /// Grade an already decoded image.
    pub fn process_image(&mut self, image: &RasterImage, num_questions: usize) -> Result<ProcessingResult> {
        self.grade(image, num_questions, Instant::now())
    }

    /// Clear the internal buffer pool (keeps capacity)
    pub fn clear_pool(&mut self) {
        if let Some(pool) = &mut self.pool {
            pool.clear();
        }
    }

    #[instrument(level = "debug", skip(self, image, start), fields(width = image.width(), height = image.height()))]
    fn grade(&mut self, image: &RasterImage, num_questions: usize, start: Instant) -> Result<ProcessingResult> {
        self.update_config(&ConfigOverrides::questions(num_questions))?;
        let (width, height) = image.dimensions();

        let qr_regions = self.layout.qr_search_regions(width, height);
        let qr_detector = &self.qr_detector;
        let preprocessor = &self.preprocessor;
        let pool = self.pool.as_mut();

        let (student_info, binary) = rayon::join(
            || qr_detector.detect_in_regions(image, &qr_regions),
            || match pool {
                Some(pool) => preprocessor.preprocess_with_pool(image, pool),
                None => preprocessor.preprocess(image),
            },
        );
        if student_info.is_none() {
            warn!("no student QR code found");
        }

        let bubble_layout = self.layout.generate_bubble_layout(width, height);
        let detector = BubbleDetector::new(self.layout.config().clone());
        let bubbles = detector.detect_filled_bubbles(&binary, &bubble_layout);
        let answers = detector.determine_answers(&bubbles, num_questions);
        debug!(answers = answers.len(), "answers resolved");

        let processing_time = start.elapsed();
        info!(
            student = student_info.as_ref().map_or("-", |s| s.student_id.as_str()),
            elapsed_ms = processing_time.as_secs_f64() * 1000.0,
            "sheet graded"
        );

        Ok(ProcessingResult {
            student_info,
            answers,
            detected_bubbles: self.config.include_bubbles.then_some(bubbles),
            processing_time,
        })
    }
}

impl Default for OmrProcessor {
    fn default() -> Self {
        Self::with_config(OmrConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OmrError;
    use crate::models::raster::filled;

    #[test]
    fn test_corrupt_bytes_fail_to_load() {
        let mut processor = OmrProcessor::default();
        let err = processor.process_answer_sheet(b"not an image", 20).unwrap_err();
        assert!(matches!(err, OmrError::ImageLoad(_)));
        assert!(err.is_load_error());
    }

    #[test]
    fn test_question_count_is_validated() {
        let mut processor = OmrProcessor::default();
        let page = filled(200, 300, [255, 255, 255, 255]);
        assert!(matches!(processor.process_image(&page, 0), Err(OmrError::Config(_))));
        assert!(matches!(processor.process_image(&page, 151), Err(OmrError::Config(_))));
        assert_eq!(processor.config().num_questions, 120);
    }

    #[test]
    fn test_blank_page_defaults() {
        let mut processor = OmrProcessor::default();
        let page = filled(400, 500, [255, 255, 255, 255]);
        let result = processor.process_image(&page, 12).unwrap();
        assert_eq!(result.student_info, None);
        assert_eq!(result.answers, vec!["A"; 12]);
        assert_eq!(result.detected_bubbles.as_ref().map(Vec::len), Some(48));
        assert_eq!(processor.config().num_questions, 12);
    }

    #[test]
    fn test_bubbles_can_be_omitted() {
        let mut processor = OmrProcessor::with_config(OmrConfig {
            include_bubbles: false,
            ..OmrConfig::default()
        })
        .with_pool();
        let page = filled(400, 500, [255, 255, 255, 255]);
        let result = processor.process_image(&page, 5).unwrap();
        assert!(result.detected_bubbles.is_none());
        assert_eq!(result.answers.len(), 5);
    }
}
