//! Configuration for answer sheets, preprocessing and layout geometry.
//!
//! Every struct deserializes with `#[serde(default)]`, so a config file only
//! needs the fields it wants to change.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{OmrError, Result};

/// Largest question count a sheet may declare.
pub const MAX_QUESTIONS: usize = 150;

/// Answer emitted for a question in strict mode when nothing is marked.
pub const BLANK_ANSWER: &str = "-";

/// How a question's answer is chosen from its bubbles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerPolicy {
    /// Always report the darkest option, even when nothing crosses the fill threshold.
    #[default]
    AlwaysDarkest,
    /// Report [`BLANK_ANSWER`] when the darkest option is not filled.
    Strict,
}

/// Preset option label sets.
pub struct OptionLabels;

impl OptionLabels {
    /// `A`, `B`, `C`, ... for `count` options.
    pub fn latin(count: usize) -> Vec<String> {
        (b'A'..=b'Z')
            .take(count)
            .map(|c| char::from(c).to_string())
            .collect()
    }

    /// The four Persian option letters used on Iranian answer sheets.
    pub fn persian() -> Vec<String> {
        ["الف", "ب", "ج", "د"].iter().map(|s| s.to_string()).collect()
    }
}

/// Declared shape of an answer sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerSheetConfig {
    /// Questions on the sheet, 1 to 150.
    pub num_questions: usize,
    /// Bubbles per question.
    pub options_per_question: usize,
    /// Advisory bubble radius in pixels. Caps the bubble size and sets blob area bounds.
    pub bubble_radius: f64,
    /// Columns the questions are split across.
    pub columns_per_page: usize,
    /// Darkness above which a bubble counts as filled, in `[0, 1]`.
    pub bubble_fill_threshold: f64,
    /// Ordered answer labels; `options.len() == options_per_question`.
    pub options: Vec<String>,
    /// How questions without a filled bubble are answered.
    pub answer_policy: AnswerPolicy,
}

impl Default for AnswerSheetConfig {
    fn default() -> Self {
        AnswerSheetConfig {
            num_questions: 120,
            options_per_question: 4,
            bubble_radius: 15.0,
            columns_per_page: 4,
            bubble_fill_threshold: 0.3,
            options: OptionLabels::latin(4),
            answer_policy: AnswerPolicy::AlwaysDarkest,
        }
    }
}

impl AnswerSheetConfig {
    /// Build a config from overrides merged onto the defaults.
    pub fn from_overrides(overrides: &ConfigOverrides) -> Result<Self> {
        let mut config = Self::default();
        config.apply(overrides)?;
        Ok(config)
    }

    /// Merge `overrides` into this config and re-validate.
    ///
    /// Changing `options_per_question` without supplying labels regenerates
    /// Latin labels of the new length. On error the config is left untouched.
    pub fn apply(&mut self, overrides: &ConfigOverrides) -> Result<()> {
        let mut next = self.clone();
        if let Some(n) = overrides.num_questions {
            next.num_questions = n;
        }
        if let Some(n) = overrides.options_per_question {
            next.options_per_question = n;
            if overrides.options.is_none() && next.options.len() != n {
                next.options = OptionLabels::latin(n);
            }
        }
        if let Some(r) = overrides.bubble_radius {
            next.bubble_radius = r;
        }
        if let Some(c) = overrides.columns_per_page {
            next.columns_per_page = c;
        }
        if let Some(t) = overrides.bubble_fill_threshold {
            next.bubble_fill_threshold = t;
        }
        if let Some(options) = &overrides.options {
            next.options = options.clone();
            if overrides.options_per_question.is_none() {
                next.options_per_question = options.len();
            }
        }
        if let Some(policy) = overrides.answer_policy {
            next.answer_policy = policy;
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Check the invariants the layout and detector rely on.
    pub fn validate(&self) -> Result<()> {
        if self.num_questions == 0 || self.num_questions > MAX_QUESTIONS {
            return Err(OmrError::config(format!(
                "num_questions must be between 1 and {MAX_QUESTIONS}, got {}",
                self.num_questions
            )));
        }
        if self.options_per_question == 0 {
            return Err(OmrError::config("options_per_question must be at least 1"));
        }
        if self.options.len() != self.options_per_question {
            return Err(OmrError::config(format!(
                "expected {} option labels, got {}",
                self.options_per_question,
                self.options.len()
            )));
        }
        if self.columns_per_page == 0 {
            return Err(OmrError::config("columns_per_page must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.bubble_fill_threshold) {
            return Err(OmrError::config(format!(
                "bubble_fill_threshold must be within [0, 1], got {}",
                self.bubble_fill_threshold
            )));
        }
        if self.bubble_radius.is_nan() || self.bubble_radius <= 0.0 {
            return Err(OmrError::config("bubble_radius must be positive"));
        }
        Ok(())
    }

    /// Questions stacked in one column before the next column starts.
    pub fn questions_per_column(&self) -> usize {
        self.num_questions.div_ceil(self.columns_per_page.max(1))
    }

    /// Label reported when a question has no bubble data at all.
    pub fn fallback_option(&self) -> &str {
        self.options.first().map(String::as_str).unwrap_or("A")
    }
}

/// Partial update for [`AnswerSheetConfig`]; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOverrides {
    /// Replaces `num_questions`.
    pub num_questions: Option<usize>,
    /// Replaces `options_per_question`.
    pub options_per_question: Option<usize>,
    /// Replaces `bubble_radius`.
    pub bubble_radius: Option<f64>,
    /// Replaces `columns_per_page`.
    pub columns_per_page: Option<usize>,
    /// Replaces `bubble_fill_threshold`.
    pub bubble_fill_threshold: Option<f64>,
    /// Replaces `options`.
    pub options: Option<Vec<String>>,
    /// Replaces `answer_policy`.
    pub answer_policy: Option<AnswerPolicy>,
}

impl ConfigOverrides {
    /// Overrides that only change the question count.
    pub fn questions(num_questions: usize) -> Self {
        Self {
            num_questions: Some(num_questions),
            ..Self::default()
        }
    }
}

/// Binarization strategy used after blurring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMethod {
    /// Local mean over a square block, minus a bias.
    #[default]
    Adaptive,
    /// One fixed cut for the whole page.
    Global(u8),
    /// Global cut chosen by Otsu's method.
    Otsu,
}

/// Tunable parameters of the preprocessing stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Gaussian blur radius in pixels; 0 skips the blur.
    pub gaussian_blur_radius: u32,
    /// Side of the adaptive threshold window in pixels.
    pub adaptive_threshold_block_size: u32,
    /// A pixel turns black when it is more than this far below its local mean.
    pub threshold_bias: f64,
    /// Side of the square closing kernel.
    pub morphology_kernel_size: u32,
    /// Run a morphological close after binarization.
    pub apply_morphology: bool,
    /// Binarization used after the blur.
    pub threshold_method: ThresholdMethod,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        PreprocessConfig {
            gaussian_blur_radius: 3,
            adaptive_threshold_block_size: 35,
            threshold_bias: 10.0,
            morphology_kernel_size: 3,
            apply_morphology: false,
            threshold_method: ThresholdMethod::Adaptive,
        }
    }
}

/// Page geometry of the printed sheet, as fractions of page or column size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutGeometry {
    /// Header area (title, student box, QR), fraction of page height.
    pub top_margin: f64,
    /// Footer area, fraction of page height.
    pub bottom_margin: f64,
    /// Fraction of column width before the first bubble.
    pub left_margin: f64,
    /// Fraction of column width after the last bubble.
    pub right_margin: f64,
    /// Bubble diameter relative to the option spacing and the row height.
    pub bubble_scale: f64,
    /// Absolute cap on bubble diameter in pixels.
    pub max_bubble_size: f64,
    /// QR side length as a fraction of the shorter page side.
    pub qr_size: f64,
    /// Student info box origin, fractions of page width and height.
    pub qr_info_box_x: f64,
    /// Vertical counterpart of `qr_info_box_x`.
    pub qr_info_box_y: f64,
    /// Distance of the corner QR regions from the page edge, in pixels.
    pub qr_corner_inset: f64,
    /// Corner QR regions relative to the info box size.
    pub qr_corner_scale: f64,
}

impl Default for LayoutGeometry {
    fn default() -> Self {
        LayoutGeometry {
            top_margin: 0.18,
            bottom_margin: 0.12,
            left_margin: 0.12,
            right_margin: 0.08,
            bubble_scale: 0.65,
            max_bubble_size: 32.0,
            qr_size: 0.12,
            qr_info_box_x: 0.05,
            qr_info_box_y: 0.12,
            qr_corner_inset: 15.0,
            qr_corner_scale: 0.8,
        }
    }
}

/// Everything a processor needs, loadable from one JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OmrConfig {
    /// Sheet shape and answer rules.
    pub sheet: AnswerSheetConfig,
    /// Preprocessing stages.
    pub preprocess: PreprocessConfig,
    /// Printed page geometry.
    pub layout: LayoutGeometry,
    /// Keep the per-bubble measurements in the result.
    pub include_bubbles: bool,
}

impl Default for OmrConfig {
    fn default() -> Self {
        OmrConfig {
            sheet: AnswerSheetConfig::default(),
            preprocess: PreprocessConfig::default(),
            layout: LayoutGeometry::default(),
            include_bubbles: true,
        }
    }
}

impl OmrConfig {
    /// Parse a JSON config; missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.sheet.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Wrap a sheet config with default preprocessing and layout geometry.
    pub fn for_sheet(sheet: AnswerSheetConfig) -> Self {
        Self {
            sheet,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AnswerSheetConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.options, vec!["A", "B", "C", "D"]);
        assert_eq!(config.questions_per_column(), 30);
    }

    #[test]
    fn test_overrides_merge_onto_defaults() {
        let overrides = ConfigOverrides {
            num_questions: Some(40),
            columns_per_page: Some(2),
            ..ConfigOverrides::default()
        };
        let config = AnswerSheetConfig::from_overrides(&overrides).unwrap();
        assert_eq!(config.num_questions, 40);
        assert_eq!(config.columns_per_page, 2);
        assert_eq!(config.options_per_question, 4);
        assert_eq!(config.questions_per_column(), 20);
    }

    #[test]
    fn test_option_count_change_regenerates_labels() {
        let mut config = AnswerSheetConfig::default();
        config
            .apply(&ConfigOverrides {
                options_per_question: Some(5),
                ..ConfigOverrides::default()
            })
            .unwrap();
        assert_eq!(config.options, vec!["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn test_labels_imply_option_count() {
        let mut config = AnswerSheetConfig::default();
        config
            .apply(&ConfigOverrides {
                options: Some(OptionLabels::persian()),
                ..ConfigOverrides::default()
            })
            .unwrap();
        assert_eq!(config.options_per_question, 4);
        assert_eq!(config.fallback_option(), "الف");
    }

    #[test]
    fn test_invalid_overrides_leave_config_untouched() {
        let mut config = AnswerSheetConfig::default();
        let err = config.apply(&ConfigOverrides::questions(151)).unwrap_err();
        assert!(matches!(err, OmrError::Config(_)));
        assert_eq!(config.num_questions, 120);

        assert!(config.apply(&ConfigOverrides::questions(0)).is_err());
        assert!(
            config
                .apply(&ConfigOverrides {
                    bubble_fill_threshold: Some(1.5),
                    ..ConfigOverrides::default()
                })
                .is_err()
        );
        assert!(
            config
                .apply(&ConfigOverrides {
                    options_per_question: Some(3),
                    options: Some(OptionLabels::latin(4)),
                    ..ConfigOverrides::default()
                })
                .is_err()
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "sheet": { "num_questions": 30, "answer_policy": "strict" },
            "preprocess": { "apply_morphology": true, "threshold_method": { "global": 128 } }
        }"#;
        let config = OmrConfig::from_json(json).unwrap();
        assert_eq!(config.sheet.num_questions, 30);
        assert_eq!(config.sheet.answer_policy, AnswerPolicy::Strict);
        assert_eq!(config.sheet.columns_per_page, 4);
        assert!(config.preprocess.apply_morphology);
        assert_eq!(config.preprocess.threshold_method, ThresholdMethod::Global(128));
        assert_eq!(config.preprocess.gaussian_blur_radius, 3);
        assert_eq!(config.layout, LayoutGeometry::default());
    }

    #[test]
    fn test_json_with_bad_sheet_is_rejected() {
        let json = r#"{ "sheet": { "options_per_question": 5 } }"#;
        assert!(matches!(
            OmrConfig::from_json(json),
            Err(OmrError::Config(_))
        ));
    }
}
