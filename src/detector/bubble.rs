//! Bubble fill measurement and answer resolution

use std::f64::consts::PI;

use rayon::prelude::*;
use tracing::{debug, warn};

use super::blob::BlobScanner;
use super::connected_components::find_components;
use crate::config::{AnswerPolicy, AnswerSheetConfig, BLANK_ANSWER};
use crate::models::matrix::DARK_CUTOFF;
use crate::models::{BitMatrix, BubbleRegion, DetectedAnswer, DetectedBubble, RasterImage};

/// Fraction of the bubble box trimmed on each side before sampling.
const SAMPLE_PADDING: f64 = 0.15;

/// Measures bubbles on a binarized page and turns them into answers.
#[derive(Debug, Clone, Default)]
pub struct BubbleDetector {
    config: AnswerSheetConfig,
}

impl BubbleDetector {
    /// Detector for sheets shaped like `config`.
    pub fn new(config: AnswerSheetConfig) -> Self {
        Self { config }
    }

    /// Sheet config used for labels and thresholds.
    pub fn config(&self) -> &AnswerSheetConfig {
        &self.config
    }

    /// Measure every region of `layout`, one inner vector per question.
    ///
    /// Options are labeled in configured order; regions beyond the label
    /// count are ignored.
    pub fn detect_filled_bubbles(
        &self,
        binary: &RasterImage,
        layout: &[Vec<BubbleRegion>],
    ) -> Vec<DetectedBubble> {
        let threshold = self.config.bubble_fill_threshold;
        let options = &self.config.options;
        let bubbles: Vec<DetectedBubble> = layout
            .par_iter()
            .enumerate()
            .flat_map_iter(|(index, regions)| {
                regions
                    .iter()
                    .zip(options)
                    .map(move |(region, option)| {
                        let darkness = bubble_darkness(binary, region);
                        DetectedBubble {
                            region: *region,
                            question_number: index + 1,
                            option: option.clone(),
                            darkness,
                            is_filled: darkness > threshold,
                        }
                    })
            })
            .collect();

        debug!(
            bubbles = bubbles.len(),
            filled = bubbles.iter().filter(|b| b.is_filled).count(),
            "measured bubbles"
        );
        bubbles
    }

    /// One answer label per question, in question order.
    pub fn determine_answers(&self, bubbles: &[DetectedBubble], num_questions: usize) -> Vec<String> {
        self.answer_details(bubbles, num_questions)
            .into_iter()
            .map(|detail| detail.answer)
            .collect()
    }

    /// Answers together with the darkness of the chosen bubble.
    ///
    /// The darkest bubble wins even when it is not filled, unless the policy
    /// is [`AnswerPolicy::Strict`]. Ties keep the earlier option. A question
    /// without any bubble falls back to the first label.
    pub fn answer_details(&self, bubbles: &[DetectedBubble], num_questions: usize) -> Vec<DetectedAnswer> {
        let mut darkest: Vec<Option<&DetectedBubble>> = vec![None; num_questions];
        for bubble in bubbles {
            let Some(slot) = bubble
                .question_number
                .checked_sub(1)
                .and_then(|i| darkest.get_mut(i))
            else {
                continue;
            };
            if slot.is_none_or(|best| bubble.darkness > best.darkness) {
                *slot = Some(bubble);
            }
        }

        let mut unfilled = 0usize;
        let answers: Vec<DetectedAnswer> = darkest
            .into_iter()
            .enumerate()
            .map(|(index, best)| {
                let question_number = index + 1;
                let (answer, confidence) = match best {
                    None => (self.config.fallback_option().to_string(), 0.0),
                    Some(bubble) if bubble.is_filled => (bubble.option.clone(), bubble.darkness),
                    Some(bubble) => {
                        unfilled += 1;
                        match self.config.answer_policy {
                            AnswerPolicy::AlwaysDarkest => (bubble.option.clone(), bubble.darkness),
                            AnswerPolicy::Strict => (BLANK_ANSWER.to_string(), 0.0),
                        }
                    }
                };
                DetectedAnswer {
                    question_number,
                    answer,
                    confidence,
                }
            })
            .collect();

        if unfilled > 0 {
            warn!(unfilled, policy = ?self.config.answer_policy, "questions without a filled bubble");
        }
        answers
    }

    /// Smallest and largest blob area accepted as a bubble.
    pub fn blob_area_bounds(&self) -> (f64, f64) {
        let r = self.config.bubble_radius;
        let min_area = r * r * PI * 0.5;
        (min_area, min_area * 4.0)
    }

    /// Locate bubble-sized ink blobs by seeded flood fill.
    ///
    /// Returns at most `expected_count` regions, in seed scan order.
    pub fn detect_bubbles_using_contours(&self, binary: &RasterImage, expected_count: usize) -> Vec<BubbleRegion> {
        let matrix = BitMatrix::from_binary(binary);
        let (min_area, max_area) = self.blob_area_bounds();
        let regions: Vec<BubbleRegion> = BlobScanner::new(&matrix)
            .scan(min_area, max_area, expected_count)
            .into_iter()
            .map(|b| BubbleRegion::from_extents(b.min_x as u32, b.min_y as u32, b.max_x as u32, b.max_y as u32))
            .collect();
        debug!(found = regions.len(), expected_count, "flood fill blobs");
        regions
    }

    /// Same contract as [`detect_bubbles_using_contours`](Self::detect_bubbles_using_contours),
    /// using exact 8-connected components instead of a bounded fill.
    pub fn detect_bubbles_using_components(&self, binary: &RasterImage, expected_count: usize) -> Vec<BubbleRegion> {
        let matrix = BitMatrix::from_binary(binary);
        let (min_area, max_area) = self.blob_area_bounds();
        let regions: Vec<BubbleRegion> = find_components(&matrix)
            .into_iter()
            .filter(|c| (min_area..=max_area).contains(&(c.area as f64)))
            .take(expected_count)
            .map(|c| BubbleRegion::from_extents(c.min_x as u32, c.min_y as u32, c.max_x as u32, c.max_y as u32))
            .collect();
        debug!(found = regions.len(), expected_count, "connected component blobs");
        regions
    }
}

/// Fraction of dark pixels in the central disk of a bubble.
///
/// Only the middle 70% of the box is scanned and, inside it, only pixels
/// within `min(w, h) * 0.35` of the center. Pixels outside the image are not
/// counted. Returns 0.0 when nothing was sampled.
pub fn bubble_darkness(binary: &RasterImage, region: &BubbleRegion) -> f64 {
    let (width, height) = binary.dimensions();
    let (w, h) = (region.width as f64, region.height as f64);

    let start_x = (region.x as f64 + w * SAMPLE_PADDING) as u32;
    let end_x = ((region.x as f64 + w * (1.0 - SAMPLE_PADDING)) as u32).min(width);
    let start_y = (region.y as f64 + h * SAMPLE_PADDING) as u32;
    let end_y = ((region.y as f64 + h * (1.0 - SAMPLE_PADDING)) as u32).min(height);

    let radius = w.min(h) * (1.0 - 2.0 * SAMPLE_PADDING) / 2.0;
    let radius_sq = radius * radius;
    let (cx, cy) = (region.center_x as f64, region.center_y as f64);

    let mut dark = 0usize;
    let mut total = 0usize;
    for y in start_y..end_y {
        let dy = y as f64 - cy;
        for x in start_x..end_x {
            let dx = x as f64 - cx;
            if dx * dx + dy * dy > radius_sq {
                continue;
            }
            total += 1;
            if binary.get_pixel(x, y)[0] < DARK_CUTOFF {
                dark += 1;
            }
        }
    }

    if total == 0 { 0.0 } else { dark as f64 / total as f64 }
}
