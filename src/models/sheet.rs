use std::time::Duration;

use serde::{Serialize, Serializer};

use super::BubbleRegion;

/// Placeholder for identity fields a QR payload did not carry.
///
/// Distinguishes "decoded but unidentified" from "no code found" (`None`).
pub const UNKNOWN: &str = "Unknown";

/// Student identity decoded from the sheet's QR code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInfo {
    /// Student identifier.
    pub student_id: String,
    /// Student name, or [`UNKNOWN`].
    pub student_name: String,
    /// Test identifier, or [`UNKNOWN`].
    pub test_id: String,
    /// Test date as printed in the payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_date: Option<String>,
    /// Grade or class label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
}

impl StudentInfo {
    /// Identity with only a student id; name and test are [`UNKNOWN`].
    pub fn with_id(student_id: impl Into<String>) -> Self {
        Self {
            student_id: student_id.into(),
            student_name: UNKNOWN.to_string(),
            test_id: UNKNOWN.to_string(),
            test_date: None,
            grade: None,
        }
    }

    /// True when the student id is not [`UNKNOWN`].
    pub fn is_identified(&self) -> bool {
        self.student_id != UNKNOWN
    }
}

/// A measured bubble.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedBubble {
    /// Where the bubble was sampled.
    pub region: BubbleRegion,
    /// 1-based.
    pub question_number: usize,
    /// Option label.
    pub option: String,
    /// Fraction of dark pixels in the sampled disk, 0.0 to 1.0.
    pub darkness: f64,
    /// `darkness` above the configured fill threshold.
    pub is_filled: bool,
}

/// Resolved answer for one question.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedAnswer {
    /// 1-based.
    pub question_number: usize,
    /// Chosen label, or `-` in strict mode.
    pub answer: String,
    /// Darkness of the chosen bubble; 0.0 when the question had no bubble data.
    pub confidence: f64,
}

/// Output of one grading pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResult {
    /// Decoded identity, `None` when no QR code was read.
    pub student_info: Option<StudentInfo>,
    /// One label per question, in question order.
    pub answers: Vec<String>,
    /// Per-bubble measurements, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_bubbles: Option<Vec<DetectedBubble>>,
    /// Wall-clock time of the grading pass.
    #[serde(rename = "processingTimeMs", serialize_with = "serialize_millis")]
    pub processing_time: Duration,
}

impl ProcessingResult {
    /// Per-question answers with the darkness of the chosen bubble.
    ///
    /// Confidence is 0.0 when bubbles were not kept or the answer is not a
    /// measured option (blank or fallback).
    pub fn answer_details(&self) -> Vec<DetectedAnswer> {
        self.answers
            .iter()
            .enumerate()
            .map(|(index, answer)| {
                let question_number = index + 1;
                let confidence = self
                    .detected_bubbles
                    .iter()
                    .flatten()
                    .find(|b| b.question_number == question_number && &b.option == answer)
                    .map_or(0.0, |b| b.darkness);
                DetectedAnswer {
                    question_number,
                    answer: answer.clone(),
                    confidence,
                }
            })
            .collect()
    }
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64() * 1000.0)
}
