//! Core data model types for graderbench.
//!
//! These are the fundamental types the entire graderbench system uses to
//! represent grading inputs, attempts, and their outcomes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consistency::ConsistencyMetrics;
use crate::error::ErrorInfo;

/// One question/answer bundle to grade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingContext {
    /// The question that was asked.
    pub question: String,
    /// The reference ("correct") answer.
    pub reference_answer: String,
    /// The student answer being graded.
    pub student_answer: String,
    /// Externally supplied ground-truth grade in [0, 1], if available.
    #[serde(default)]
    pub reference_grade: Option<f64>,
}

impl GradingContext {
    /// Build the grading prompt sent to the model.
    pub fn grading_prompt(&self) -> String {
        format!(
            "Question: {}\n\nCorrect Answer: {}\n\nStudent's Answer: {}\n\n\
             Grade the student's answer based on the correct answer from (0.0 - 1.0)",
            self.question, self.reference_answer, self.student_answer
        )
    }
}

/// Identifies one unit of work: a single grading attempt.
///
/// Attempt numbers are 1-based and dense per question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationTask {
    pub model_id: String,
    pub question_id: u32,
    pub attempt: u32,
}

/// How reliably a numeric grade was parsed from free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Explicit "Grade: 0.8"-style label.
    High,
    /// Standalone number found in the body text.
    Medium,
    /// Spelled-out number ("half", "one").
    Low,
    /// Nothing found; the default grade was used.
    VeryLow,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::High => write!(f, "high"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::Low => write!(f, "low"),
            Confidence::VeryLow => write!(f, "very_low"),
        }
    }
}

/// The observable output of one grading attempt.
///
/// Constructed once, after the question's full attempt set has terminated and
/// its consistency metrics are known; never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub task: EvaluationTask,
    /// The prompt that was sent.
    pub prompt: String,
    /// Raw model response. `None` when the request failed.
    pub response: Option<String>,
    /// Extracted grade, clamped to [0, 1]. `None` when the request failed.
    pub grade: Option<f64>,
    /// Parse confidence for `grade`.
    pub confidence: Option<Confidence>,
    /// Wall-clock request duration in seconds (0.0 for failed requests).
    pub response_time_secs: f64,
    /// `1 − |grade − reference|`, clamped to [0, 1]. `None` without a
    /// reference grade or on failure.
    pub accuracy: Option<f64>,
    /// Populated when the attempt failed.
    pub error: Option<ErrorInfo>,
    /// Metrics over the question's attempt set. Every record of a question
    /// carries the same copy; `None` only when no attempt of the question
    /// succeeded.
    pub consistency: Option<ConsistencyMetrics>,
}

impl AttemptRecord {
    /// Whether this attempt failed at the request level.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
