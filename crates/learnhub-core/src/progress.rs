//! Completion and analytics arithmetic applied on every graded submission

use chrono::{DateTime, Utc};
use learnhub_db::entities::ProgressStatus;
use serde_json::{json, Value};

use crate::error::CoreError;

pub const FULL_COMPLETION: f64 = 100.0;

// Shares like 100/3 do not sum back to exactly 100.
const COMPLETION_EPSILON: f64 = 1e-6;

/// Percentage a submission adds to its course.
///
/// Only the first passing attempt at a module counts; the share is
/// `100 / module_count`.
pub fn completion_increment(counts_toward_completion: bool, module_count: u64) -> f64 {
    if !counts_toward_completion || module_count == 0 {
        return 0.0;
    }
    FULL_COMPLETION / module_count as f64
}

/// Clamp to `[0, 100]`, snapping values within rounding error of 100
pub fn settle_percentage(percentage: f64) -> f64 {
    if percentage >= FULL_COMPLETION - COMPLETION_EPSILON {
        FULL_COMPLETION
    } else if percentage <= 0.0 {
        0.0
    } else {
        percentage
    }
}

pub fn status_for_percentage(percentage: f64) -> ProgressStatus {
    if percentage >= FULL_COMPLETION {
        ProgressStatus::Completed
    } else {
        ProgressStatus::InProgress
    }
}

/// Whether a manually supplied status agrees with its percentage.
///
/// Not Started only at 0, Completed only at 100, In Progress below 100.
pub fn status_matches_percentage(status: ProgressStatus, percentage: f64) -> bool {
    match status {
        ProgressStatus::NotStarted => percentage == 0.0,
        ProgressStatus::InProgress => percentage < FULL_COMPLETION,
        ProgressStatus::Completed => percentage >= FULL_COMPLETION,
    }
}

/// New course progress after one submission
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressAdvance {
    pub previous_percentage: f64,
    pub percentage: f64,
    pub status: ProgressStatus,
    /// True only on the submission that first brings the course to 100
    pub just_completed: bool,
}

/// Apply `increment` to the existing percentage (or to zero for a new row)
pub fn advance(previous: Option<f64>, increment: f64) -> ProgressAdvance {
    let previous_percentage = previous.unwrap_or(0.0);
    let percentage = settle_percentage(previous_percentage + increment.max(0.0));

    ProgressAdvance {
        previous_percentage,
        percentage,
        status: status_for_percentage(percentage),
        just_completed: previous_percentage < FULL_COMPLETION && percentage >= FULL_COMPLETION,
    }
}

/// Rolling counters kept per (user, course)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnalyticsTotals {
    pub quizzes_taken: i32,
    pub modules_completed: i32,
    pub total_score: i32,
    pub average_score: f64,
}

impl AnalyticsTotals {
    /// Fold one graded submission into the counters
    pub fn record(self, score: i32, course_just_completed: bool) -> Result<Self, CoreError> {
        let overflow = || CoreError::validation("Performance totals exceed the supported range");
        let quizzes_taken = self.quizzes_taken.checked_add(1).ok_or_else(overflow)?;
        let total_score = self.total_score.checked_add(score).ok_or_else(overflow)?;
        let modules_completed = self
            .modules_completed
            .checked_add(i32::from(course_just_completed))
            .ok_or_else(overflow)?;

        Ok(Self {
            quizzes_taken,
            modules_completed,
            total_score,
            average_score: f64::from(total_score) / f64::from(quizzes_taken),
        })
    }
}

/// Append one trend point to the stored JSON array.
/// Anything other than an array is replaced.
pub fn push_trend_point(
    trends: &Value,
    recorded_at: DateTime<Utc>,
    score: i32,
    total_marks: i32,
    average_score: f64,
) -> Value {
    let mut points = trends.as_array().cloned().unwrap_or_default();
    points.push(json!({
        "recorded_at": recorded_at.to_rfc3339(),
        "score": score,
        "total_marks": total_marks,
        "average_score": average_score,
    }));
    Value::Array(points)
}
