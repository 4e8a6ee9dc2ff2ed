//! Scoring of a quiz submission against a module's stored answers
//!
//! Grading is pure: it takes the module's quizzes and the submitted answer
//! map and produces a [`GradeOutcome`]. Persisting the outcome and its side
//! effects is the store's job.

use learnhub_db::entities::{quiz, QuizStatus};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::CoreError;

/// A submission passes when it earns at least this share of the module's marks
pub const PASS_RATIO: f64 = 0.5;

/// Upper bound on the marks of a single quiz
pub const MAX_QUIZ_MARKS: i32 = 10_000;

/// A submitted answer after normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmittedAnswer {
    /// Absent, JSON null, or the literal string "none"
    Skipped,
    /// Text compared verbatim with the stored answer
    Given(String),
    /// Arrays and objects; never equal to a stored answer
    Unmatchable,
}

impl SubmittedAnswer {
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => SubmittedAnswer::Skipped,
            Some(Value::String(text)) if text.eq_ignore_ascii_case("none") => {
                SubmittedAnswer::Skipped
            }
            Some(Value::String(text)) => SubmittedAnswer::Given(text.clone()),
            Some(Value::Number(number)) => SubmittedAnswer::Given(number.to_string()),
            Some(Value::Bool(flag)) => SubmittedAnswer::Given(flag.to_string()),
            Some(Value::Array(_)) | Some(Value::Object(_)) => SubmittedAnswer::Unmatchable,
        }
    }

    pub fn matches(&self, correct_answer: &str) -> bool {
        matches!(self, SubmittedAnswer::Given(text) if text == correct_answer)
    }
}

/// Result of scoring one submission
#[derive(Debug, Clone, PartialEq)]
pub struct GradeOutcome {
    pub total_score: i32,
    pub total_marks: i32,
    pub corrected_count: usize,
    pub incorrected_count: usize,
    pub skipped_count: usize,
    /// Stored answers keyed by quiz id
    pub correct_answers: BTreeMap<String, String>,
    /// Per-question correctness keyed by quiz id
    pub is_correct: BTreeMap<String, bool>,
    pub status: QuizStatus,
}

impl GradeOutcome {
    pub fn passed(&self) -> bool {
        self.status == QuizStatus::Passed
    }

    pub fn correct_answers_json(&self) -> Value {
        Value::Object(
            self.correct_answers
                .iter()
                .map(|(id, answer)| (id.clone(), Value::String(answer.clone())))
                .collect(),
        )
    }

    pub fn is_correct_json(&self) -> Value {
        Value::Object(
            self.is_correct
                .iter()
                .map(|(id, correct)| (id.clone(), Value::Bool(*correct)))
                .collect(),
        )
    }
}

/// Pass/fail policy; exactly half the marks passes
pub fn status_for(total_score: i32, total_marks: i32) -> QuizStatus {
    if f64::from(total_score) >= PASS_RATIO * f64::from(total_marks) {
        QuizStatus::Passed
    } else {
        QuizStatus::Failed
    }
}

/// Score `answers` (keyed by quiz id as a string) against `quizzes`.
///
/// Every quiz is counted exactly once as correct, incorrect or skipped.
/// Answers for quizzes outside the module are ignored. Fails when the
/// module's marks do not fit the score column.
pub fn grade(
    quizzes: &[quiz::Model],
    answers: &Map<String, Value>,
) -> Result<GradeOutcome, CoreError> {
    let mut outcome = GradeOutcome {
        total_score: 0,
        total_marks: 0,
        corrected_count: 0,
        incorrected_count: 0,
        skipped_count: 0,
        correct_answers: BTreeMap::new(),
        is_correct: BTreeMap::new(),
        status: QuizStatus::Failed,
    };

    for quiz in quizzes {
        let key = quiz.id.to_string();
        let answer = SubmittedAnswer::from_json(answers.get(&key));
        let correct = answer.matches(&quiz.correct_answer);

        if correct {
            outcome.total_score = add_marks(outcome.total_score, quiz.marks)?;
            outcome.corrected_count += 1;
        } else if answer == SubmittedAnswer::Skipped {
            outcome.skipped_count += 1;
        } else {
            outcome.incorrected_count += 1;
        }
        outcome.total_marks = add_marks(outcome.total_marks, quiz.marks)?;

        outcome
            .correct_answers
            .insert(key.clone(), quiz.correct_answer.clone());
        outcome.is_correct.insert(key, correct);
    }

    outcome.status = status_for(outcome.total_score, outcome.total_marks);
    Ok(outcome)
}

fn add_marks(total: i32, marks: i32) -> Result<i32, CoreError> {
    total
        .checked_add(marks)
        .ok_or_else(|| CoreError::validation("Module marks exceed the supported total"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn quiz(id: i32, correct_answer: &str, marks: i32) -> quiz::Model {
        quiz::Model {
            id,
            module_id: 1,
            question: format!("Question {}", id),
            correct_answer: correct_answer.to_string(),
            marks,
            options: json!(["A", "B", "C"]),
            created_at: Utc::now(),
        }
    }

    fn answers(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_all_correct_passes() {
        let quizzes = vec![quiz(1, "A", 5), quiz(2, "B", 5)];
        let outcome = grade(&quizzes, &answers(json!({"1": "A", "2": "B"}))).unwrap();

        assert_eq!(outcome.total_score, 10);
        assert_eq!(outcome.total_marks, 10);
        assert_eq!(outcome.corrected_count, 2);
        assert_eq!(outcome.status, QuizStatus::Passed);
        assert_eq!(outcome.is_correct.get("1"), Some(&true));
    }

    #[test]
    fn test_omitted_answer_is_skipped() {
        let quizzes = vec![quiz(1, "A", 5), quiz(2, "B", 5)];
        let outcome = grade(&quizzes, &answers(json!({"1": "A", "2": null}))).unwrap();

        assert_eq!(outcome.skipped_count, 1);
        assert_eq!(outcome.corrected_count, 1);
        assert_eq!(outcome.incorrected_count, 0);
        assert_eq!(outcome.total_score, 5);
    }

    #[test]
    fn test_none_string_and_missing_key_are_skipped() {
        let quizzes = vec![quiz(1, "A", 2), quiz(2, "B", 2), quiz(3, "C", 2)];
        let outcome = grade(&quizzes, &answers(json!({"1": "None", "2": "none"}))).unwrap();

        assert_eq!(outcome.skipped_count, 3);
        assert_eq!(outcome.total_score, 0);
        assert_eq!(outcome.status, QuizStatus::Failed);
    }

    #[test]
    fn test_pass_threshold_is_inclusive() {
        assert_eq!(status_for(5, 10), QuizStatus::Passed);
        assert_eq!(status_for(4, 10), QuizStatus::Failed);
        assert_eq!(status_for(3, 5), QuizStatus::Passed);
        assert_eq!(status_for(2, 5), QuizStatus::Failed);
    }

    #[test]
    fn test_counts_cover_every_quiz() {
        let quizzes = vec![
            quiz(1, "A", 1),
            quiz(2, "B", 2),
            quiz(3, "C", 3),
            quiz(4, "D", 4),
        ];
        let outcome = grade(
            &quizzes,
            &answers(json!({"1": "A", "2": "wrong", "3": ["C"], "99": "ignored"})),
        )
        .unwrap();

        assert_eq!(
            outcome.corrected_count + outcome.incorrected_count + outcome.skipped_count,
            quizzes.len()
        );
        assert_eq!(outcome.corrected_count, 1);
        assert_eq!(outcome.incorrected_count, 2);
        assert_eq!(outcome.skipped_count, 1);
        assert!(!outcome.correct_answers.contains_key("99"));
    }

    #[test]
    fn test_numeric_answers_compare_by_text() {
        let quizzes = vec![quiz(1, "42", 3), quiz(2, "true", 3)];
        let outcome = grade(&quizzes, &answers(json!({"1": 42, "2": true}))).unwrap();

        assert_eq!(outcome.corrected_count, 2);
        assert_eq!(outcome.total_score, 6);
    }

    #[test]
    fn test_comparison_is_exact() {
        let quizzes = vec![quiz(1, "Paris", 4)];
        let outcome = grade(&quizzes, &answers(json!({"1": "paris "}))).unwrap();

        assert_eq!(outcome.incorrected_count, 1);
        assert_eq!(outcome.total_score, 0);
    }

    #[test]
    fn test_empty_module_passes_trivially() {
        let outcome = grade(&[], &Map::new()).unwrap();
        assert_eq!(outcome.total_marks, 0);
        assert!(outcome.passed());
    }

    #[test]
    fn test_marks_overflow_is_rejected() {
        let quizzes = vec![quiz(1, "A", 1_500_000_000), quiz(2, "B", 1_500_000_000)];
        let err = grade(&quizzes, &answers(json!({"1": "A", "2": "B"}))).unwrap_err();

        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_json_maps_are_keyed_by_quiz_id() {
        let quizzes = vec![quiz(7, "A", 1)];
        let outcome = grade(&quizzes, &answers(json!({"7": "B"}))).unwrap();

        assert_eq!(outcome.correct_answers_json(), json!({"7": "A"}));
        assert_eq!(outcome.is_correct_json(), json!({"7": false}));
    }
}
