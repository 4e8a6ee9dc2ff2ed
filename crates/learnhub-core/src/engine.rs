//! Quiz submission: validation, grading and the recorded side effects

use chrono::{DateTime, Utc};
use learnhub_db::entities::QuizStatus;
use learnhub_directory::UserDirectory;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::catalog::QuizView;
use crate::error::CoreError;
use crate::grading;
use crate::store::{GradedSubmission, LearningStore};

/// Body of `POST /module/{id}/submit-quiz`
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct QuizSubmission {
    pub user_id: Option<i32>,
    /// Answers keyed by quiz id
    #[schema(value_type = Option<Object>)]
    pub answers: Option<Map<String, Value>>,
    /// Seconds spent on the attempt
    pub time_spent: Option<i32>,
}

/// Full grading result returned to the learner
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubmissionReport {
    pub result_id: i32,
    pub user_id: i32,
    pub module_id: i32,
    pub score: i32,
    #[schema(value_type = String)]
    pub status: QuizStatus,
    pub total_marks: i32,
    #[schema(value_type = Object)]
    pub answers: Value,
    pub correct_answers: BTreeMap<String, String>,
    pub is_correct: BTreeMap<String, bool>,
    pub corrected_count: usize,
    pub incorrected_count: usize,
    pub skipped_count: usize,
    /// Course completion after this attempt
    pub completion_percentage: f64,
    pub time_spent: i32,
    pub attempted_at: DateTime<Utc>,
}

/// A module with its quizzes, stored answers withheld
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ModuleDetails {
    pub id: i32,
    pub course_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub objectives: Option<String>,
    pub learning_points: Option<String>,
    /// Number of passing submissions recorded against the module
    pub completion_percentage: f64,
    pub quizzes: Vec<QuizView>,
}

/// Grades submissions and records their outcome
#[derive(Clone)]
pub struct GradingEngine {
    store: Arc<dyn LearningStore>,
    directory: Arc<dyn UserDirectory>,
}

impl GradingEngine {
    pub fn new(store: Arc<dyn LearningStore>, directory: Arc<dyn UserDirectory>) -> Self {
        Self { store, directory }
    }

    /// Grade a submission for `module_id` and persist the result together
    /// with the updated course progress and analytics.
    ///
    /// Checks run in order: module exists, body is complete, user exists.
    /// Nothing is written unless all three hold.
    pub async fn submit(
        &self,
        module_id: i32,
        submission: QuizSubmission,
    ) -> Result<SubmissionReport, CoreError> {
        let module = self
            .store
            .find_module(module_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("Module with ID {} not found", module_id)))?;

        let user_id = submission
            .user_id
            .ok_or_else(|| CoreError::validation("user_id is required"))?;
        let answers = submission
            .answers
            .ok_or_else(|| CoreError::validation("answers are required"))?;
        let time_spent = submission.time_spent.unwrap_or(0);
        if time_spent < 0 {
            return Err(CoreError::validation("time_spent must not be negative"));
        }

        if self.directory.get_user(user_id).await?.is_none() {
            return Err(CoreError::not_found(format!("User with ID {} not found", user_id)));
        }

        let quizzes = self.store.quizzes_for_module(module.id).await?;
        let outcome = grading::grade(&quizzes, &answers)?;
        debug!(
            "User {} scored {}/{} on module {}",
            user_id, outcome.total_score, outcome.total_marks, module.id
        );

        let attempted_at = Utc::now();
        let record = self
            .store
            .record_submission(GradedSubmission {
                user_id,
                module: module.clone(),
                answers: Value::Object(answers.clone()),
                outcome: outcome.clone(),
                time_spent,
                attempted_at,
            })
            .await?;

        info!(
            "Recorded {} attempt {} for user {} on module {} (course at {}%)",
            outcome.status.as_str(),
            record.result.id,
            user_id,
            module.id,
            record.progress.completion_percentage
        );

        Ok(SubmissionReport {
            result_id: record.result.id,
            user_id,
            module_id: module.id,
            score: outcome.total_score,
            status: outcome.status,
            total_marks: outcome.total_marks,
            answers: Value::Object(answers),
            correct_answers: outcome.correct_answers,
            is_correct: outcome.is_correct,
            corrected_count: outcome.corrected_count,
            incorrected_count: outcome.incorrected_count,
            skipped_count: outcome.skipped_count,
            completion_percentage: record.progress.completion_percentage,
            time_spent,
            attempted_at,
        })
    }

    pub async fn module_details(&self, module_id: i32) -> Result<ModuleDetails, CoreError> {
        let module = self
            .store
            .find_module(module_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("Module with ID {} not found", module_id)))?;
        let quizzes = self.store.quizzes_for_module(module.id).await?;

        Ok(ModuleDetails {
            id: module.id,
            course_id: module.course_id,
            title: module.title,
            description: module.description,
            objectives: module.objectives,
            learning_points: module.learning_points,
            completion_percentage: module.completion_percentage,
            quizzes: quizzes
                .iter()
                .map(|quiz| QuizView::from_model(quiz, false))
                .collect(),
        })
    }
}
