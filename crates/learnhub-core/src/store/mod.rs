//! Repository interface over the relational store

mod database;

pub use database::SeaOrmStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use learnhub_db::entities::{
    audit_trail, course, course_progress, enrollment, module, performance_analytics, quiz,
    quiz_result, ProgressStatus,
};
use serde_json::Value;

use crate::catalog::{CourseEdit, NewCourse};
use crate::error::CoreError;
use crate::grading::GradeOutcome;

/// A graded submission ready to be persisted
#[derive(Debug, Clone)]
pub struct GradedSubmission {
    pub user_id: i32,
    pub module: module::Model,
    /// Answer map exactly as submitted
    pub answers: Value,
    pub outcome: GradeOutcome,
    pub time_spent: i32,
    pub attempted_at: DateTime<Utc>,
}

/// Everything written by one submission
#[derive(Debug, Clone)]
pub struct SubmissionRecord {
    pub result: quiz_result::Model,
    pub progress: course_progress::Model,
    pub analytics: performance_analytics::Model,
    /// Whether this attempt added to the course percentage
    pub counted_toward_completion: bool,
}

/// Optional narrowing for cross-user progress queries
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressFilter {
    pub course_id: Option<i32>,
    pub user_id: Option<i32>,
    pub accessed_from: Option<DateTime<Utc>>,
    pub accessed_until: Option<DateTime<Utc>>,
}

/// Persistence operations used by the services.
///
/// Multi-row writes (`create_course`, `record_submission`,
/// `complete_enrollment`) are atomic: they commit fully or not at all.
#[async_trait]
pub trait LearningStore: Send + Sync {
    // Catalog
    async fn find_course(&self, id: i32) -> Result<Option<course::Model>, CoreError>;
    async fn find_course_by_code(&self, code: &str) -> Result<Option<course::Model>, CoreError>;
    /// Newest first
    async fn list_courses(&self) -> Result<Vec<course::Model>, CoreError>;
    async fn courses_by_ids(&self, ids: &[i32]) -> Result<Vec<course::Model>, CoreError>;
    /// Inserts the course, its modules and quizzes, and an audit entry
    async fn create_course(&self, course: &NewCourse) -> Result<course::Model, CoreError>;
    /// Overwrites the editable fields and appends `audit_action` as one
    /// write; `None` when the course does not exist.
    async fn update_course(
        &self,
        course_id: i32,
        edit: &CourseEdit,
        editor_id: i32,
        audit_action: String,
    ) -> Result<Option<course::Model>, CoreError>;

    async fn find_module(&self, id: i32) -> Result<Option<module::Model>, CoreError>;
    /// Ordered by id
    async fn modules_for_course(&self, course_id: i32) -> Result<Vec<module::Model>, CoreError>;
    /// Ordered by id
    async fn quizzes_for_module(&self, module_id: i32) -> Result<Vec<quiz::Model>, CoreError>;
    async fn quizzes_for_modules(&self, module_ids: &[i32]) -> Result<Vec<quiz::Model>, CoreError>;

    // Enrollment and audit
    async fn find_enrollment(
        &self,
        user_id: i32,
        course_id: i32,
    ) -> Result<Option<enrollment::Model>, CoreError>;
    async fn enrollments_for_user(&self, user_id: i32) -> Result<Vec<enrollment::Model>, CoreError>;
    async fn enrollments_for_course(
        &self,
        course_id: i32,
    ) -> Result<Vec<enrollment::Model>, CoreError>;
    async fn enrollments(&self, filter: ProgressFilter) -> Result<Vec<enrollment::Model>, CoreError>;
    async fn create_enrollment(
        &self,
        user_id: i32,
        course_id: i32,
    ) -> Result<enrollment::Model, CoreError>;
    /// Marks the enrollment completed and appends an audit entry;
    /// `None` when there is no enrollment.
    async fn complete_enrollment(
        &self,
        user_id: i32,
        course_id: i32,
    ) -> Result<Option<enrollment::Model>, CoreError>;
    /// Oldest first
    async fn audit_trail(&self) -> Result<Vec<audit_trail::Model>, CoreError>;

    // Progress
    async fn find_progress(
        &self,
        user_id: i32,
        course_id: i32,
    ) -> Result<Option<course_progress::Model>, CoreError>;
    async fn progress_for_user(&self, user_id: i32)
        -> Result<Vec<course_progress::Model>, CoreError>;
    async fn progress_rows(
        &self,
        filter: ProgressFilter,
    ) -> Result<Vec<course_progress::Model>, CoreError>;
    /// Overwrite (or create) the progress row for (user, course)
    async fn save_progress(
        &self,
        user_id: i32,
        course_id: i32,
        completion_percentage: f64,
        status: ProgressStatus,
    ) -> Result<course_progress::Model, CoreError>;

    // Results and analytics
    /// Oldest first
    async fn results_for_user(&self, user_id: i32) -> Result<Vec<quiz_result::Model>, CoreError>;
    /// Oldest first
    async fn results_for_user_in_modules(
        &self,
        user_id: i32,
        module_ids: &[i32],
    ) -> Result<Vec<quiz_result::Model>, CoreError>;
    /// Persist the result and update module counter, course progress and
    /// analytics in one transaction
    async fn record_submission(
        &self,
        submission: GradedSubmission,
    ) -> Result<SubmissionRecord, CoreError>;
    async fn all_analytics(&self) -> Result<Vec<performance_analytics::Model>, CoreError>;
}
