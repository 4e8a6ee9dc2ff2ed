//! Read views over course progress, plus the manual progress override

use chrono::{DateTime, Utc};
use learnhub_db::entities::{course, course_progress, module, quiz_result, ProgressStatus, QuizStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::error::CoreError;
use crate::progress::{self, FULL_COMPLETION};
use crate::store::LearningStore;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseSummary {
    pub id: i32,
    pub title: String,
    pub description: String,
}

/// Course-level progress of one learner
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct ProgressSnapshot {
    pub completion_percentage: f64,
    #[schema(value_type = String)]
    pub status: ProgressStatus,
}

impl ProgressSnapshot {
    fn from_row(row: Option<&course_progress::Model>) -> Self {
        match row {
            Some(row) => Self {
                completion_percentage: row.completion_percentage,
                status: row.status,
            },
            None => Self {
                completion_percentage: 0.0,
                status: ProgressStatus::NotStarted,
            },
        }
    }
}

/// Entry of the module-wise view
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ModuleProgress {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub objectives: Option<String>,
    pub learning_points: Option<String>,
    /// Number of passing submissions recorded against the module
    pub completion_percentage: f64,
    pub course: CourseSummary,
    pub progress: ProgressSnapshot,
    /// Score of the learner's latest attempt, 0 when never attempted
    pub latest_score: i32,
    #[schema(value_type = Option<String>)]
    pub latest_status: Option<QuizStatus>,
}

/// Module entry of the course-wise view
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ModuleStatus {
    pub module_id: i32,
    pub title: String,
    pub description: Option<String>,
    /// "Passed"/"Failed" from the latest attempt, or "Not Started"
    pub status: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseProgressSummary {
    #[schema(value_type = String)]
    pub completion_status: ProgressStatus,
    pub completion_percentage: f64,
    pub last_accessed: Option<DateTime<Utc>>,
    pub total_score: i64,
    pub total_marks: i64,
    /// `total_score / total_marks * 100`, two decimals
    pub quiz_percentage: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseProgressReport {
    pub modules: Vec<ModuleStatus>,
    pub course_progress: CourseProgressSummary,
}

/// Entry of the employee detail view, one per module
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmployeeModuleProgress {
    pub user_id: i32,
    pub course_id: i32,
    pub module_id: i32,
    pub module_title: String,
    #[schema(value_type = String)]
    pub completion_status: ProgressStatus,
    pub completion_percentage: f64,
    pub last_accessed: DateTime<Utc>,
    #[schema(value_type = Option<String>)]
    pub quiz_status: Option<QuizStatus>,
}

/// Body of `PUT /api/modules/{id}/progress`
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ProgressUpdate {
    pub user_id: Option<i32>,
    pub completion_percentage: Option<f64>,
    /// One of "Not Started", "In Progress", "Completed"
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProgressRecord {
    pub user_id: i32,
    pub course_id: i32,
    pub completion_percentage: f64,
    #[schema(value_type = String)]
    pub status: ProgressStatus,
    pub last_accessed: DateTime<Utc>,
}

impl From<course_progress::Model> for ProgressRecord {
    fn from(row: course_progress::Model) -> Self {
        Self {
            user_id: row.user_id,
            course_id: row.course_id,
            completion_percentage: row.completion_percentage,
            status: row.status,
            last_accessed: row.last_accessed,
        }
    }
}

/// Round to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Latest result per module; `results` must be ordered oldest first
fn latest_by_module(results: Vec<quiz_result::Model>) -> HashMap<i32, quiz_result::Model> {
    let mut latest = HashMap::new();
    for result in results {
        latest.insert(result.module_id, result);
    }
    latest
}

/// Progress views computed on demand from the store
#[derive(Clone)]
pub struct ProgressAggregator {
    store: Arc<dyn LearningStore>,
}

impl ProgressAggregator {
    pub fn new(store: Arc<dyn LearningStore>) -> Self {
        Self { store }
    }

    async fn require_course(&self, course_id: i32) -> Result<course::Model, CoreError> {
        self.store
            .find_course(course_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("Course with ID {} not found", course_id)))
    }

    async fn latest_results(
        &self,
        user_id: i32,
        modules: &[module::Model],
    ) -> Result<HashMap<i32, quiz_result::Model>, CoreError> {
        let module_ids: Vec<i32> = modules.iter().map(|m| m.id).collect();
        let results = self
            .store
            .results_for_user_in_modules(user_id, &module_ids)
            .await?;
        Ok(latest_by_module(results))
    }

    /// Every module of the course with the learner's progress
    pub async fn module_progress(
        &self,
        user_id: i32,
        course_id: i32,
    ) -> Result<Vec<ModuleProgress>, CoreError> {
        let course = self.require_course(course_id).await?;
        let modules = self.store.modules_for_course(course_id).await?;
        let progress = self.store.find_progress(user_id, course_id).await?;
        let snapshot = ProgressSnapshot::from_row(progress.as_ref());
        let latest = self.latest_results(user_id, &modules).await?;

        debug!(
            "Module view for user {} in course {}: {} modules",
            user_id,
            course_id,
            modules.len()
        );

        Ok(modules
            .into_iter()
            .map(|m| {
                let result = latest.get(&m.id);
                ModuleProgress {
                    id: m.id,
                    title: m.title,
                    description: m.description,
                    objectives: m.objectives,
                    learning_points: m.learning_points,
                    completion_percentage: m.completion_percentage,
                    course: CourseSummary {
                        id: course.id,
                        title: course.title.clone(),
                        description: course.description.clone(),
                    },
                    progress: snapshot,
                    latest_score: result.map(|r| r.score).unwrap_or(0),
                    latest_status: result.map(|r| r.status),
                }
            })
            .collect())
    }

    /// Quiz totals over the latest attempt at each module, with the course
    /// progress row (or its defaults)
    pub async fn course_progress(
        &self,
        user_id: i32,
        course_id: i32,
    ) -> Result<CourseProgressReport, CoreError> {
        self.require_course(course_id).await?;
        let modules = self.store.modules_for_course(course_id).await?;
        let latest = self.latest_results(user_id, &modules).await?;
        let progress = self.store.find_progress(user_id, course_id).await?;

        let total_score: i64 = latest.values().map(|r| i64::from(r.score)).sum();
        let total_marks: i64 = latest.values().map(|r| i64::from(r.total_marks)).sum();
        let quiz_percentage = if total_marks > 0 {
            round2(total_score as f64 / total_marks as f64 * 100.0)
        } else {
            0.0
        };

        let snapshot = ProgressSnapshot::from_row(progress.as_ref());
        let summary = CourseProgressSummary {
            completion_status: snapshot.status,
            completion_percentage: snapshot.completion_percentage,
            last_accessed: progress.as_ref().map(|p| p.last_accessed),
            total_score,
            total_marks,
            quiz_percentage,
        };

        let modules = modules
            .into_iter()
            .map(|m| ModuleStatus {
                status: latest
                    .get(&m.id)
                    .map(|r| r.status.as_str())
                    .unwrap_or(ProgressStatus::NotStarted.as_str())
                    .to_string(),
                module_id: m.id,
                title: m.title,
                description: m.description,
            })
            .collect();

        Ok(CourseProgressReport {
            modules,
            course_progress: summary,
        })
    }

    /// Course progress row expanded to one entry per module
    pub async fn employee_detail(
        &self,
        user_id: i32,
        course_id: i32,
    ) -> Result<Vec<EmployeeModuleProgress>, CoreError> {
        let progress = self
            .store
            .find_progress(user_id, course_id)
            .await?
            .ok_or_else(|| CoreError::not_found("No progress data found for the user"))?;
        let modules = self.store.modules_for_course(course_id).await?;
        let latest = self.latest_results(user_id, &modules).await?;

        Ok(modules
            .into_iter()
            .map(|m| EmployeeModuleProgress {
                user_id,
                course_id,
                quiz_status: latest.get(&m.id).map(|r| r.status),
                module_id: m.id,
                module_title: m.title,
                completion_status: progress.status,
                completion_percentage: progress.completion_percentage,
                last_accessed: progress.last_accessed,
            })
            .collect())
    }

    /// Overwrite the learner's progress in the course owning `module_id`
    pub async fn update_progress(
        &self,
        module_id: i32,
        update: ProgressUpdate,
    ) -> Result<ProgressRecord, CoreError> {
        let (Some(user_id), Some(percentage), Some(status)) =
            (update.user_id, update.completion_percentage, update.status.as_deref())
        else {
            return Err(CoreError::validation(
                "user_id, completion_percentage and status are required",
            ));
        };

        let status = ProgressStatus::parse(status)
            .ok_or_else(|| CoreError::validation("Invalid status value"))?;
        if !(0.0..=FULL_COMPLETION).contains(&percentage) {
            return Err(CoreError::validation(
                "completion_percentage must be between 0 and 100",
            ));
        }
        if !progress::status_matches_percentage(status, percentage) {
            return Err(CoreError::validation(format!(
                "status '{}' does not match completion_percentage {}",
                status.as_str(),
                percentage
            )));
        }

        let module = self
            .store
            .find_module(module_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Module not found"))?;

        let saved = self
            .store
            .save_progress(user_id, module.course_id, percentage, status)
            .await?;
        info!(
            "Progress of user {} in course {} set to {} ({}%)",
            user_id,
            module.course_id,
            status.as_str(),
            percentage
        );

        Ok(saved.into())
    }
}
