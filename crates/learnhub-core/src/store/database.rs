//! `LearningStore` backed by sea-orm (postgres or sqlite)

use async_trait::async_trait;
use chrono::Utc;
use learnhub_db::entities::{
    audit_trail, course, course_progress, enrollment, module, performance_analytics, quiz,
    quiz_result, EnrollmentStatus, ProgressStatus, QuizStatus,
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, NotSet, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde_json::Value;
use tracing::{debug, error, info};

use super::{GradedSubmission, LearningStore, ProgressFilter, SubmissionRecord};
use crate::catalog::{CourseEdit, NewCourse};
use crate::error::CoreError;
use crate::progress::{self, AnalyticsTotals};

/// Store over a sea-orm connection pool
#[derive(Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

async fn append_audit<C: ConnectionTrait>(
    conn: &C,
    course_id: Option<i32>,
    user_id: i32,
    action: String,
) -> Result<audit_trail::Model, DbErr> {
    audit_trail::ActiveModel {
        id: NotSet,
        course_id: Set(course_id),
        user_id: Set(user_id),
        action: Set(action),
        created_at: Set(Utc::now()),
    }
    .insert(conn)
    .await
}

async fn insert_course(
    txn: &DatabaseTransaction,
    new_course: &NewCourse,
) -> Result<course::Model, DbErr> {
    let now = Utc::now();

    let created = course::ActiveModel {
        id: NotSet,
        course_code: Set(new_course.course_code.trim().to_string()),
        title: Set(new_course.title.clone()),
        description: Set(new_course.description.clone()),
        instructor: Set(new_course.instructor.clone()),
        start_date: Set(new_course.start_date.clone()),
        end_date: Set(new_course.end_date.clone()),
        duration: Set(new_course.duration.clone()),
        detailed_description: Set(new_course.detailed_description.clone()),
        created_by: Set(new_course.created_by),
        created_at: Set(now),
    }
    .insert(txn)
    .await?;

    for new_module in &new_course.modules {
        let saved_module = module::ActiveModel {
            id: NotSet,
            course_id: Set(created.id),
            title: Set(new_module.title.clone()),
            description: Set(new_module.description.clone()),
            objectives: Set(new_module.objectives.clone()),
            learning_points: Set(new_module.learning_points.clone()),
            completion_percentage: Set(0.0),
            created_at: Set(now),
        }
        .insert(txn)
        .await?;

        for new_quiz in &new_module.quizzes {
            quiz::ActiveModel {
                id: NotSet,
                module_id: Set(saved_module.id),
                question: Set(new_quiz.question.clone()),
                correct_answer: Set(new_quiz.correct_answer.clone()),
                marks: Set(new_quiz.marks),
                options: Set(Value::Array(
                    new_quiz.options.iter().cloned().map(Value::String).collect(),
                )),
                created_at: Set(now),
            }
            .insert(txn)
            .await?;
        }
    }

    append_audit(
        txn,
        Some(created.id),
        new_course.created_by,
        format!("'{}' is Added.", new_course.title),
    )
    .await?;

    Ok(created)
}

async fn write_submission(
    txn: &DatabaseTransaction,
    submission: &GradedSubmission,
) -> Result<SubmissionRecord, CoreError> {
    let user_id = submission.user_id;
    let module_id = submission.module.id;
    let course_id = submission.module.course_id;
    let outcome = &submission.outcome;
    let passed = outcome.passed();

    let passed_before = quiz_result::Entity::find()
        .filter(quiz_result::Column::UserId.eq(user_id))
        .filter(quiz_result::Column::ModuleId.eq(module_id))
        .filter(quiz_result::Column::Status.eq(QuizStatus::Passed))
        .count(txn)
        .await?
        > 0;

    let result = quiz_result::ActiveModel {
        id: NotSet,
        user_id: Set(user_id),
        module_id: Set(module_id),
        score: Set(outcome.total_score),
        status: Set(outcome.status),
        total_marks: Set(outcome.total_marks),
        answers: Set(submission.answers.clone()),
        correct_answers: Set(outcome.correct_answers_json()),
        is_correct: Set(outcome.is_correct_json()),
        time_spent: Set(submission.time_spent),
        is_complete: Set(true),
        attempted_at: Set(submission.attempted_at),
    }
    .insert(txn)
    .await?;

    if passed {
        module::Entity::update_many()
            .col_expr(
                module::Column::CompletionPercentage,
                Expr::col(module::Column::CompletionPercentage).add(1.0),
            )
            .filter(module::Column::Id.eq(module_id))
            .exec(txn)
            .await?;
    }

    let module_count = module::Entity::find()
        .filter(module::Column::CourseId.eq(course_id))
        .count(txn)
        .await?;

    let counted = passed && !passed_before;
    let increment = progress::completion_increment(counted, module_count);

    let existing_progress = course_progress::Entity::find()
        .filter(course_progress::Column::UserId.eq(user_id))
        .filter(course_progress::Column::CourseId.eq(course_id))
        .one(txn)
        .await?;

    let advance = progress::advance(
        existing_progress.as_ref().map(|p| p.completion_percentage),
        increment,
    );

    let progress_row = match existing_progress {
        Some(row) => {
            let mut active: course_progress::ActiveModel = row.into();
            active.completion_percentage = Set(advance.percentage);
            active.status = Set(advance.status);
            active.last_accessed = Set(submission.attempted_at);
            active.update(txn).await?
        }
        None => {
            course_progress::ActiveModel {
                id: NotSet,
                user_id: Set(user_id),
                course_id: Set(course_id),
                completion_percentage: Set(advance.percentage),
                status: Set(advance.status),
                last_accessed: Set(submission.attempted_at),
            }
            .insert(txn)
            .await?
        }
    };

    let existing_analytics = performance_analytics::Entity::find()
        .filter(performance_analytics::Column::UserId.eq(user_id))
        .filter(performance_analytics::Column::CourseId.eq(course_id))
        .one(txn)
        .await?;

    let previous_totals = existing_analytics
        .as_ref()
        .map(|row| AnalyticsTotals {
            quizzes_taken: row.quizzes_taken,
            modules_completed: row.modules_completed,
            total_score: row.total_score,
            average_score: row.average_score,
        })
        .unwrap_or_default();
    let totals = previous_totals.record(outcome.total_score, advance.just_completed)?;

    let previous_trends = existing_analytics
        .as_ref()
        .map(|row| row.trends.clone())
        .unwrap_or(Value::Array(Vec::new()));
    let trends = progress::push_trend_point(
        &previous_trends,
        submission.attempted_at,
        outcome.total_score,
        outcome.total_marks,
        totals.average_score,
    );

    let analytics_row = match existing_analytics {
        Some(row) => {
            let mut active: performance_analytics::ActiveModel = row.into();
            active.quizzes_taken = Set(totals.quizzes_taken);
            active.modules_completed = Set(totals.modules_completed);
            active.total_score = Set(totals.total_score);
            active.average_score = Set(totals.average_score);
            active.trends = Set(trends);
            active.update(txn).await?
        }
        None => {
            performance_analytics::ActiveModel {
                id: NotSet,
                user_id: Set(user_id),
                course_id: Set(course_id),
                quizzes_taken: Set(totals.quizzes_taken),
                modules_completed: Set(totals.modules_completed),
                total_score: Set(totals.total_score),
                average_score: Set(totals.average_score),
                trends: Set(trends),
            }
            .insert(txn)
            .await?
        }
    };

    Ok(SubmissionRecord {
        result,
        progress: progress_row,
        analytics: analytics_row,
        counted_toward_completion: counted,
    })
}

#[async_trait]
impl LearningStore for SeaOrmStore {
    async fn find_course(&self, id: i32) -> Result<Option<course::Model>, CoreError> {
        Ok(course::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn find_course_by_code(&self, code: &str) -> Result<Option<course::Model>, CoreError> {
        Ok(course::Entity::find()
            .filter(course::Column::CourseCode.eq(code.trim()))
            .one(&self.db)
            .await?)
    }

    async fn list_courses(&self) -> Result<Vec<course::Model>, CoreError> {
        Ok(course::Entity::find()
            .order_by_desc(course::Column::CreatedAt)
            .order_by_desc(course::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn courses_by_ids(&self, ids: &[i32]) -> Result<Vec<course::Model>, CoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(course::Entity::find()
            .filter(course::Column::Id.is_in(ids.to_vec()))
            .order_by_asc(course::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn create_course(&self, new_course: &NewCourse) -> Result<course::Model, CoreError> {
        let txn = self.db.begin().await?;

        match insert_course(&txn, new_course).await {
            Ok(created) => {
                txn.commit().await?;
                info!("Created course {} ({})", created.id, created.course_code);
                Ok(created)
            }
            Err(e) => {
                error!("Rolling back course creation: {}", e);
                txn.rollback().await?;
                Err(e.into())
            }
        }
    }

    async fn update_course(
        &self,
        course_id: i32,
        edit: &CourseEdit,
        editor_id: i32,
        audit_action: String,
    ) -> Result<Option<course::Model>, CoreError> {
        let txn = self.db.begin().await?;

        let Some(existing) = course::Entity::find_by_id(course_id).one(&txn).await? else {
            txn.rollback().await?;
            return Ok(None);
        };

        let mut active: course::ActiveModel = existing.into();
        active.title = Set(edit.title.trim().to_string());
        active.description = Set(edit.description.clone());
        active.start_date = Set(edit.start_date.clone());
        active.end_date = Set(edit.end_date.clone());
        active.duration = Set(edit.duration.clone());
        if let Some(detailed) = &edit.detailed_description {
            active.detailed_description = Set(Some(detailed.clone()));
        }
        let updated = active.update(&txn).await?;

        append_audit(&txn, Some(course_id), editor_id, audit_action).await?;

        txn.commit().await?;
        info!("Course {} edited by user {}", course_id, editor_id);
        Ok(Some(updated))
    }

    async fn find_module(&self, id: i32) -> Result<Option<module::Model>, CoreError> {
        Ok(module::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn modules_for_course(&self, course_id: i32) -> Result<Vec<module::Model>, CoreError> {
        Ok(module::Entity::find()
            .filter(module::Column::CourseId.eq(course_id))
            .order_by_asc(module::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn quizzes_for_module(&self, module_id: i32) -> Result<Vec<quiz::Model>, CoreError> {
        Ok(quiz::Entity::find()
            .filter(quiz::Column::ModuleId.eq(module_id))
            .order_by_asc(quiz::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn quizzes_for_modules(&self, module_ids: &[i32]) -> Result<Vec<quiz::Model>, CoreError> {
        if module_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(quiz::Entity::find()
            .filter(quiz::Column::ModuleId.is_in(module_ids.to_vec()))
            .order_by_asc(quiz::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn find_enrollment(
        &self,
        user_id: i32,
        course_id: i32,
    ) -> Result<Option<enrollment::Model>, CoreError> {
        Ok(enrollment::Entity::find()
            .filter(enrollment::Column::UserId.eq(user_id))
            .filter(enrollment::Column::CourseId.eq(course_id))
            .one(&self.db)
            .await?)
    }

    async fn enrollments_for_user(&self, user_id: i32) -> Result<Vec<enrollment::Model>, CoreError> {
        Ok(enrollment::Entity::find()
            .filter(enrollment::Column::UserId.eq(user_id))
            .order_by_asc(enrollment::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn enrollments_for_course(
        &self,
        course_id: i32,
    ) -> Result<Vec<enrollment::Model>, CoreError> {
        Ok(enrollment::Entity::find()
            .filter(enrollment::Column::CourseId.eq(course_id))
            .order_by_asc(enrollment::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn enrollments(&self, filter: ProgressFilter) -> Result<Vec<enrollment::Model>, CoreError> {
        let mut condition = Condition::all();
        if let Some(course_id) = filter.course_id {
            condition = condition.add(enrollment::Column::CourseId.eq(course_id));
        }
        if let Some(user_id) = filter.user_id {
            condition = condition.add(enrollment::Column::UserId.eq(user_id));
        }

        Ok(enrollment::Entity::find()
            .filter(condition)
            .order_by_asc(enrollment::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn create_enrollment(
        &self,
        user_id: i32,
        course_id: i32,
    ) -> Result<enrollment::Model, CoreError> {
        let created = enrollment::ActiveModel {
            id: NotSet,
            user_id: Set(user_id),
            course_id: Set(course_id),
            status: Set(EnrollmentStatus::Enrolled),
            enrolled_at: Set(Utc::now()),
            is_completed: Set(false),
        }
        .insert(&self.db)
        .await?;

        info!("User {} enrolled in course {}", user_id, course_id);
        Ok(created)
    }

    async fn complete_enrollment(
        &self,
        user_id: i32,
        course_id: i32,
    ) -> Result<Option<enrollment::Model>, CoreError> {
        let txn = self.db.begin().await?;

        let Some(existing) = enrollment::Entity::find()
            .filter(enrollment::Column::UserId.eq(user_id))
            .filter(enrollment::Column::CourseId.eq(course_id))
            .one(&txn)
            .await?
        else {
            txn.rollback().await?;
            return Ok(None);
        };

        let mut active: enrollment::ActiveModel = existing.into();
        active.status = Set(EnrollmentStatus::Completed);
        active.is_completed = Set(true);
        let updated = active.update(&txn).await?;

        append_audit(
            &txn,
            Some(course_id),
            user_id,
            "Course Completed".to_string(),
        )
        .await?;

        txn.commit().await?;
        info!("User {} completed course {}", user_id, course_id);
        Ok(Some(updated))
    }

    async fn audit_trail(&self) -> Result<Vec<audit_trail::Model>, CoreError> {
        Ok(audit_trail::Entity::find()
            .order_by_asc(audit_trail::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn find_progress(
        &self,
        user_id: i32,
        course_id: i32,
    ) -> Result<Option<course_progress::Model>, CoreError> {
        Ok(course_progress::Entity::find()
            .filter(course_progress::Column::UserId.eq(user_id))
            .filter(course_progress::Column::CourseId.eq(course_id))
            .one(&self.db)
            .await?)
    }

    async fn progress_for_user(
        &self,
        user_id: i32,
    ) -> Result<Vec<course_progress::Model>, CoreError> {
        Ok(course_progress::Entity::find()
            .filter(course_progress::Column::UserId.eq(user_id))
            .order_by_asc(course_progress::Column::CourseId)
            .all(&self.db)
            .await?)
    }

    async fn progress_rows(
        &self,
        filter: ProgressFilter,
    ) -> Result<Vec<course_progress::Model>, CoreError> {
        let mut condition = Condition::all();
        if let Some(course_id) = filter.course_id {
            condition = condition.add(course_progress::Column::CourseId.eq(course_id));
        }
        if let Some(user_id) = filter.user_id {
            condition = condition.add(course_progress::Column::UserId.eq(user_id));
        }
        if let Some(from) = filter.accessed_from {
            condition = condition.add(course_progress::Column::LastAccessed.gte(from));
        }
        if let Some(until) = filter.accessed_until {
            condition = condition.add(course_progress::Column::LastAccessed.lte(until));
        }

        Ok(course_progress::Entity::find()
            .filter(condition)
            .order_by_asc(course_progress::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn save_progress(
        &self,
        user_id: i32,
        course_id: i32,
        completion_percentage: f64,
        status: ProgressStatus,
    ) -> Result<course_progress::Model, CoreError> {
        let now = Utc::now();
        let existing = self.find_progress(user_id, course_id).await?;

        let saved = match existing {
            Some(row) => {
                let mut active: course_progress::ActiveModel = row.into();
                active.completion_percentage = Set(completion_percentage);
                active.status = Set(status);
                active.last_accessed = Set(now);
                active.update(&self.db).await?
            }
            None => {
                course_progress::ActiveModel {
                    id: NotSet,
                    user_id: Set(user_id),
                    course_id: Set(course_id),
                    completion_percentage: Set(completion_percentage),
                    status: Set(status),
                    last_accessed: Set(now),
                }
                .insert(&self.db)
                .await?
            }
        };

        debug!(
            "Progress for user {} in course {} set to {}%",
            user_id, course_id, saved.completion_percentage
        );
        Ok(saved)
    }

    async fn results_for_user(&self, user_id: i32) -> Result<Vec<quiz_result::Model>, CoreError> {
        Ok(quiz_result::Entity::find()
            .filter(quiz_result::Column::UserId.eq(user_id))
            .order_by_asc(quiz_result::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn results_for_user_in_modules(
        &self,
        user_id: i32,
        module_ids: &[i32],
    ) -> Result<Vec<quiz_result::Model>, CoreError> {
        if module_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(quiz_result::Entity::find()
            .filter(quiz_result::Column::UserId.eq(user_id))
            .filter(quiz_result::Column::ModuleId.is_in(module_ids.to_vec()))
            .order_by_asc(quiz_result::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn record_submission(
        &self,
        submission: GradedSubmission,
    ) -> Result<SubmissionRecord, CoreError> {
        let txn = self.db.begin().await?;

        match write_submission(&txn, &submission).await {
            Ok(record) => {
                txn.commit().await?;
                Ok(record)
            }
            Err(e) => {
                error!(
                    "Rolling back submission of user {} for module {}: {}",
                    submission.user_id, submission.module.id, e
                );
                txn.rollback().await?;
                Err(e)
            }
        }
    }

    async fn all_analytics(&self) -> Result<Vec<performance_analytics::Model>, CoreError> {
        Ok(performance_analytics::Entity::find()
            .order_by_asc(performance_analytics::Column::UserId)
            .order_by_asc(performance_analytics::Column::CourseId)
            .all(&self.db)
            .await?)
    }
}
