//! Course catalog, enrollment and audit log

use chrono::{DateTime, Utc};
use learnhub_db::entities::{audit_trail, course, quiz, EnrollmentStatus, ProgressStatus};
use learnhub_directory::{UserDirectory, UserRole};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use crate::error::CoreError;
use crate::grading::MAX_QUIZ_MARKS;
use crate::store::LearningStore;

/// Request body for creating a course with its content
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewCourse {
    /// External course code
    #[serde(rename = "course_id", default)]
    pub course_code: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub instructor: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub detailed_description: Option<String>,
    /// Id of the creating user in the authentication service
    #[serde(default)]
    pub created_by: i32,
    #[serde(default)]
    pub modules: Vec<NewModule>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewModule {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub objectives: Option<String>,
    #[serde(default)]
    pub learning_points: Option<String>,
    #[serde(default)]
    pub quizzes: Vec<NewQuiz>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewQuiz {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub correct_answer: String,
    #[serde(default)]
    pub marks: i32,
    #[serde(default)]
    pub options: Vec<String>,
}

impl NewCourse {
    pub fn validate(&self) -> Result<(), CoreError> {
        let required = [
            ("course_id", &self.course_code),
            ("title", &self.title),
            ("description", &self.description),
            ("instructor", &self.instructor),
            ("start_date", &self.start_date),
            ("end_date", &self.end_date),
            ("duration", &self.duration),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(CoreError::validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }
        if self.created_by <= 0 {
            return Err(CoreError::validation("Missing required fields: created_by"));
        }

        for (index, module) in self.modules.iter().enumerate() {
            if module.title.trim().is_empty() {
                return Err(CoreError::validation(format!(
                    "Module {} is missing a title",
                    index + 1
                )));
            }
            for quiz in &module.quizzes {
                if quiz.question.trim().is_empty() || quiz.correct_answer.is_empty() {
                    return Err(CoreError::validation(format!(
                        "Every quiz in module '{}' needs a question and a correct answer",
                        module.title
                    )));
                }
                if !(0..=MAX_QUIZ_MARKS).contains(&quiz.marks) {
                    return Err(CoreError::validation(format!(
                        "Quiz '{}' marks must be between 0 and {}",
                        quiz.question, MAX_QUIZ_MARKS
                    )));
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatedCourse {
    pub id: i32,
    #[serde(rename = "course_id")]
    pub course_code: String,
    pub title: String,
}

/// A quiz as listed in the catalog. `correct_answer` is only filled for
/// content authors.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuizView {
    pub id: i32,
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    pub marks: i32,
    pub options: Vec<String>,
}

impl QuizView {
    pub fn from_model(quiz: &quiz::Model, with_answer: bool) -> Self {
        Self {
            id: quiz.id,
            question: quiz.question.clone(),
            correct_answer: with_answer.then(|| quiz.correct_answer.clone()),
            marks: quiz.marks,
            options: quiz.option_list(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ModuleView {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub objectives: Option<String>,
    pub learning_points: Option<String>,
    pub quizzes: Vec<QuizView>,
}

/// One course as seen by a particular user
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseListing {
    pub id: i32,
    #[serde(rename = "course_id")]
    pub course_code: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub duration: String,
    pub detailed_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: i32,
    /// The user's progress status, if they have started
    #[schema(value_type = Option<String>)]
    pub status: Option<ProgressStatus>,
    pub is_enrolled: bool,
    #[schema(value_type = Option<String>)]
    pub enrollment_status: Option<EnrollmentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modules: Option<Vec<ModuleView>>,
}

/// Body of the enroll and complete-course requests
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct EnrollmentRequest {
    #[serde(default)]
    pub user_id: i32,
    #[serde(default)]
    pub course_id: i32,
}

impl EnrollmentRequest {
    fn validate(&self) -> Result<(), CoreError> {
        if self.user_id <= 0 || self.course_id <= 0 {
            return Err(CoreError::validation("user_id and course_id are required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EnrolledCourse {
    pub enrollment_id: i32,
    pub course_id: i32,
    pub course_code: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = String)]
    pub status: EnrollmentStatus,
    pub is_completed: bool,
    pub enrolled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuditEntry {
    pub id: i32,
    pub course_id: Option<i32>,
    pub user_id: i32,
    pub action: String,
    pub created_at: DateTime<Utc>,
}

impl From<audit_trail::Model> for AuditEntry {
    fn from(entry: audit_trail::Model) -> Self {
        Self {
            id: entry.id,
            course_id: entry.course_id,
            user_id: entry.user_id,
            action: entry.action,
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseUser {
    pub user_id: i32,
    pub name: String,
    pub email: String,
    #[schema(value_type = String)]
    pub enrollment_status: EnrollmentStatus,
    pub enrolled_at: DateTime<Utc>,
}

/// Editable course fields
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CourseEdit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub duration: String,
    /// Left unchanged when absent
    #[serde(default)]
    pub detailed_description: Option<String>,
}

impl CourseEdit {
    fn validate(&self) -> Result<(), CoreError> {
        let required = [
            ("title", &self.title),
            ("description", &self.description),
            ("start_date", &self.start_date),
            ("end_date", &self.end_date),
            ("duration", &self.duration),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(CoreError::validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }
}

/// Body of `PUT /editCourse/{course_id}`
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseEditRequest {
    #[serde(default)]
    pub course_data: Option<CourseEdit>,
    /// The editing user
    #[serde(default)]
    pub user_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseCreator {
    pub id: i32,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// A single course as seen by one user
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseDetails {
    pub course_id: i32,
    pub course_code: String,
    pub title: String,
    pub description: String,
    pub instructor: String,
    /// Enrollment status, or "Not Enrolled"
    pub status: String,
    pub is_completed: bool,
    pub start_date: String,
    pub end_date: String,
    pub duration: String,
    pub detailed_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: CourseCreator,
}

/// An enrolled course with the learner's progress
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserCourse {
    pub course_id: i32,
    pub title: String,
    pub description: String,
    pub instructor: String,
    #[schema(value_type = String)]
    pub status: EnrollmentStatus,
    pub is_completed: bool,
    pub enrolled_at: DateTime<Utc>,
    #[schema(value_type = String)]
    pub progress_status: ProgressStatus,
    pub completion_percentage: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmployeeCourseProgress {
    pub name: String,
    pub email: String,
    pub course_id: i32,
    pub completion_percentage: f64,
    #[schema(value_type = String)]
    pub status: ProgressStatus,
    pub last_accessed: DateTime<Utc>,
}

/// Catalog and enrollment operations
#[derive(Clone)]
pub struct CourseCatalog {
    store: Arc<dyn LearningStore>,
    directory: Arc<dyn UserDirectory>,
}

impl CourseCatalog {
    pub fn new(store: Arc<dyn LearningStore>, directory: Arc<dyn UserDirectory>) -> Self {
        Self { store, directory }
    }

    /// Create a course with its modules and quizzes
    pub async fn create_course(&self, new_course: NewCourse) -> Result<CreatedCourse, CoreError> {
        new_course.validate()?;

        if self.directory.get_user(new_course.created_by).await?.is_none() {
            return Err(CoreError::not_found(format!(
                "Creator with ID {} not found",
                new_course.created_by
            )));
        }

        if self
            .store
            .find_course_by_code(&new_course.course_code)
            .await?
            .is_some()
        {
            return Err(CoreError::Conflict(format!(
                "Course with code '{}' already exists",
                new_course.course_code.trim()
            )));
        }

        let created = self.store.create_course(&new_course).await?;
        Ok(CreatedCourse {
            id: created.id,
            course_code: created.course_code,
            title: created.title,
        })
    }

    /// Every course, newest first, annotated for `user_id`
    pub async fn list_courses_for_user(&self, user_id: i32) -> Result<Vec<CourseListing>, CoreError> {
        let user = self
            .directory
            .get_user(user_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("User with ID {} not found", user_id)))?;
        let role = user.role();
        let reduced = role == UserRole::Employee;

        let courses = self.store.list_courses().await?;
        let enrollments: HashMap<i32, EnrollmentStatus> = self
            .store
            .enrollments_for_user(user_id)
            .await?
            .into_iter()
            .map(|e| (e.course_id, e.status))
            .collect();
        let progress: HashMap<i32, ProgressStatus> = self
            .store
            .progress_for_user(user_id)
            .await?
            .into_iter()
            .map(|p| (p.course_id, p.status))
            .collect();

        let mut listings = Vec::with_capacity(courses.len());
        for course in courses {
            let modules = if reduced {
                None
            } else {
                Some(self.module_views(course.id, role.authors_content()).await?)
            };
            let enrollment_status = enrollments.get(&course.id).copied();

            listings.push(CourseListing {
                id: course.id,
                course_code: course.course_code,
                title: course.title,
                description: course.description,
                instructor: (!reduced).then_some(course.instructor),
                start_date: course.start_date,
                end_date: course.end_date,
                duration: course.duration,
                detailed_description: course.detailed_description,
                created_at: course.created_at,
                created_by: course.created_by,
                status: progress.get(&course.id).copied(),
                is_enrolled: enrollment_status.is_some(),
                enrollment_status,
                modules,
            });
        }

        debug!("Listed {} courses for user {}", listings.len(), user_id);
        Ok(listings)
    }

    async fn module_views(&self, course_id: i32, with_answers: bool) -> Result<Vec<ModuleView>, CoreError> {
        let modules = self.store.modules_for_course(course_id).await?;
        let module_ids: Vec<i32> = modules.iter().map(|m| m.id).collect();
        let mut quizzes: HashMap<i32, Vec<QuizView>> = HashMap::new();
        for quiz in self.store.quizzes_for_modules(&module_ids).await? {
            quizzes
                .entry(quiz.module_id)
                .or_default()
                .push(QuizView::from_model(&quiz, with_answers));
        }

        Ok(modules
            .into_iter()
            .map(|m| ModuleView {
                quizzes: quizzes.remove(&m.id).unwrap_or_default(),
                id: m.id,
                title: m.title,
                description: m.description,
                objectives: m.objectives,
                learning_points: m.learning_points,
            })
            .collect())
    }

    pub async fn enroll(&self, request: EnrollmentRequest) -> Result<EnrolledCourse, CoreError> {
        request.validate()?;

        let course = self
            .store
            .find_course(request.course_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Course not found"))?;

        if self
            .store
            .find_enrollment(request.user_id, request.course_id)
            .await?
            .is_some()
        {
            return Err(CoreError::Conflict(
                "User is already enrolled in this course".to_string(),
            ));
        }

        let enrollment = self
            .store
            .create_enrollment(request.user_id, request.course_id)
            .await?;

        Ok(enrolled_course(enrollment, Some(&course)))
    }

    pub async fn enrolled_courses(&self, user_id: i32) -> Result<Vec<EnrolledCourse>, CoreError> {
        let enrollments = self.store.enrollments_for_user(user_id).await?;
        if enrollments.is_empty() {
            return Err(CoreError::not_found("No enrolled courses found"));
        }

        let course_ids: Vec<i32> = enrollments.iter().map(|e| e.course_id).collect();
        let courses: HashMap<i32, course::Model> = self
            .store
            .courses_by_ids(&course_ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        Ok(enrollments
            .into_iter()
            .map(|e| {
                let course = courses.get(&e.course_id);
                enrolled_course(e, course)
            })
            .collect())
    }

    /// Mark an enrollment completed and record it in the audit log
    pub async fn complete_course(&self, request: EnrollmentRequest) -> Result<EnrolledCourse, CoreError> {
        request.validate()?;

        let enrollment = self
            .store
            .complete_enrollment(request.user_id, request.course_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Enrollment not found"))?;
        let course = self.store.find_course(request.course_id).await?;

        Ok(enrolled_course(enrollment, course.as_ref()))
    }

    pub async fn audit_trail(&self) -> Result<Vec<AuditEntry>, CoreError> {
        Ok(self
            .store
            .audit_trail()
            .await?
            .into_iter()
            .map(AuditEntry::from)
            .collect())
    }

    /// Enrolled users with names resolved through the directory
    pub async fn course_users(&self, course_id: i32) -> Result<Vec<CourseUser>, CoreError> {
        if self.store.find_course(course_id).await?.is_none() {
            return Err(CoreError::not_found("Course not found"));
        }

        let enrollments = self.store.enrollments_for_course(course_id).await?;
        let mut users = Vec::with_capacity(enrollments.len());
        for enrollment in enrollments {
            let (name, email) = match self.directory.get_user(enrollment.user_id).await {
                Ok(Some(user)) => (user.name, user.email),
                Ok(None) => {
                    warn!("Enrolled user {} is unknown to the directory", enrollment.user_id);
                    unknown_user()
                }
                Err(e) => {
                    warn!("Failed to resolve user {}: {}", enrollment.user_id, e);
                    unknown_user()
                }
            };

            users.push(CourseUser {
                user_id: enrollment.user_id,
                name,
                email,
                enrollment_status: enrollment.status,
                enrolled_at: enrollment.enrolled_at,
            });
        }

        info!("Resolved {} users for course {}", users.len(), course_id);
        Ok(users)
    }

    /// Update a course's descriptive fields and log who edited it
    pub async fn edit_course(
        &self,
        course_id: i32,
        request: CourseEditRequest,
    ) -> Result<CreatedCourse, CoreError> {
        let user_id = request
            .user_id
            .filter(|id| *id > 0)
            .ok_or_else(|| CoreError::validation("User ID is required"))?;
        let edit = request
            .course_data
            .ok_or_else(|| CoreError::validation("courseData is required"))?;
        edit.validate()?;

        let editor = self
            .directory
            .get_user(user_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("User with ID {} not found", user_id)))?;

        let action = format!(
            "'{}' is Edited by {} ({}).",
            edit.title.trim(),
            editor.name,
            editor.email
        );
        let updated = self
            .store
            .update_course(course_id, &edit, user_id, action)
            .await?
            .ok_or_else(|| CoreError::not_found("Course not found"))?;

        Ok(CreatedCourse {
            id: updated.id,
            course_code: updated.course_code,
            title: updated.title,
        })
    }

    /// One course with the viewer's enrollment and the creator's contact
    pub async fn view_course(&self, user_id: i32, course_id: i32) -> Result<CourseDetails, CoreError> {
        let course = self
            .store
            .find_course(course_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Course not found"))?;
        let viewer = self
            .directory
            .get_user(user_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("User with ID {} not found", user_id)))?;

        let creator = if course.created_by == viewer.id {
            Some(viewer)
        } else {
            match self.directory.get_user(course.created_by).await {
                Ok(found) => found,
                Err(e) => {
                    warn!("Failed to resolve creator {}: {}", course.created_by, e);
                    None
                }
            }
        };
        let enrollment = self.store.find_enrollment(user_id, course_id).await?;

        Ok(CourseDetails {
            course_id: course.id,
            course_code: course.course_code,
            title: course.title,
            description: course.description,
            instructor: course.instructor,
            status: enrollment
                .as_ref()
                .map_or("Not Enrolled", |e| e.status.as_str())
                .to_string(),
            is_completed: enrollment.as_ref().is_some_and(|e| e.is_completed),
            start_date: course.start_date,
            end_date: course.end_date,
            duration: course.duration,
            detailed_description: course.detailed_description,
            created_at: course.created_at,
            created_by: CourseCreator {
                id: course.created_by,
                name: creator.as_ref().map(|u| u.name.clone()),
                email: creator.map(|u| u.email),
            },
        })
    }

    /// Enrolled courses joined with the learner's progress
    pub async fn user_courses(&self, user_id: i32) -> Result<Vec<UserCourse>, CoreError> {
        let enrollments = self.store.enrollments_for_user(user_id).await?;
        if enrollments.is_empty() {
            return Err(CoreError::not_found("No courses found for this user"));
        }

        let course_ids: Vec<i32> = enrollments.iter().map(|e| e.course_id).collect();
        let courses: HashMap<i32, course::Model> = self
            .store
            .courses_by_ids(&course_ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        let progress: HashMap<i32, (ProgressStatus, f64)> = self
            .store
            .progress_for_user(user_id)
            .await?
            .into_iter()
            .map(|p| (p.course_id, (p.status, p.completion_percentage)))
            .collect();

        Ok(enrollments
            .into_iter()
            .filter_map(|e| {
                let course = courses.get(&e.course_id)?;
                let (progress_status, completion_percentage) = progress
                    .get(&e.course_id)
                    .copied()
                    .unwrap_or((ProgressStatus::NotStarted, 0.0));
                Some(UserCourse {
                    course_id: course.id,
                    title: course.title.clone(),
                    description: course.description.clone(),
                    instructor: course.instructor.clone(),
                    status: e.status,
                    is_completed: e.is_completed,
                    enrolled_at: e.enrolled_at,
                    progress_status,
                    completion_percentage,
                })
            })
            .collect())
    }

    /// Course progress of a user holding the Employee role
    pub async fn employee_course_progress(
        &self,
        user_id: i32,
        course_id: i32,
    ) -> Result<EmployeeCourseProgress, CoreError> {
        let user = self
            .directory
            .get_user(user_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("User with ID {} not found", user_id)))?;
        if user.role() != UserRole::Employee {
            return Err(CoreError::validation("User is not an employee"));
        }

        let progress = self
            .store
            .find_progress(user_id, course_id)
            .await?
            .ok_or_else(|| {
                CoreError::not_found("No progress found for this user in the specified course")
            })?;

        Ok(EmployeeCourseProgress {
            name: user.name,
            email: user.email,
            course_id,
            completion_percentage: progress.completion_percentage,
            status: progress.status,
            last_accessed: progress.last_accessed,
        })
    }
}

fn unknown_user() -> (String, String) {
    ("Unknown".to_string(), "Unknown".to_string())
}

fn enrolled_course(
    enrollment: learnhub_db::entities::enrollment::Model,
    course: Option<&course::Model>,
) -> EnrolledCourse {
    EnrolledCourse {
        enrollment_id: enrollment.id,
        course_id: enrollment.course_id,
        course_code: course.map(|c| c.course_code.clone()),
        title: course.map(|c| c.title.clone()),
        description: course.map(|c| c.description.clone()),
        status: enrollment.status,
        is_completed: enrollment.is_completed,
        enrolled_at: enrollment.enrolled_at,
    }
}
