//! Request and response envelopes of the HTTP API

use learnhub_core::aggregator::{EmployeeModuleProgress, ModuleProgress, ProgressRecord};
use learnhub_core::catalog::{
    AuditEntry, CourseDetails, CourseListing, CourseUser, CreatedCourse, EnrolledCourse,
};
use learnhub_core::engine::{ModuleDetails, SubmissionReport};
use learnhub_core::reporting::IndividualPerformance;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: &str) -> Self {
        Self {
            error: error.into(),
            code: Some(code.to_string()),
        }
    }
}

/// `user_id` and `course_id` query pair shared by the progress views
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProgressQuery {
    pub user_id: Option<i32>,
    pub course_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ModuleListResponse {
    pub modules: Vec<ModuleProgress>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ModuleDetailsResponse {
    pub module: ModuleDetails,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubmitQuizResponse {
    pub message: String,
    pub result: SubmissionReport,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProgressUpdateResponse {
    pub message: String,
    pub progress: ProgressRecord,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmployeeProgressResponse {
    pub progress: Vec<EmployeeModuleProgress>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IndividualPerformanceResponse {
    /// Always "success"
    pub status: String,
    pub data: IndividualPerformance,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreateCourseResponse {
    pub message: String,
    pub course: CreatedCourse,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseListResponse {
    pub courses: Vec<CourseListing>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EnrollmentResponse {
    pub message: String,
    pub enrollment: EnrolledCourse,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EnrolledCoursesResponse {
    pub enrolled_courses: Vec<EnrolledCourse>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuditTrailResponse {
    pub audit_trail: Vec<AuditEntry>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseUsersResponse {
    pub users: Vec<CourseUser>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EditCourseResponse {
    pub message: String,
    pub course: CreatedCourse,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseDetailsResponse {
    pub course_details: CourseDetails,
}
