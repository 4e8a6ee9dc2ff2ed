//! HTTP handlers

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use learnhub_core::aggregator::ProgressUpdate;
use learnhub_core::catalog::{
    CourseEditRequest, EmployeeCourseProgress, EnrollmentRequest, NewCourse, UserCourse,
};
use learnhub_core::engine::QuizSubmission;
use learnhub_core::reporting::{HrFilters, HrReport, ManagerUserReport};
use std::sync::Arc;
use tracing::debug;

use crate::error::{error_response, invalid_request, ApiError};
use crate::models::*;
use crate::AppState;

fn path_param<T>(path: Result<Path<T>, PathRejection>) -> Result<T, ApiError> {
    path.map(|Path(value)| value)
        .map_err(|e| invalid_request(e.body_text()))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|e| invalid_request(e.body_text()))
}

/// Both ids of a progress query, or 400
fn user_and_course(
    query: Result<Query<ProgressQuery>, QueryRejection>,
) -> Result<(i32, i32), ApiError> {
    let Query(query) = query.map_err(|e| invalid_request(e.body_text()))?;
    match (query.user_id, query.course_id) {
        (Some(user_id), Some(course_id)) => Ok((user_id, course_id)),
        _ => Err(invalid_request("User ID and Course ID are required")),
    }
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Modules of a course with the learner's progress
#[utoipa::path(
    get,
    path = "/api/modules",
    params(ProgressQuery),
    responses(
        (status = 200, description = "Modules with progress", body = ModuleListResponse),
        (status = 400, description = "Missing user_id or course_id", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    tag = "progress"
)]
pub async fn list_modules(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ProgressQuery>, QueryRejection>,
) -> Result<Json<ModuleListResponse>, ApiError> {
    let (user_id, course_id) = user_and_course(query)?;
    debug!("Listing modules of course {} for user {}", course_id, user_id);

    let modules = state
        .services
        .progress
        .module_progress(user_id, course_id)
        .await
        .map_err(error_response)?;

    Ok(Json(ModuleListResponse { modules }))
}

/// Overwrite a learner's progress in the course owning the module
#[utoipa::path(
    put,
    path = "/api/modules/{id}/progress",
    params(
        ("id" = i32, Path, description = "Module ID")
    ),
    request_body = ProgressUpdate,
    responses(
        (status = 200, description = "Progress updated", body = ProgressUpdateResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorResponse),
        (status = 404, description = "Module not found", body = ErrorResponse)
    ),
    tag = "progress"
)]
pub async fn update_module_progress(
    State(state): State<Arc<AppState>>,
    module_id: Result<Path<i32>, PathRejection>,
    body: Result<Json<ProgressUpdate>, JsonRejection>,
) -> Result<Json<ProgressUpdateResponse>, ApiError> {
    let module_id = path_param(module_id)?;
    let update = json_body(body)?;

    let progress = state
        .services
        .progress
        .update_progress(module_id, update)
        .await
        .map_err(error_response)?;

    Ok(Json(ProgressUpdateResponse {
        message: "Progress updated successfully".to_string(),
        progress,
    }))
}

/// Module with its quizzes; stored answers are never included
#[utoipa::path(
    get,
    path = "/module/{id}/details",
    params(
        ("id" = i32, Path, description = "Module ID")
    ),
    responses(
        (status = 200, description = "Module details", body = ModuleDetailsResponse),
        (status = 404, description = "Module not found", body = ErrorResponse)
    ),
    tag = "quizzes"
)]
pub async fn module_details(
    State(state): State<Arc<AppState>>,
    module_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<ModuleDetailsResponse>, ApiError> {
    let module_id = path_param(module_id)?;

    let module = state
        .services
        .grading
        .module_details(module_id)
        .await
        .map_err(error_response)?;

    Ok(Json(ModuleDetailsResponse { module }))
}

/// Grade a quiz submission
#[utoipa::path(
    post,
    path = "/module/{id}/submit-quiz",
    params(
        ("id" = i32, Path, description = "Module ID")
    ),
    request_body = QuizSubmission,
    responses(
        (status = 201, description = "Submission graded and recorded", body = SubmitQuizResponse),
        (status = 400, description = "Missing user_id or answers", body = ErrorResponse),
        (status = 404, description = "Module or user not found", body = ErrorResponse),
        (status = 500, description = "Authentication service or database failure", body = ErrorResponse)
    ),
    tag = "quizzes"
)]
pub async fn submit_quiz(
    State(state): State<Arc<AppState>>,
    module_id: Result<Path<i32>, PathRejection>,
    body: Result<Json<QuizSubmission>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmitQuizResponse>), ApiError> {
    let module_id = path_param(module_id)?;
    let submission = match body {
        Ok(Json(submission)) => submission,
        Err(rejection) => {
            // Missing module wins over a malformed body
            state
                .services
                .grading
                .module_details(module_id)
                .await
                .map_err(error_response)?;
            return Err(invalid_request(rejection.body_text()));
        }
    };

    let report = state
        .services
        .grading
        .submit(module_id, submission)
        .await
        .map_err(error_response)?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitQuizResponse {
            message: "Quiz submitted successfully!".to_string(),
            result: report,
        }),
    ))
}

/// Course progress expanded per module
#[utoipa::path(
    get,
    path = "/api/employee-progress-detail/{user_id}/{course_id}",
    params(
        ("user_id" = i32, Path, description = "User ID"),
        ("course_id" = i32, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Per-module progress", body = EmployeeProgressResponse),
        (status = 404, description = "No progress recorded", body = ErrorResponse)
    ),
    tag = "progress"
)]
pub async fn employee_progress_detail(
    State(state): State<Arc<AppState>>,
    ids: Result<Path<(i32, i32)>, PathRejection>,
) -> Result<Json<EmployeeProgressResponse>, ApiError> {
    let (user_id, course_id) = path_param(ids)?;

    let progress = state
        .services
        .progress
        .employee_detail(user_id, course_id)
        .await
        .map_err(error_response)?;

    Ok(Json(EmployeeProgressResponse { progress }))
}

/// Quiz totals and completion of one course
#[utoipa::path(
    get,
    path = "/api/course-progress",
    params(ProgressQuery),
    responses(
        (status = 200, description = "Course progress", body = learnhub_core::aggregator::CourseProgressReport),
        (status = 400, description = "Missing user_id or course_id", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    tag = "progress"
)]
pub async fn course_progress(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ProgressQuery>, QueryRejection>,
) -> Result<Json<learnhub_core::aggregator::CourseProgressReport>, ApiError> {
    let (user_id, course_id) = user_and_course(query)?;

    let report = state
        .services
        .progress
        .course_progress(user_id, course_id)
        .await
        .map_err(error_response)?;

    Ok(Json(report))
}

/// Scores per user across their courses
#[utoipa::path(
    get,
    path = "/manager/performance",
    responses(
        (status = 200, description = "Scores grouped by user", body = Vec<ManagerUserReport>),
        (status = 500, description = "Database failure", body = ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn manager_performance(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ManagerUserReport>>, ApiError> {
    let report = state
        .services
        .reporting
        .manager_view()
        .await
        .map_err(error_response)?;

    Ok(Json(report))
}

/// Course trends, leaderboard and completion snapshot
#[utoipa::path(
    get,
    path = "/hr/performance",
    params(HrFilters),
    responses(
        (status = 200, description = "HR report", body = HrReport),
        (status = 400, description = "Invalid filter", body = ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn hr_performance(
    State(state): State<Arc<AppState>>,
    filters: Result<Query<HrFilters>, QueryRejection>,
) -> Result<Json<HrReport>, ApiError> {
    let Query(filters) = filters.map_err(|e| invalid_request(e.body_text()))?;

    let report = state
        .services
        .reporting
        .hr_view(&filters)
        .await
        .map_err(error_response)?;

    Ok(Json(report))
}

/// Enrollments, completion and quiz scores of one user
#[utoipa::path(
    get,
    path = "/api/individual-performance/{id}",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Individual report", body = IndividualPerformanceResponse)
    ),
    tag = "reports"
)]
pub async fn individual_performance(
    State(state): State<Arc<AppState>>,
    user_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<IndividualPerformanceResponse>, ApiError> {
    let user_id = path_param(user_id)?;

    let data = state
        .services
        .reporting
        .individual_view(user_id)
        .await
        .map_err(error_response)?;

    Ok(Json(IndividualPerformanceResponse {
        status: "success".to_string(),
        data,
    }))
}

/// Create a course with modules and quizzes
#[utoipa::path(
    post,
    path = "/courses",
    request_body = NewCourse,
    responses(
        (status = 201, description = "Course created", body = CreateCourseResponse),
        (status = 400, description = "Missing fields or duplicate course code", body = ErrorResponse),
        (status = 404, description = "Creator not found", body = ErrorResponse)
    ),
    tag = "courses"
)]
pub async fn create_course(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewCourse>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateCourseResponse>), ApiError> {
    let new_course = json_body(body)?;

    let course = state
        .services
        .catalog
        .create_course(new_course)
        .await
        .map_err(error_response)?;

    Ok((
        StatusCode::CREATED,
        Json(CreateCourseResponse {
            message: "Course added successfully!".to_string(),
            course,
        }),
    ))
}

/// Every course as seen by the given user
#[utoipa::path(
    get,
    path = "/courses/{user_id}",
    params(
        ("user_id" = i32, Path, description = "Viewing user ID")
    ),
    responses(
        (status = 200, description = "Courses, newest first", body = CourseListResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "courses"
)]
pub async fn list_courses(
    State(state): State<Arc<AppState>>,
    user_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<CourseListResponse>, ApiError> {
    let user_id = path_param(user_id)?;

    let courses = state
        .services
        .catalog
        .list_courses_for_user(user_id)
        .await
        .map_err(error_response)?;

    Ok(Json(CourseListResponse { courses }))
}

/// Enroll a user in a course
#[utoipa::path(
    post,
    path = "/enroll",
    request_body = EnrollmentRequest,
    responses(
        (status = 201, description = "Enrolled", body = EnrollmentResponse),
        (status = 400, description = "Already enrolled", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    tag = "courses"
)]
pub async fn enroll(
    State(state): State<Arc<AppState>>,
    body: Result<Json<EnrollmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<EnrollmentResponse>), ApiError> {
    let request = json_body(body)?;

    let enrollment = state
        .services
        .catalog
        .enroll(request)
        .await
        .map_err(error_response)?;

    Ok((
        StatusCode::CREATED,
        Json(EnrollmentResponse {
            message: "Enrolled successfully".to_string(),
            enrollment,
        }),
    ))
}

/// Courses a user is enrolled in
#[utoipa::path(
    get,
    path = "/course/enrolledcourses/{user_id}",
    params(
        ("user_id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Enrollments", body = EnrolledCoursesResponse),
        (status = 404, description = "No enrollments", body = ErrorResponse)
    ),
    tag = "courses"
)]
pub async fn enrolled_courses(
    State(state): State<Arc<AppState>>,
    user_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<EnrolledCoursesResponse>, ApiError> {
    let user_id = path_param(user_id)?;

    let enrolled_courses = state
        .services
        .catalog
        .enrolled_courses(user_id)
        .await
        .map_err(error_response)?;

    Ok(Json(EnrolledCoursesResponse { enrolled_courses }))
}

/// Mark an enrollment completed
#[utoipa::path(
    post,
    path = "/course/completed",
    request_body = EnrollmentRequest,
    responses(
        (status = 200, description = "Enrollment completed", body = EnrollmentResponse),
        (status = 404, description = "Enrollment not found", body = ErrorResponse)
    ),
    tag = "courses"
)]
pub async fn complete_course(
    State(state): State<Arc<AppState>>,
    body: Result<Json<EnrollmentRequest>, JsonRejection>,
) -> Result<Json<EnrollmentResponse>, ApiError> {
    let request = json_body(body)?;

    let enrollment = state
        .services
        .catalog
        .complete_course(request)
        .await
        .map_err(error_response)?;

    Ok(Json(EnrollmentResponse {
        message: "Course marked as completed".to_string(),
        enrollment,
    }))
}

/// The audit log, oldest first
#[utoipa::path(
    get,
    path = "/course/audittrail",
    responses(
        (status = 200, description = "Audit entries", body = AuditTrailResponse)
    ),
    tag = "courses"
)]
pub async fn audit_trail(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AuditTrailResponse>, ApiError> {
    let audit_trail = state
        .services
        .catalog
        .audit_trail()
        .await
        .map_err(error_response)?;

    Ok(Json(AuditTrailResponse { audit_trail }))
}

/// Users enrolled in a course
#[utoipa::path(
    get,
    path = "/course/users/{course_id}",
    params(
        ("course_id" = i32, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Enrolled users", body = CourseUsersResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    tag = "courses"
)]
pub async fn course_users(
    State(state): State<Arc<AppState>>,
    course_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<CourseUsersResponse>, ApiError> {
    let course_id = path_param(course_id)?;

    let users = state
        .services
        .catalog
        .course_users(course_id)
        .await
        .map_err(error_response)?;

    Ok(Json(CourseUsersResponse { users }))
}

/// Update a course and log the edit
#[utoipa::path(
    put,
    path = "/editCourse/{course_id}",
    params(
        ("course_id" = i32, Path, description = "Course ID")
    ),
    request_body = CourseEditRequest,
    responses(
        (status = 200, description = "Course updated", body = EditCourseResponse),
        (status = 400, description = "Missing user or course fields", body = ErrorResponse),
        (status = 404, description = "Course or user not found", body = ErrorResponse)
    ),
    tag = "courses"
)]
pub async fn edit_course(
    State(state): State<Arc<AppState>>,
    course_id: Result<Path<i32>, PathRejection>,
    body: Result<Json<CourseEditRequest>, JsonRejection>,
) -> Result<Json<EditCourseResponse>, ApiError> {
    let course_id = path_param(course_id)?;
    let request = json_body(body)?;

    let course = state
        .services
        .catalog
        .edit_course(course_id, request)
        .await
        .map_err(error_response)?;

    Ok(Json(EditCourseResponse {
        message: "Course updated successfully!".to_string(),
        course,
    }))
}

/// One course with the viewer's enrollment status and the creator
#[utoipa::path(
    get,
    path = "/viewCourse/{user_id}/{course_id}",
    params(
        ("user_id" = i32, Path, description = "Viewing user ID"),
        ("course_id" = i32, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Course details", body = CourseDetailsResponse),
        (status = 404, description = "Course or user not found", body = ErrorResponse)
    ),
    tag = "courses"
)]
pub async fn view_course(
    State(state): State<Arc<AppState>>,
    ids: Result<Path<(i32, i32)>, PathRejection>,
) -> Result<Json<CourseDetailsResponse>, ApiError> {
    let (user_id, course_id) = path_param(ids)?;

    let course_details = state
        .services
        .catalog
        .view_course(user_id, course_id)
        .await
        .map_err(error_response)?;

    Ok(Json(CourseDetailsResponse { course_details }))
}

/// Enrolled courses with progress
#[utoipa::path(
    get,
    path = "/userCourses/{user_id}",
    params(
        ("user_id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Enrolled courses with progress", body = Vec<UserCourse>),
        (status = 404, description = "No enrollments", body = ErrorResponse)
    ),
    tag = "courses"
)]
pub async fn user_courses(
    State(state): State<Arc<AppState>>,
    user_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<Vec<UserCourse>>, ApiError> {
    let user_id = path_param(user_id)?;

    let courses = state
        .services
        .catalog
        .user_courses(user_id)
        .await
        .map_err(error_response)?;

    Ok(Json(courses))
}

/// Course progress of an employee
#[utoipa::path(
    get,
    path = "/employee-course-progress/{user_id}/{course_id}",
    params(
        ("user_id" = i32, Path, description = "User ID"),
        ("course_id" = i32, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Course progress", body = EmployeeCourseProgress),
        (status = 400, description = "User is not an employee", body = ErrorResponse),
        (status = 404, description = "User or progress not found", body = ErrorResponse)
    ),
    tag = "progress"
)]
pub async fn employee_course_progress(
    State(state): State<Arc<AppState>>,
    ids: Result<Path<(i32, i32)>, PathRejection>,
) -> Result<Json<EmployeeCourseProgress>, ApiError> {
    let (user_id, course_id) = path_param(ids)?;

    let progress = state
        .services
        .catalog
        .employee_course_progress(user_id, course_id)
        .await
        .map_err(error_response)?;

    Ok(Json(progress))
}
