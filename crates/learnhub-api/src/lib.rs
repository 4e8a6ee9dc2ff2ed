pub mod error;
pub mod handlers;
pub mod models;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use learnhub_core::Services;

/// Application state shared across handlers
pub struct AppState {
    pub services: Services,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Learnhub API",
        version = "0.1.0",
        description = "Quiz grading, learner progress and performance reporting",
        contact(
            name = "Learnhub Team",
            email = "team@learnhub.dev"
        )
    ),
    paths(
        handlers::health_check,
        handlers::list_modules,
        handlers::update_module_progress,
        handlers::module_details,
        handlers::submit_quiz,
        handlers::employee_progress_detail,
        handlers::course_progress,
        handlers::manager_performance,
        handlers::hr_performance,
        handlers::individual_performance,
        handlers::create_course,
        handlers::list_courses,
        handlers::enroll,
        handlers::enrolled_courses,
        handlers::complete_course,
        handlers::audit_trail,
        handlers::course_users,
        handlers::edit_course,
        handlers::view_course,
        handlers::user_courses,
        handlers::employee_course_progress,
    ),
    components(
        schemas(
            models::HealthResponse,
            models::ErrorResponse,
            models::ModuleListResponse,
            models::ModuleDetailsResponse,
            models::SubmitQuizResponse,
            models::ProgressUpdateResponse,
            models::EmployeeProgressResponse,
            models::IndividualPerformanceResponse,
            models::CreateCourseResponse,
            models::CourseListResponse,
            models::EnrollmentResponse,
            models::EnrolledCoursesResponse,
            models::AuditTrailResponse,
            models::CourseUsersResponse,
            models::EditCourseResponse,
            models::CourseDetailsResponse,
            learnhub_core::engine::QuizSubmission,
            learnhub_core::engine::SubmissionReport,
            learnhub_core::aggregator::ProgressUpdate,
            learnhub_core::aggregator::CourseProgressReport,
            learnhub_core::catalog::NewCourse,
            learnhub_core::catalog::NewModule,
            learnhub_core::catalog::NewQuiz,
            learnhub_core::catalog::EnrollmentRequest,
            learnhub_core::catalog::CourseEditRequest,
            learnhub_core::catalog::CourseEdit,
            learnhub_core::catalog::UserCourse,
            learnhub_core::catalog::EmployeeCourseProgress,
            learnhub_core::reporting::HrReport,
            learnhub_core::reporting::ManagerUserReport,
        )
    ),
    tags(
        (name = "quizzes", description = "Module details and quiz submission"),
        (name = "progress", description = "Learner progress views"),
        (name = "reports", description = "Manager, HR and individual performance reports"),
        (name = "courses", description = "Course catalog, enrollment and audit log"),
        (name = "system", description = "System health and info endpoints")
    )
)]
pub struct ApiDoc;

/// API server configuration
pub struct ApiServerConfig {
    /// Address to bind the API server
    pub bind_addr: SocketAddr,
    /// Enable CORS (for browser front ends)
    pub enable_cors: bool,
    /// Allowed CORS origins (if empty, any localhost origin)
    pub cors_origins: Vec<String>,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5003)),
            enable_cors: true,
            cors_origins: vec!["http://localhost:5173".to_string()],
        }
    }
}

/// API Server
pub struct ApiServer {
    config: ApiServerConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(config: ApiServerConfig, services: Services) -> Self {
        let state = Arc::new(AppState { services });
        Self { config, state }
    }

    fn cors_layer(&self) -> CorsLayer {
        let origins: Vec<HeaderValue> = self
            .config
            .cors_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect();

        let allow_origin = if origins.is_empty() {
            AllowOrigin::predicate(|origin: &HeaderValue, _| {
                let origin_str = origin.to_str().unwrap_or("");
                origin_str.starts_with("http://localhost:")
                    || origin_str.starts_with("http://127.0.0.1:")
            })
        } else {
            AllowOrigin::list(origins)
        };

        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::PUT])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_origin(allow_origin)
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let api_doc = ApiDoc::openapi();

        let api_router = Router::new()
            .route("/api/health", get(handlers::health_check))
            // Grading and progress
            .route("/api/modules", get(handlers::list_modules))
            .route(
                "/api/modules/{id}/progress",
                put(handlers::update_module_progress),
            )
            .route("/module/{id}/details", get(handlers::module_details))
            .route("/module/{id}/submit-quiz", post(handlers::submit_quiz))
            .route(
                "/api/employee-progress-detail/{user_id}/{course_id}",
                get(handlers::employee_progress_detail),
            )
            .route("/api/course-progress", get(handlers::course_progress))
            // Reports
            .route("/manager/performance", get(handlers::manager_performance))
            .route("/hr/performance", get(handlers::hr_performance))
            .route(
                "/api/individual-performance/{id}",
                get(handlers::individual_performance),
            )
            // Catalog
            .route("/courses", post(handlers::create_course))
            .route("/courses/{user_id}", get(handlers::list_courses))
            .route("/enroll", post(handlers::enroll))
            .route(
                "/course/enrolledcourses/{user_id}",
                get(handlers::enrolled_courses),
            )
            .route("/course/completed", post(handlers::complete_course))
            .route("/course/audittrail", get(handlers::audit_trail))
            .route("/course/users/{course_id}", get(handlers::course_users))
            .route(
                "/editCourse/{course_id}",
                post(handlers::edit_course).put(handlers::edit_course),
            )
            .route(
                "/viewCourse/{user_id}/{course_id}",
                get(handlers::view_course),
            )
            .route("/userCourses/{user_id}", get(handlers::user_courses))
            .route(
                "/employee-course-progress/{user_id}/{course_id}",
                get(handlers::employee_course_progress),
            )
            .with_state(self.state.clone());

        // SwaggerUi automatically creates a route for /api/openapi.json
        let router = Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", api_doc))
            .merge(api_router);

        let mut router = router.layer(TraceLayer::new_for_http());

        if self.config.enable_cors {
            router = router.layer(self.cors_layer());
        }

        router
    }

    /// Start the API server
    pub async fn start(self) -> Result<(), anyhow::Error> {
        let router = self.build_router();

        info!("Starting API server on {}", self.config.bind_addr);
        info!(
            "OpenAPI spec: http://{}/api/openapi.json",
            self.config.bind_addr
        );
        info!("Swagger UI: http://{}/swagger-ui", self.config.bind_addr);

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        axum::serve(listener, router)
            .await
            .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

        Ok(())
    }
}
