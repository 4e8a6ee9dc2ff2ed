//! Database entities

pub mod audit_trail;
pub mod course;
pub mod course_progress;
pub mod enrollment;
pub mod module;
pub mod performance_analytics;
pub mod quiz;
pub mod quiz_result;

pub use audit_trail::Entity as AuditTrail;
pub use course::Entity as Course;
pub use course_progress::Entity as CourseProgress;
pub use enrollment::Entity as Enrollment;
pub use module::Entity as Module;
pub use performance_analytics::Entity as PerformanceAnalytics;
pub use quiz::Entity as Quiz;
pub use quiz_result::Entity as QuizResult;

pub use course_progress::ProgressStatus;
pub use enrollment::EnrollmentStatus;
pub use quiz_result::QuizStatus;

pub mod prelude {
    pub use super::audit_trail::Entity as AuditTrail;
    pub use super::course::Entity as Course;
    pub use super::course_progress::Entity as CourseProgress;
    pub use super::enrollment::Entity as Enrollment;
    pub use super::module::Entity as Module;
    pub use super::performance_analytics::Entity as PerformanceAnalytics;
    pub use super::quiz::Entity as Quiz;
    pub use super::quiz_result::Entity as QuizResult;
}
