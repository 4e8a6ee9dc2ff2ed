//! Integration tests for learnhub-db
//!
//! Tests entities and constraints against a real SQLite in-memory database

use chrono::Utc;
use learnhub_db::entities::{
    audit_trail, course, course_progress, enrollment, module, performance_analytics, quiz,
    quiz_result, EnrollmentStatus, ProgressStatus, QuizStatus,
};
use learnhub_db::{connect, migrate};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, NotSet,
    PaginatorTrait, QueryFilter, Set,
};
use serde_json::json;

/// Helper to create a test database
async fn setup_test_db() -> sea_orm::DatabaseConnection {
    let db = connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    migrate(&db).await.expect("Failed to run migrations");

    db
}

async fn insert_course(db: &sea_orm::DatabaseConnection, code: &str) -> course::Model {
    course::ActiveModel {
        id: NotSet,
        course_code: Set(code.to_string()),
        title: Set("Rust Basics".to_string()),
        description: Set("Ownership and borrowing".to_string()),
        instructor: Set("Ferris".to_string()),
        start_date: Set("2025-01-01".to_string()),
        end_date: Set("2025-02-01".to_string()),
        duration: Set("4 weeks".to_string()),
        detailed_description: Set(None),
        created_by: Set(1),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to insert course")
}

async fn insert_module(db: &sea_orm::DatabaseConnection, course_id: i32) -> module::Model {
    module::ActiveModel {
        id: NotSet,
        course_id: Set(course_id),
        title: Set("Ownership".to_string()),
        description: Set(Some("Moves and borrows".to_string())),
        objectives: Set(None),
        learning_points: Set(None),
        completion_percentage: Set(0.0),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to insert module")
}

fn enrollment_for(user_id: i32, course_id: i32) -> enrollment::ActiveModel {
    enrollment::ActiveModel {
        id: NotSet,
        user_id: Set(user_id),
        course_id: Set(course_id),
        status: Set(EnrollmentStatus::Enrolled),
        enrolled_at: Set(Utc::now()),
        is_completed: Set(false),
    }
}

fn progress_for(user_id: i32, course_id: i32) -> course_progress::ActiveModel {
    course_progress::ActiveModel {
        id: NotSet,
        user_id: Set(user_id),
        course_id: Set(course_id),
        completion_percentage: Set(50.0),
        status: Set(ProgressStatus::InProgress),
        last_accessed: Set(Utc::now()),
    }
}

#[tokio::test]
async fn test_database_connection() {
    let db = connect("sqlite::memory:").await.expect("Failed to connect");

    let backend = db.get_database_backend();
    assert!(matches!(backend, sea_orm::DatabaseBackend::Sqlite));
}

#[tokio::test]
async fn test_migrations_run_successfully() {
    let db = connect("sqlite::memory:").await.expect("Failed to connect");

    let result = migrate(&db).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_course_owns_modules_and_quizzes() {
    let db = setup_test_db().await;
    let course = insert_course(&db, "RUST-101").await;
    let module = insert_module(&db, course.id).await;

    let quiz = quiz::ActiveModel {
        id: NotSet,
        module_id: Set(module.id),
        question: Set("Who owns a moved value?".to_string()),
        correct_answer: Set("The receiver".to_string()),
        marks: Set(5),
        options: Set(json!(["The sender", "The receiver"])),
        created_at: Set(Utc::now()),
    }
    .insert(&db)
    .await
    .expect("Failed to insert quiz");

    assert_eq!(quiz.option_list(), vec!["The sender", "The receiver"]);

    let modules = course
        .find_related(module::Entity)
        .all(&db)
        .await
        .expect("Failed to load modules");
    assert_eq!(modules.len(), 1);

    let quizzes = module
        .find_related(quiz::Entity)
        .all(&db)
        .await
        .expect("Failed to load quizzes");
    assert_eq!(quizzes.len(), 1);
    assert_eq!(quizzes[0].marks, 5);
}

#[tokio::test]
async fn test_course_code_is_unique() {
    let db = setup_test_db().await;
    insert_course(&db, "RUST-101").await;

    let duplicate = course::ActiveModel {
        id: NotSet,
        course_code: Set("RUST-101".to_string()),
        title: Set("Another".to_string()),
        description: Set("Another".to_string()),
        instructor: Set("Someone".to_string()),
        start_date: Set("2025-01-01".to_string()),
        end_date: Set("2025-02-01".to_string()),
        duration: Set("1 week".to_string()),
        detailed_description: Set(None),
        created_by: Set(1),
        created_at: Set(Utc::now()),
    }
    .insert(&db)
    .await;

    assert!(duplicate.is_err());
}

#[tokio::test]
async fn test_one_enrollment_per_user_and_course() {
    let db = setup_test_db().await;
    let course = insert_course(&db, "RUST-101").await;

    enrollment_for(7, course.id)
        .insert(&db)
        .await
        .expect("First enrollment should succeed");

    let second = enrollment_for(7, course.id).insert(&db).await;
    assert!(second.is_err());

    enrollment_for(8, course.id)
        .insert(&db)
        .await
        .expect("Another user may enroll");
}

#[tokio::test]
async fn test_one_progress_row_per_user_and_course() {
    let db = setup_test_db().await;
    let course = insert_course(&db, "RUST-101").await;

    progress_for(7, course.id)
        .insert(&db)
        .await
        .expect("First progress row should succeed");
    assert!(progress_for(7, course.id).insert(&db).await.is_err());
}

#[tokio::test]
async fn test_status_enums_round_trip_as_display_strings() {
    let db = setup_test_db().await;
    let course = insert_course(&db, "RUST-101").await;
    progress_for(7, course.id).insert(&db).await.unwrap();

    let stored = course_progress::Entity::find()
        .filter(course_progress::Column::Status.eq(ProgressStatus::InProgress))
        .one(&db)
        .await
        .unwrap()
        .expect("progress row should exist");
    assert_eq!(stored.status.as_str(), "In Progress");
    assert_eq!(
        serde_json::to_value(stored.status).unwrap(),
        json!("In Progress")
    );
    assert_eq!(ProgressStatus::parse("Not Started"), Some(ProgressStatus::NotStarted));
    assert_eq!(ProgressStatus::parse("done"), None);
}

#[tokio::test]
async fn test_quiz_result_keeps_answer_maps() {
    let db = setup_test_db().await;
    let course = insert_course(&db, "RUST-101").await;
    let module = insert_module(&db, course.id).await;

    let result = quiz_result::ActiveModel {
        id: NotSet,
        user_id: Set(7),
        module_id: Set(module.id),
        score: Set(5),
        status: Set(QuizStatus::Passed),
        total_marks: Set(10),
        answers: Set(json!({"1": "A", "2": null})),
        correct_answers: Set(json!({"1": "A", "2": "B"})),
        is_correct: Set(json!({"1": true, "2": false})),
        time_spent: Set(120),
        is_complete: Set(true),
        attempted_at: Set(Utc::now()),
    }
    .insert(&db)
    .await
    .expect("Failed to insert quiz result");

    let loaded = quiz_result::Entity::find_by_id(result.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.answers["2"], serde_json::Value::Null);
    assert_eq!(loaded.is_correct["1"], json!(true));
    assert_eq!(loaded.status, QuizStatus::Passed);
    assert_eq!(loaded.time_spent, 120);
}

#[tokio::test]
async fn test_analytics_unique_per_user_and_course() {
    let db = setup_test_db().await;
    let course = insert_course(&db, "RUST-101").await;

    let row = || performance_analytics::ActiveModel {
        id: NotSet,
        user_id: Set(7),
        course_id: Set(course.id),
        quizzes_taken: Set(1),
        modules_completed: Set(0),
        total_score: Set(5),
        average_score: Set(5.0),
        trends: Set(json!([])),
    };

    row().insert(&db).await.expect("First analytics row");
    assert!(row().insert(&db).await.is_err());
}

#[tokio::test]
async fn test_deleting_course_cascades_to_modules() {
    let db = setup_test_db().await;
    let course = insert_course(&db, "RUST-101").await;
    insert_module(&db, course.id).await;

    audit_trail::ActiveModel {
        id: NotSet,
        course_id: Set(Some(course.id)),
        user_id: Set(1),
        action: Set("'Rust Basics' is Added.".to_string()),
        created_at: Set(Utc::now()),
    }
    .insert(&db)
    .await
    .unwrap();

    course.delete(&db).await.expect("Failed to delete course");

    let modules = module::Entity::find().count(&db).await.unwrap();
    assert_eq!(modules, 0);

    // audit entries outlive their course
    let entries = audit_trail::Entity::find().all(&db).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].course_id, None);
}
