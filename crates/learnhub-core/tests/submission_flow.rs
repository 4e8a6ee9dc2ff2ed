//! End-to-end tests of grading, progress and reporting over SQLite

use chrono::Utc;
use learnhub_core::aggregator::ProgressUpdate;
use learnhub_core::catalog::{CourseEdit, CourseEditRequest, EnrollmentRequest, NewCourse};
use learnhub_core::engine::QuizSubmission;
use learnhub_core::reporting::HrFilters;
use learnhub_core::{CoreError, LearningStore, SeaOrmStore, Services};
use learnhub_db::entities::{quiz, ProgressStatus, QuizStatus};
use learnhub_directory::{StaticUserDirectory, UserRecord};
use sea_orm::{ActiveModelTrait, ConnectionTrait, NotSet, Set};
use serde_json::{json, Map, Value};
use std::sync::Arc;

const INSTRUCTOR: i32 = 1;
const LEARNER: i32 = 2;
const OTHER_LEARNER: i32 = 3;

struct Fixture {
    services: Services,
    store: Arc<SeaOrmStore>,
    course_id: i32,
    /// (module id, [(quiz id, correct answer)])
    modules: Vec<(i32, Vec<(i32, String)>)>,
}

impl Fixture {
    fn all_correct(&self, module_index: usize) -> Map<String, Value> {
        self.modules[module_index]
            .1
            .iter()
            .map(|(id, answer)| (id.to_string(), json!(answer)))
            .collect()
    }

    fn all_wrong(&self, module_index: usize) -> Map<String, Value> {
        self.modules[module_index]
            .1
            .iter()
            .map(|(id, _)| (id.to_string(), json!("wrong")))
            .collect()
    }

    async fn submit(
        &self,
        user_id: i32,
        module_index: usize,
        answers: Map<String, Value>,
    ) -> Result<learnhub_core::engine::SubmissionReport, CoreError> {
        self.services
            .grading
            .submit(
                self.modules[module_index].0,
                QuizSubmission {
                    user_id: Some(user_id),
                    answers: Some(answers),
                    time_spent: Some(30),
                },
            )
            .await
    }
}

fn course_body(code: &str) -> NewCourse {
    serde_json::from_value(json!({
        "course_id": code,
        "title": "Rust Basics",
        "description": "Ownership and borrowing",
        "instructor": "Ferris",
        "start_date": "2025-01-01",
        "end_date": "2025-02-01",
        "duration": "4 weeks",
        "created_by": INSTRUCTOR,
        "modules": [
            {
                "title": "Ownership",
                "quizzes": [
                    {"question": "Q1", "correct_answer": "A", "marks": 5, "options": ["A", "B"]},
                    {"question": "Q2", "correct_answer": "B", "marks": 5, "options": ["A", "B"]}
                ]
            },
            {
                "title": "Borrowing",
                "learning_points": "Shared vs unique",
                "quizzes": [
                    {"question": "Q3", "correct_answer": "C", "marks": 4, "options": ["C", "D"]},
                    {"question": "Q4", "correct_answer": "D", "marks": 6, "options": ["C", "D"]}
                ]
            }
        ]
    }))
    .expect("course body should deserialize")
}

fn directory() -> StaticUserDirectory {
    StaticUserDirectory::new()
        .with_user(UserRecord::new(INSTRUCTOR, "Ada", "ada@example.com", "Instructor"))
        .with_user(UserRecord::new(LEARNER, "Grace", "grace@example.com", "Employee"))
        .with_user(UserRecord::new(OTHER_LEARNER, "Linus", "linus@example.com", "Employee"))
}

async fn setup() -> Fixture {
    let db = learnhub_db::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");
    learnhub_db::migrate(&db).await.expect("Failed to run migrations");

    let store = Arc::new(SeaOrmStore::new(db));
    let services = Services::new(store.clone(), Arc::new(directory()));

    let created = services
        .catalog
        .create_course(course_body("RUST-101"))
        .await
        .expect("Failed to create course");

    let mut modules = Vec::new();
    for module in store.modules_for_course(created.id).await.unwrap() {
        let quizzes = store
            .quizzes_for_module(module.id)
            .await
            .unwrap()
            .into_iter()
            .map(|q| (q.id, q.correct_answer))
            .collect();
        modules.push((module.id, quizzes));
    }

    Fixture {
        services,
        store,
        course_id: created.id,
        modules,
    }
}

#[tokio::test]
async fn test_all_correct_submission_passes() {
    let fx = setup().await;

    let report = fx.submit(LEARNER, 0, fx.all_correct(0)).await.unwrap();

    assert_eq!(report.score, 10);
    assert_eq!(report.total_marks, 10);
    assert_eq!(report.status, QuizStatus::Passed);
    assert_eq!(report.corrected_count, 2);
    assert_eq!(report.incorrected_count, 0);
    assert_eq!(report.skipped_count, 0);
    assert_eq!(report.completion_percentage, 50.0);
    assert_eq!(report.time_spent, 30);
}

#[tokio::test]
async fn test_null_answer_counts_as_skipped() {
    let fx = setup().await;
    let (first_quiz, first_answer) = fx.modules[0].1[0].clone();
    let (second_quiz, _) = fx.modules[0].1[1].clone();

    let mut answers = Map::new();
    answers.insert(first_quiz.to_string(), json!(first_answer));
    answers.insert(second_quiz.to_string(), Value::Null);

    let report = fx.submit(LEARNER, 0, answers).await.unwrap();

    assert_eq!(report.skipped_count, 1);
    assert_eq!(report.corrected_count, 1);
    assert_eq!(report.score, 5);
    // exactly half the marks passes
    assert_eq!(report.status, QuizStatus::Passed);
    assert_eq!(
        report.corrected_count + report.incorrected_count + report.skipped_count,
        fx.modules[0].1.len()
    );
}

#[tokio::test]
async fn test_missing_module_writes_nothing() {
    let fx = setup().await;

    let result = fx
        .services
        .grading
        .submit(
            9999,
            QuizSubmission {
                user_id: Some(LEARNER),
                answers: Some(Map::new()),
                time_spent: None,
            },
        )
        .await;

    assert!(matches!(result, Err(CoreError::NotFound(_))));
    assert!(fx.store.results_for_user(LEARNER).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_user_writes_nothing() {
    let fx = setup().await;

    let result = fx.submit(404, 0, fx.all_correct(0)).await;

    assert!(matches!(result, Err(CoreError::NotFound(_))));
    assert!(fx.store.results_for_user(404).await.unwrap().is_empty());
    assert!(fx.store.find_progress(404, fx.course_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_failing_write_rolls_back_the_whole_submission() {
    let fx = setup().await;
    fx.store
        .connection()
        .execute_unprepared("DROP TABLE performance_analytics")
        .await
        .unwrap();

    let result = fx.submit(LEARNER, 0, fx.all_correct(0)).await;

    assert!(matches!(result, Err(CoreError::Persistence(_))));
    assert!(fx.store.results_for_user(LEARNER).await.unwrap().is_empty());
    assert!(fx.store.find_progress(LEARNER, fx.course_id).await.unwrap().is_none());
    let module = fx.store.find_module(fx.modules[0].0).await.unwrap().unwrap();
    assert_eq!(module.completion_percentage, 0.0);
}

#[tokio::test]
async fn test_oversized_marks_are_rejected_at_creation() {
    let fx = setup().await;
    let mut course = course_body("BIG-1");
    course.modules[0].quizzes[0].marks = 1_500_000_000;
    course.modules[0].quizzes[1].marks = 1_500_000_000;

    let result = fx.services.catalog.create_course(course).await;

    assert!(matches!(result, Err(CoreError::Validation(_))));
    assert!(fx.store.find_course_by_code("BIG-1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_marks_overflow_fails_submission_without_writes() {
    let fx = setup().await;
    let module_id = fx.modules[0].0;
    let mut answers = fx.all_correct(0);
    for question in ["Huge 1", "Huge 2"] {
        let saved = quiz::ActiveModel {
            id: NotSet,
            module_id: Set(module_id),
            question: Set(question.to_string()),
            correct_answer: Set("A".to_string()),
            marks: Set(1_500_000_000),
            options: Set(json!(["A"])),
            created_at: Set(Utc::now()),
        }
        .insert(fx.store.connection())
        .await
        .unwrap();
        answers.insert(saved.id.to_string(), json!("A"));
    }

    let result = fx.submit(LEARNER, 0, answers).await;

    assert!(matches!(result, Err(CoreError::Validation(_))));
    assert!(fx.store.results_for_user(LEARNER).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_incomplete_body_is_rejected() {
    let fx = setup().await;

    let no_answers = fx
        .services
        .grading
        .submit(
            fx.modules[0].0,
            QuizSubmission {
                user_id: Some(LEARNER),
                answers: None,
                time_spent: None,
            },
        )
        .await;
    assert!(matches!(no_answers, Err(CoreError::Validation(_))));

    let no_user = fx
        .services
        .grading
        .submit(
            fx.modules[0].0,
            QuizSubmission {
                user_id: None,
                answers: Some(fx.all_correct(0)),
                time_spent: None,
            },
        )
        .await;
    assert!(matches!(no_user, Err(CoreError::Validation(_))));
}

#[tokio::test]
async fn test_failed_attempt_is_recorded_without_progress() {
    let fx = setup().await;

    let report = fx.submit(LEARNER, 0, fx.all_wrong(0)).await.unwrap();
    assert_eq!(report.status, QuizStatus::Failed);
    assert_eq!(report.incorrected_count, 2);
    assert_eq!(report.completion_percentage, 0.0);

    let results = fx.store.results_for_user(LEARNER).await.unwrap();
    assert_eq!(results.len(), 1);
    let expected: Map<String, Value> = fx.modules[0]
        .1
        .iter()
        .map(|(id, _)| (id.to_string(), Value::Bool(false)))
        .collect();
    assert_eq!(results[0].is_correct, Value::Object(expected));

    let progress = fx
        .store
        .find_progress(LEARNER, fx.course_id)
        .await
        .unwrap()
        .expect("failed attempts still create progress");
    assert_eq!(progress.status, ProgressStatus::InProgress);
}

#[tokio::test]
async fn test_resubmission_never_decreases_progress() {
    let fx = setup().await;

    let first = fx.submit(LEARNER, 0, fx.all_correct(0)).await.unwrap();
    assert_eq!(first.completion_percentage, 50.0);

    let failed = fx.submit(LEARNER, 0, fx.all_wrong(0)).await.unwrap();
    assert_eq!(failed.completion_percentage, 50.0);

    let repassed = fx.submit(LEARNER, 0, fx.all_correct(0)).await.unwrap();
    assert_eq!(repassed.completion_percentage, 50.0);

    let finished = fx.submit(LEARNER, 1, fx.all_correct(1)).await.unwrap();
    assert_eq!(finished.completion_percentage, 100.0);

    let progress = fx
        .store
        .find_progress(LEARNER, fx.course_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(progress.status, ProgressStatus::Completed);

    let again = fx.submit(LEARNER, 1, fx.all_correct(1)).await.unwrap();
    assert_eq!(again.completion_percentage, 100.0);

    let module = fx.store.find_module(fx.modules[0].0).await.unwrap().unwrap();
    assert_eq!(module.completion_percentage, 2.0);
}

#[tokio::test]
async fn test_analytics_average_matches_totals() {
    let fx = setup().await;

    fx.submit(LEARNER, 0, fx.all_correct(0)).await.unwrap();
    fx.submit(LEARNER, 0, fx.all_wrong(0)).await.unwrap();
    fx.submit(LEARNER, 1, fx.all_correct(1)).await.unwrap();

    let analytics = fx.store.all_analytics().await.unwrap();
    assert_eq!(analytics.len(), 1);
    let row = &analytics[0];
    assert_eq!(row.quizzes_taken, 3);
    assert_eq!(row.total_score, 20);
    assert_eq!(row.modules_completed, 1);
    assert_eq!(
        row.average_score,
        f64::from(row.total_score) / f64::from(row.quizzes_taken)
    );
    assert_eq!(row.trends.as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn test_fresh_course_progress_is_not_started() {
    let fx = setup().await;

    let report = fx
        .services
        .progress
        .course_progress(LEARNER, fx.course_id)
        .await
        .unwrap();

    assert_eq!(report.course_progress.completion_percentage, 0.0);
    assert_eq!(report.course_progress.completion_status, ProgressStatus::NotStarted);
    assert_eq!(report.course_progress.quiz_percentage, 0.0);
    assert!(report.course_progress.last_accessed.is_none());
    assert_eq!(report.modules.len(), 2);
    assert!(report.modules.iter().all(|m| m.status == "Not Started"));

    let modules = fx
        .services
        .progress
        .module_progress(LEARNER, fx.course_id)
        .await
        .unwrap();
    assert!(modules
        .iter()
        .all(|m| m.progress.status == ProgressStatus::NotStarted && m.latest_score == 0));
}

#[tokio::test]
async fn test_course_progress_uses_latest_attempt_per_module() {
    let fx = setup().await;

    fx.submit(LEARNER, 0, fx.all_wrong(0)).await.unwrap();
    fx.submit(LEARNER, 0, fx.all_correct(0)).await.unwrap();
    fx.submit(LEARNER, 1, fx.all_wrong(1)).await.unwrap();

    let report = fx
        .services
        .progress
        .course_progress(LEARNER, fx.course_id)
        .await
        .unwrap();

    assert_eq!(report.course_progress.total_score, 10);
    assert_eq!(report.course_progress.total_marks, 20);
    assert_eq!(report.course_progress.quiz_percentage, 50.0);
    assert_eq!(report.modules[0].status, "Passed");
    assert_eq!(report.modules[1].status, "Failed");
}

#[tokio::test]
async fn test_employee_detail_lists_each_module() {
    let fx = setup().await;

    let before = fx
        .services
        .progress
        .employee_detail(LEARNER, fx.course_id)
        .await;
    assert!(matches!(before, Err(CoreError::NotFound(_))));

    fx.submit(LEARNER, 0, fx.all_correct(0)).await.unwrap();

    let detail = fx
        .services
        .progress
        .employee_detail(LEARNER, fx.course_id)
        .await
        .unwrap();
    assert_eq!(detail.len(), 2);
    assert_eq!(detail[0].module_title, "Ownership");
    assert_eq!(detail[0].quiz_status, Some(QuizStatus::Passed));
    assert_eq!(detail[1].quiz_status, None);
    assert!(detail.iter().all(|d| d.completion_percentage == 50.0));
}

#[tokio::test]
async fn test_manual_progress_update_validates_input() {
    let fx = setup().await;
    let module_id = fx.modules[0].0;
    let update = |pct: Option<f64>, status: Option<&str>| ProgressUpdate {
        user_id: Some(LEARNER),
        completion_percentage: pct,
        status: status.map(str::to_string),
    };

    let missing = fx.services.progress.update_progress(module_id, update(None, Some("In Progress"))).await;
    assert!(matches!(missing, Err(CoreError::Validation(_))));

    let bad_status = fx.services.progress.update_progress(module_id, update(Some(10.0), Some("Done"))).await;
    assert!(matches!(bad_status, Err(CoreError::Validation(_))));

    let out_of_range = fx.services.progress.update_progress(module_id, update(Some(120.0), Some("In Progress"))).await;
    assert!(matches!(out_of_range, Err(CoreError::Validation(_))));

    let early_completion = fx.services.progress.update_progress(module_id, update(Some(60.0), Some("Completed"))).await;
    assert!(matches!(early_completion, Err(CoreError::Validation(_))));

    let started_yet_not_started = fx.services.progress.update_progress(module_id, update(Some(20.0), Some("Not Started"))).await;
    assert!(matches!(started_yet_not_started, Err(CoreError::Validation(_))));

    let finished_yet_in_progress = fx.services.progress.update_progress(module_id, update(Some(100.0), Some("In Progress"))).await;
    assert!(matches!(finished_yet_in_progress, Err(CoreError::Validation(_))));

    let no_module = fx.services.progress.update_progress(9999, update(Some(10.0), Some("In Progress"))).await;
    assert!(matches!(no_module, Err(CoreError::NotFound(_))));

    let saved = fx
        .services
        .progress
        .update_progress(module_id, update(Some(40.0), Some("In Progress")))
        .await
        .unwrap();
    assert_eq!(saved.course_id, fx.course_id);
    assert_eq!(saved.completion_percentage, 40.0);
    assert_eq!(saved.status, ProgressStatus::InProgress);
}

#[tokio::test]
async fn test_module_details_hide_answers() {
    let fx = setup().await;

    let details = fx
        .services
        .grading
        .module_details(fx.modules[1].0)
        .await
        .unwrap();

    assert_eq!(details.title, "Borrowing");
    assert_eq!(details.quizzes.len(), 2);
    assert!(details.quizzes.iter().all(|q| q.correct_answer.is_none()));

    let json = serde_json::to_value(&details).unwrap();
    assert!(!json.to_string().contains("correct_answer"));
}

#[tokio::test]
async fn test_catalog_rules() {
    let fx = setup().await;

    let duplicate = fx.services.catalog.create_course(course_body("RUST-101")).await;
    assert!(matches!(duplicate, Err(CoreError::Conflict(_))));

    let mut unknown_creator = course_body("RUST-102");
    unknown_creator.created_by = 404;
    let missing = fx.services.catalog.create_course(unknown_creator).await;
    assert!(matches!(missing, Err(CoreError::NotFound(_))));

    let request = EnrollmentRequest {
        user_id: LEARNER,
        course_id: fx.course_id,
    };
    fx.services.catalog.enroll(request).await.unwrap();
    let twice = fx.services.catalog.enroll(request).await;
    assert!(matches!(twice, Err(CoreError::Conflict(_))));

    let no_course = fx
        .services
        .catalog
        .enroll(EnrollmentRequest {
            user_id: LEARNER,
            course_id: 9999,
        })
        .await;
    assert!(matches!(no_course, Err(CoreError::NotFound(_))));

    let completed = fx.services.catalog.complete_course(request).await.unwrap();
    assert!(completed.is_completed);

    let audit = fx.services.catalog.audit_trail().await.unwrap();
    let actions: Vec<&str> = audit.iter().map(|a| a.action.as_str()).collect();
    assert_eq!(actions, vec!["'Rust Basics' is Added.", "Course Completed"]);

    let not_enrolled = fx
        .services
        .catalog
        .complete_course(EnrollmentRequest {
            user_id: OTHER_LEARNER,
            course_id: fx.course_id,
        })
        .await;
    assert!(matches!(not_enrolled, Err(CoreError::NotFound(_))));
}

fn edit_request(user_id: Option<i32>, title: &str) -> CourseEditRequest {
    CourseEditRequest {
        user_id,
        course_data: Some(CourseEdit {
            title: title.to_string(),
            description: "Lifetimes too".to_string(),
            start_date: "2025-03-01".to_string(),
            end_date: "2025-04-01".to_string(),
            duration: "6 weeks".to_string(),
            detailed_description: None,
        }),
    }
}

#[tokio::test]
async fn test_course_edit_updates_fields_and_audit() {
    let fx = setup().await;

    let edited = fx
        .services
        .catalog
        .edit_course(fx.course_id, edit_request(Some(INSTRUCTOR), "Rust Basics II"))
        .await
        .unwrap();
    assert_eq!(edited.title, "Rust Basics II");
    assert_eq!(edited.course_code, "RUST-101");

    let course = fx.store.find_course(fx.course_id).await.unwrap().unwrap();
    assert_eq!(course.duration, "6 weeks");
    assert_eq!(course.created_by, INSTRUCTOR);

    let audit = fx.services.catalog.audit_trail().await.unwrap();
    assert_eq!(
        audit.last().unwrap().action,
        "'Rust Basics II' is Edited by Ada (ada@example.com)."
    );

    let no_user = fx.services.catalog.edit_course(fx.course_id, edit_request(None, "X")).await;
    assert!(matches!(no_user, Err(CoreError::Validation(_))));

    let blank_title = fx
        .services
        .catalog
        .edit_course(fx.course_id, edit_request(Some(INSTRUCTOR), " "))
        .await;
    assert!(matches!(blank_title, Err(CoreError::Validation(_))));

    let unknown_editor = fx
        .services
        .catalog
        .edit_course(fx.course_id, edit_request(Some(404), "X"))
        .await;
    assert!(matches!(unknown_editor, Err(CoreError::NotFound(_))));

    let no_course = fx
        .services
        .catalog
        .edit_course(9999, edit_request(Some(INSTRUCTOR), "X"))
        .await;
    assert!(matches!(no_course, Err(CoreError::NotFound(_))));

    // Rejected edits leave no audit entries behind
    assert_eq!(fx.services.catalog.audit_trail().await.unwrap().len(), audit.len());
}

#[tokio::test]
async fn test_view_course_reports_enrollment_and_creator() {
    let fx = setup().await;

    let before = fx.services.catalog.view_course(LEARNER, fx.course_id).await.unwrap();
    assert_eq!(before.status, "Not Enrolled");
    assert!(!before.is_completed);
    assert_eq!(before.created_by.id, INSTRUCTOR);
    assert_eq!(before.created_by.name.as_deref(), Some("Ada"));

    let request = EnrollmentRequest {
        user_id: LEARNER,
        course_id: fx.course_id,
    };
    fx.services.catalog.enroll(request).await.unwrap();
    fx.services.catalog.complete_course(request).await.unwrap();

    let after = fx.services.catalog.view_course(LEARNER, fx.course_id).await.unwrap();
    assert_eq!(after.status, "Completed");
    assert!(after.is_completed);

    let no_course = fx.services.catalog.view_course(LEARNER, 9999).await;
    assert!(matches!(no_course, Err(CoreError::NotFound(_))));
    let no_user = fx.services.catalog.view_course(404, fx.course_id).await;
    assert!(matches!(no_user, Err(CoreError::NotFound(_))));
}

#[tokio::test]
async fn test_user_courses_carry_progress() {
    let fx = setup().await;

    let none = fx.services.catalog.user_courses(LEARNER).await;
    assert!(matches!(none, Err(CoreError::NotFound(_))));

    fx.services
        .catalog
        .enroll(EnrollmentRequest {
            user_id: LEARNER,
            course_id: fx.course_id,
        })
        .await
        .unwrap();
    let fresh = fx.services.catalog.user_courses(LEARNER).await.unwrap();
    assert_eq!(fresh.len(), 1);
    assert_eq!(fresh[0].progress_status, ProgressStatus::NotStarted);
    assert_eq!(fresh[0].completion_percentage, 0.0);

    fx.submit(LEARNER, 0, fx.all_correct(0)).await.unwrap();
    let started = fx.services.catalog.user_courses(LEARNER).await.unwrap();
    assert_eq!(started[0].title, "Rust Basics");
    assert_eq!(started[0].progress_status, ProgressStatus::InProgress);
    assert_eq!(started[0].completion_percentage, 50.0);
}

#[tokio::test]
async fn test_employee_course_progress_requires_employee_role() {
    let fx = setup().await;

    let not_employee = fx
        .services
        .catalog
        .employee_course_progress(INSTRUCTOR, fx.course_id)
        .await;
    assert!(matches!(not_employee, Err(CoreError::Validation(_))));

    let no_progress = fx
        .services
        .catalog
        .employee_course_progress(LEARNER, fx.course_id)
        .await;
    assert!(matches!(no_progress, Err(CoreError::NotFound(_))));

    let unknown = fx.services.catalog.employee_course_progress(404, fx.course_id).await;
    assert!(matches!(unknown, Err(CoreError::NotFound(_))));

    fx.submit(LEARNER, 0, fx.all_correct(0)).await.unwrap();
    let progress = fx
        .services
        .catalog
        .employee_course_progress(LEARNER, fx.course_id)
        .await
        .unwrap();
    assert_eq!(progress.name, "Grace");
    assert_eq!(progress.email, "grace@example.com");
    assert_eq!(progress.completion_percentage, 50.0);
    assert_eq!(progress.status, ProgressStatus::InProgress);
}

#[tokio::test]
async fn test_course_listing_depends_on_role() {
    let fx = setup().await;
    fx.services
        .catalog
        .enroll(EnrollmentRequest {
            user_id: LEARNER,
            course_id: fx.course_id,
        })
        .await
        .unwrap();

    let employee_view = fx.services.catalog.list_courses_for_user(LEARNER).await.unwrap();
    assert_eq!(employee_view.len(), 1);
    assert!(employee_view[0].is_enrolled);
    assert!(employee_view[0].instructor.is_none());
    assert!(employee_view[0].modules.is_none());

    let instructor_view = fx
        .services
        .catalog
        .list_courses_for_user(INSTRUCTOR)
        .await
        .unwrap();
    let modules = instructor_view[0].modules.as_ref().unwrap();
    assert_eq!(modules.len(), 2);
    assert_eq!(modules[0].quizzes[0].correct_answer.as_deref(), Some("A"));
    assert!(!instructor_view[0].is_enrolled);

    let unknown = fx.services.catalog.list_courses_for_user(404).await;
    assert!(matches!(unknown, Err(CoreError::NotFound(_))));
}

#[tokio::test]
async fn test_enrolled_courses_and_course_users() {
    let fx = setup().await;

    let none = fx.services.catalog.enrolled_courses(LEARNER).await;
    assert!(matches!(none, Err(CoreError::NotFound(_))));

    for user_id in [LEARNER, 77] {
        fx.services
            .catalog
            .enroll(EnrollmentRequest {
                user_id,
                course_id: fx.course_id,
            })
            .await
            .unwrap();
    }

    let enrolled = fx.services.catalog.enrolled_courses(LEARNER).await.unwrap();
    assert_eq!(enrolled[0].title.as_deref(), Some("Rust Basics"));

    let users = fx.services.catalog.course_users(fx.course_id).await.unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].name, "Grace");
    assert_eq!(users[1].name, "Unknown");
}

#[tokio::test]
async fn test_reports_cover_every_learner() {
    let fx = setup().await;
    for user_id in [LEARNER, OTHER_LEARNER] {
        fx.services
            .catalog
            .enroll(EnrollmentRequest {
                user_id,
                course_id: fx.course_id,
            })
            .await
            .unwrap();
    }

    fx.submit(LEARNER, 0, fx.all_correct(0)).await.unwrap();
    fx.submit(LEARNER, 1, fx.all_correct(1)).await.unwrap();
    fx.submit(OTHER_LEARNER, 0, fx.all_wrong(0)).await.unwrap();

    let manager = fx.services.reporting.manager_view().await.unwrap();
    assert_eq!(manager.len(), 2);
    assert_eq!(manager[0].user_name.as_deref(), Some("Grace"));
    assert_eq!(manager[0].courses[0].total_score, 20);

    let hr = fx
        .services
        .reporting
        .hr_view(&HrFilters::default())
        .await
        .unwrap();
    assert_eq!(hr.trends.len(), 1);
    assert_eq!(hr.trends[0].total_employees, 2);
    assert_eq!(hr.trends[0].total_score, 20);
    assert_eq!(hr.top_performers[0].user_id, LEARNER);
    assert_eq!(hr.detailed_performance.len(), 2);
    let grace = &hr.detailed_performance[0];
    assert_eq!(grace.metrics.completed_courses, 1);
    assert_eq!(grace.metrics.total_quiz_scores, 20);
    assert_eq!(grace.courses[0].status, ProgressStatus::Completed);

    let filtered = fx
        .services
        .reporting
        .hr_view(&HrFilters {
            user_id: Some(OTHER_LEARNER),
            ..HrFilters::default()
        })
        .await
        .unwrap();
    assert_eq!(filtered.detailed_performance.len(), 1);
    assert_eq!(filtered.detailed_performance[0].metrics.active_courses, 1);

    let long_ago = fx
        .services
        .reporting
        .hr_view(&HrFilters {
            start_date: Some("2000-01-01".to_string()),
            end_date: Some("2000-12-31".to_string()),
            ..HrFilters::default()
        })
        .await
        .unwrap();
    assert!(long_ago.detailed_performance.is_empty());

    let individual = fx.services.reporting.individual_view(LEARNER).await.unwrap();
    assert_eq!(individual.enrolled_courses.len(), 1);
    assert_eq!(individual.quiz_scores.len(), 2);
    assert_eq!(individual.completed_courses, 1);
    assert_eq!(individual.active_courses, 0);
    assert_eq!(
        individual.course_progress[0].course_name.as_deref(),
        Some("Rust Basics")
    );
}
