//! Initial schema: catalog, enrollment, audit and progress tables

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // 1. courses
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Course::Table)
                    .if_not_exists()
                    .col(pk_auto(Course::Id))
                    .col(string_len(Course::CourseCode, 50).not_null().unique_key())
                    .col(string_len(Course::Title, 100).not_null())
                    .col(text(Course::Description).not_null())
                    .col(string_len(Course::Instructor, 50).not_null())
                    .col(string_len(Course::StartDate, 50).not_null())
                    .col(string_len(Course::EndDate, 50).not_null())
                    .col(string_len(Course::Duration, 50).not_null())
                    .col(text_null(Course::DetailedDescription))
                    .col(integer(Course::CreatedBy).not_null())
                    .col(
                        timestamp_with_time_zone(Course::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 2. modules
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Module::Table)
                    .if_not_exists()
                    .col(pk_auto(Module::Id))
                    .col(integer(Module::CourseId).not_null())
                    .col(string_len(Module::Title, 100).not_null())
                    .col(text_null(Module::Description))
                    .col(text_null(Module::Objectives))
                    .col(text_null(Module::LearningPoints))
                    .col(double(Module::CompletionPercentage).not_null().default(0.0))
                    .col(
                        timestamp_with_time_zone(Module::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_modules_course_id")
                            .from(Module::Table, Module::CourseId)
                            .to(Course::Table, Course::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_modules_course_id")
                    .table(Module::Table)
                    .col(Module::CourseId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 3. quizzes
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Quiz::Table)
                    .if_not_exists()
                    .col(pk_auto(Quiz::Id))
                    .col(integer(Quiz::ModuleId).not_null())
                    .col(string_len(Quiz::Question, 255).not_null())
                    .col(string_len(Quiz::CorrectAnswer, 255).not_null())
                    .col(integer(Quiz::Marks).not_null().default(0))
                    .col(json(Quiz::Options).not_null())
                    .col(
                        timestamp_with_time_zone(Quiz::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_quizzes_module_id")
                            .from(Quiz::Table, Quiz::ModuleId)
                            .to(Module::Table, Module::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_quizzes_module_id")
                    .table(Quiz::Table)
                    .col(Quiz::ModuleId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 4. enrollments
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Enrollment::Table)
                    .if_not_exists()
                    .col(pk_auto(Enrollment::Id))
                    .col(integer(Enrollment::UserId).not_null())
                    .col(integer(Enrollment::CourseId).not_null())
                    .col(
                        string_len(Enrollment::Status, 32)
                            .not_null()
                            .default("Enrolled"),
                    )
                    .col(
                        timestamp_with_time_zone(Enrollment::EnrolledAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(boolean(Enrollment::IsCompleted).not_null().default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enrollments_course_id")
                            .from(Enrollment::Table, Enrollment::CourseId)
                            .to(Course::Table, Course::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_enrollments_user_course")
                    .table(Enrollment::Table)
                    .col(Enrollment::UserId)
                    .col(Enrollment::CourseId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 5. audit_trail (append-only)
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(AuditTrail::Table)
                    .if_not_exists()
                    .col(pk_auto(AuditTrail::Id))
                    .col(integer_null(AuditTrail::CourseId))
                    .col(integer(AuditTrail::UserId).not_null())
                    .col(string_len(AuditTrail::Action, 255).not_null())
                    .col(
                        timestamp_with_time_zone(AuditTrail::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_audit_trail_course_id")
                            .from(AuditTrail::Table, AuditTrail::CourseId)
                            .to(Course::Table, Course::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 6. quiz_results
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(QuizResult::Table)
                    .if_not_exists()
                    .col(pk_auto(QuizResult::Id))
                    .col(integer(QuizResult::UserId).not_null())
                    .col(integer(QuizResult::ModuleId).not_null())
                    .col(integer(QuizResult::Score).not_null().default(0))
                    .col(string_len(QuizResult::Status, 16).not_null())
                    .col(integer(QuizResult::TotalMarks).not_null())
                    .col(json(QuizResult::Answers).not_null())
                    .col(json(QuizResult::CorrectAnswers).not_null())
                    .col(json(QuizResult::IsCorrect).not_null())
                    .col(integer(QuizResult::TimeSpent).not_null().default(0))
                    .col(boolean(QuizResult::IsComplete).not_null().default(false))
                    .col(
                        timestamp_with_time_zone(QuizResult::AttemptedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_quiz_results_module_id")
                            .from(QuizResult::Table, QuizResult::ModuleId)
                            .to(Module::Table, Module::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_quiz_results_user_module")
                    .table(QuizResult::Table)
                    .col(QuizResult::UserId)
                    .col(QuizResult::ModuleId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 7. course_progress
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(CourseProgress::Table)
                    .if_not_exists()
                    .col(pk_auto(CourseProgress::Id))
                    .col(integer(CourseProgress::UserId).not_null())
                    .col(integer(CourseProgress::CourseId).not_null())
                    .col(
                        double(CourseProgress::CompletionPercentage)
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        string_len(CourseProgress::Status, 32)
                            .not_null()
                            .default("In Progress"),
                    )
                    .col(
                        timestamp_with_time_zone(CourseProgress::LastAccessed)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_course_progress_course_id")
                            .from(CourseProgress::Table, CourseProgress::CourseId)
                            .to(Course::Table, Course::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 8. performance_analytics
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(PerformanceAnalytics::Table)
                    .if_not_exists()
                    .col(pk_auto(PerformanceAnalytics::Id))
                    .col(integer(PerformanceAnalytics::UserId).not_null())
                    .col(integer(PerformanceAnalytics::CourseId).not_null())
                    .col(
                        integer(PerformanceAnalytics::QuizzesTaken)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        integer(PerformanceAnalytics::ModulesCompleted)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        integer(PerformanceAnalytics::TotalScore)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        double(PerformanceAnalytics::AverageScore)
                            .not_null()
                            .default(0.0),
                    )
                    .col(json(PerformanceAnalytics::Trends).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_performance_analytics_course_id")
                            .from(PerformanceAnalytics::Table, PerformanceAnalytics::CourseId)
                            .to(Course::Table, Course::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PerformanceAnalytics::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CourseProgress::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(QuizResult::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuditTrail::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Enrollment::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Quiz::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Module::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Course::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Course {
    #[sea_orm(iden = "courses")]
    Table,
    Id,
    CourseCode,
    Title,
    Description,
    Instructor,
    StartDate,
    EndDate,
    Duration,
    DetailedDescription,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Module {
    #[sea_orm(iden = "modules")]
    Table,
    Id,
    CourseId,
    Title,
    Description,
    Objectives,
    LearningPoints,
    CompletionPercentage,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Quiz {
    #[sea_orm(iden = "quizzes")]
    Table,
    Id,
    ModuleId,
    Question,
    CorrectAnswer,
    Marks,
    Options,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Enrollment {
    #[sea_orm(iden = "enrollments")]
    Table,
    Id,
    UserId,
    CourseId,
    Status,
    EnrolledAt,
    IsCompleted,
}

#[derive(DeriveIden)]
enum AuditTrail {
    #[sea_orm(iden = "audit_trail")]
    Table,
    Id,
    CourseId,
    UserId,
    Action,
    CreatedAt,
}

#[derive(DeriveIden)]
enum QuizResult {
    #[sea_orm(iden = "quiz_results")]
    Table,
    Id,
    UserId,
    ModuleId,
    Score,
    Status,
    TotalMarks,
    Answers,
    CorrectAnswers,
    IsCorrect,
    TimeSpent,
    IsComplete,
    AttemptedAt,
}

#[derive(DeriveIden)]
enum CourseProgress {
    #[sea_orm(iden = "course_progress")]
    Table,
    Id,
    UserId,
    CourseId,
    CompletionPercentage,
    Status,
    LastAccessed,
}

#[derive(DeriveIden)]
enum PerformanceAnalytics {
    #[sea_orm(iden = "performance_analytics")]
    Table,
    Id,
    UserId,
    CourseId,
    QuizzesTaken,
    ModulesCompleted,
    TotalScore,
    AverageScore,
    Trends,
}
