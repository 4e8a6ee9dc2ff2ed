//! Unique (user_id, course_id) keys on the rolling progress tables.
//! A racing first submission now fails instead of inserting a duplicate row.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_course_progress_user_course")
                    .table(CourseProgress::Table)
                    .col(CourseProgress::UserId)
                    .col(CourseProgress::CourseId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_performance_analytics_user_course")
                    .table(PerformanceAnalytics::Table)
                    .col(PerformanceAnalytics::UserId)
                    .col(PerformanceAnalytics::CourseId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_performance_analytics_user_course")
                    .table(PerformanceAnalytics::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_course_progress_user_course")
                    .table(CourseProgress::Table)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum CourseProgress {
    #[sea_orm(iden = "course_progress")]
    Table,
    UserId,
    CourseId,
}

#[derive(DeriveIden)]
enum PerformanceAnalytics {
    #[sea_orm(iden = "performance_analytics")]
    Table,
    UserId,
    CourseId,
}
