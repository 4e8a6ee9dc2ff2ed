//! PerformanceAnalytics entity: per (user, course) quiz rollup used by reports

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One row per (user_id, course_id); enforced by a unique index.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "performance_analytics")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,

    pub course_id: i32,

    pub quizzes_taken: i32,

    pub modules_completed: i32,

    pub total_score: i32,

    /// total_score / quizzes_taken
    #[sea_orm(column_type = "Double")]
    pub average_score: f64,

    /// JSON array of trend points, one per submission
    pub trends: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Course,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
