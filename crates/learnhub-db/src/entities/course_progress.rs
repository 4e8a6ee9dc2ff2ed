//! CourseProgress entity: rolling completion state per (user, course)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Completion state of a course for one learner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum ProgressStatus {
    #[serde(rename = "Not Started")]
    #[sea_orm(string_value = "Not Started")]
    NotStarted,

    #[serde(rename = "In Progress")]
    #[sea_orm(string_value = "In Progress")]
    InProgress,

    #[sea_orm(string_value = "Completed")]
    Completed,
}

impl ProgressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStatus::NotStarted => "Not Started",
            ProgressStatus::InProgress => "In Progress",
            ProgressStatus::Completed => "Completed",
        }
    }

    /// Parse the display form used on the wire
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Not Started" => Some(ProgressStatus::NotStarted),
            "In Progress" => Some(ProgressStatus::InProgress),
            "Completed" => Some(ProgressStatus::Completed),
            _ => None,
        }
    }
}

/// One row per (user_id, course_id); enforced by a unique index.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "course_progress")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,

    pub course_id: i32,

    /// 0 to 100
    #[sea_orm(column_type = "Double")]
    pub completion_percentage: f64,

    pub status: ProgressStatus,

    pub last_accessed: ChronoDateTimeUtc,
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
