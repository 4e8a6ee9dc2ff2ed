//! Course entity: the catalog entry that owns modules

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// External course code shown to learners (unique)
    #[sea_orm(unique)]
    pub course_code: String,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Display name of the instructor
    pub instructor: String,

    pub start_date: String,

    pub end_date: String,

    /// Free-form duration label (e.g. "6 weeks")
    pub duration: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub detailed_description: Option<String>,

    /// Id of the user (in the authentication service) who created the course
    pub created_by: i32,

    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::module::Entity")]
    Modules,

    #[sea_orm(has_many = "super::enrollment::Entity")]
    Enrollments,

    #[sea_orm(has_many = "super::course_progress::Entity")]
    Progress,

    #[sea_orm(has_many = "super::performance_analytics::Entity")]
    Analytics,

    #[sea_orm(has_many = "super::audit_trail::Entity")]
    AuditEntries,
}

impl Related<super::module::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Modules.def()
    }
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollments.def()
    }
}

impl Related<super::course_progress::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Progress.def()
    }
}

impl Related<super::performance_analytics::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Analytics.def()
    }
}

impl Related<super::audit_trail::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuditEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
