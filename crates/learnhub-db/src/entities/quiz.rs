//! Quiz entity: one question belonging to a module

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quizzes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Owning module
    pub module_id: i32,

    pub question: String,

    /// Stored answer; graded by exact comparison
    pub correct_answer: String,

    /// Points awarded for a correct answer
    pub marks: i32,

    /// Ordered list of choice strings (JSON array)
    pub options: Json,

    pub created_at: ChronoDateTimeUtc,
}

impl Model {
    /// Choice strings in their stored order; non-string entries are skipped.
    pub fn option_list(&self) -> Vec<String> {
        self.options
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_owned))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::module::Entity",
        from = "Column::ModuleId",
        to = "super::module::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Module,
}

impl Related<super::module::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Module.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
