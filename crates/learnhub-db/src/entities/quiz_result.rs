//! QuizResult entity: one graded submission for a module

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Outcome of a graded submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum QuizStatus {
    #[sea_orm(string_value = "Passed")]
    Passed,

    #[sea_orm(string_value = "Failed")]
    Failed,
}

impl QuizStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizStatus::Passed => "Passed",
            QuizStatus::Failed => "Failed",
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quiz_results")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,

    pub module_id: i32,

    /// Sum of marks for correctly answered quizzes
    pub score: i32,

    pub status: QuizStatus,

    /// Sum of marks of every quiz in the module at grading time
    pub total_marks: i32,

    /// Submitted answers keyed by quiz id
    pub answers: Json,

    /// Stored correct answers keyed by quiz id
    pub correct_answers: Json,

    /// Per-question correctness keyed by quiz id
    pub is_correct: Json,

    /// Seconds the learner spent on the attempt
    pub time_spent: i32,

    pub is_complete: bool,

    pub attempted_at: ChronoDateTimeUtc,
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
