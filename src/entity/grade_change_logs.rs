//! 成绩变更日志实体（只追加）

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "grade_change_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub submission_id: i64,
    pub actor_id: i64,
    pub previous_score: Option<f64>,
    pub new_score: f64,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub changed_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::exam_submissions::Entity",
        from = "Column::SubmissionId",
        to = "super::exam_submissions::Column::Id"
    )]
    Submission,
}

impl Related<super::exam_submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submission.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_log_entry(self) -> crate::models::exam_submissions::entities::GradeChangeLogEntry {
        use crate::models::exam_submissions::entities::GradeChangeLogEntry;

        GradeChangeLogEntry {
            id: self.id,
            submission_id: self.submission_id,
            actor_id: self.actor_id,
            previous_score: self.previous_score,
            new_score: self.new_score,
            notes: self.notes,
            changed_at: super::from_timestamp(self.changed_at),
        }
    }
}
