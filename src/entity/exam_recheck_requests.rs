//! 复查申请实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "exam_recheck_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub submission_id: i64,
    pub student_id: i64,
    #[sea_orm(column_type = "Text")]
    pub reason: String,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
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

impl Model {
    pub fn into_recheck_request(self) -> crate::models::exam_submissions::entities::RecheckRequest {
        use crate::models::exam_submissions::entities::{RecheckRequest, RecheckRequestStatus};

        RecheckRequest {
            id: self.id,
            submission_id: self.submission_id,
            student_id: self.student_id,
            reason: self.reason,
            status: self
                .status
                .parse::<RecheckRequestStatus>()
                .unwrap_or(RecheckRequestStatus::Pending),
            created_at: super::from_timestamp(self.created_at),
            updated_at: super::from_timestamp(self.updated_at),
        }
    }
}
