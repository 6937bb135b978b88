//! 考试提交实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "exam_submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub exam_id: i64,
    pub student_id: i64,
    pub started_at: i64,
    pub submitted_at: Option<i64>,
    pub score: Option<f64>,
    pub total_points: f64,
    pub is_graded: bool,
    pub status: String,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::exams::Entity",
        from = "Column::ExamId",
        to = "super::exams::Column::Id"
    )]
    Exam,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::StudentId",
        to = "super::users::Column::Id"
    )]
    Student,
    #[sea_orm(has_many = "super::student_answers::Entity")]
    StudentAnswers,
    #[sea_orm(has_many = "super::grade_change_logs::Entity")]
    GradeChangeLogs,
    #[sea_orm(has_many = "super::exam_recheck_requests::Entity")]
    RecheckRequests,
}

impl Related<super::exams::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Exam.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::student_answers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudentAnswers.def()
    }
}

impl Related<super::grade_change_logs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GradeChangeLogs.def()
    }
}

impl Related<super::exam_recheck_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecheckRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_submission(self) -> crate::models::exam_submissions::entities::ExamSubmission {
        use crate::models::exam_submissions::entities::{ExamSubmission, SubmissionStatus};

        ExamSubmission {
            id: self.id,
            exam_id: self.exam_id,
            student_id: self.student_id,
            started_at: super::from_timestamp(self.started_at),
            submitted_at: self.submitted_at.map(super::from_timestamp),
            score: self.score,
            total_points: self.total_points,
            is_graded: self.is_graded,
            status: self
                .status
                .parse::<SubmissionStatus>()
                .unwrap_or(SubmissionStatus::InProgress),
            updated_at: super::from_timestamp(self.updated_at),
        }
    }
}
