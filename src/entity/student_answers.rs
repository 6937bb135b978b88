//! 学生答案实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "student_answers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub submission_id: i64,
    pub question_id: i64,
    #[sea_orm(column_type = "Text")]
    pub student_answer: String,
    pub is_correct: Option<bool>,
    pub points_earned: Option<f64>,
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
    #[sea_orm(
        belongs_to = "super::exam_questions::Entity",
        from = "Column::QuestionId",
        to = "super::exam_questions::Column::Id"
    )]
    Question,
}

impl Related<super::exam_submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submission.def()
    }
}

impl Related<super::exam_questions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Question.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_answer(self) -> crate::models::exam_submissions::entities::StudentAnswer {
        use crate::models::exam_submissions::entities::{StudentAnswer, SubmittedAnswer};

        StudentAnswer {
            id: self.id,
            submission_id: self.submission_id,
            question_id: self.question_id,
            student_answer: SubmittedAnswer::from_storage(&self.student_answer),
            is_correct: self.is_correct,
            points_earned: self.points_earned,
            updated_at: super::from_timestamp(self.updated_at),
        }
    }
}
