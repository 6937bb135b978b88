//! 考试题目实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "exam_questions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub exam_id: i64,
    pub question_type: String,
    #[sea_orm(column_type = "Text")]
    pub text: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub options: Option<String>, // JSON 数组
    #[sea_orm(column_type = "Text")]
    pub correct_answer: String, // 带标签的 JSON，旧数据为花括号数组文本
    pub allow_multiple_answers: bool,
    pub points: f64,
    pub position: i32,
    pub created_at: i64,
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
    #[sea_orm(has_many = "super::student_answers::Entity")]
    StudentAnswers,
}

impl Related<super::exams::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Exam.def()
    }
}

impl Related<super::student_answers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudentAnswers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_question(self) -> crate::models::exams::entities::Question {
        use crate::models::exams::entities::{CorrectAnswer, Question, QuestionType};
        use crate::utils::array_codec;

        // 选项同样兼容旧的花括号编码
        let options = self
            .options
            .as_deref()
            .map(array_codec::decode)
            .unwrap_or_default();

        Question {
            id: self.id,
            exam_id: self.exam_id,
            question_type: QuestionType::from_storage(&self.question_type),
            text: self.text,
            options,
            correct_answer: CorrectAnswer::from_storage(&self.correct_answer),
            allow_multiple_answers: self.allow_multiple_answers,
            points: self.points,
            position: self.position,
            created_at: super::from_timestamp(self.created_at),
            updated_at: super::from_timestamp(self.updated_at),
        }
    }
}
