use serde::Serialize;
use ts_rs::TS;

use super::entities::{CorrectAnswer, Exam, Question, QuestionType};

/// 题目视图；学生视角下不返回正确答案
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "exam.ts")]
pub struct QuestionView {
    pub id: i64,
    pub question_type: QuestionType,
    pub text: String,
    pub options: Vec<String>,
    pub allow_multiple_answers: bool,
    pub points: f64,
    pub position: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<CorrectAnswer>,
}

impl QuestionView {
    pub fn from_question(question: Question, with_answer: bool) -> Self {
        Self {
            id: question.id,
            question_type: question.question_type,
            text: question.text,
            options: question.options,
            allow_multiple_answers: question.allow_multiple_answers,
            points: question.points,
            position: question.position,
            correct_answer: with_answer.then_some(question.correct_answer),
        }
    }
}

/// 考试详情响应
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "exam.ts")]
pub struct ExamDetailResponse {
    pub exam: Exam,
    pub questions: Vec<QuestionView>,
    pub total_points: f64,
}
