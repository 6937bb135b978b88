//! 考试与题目存储操作

use super::SeaOrmStorage;
use crate::entity::exam_questions::{
    ActiveModel as QuestionActiveModel, Column as QuestionColumn, Entity as ExamQuestions,
};
use crate::entity::exams::{ActiveModel, Column, Entity as Exams};
use crate::errors::{ExamSystemError, Result};
use crate::models::exams::{
    entities::{Exam, ExamStatus, Question},
    requests::{CreateExamRequest, QuestionDraft},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, sea_query::Expr,
};

/// 选项序列化：空列表存为 NULL
fn options_to_storage(options: &[String]) -> Result<Option<String>> {
    if options.is_empty() {
        Ok(None)
    } else {
        Ok(Some(serde_json::to_string(options)?))
    }
}

impl SeaOrmStorage {
    /// 创建考试（草稿）
    pub async fn create_exam_impl(&self, created_by: i64, req: CreateExamRequest) -> Result<Exam> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            course_id: Set(req.course_id),
            created_by: Set(created_by),
            title: Set(req.title),
            description: Set(req.description),
            status: Set(ExamStatus::Draft.to_string()),
            due_date: Set(req.due_date.map(|d| d.timestamp())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("创建考试失败: {e}")))?;

        Ok(result.into_exam())
    }

    /// 通过 ID 获取考试
    pub async fn get_exam_by_id_impl(&self, exam_id: i64) -> Result<Option<Exam>> {
        let result = Exams::find_by_id(exam_id)
            .one(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询考试失败: {e}")))?;

        Ok(result.map(|m| m.into_exam()))
    }

    /// 发布考试
    pub async fn publish_exam_impl(&self, exam_id: i64) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = Exams::update_many()
            .col_expr(Column::Status, Expr::value(ExamStatus::Published.to_string()))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(exam_id))
            .filter(Column::Status.eq(ExamStatus::Draft.to_string()))
            .exec(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("发布考试失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 列出考试题目
    pub async fn list_exam_questions_impl(&self, exam_id: i64) -> Result<Vec<Question>> {
        let results = ExamQuestions::find()
            .filter(QuestionColumn::ExamId.eq(exam_id))
            .order_by_asc(QuestionColumn::Position)
            .order_by_asc(QuestionColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询题目列表失败: {e}")))?;

        Ok(results.into_iter().map(|m| m.into_question()).collect())
    }

    /// 通过 ID 获取题目
    pub async fn get_question_by_id_impl(&self, question_id: i64) -> Result<Option<Question>> {
        let result = ExamQuestions::find_by_id(question_id)
            .one(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询题目失败: {e}")))?;

        Ok(result.map(|m| m.into_question()))
    }

    /// 添加题目
    pub async fn create_question_impl(&self, exam_id: i64, draft: QuestionDraft) -> Result<Question> {
        let now = chrono::Utc::now().timestamp();

        let model = QuestionActiveModel {
            exam_id: Set(exam_id),
            question_type: Set(draft.question_type.to_string()),
            text: Set(draft.text),
            options: Set(options_to_storage(&draft.options)?),
            correct_answer: Set(draft.correct_answer.to_storage()),
            allow_multiple_answers: Set(draft.allow_multiple_answers),
            points: Set(draft.points),
            position: Set(draft.position),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("创建题目失败: {e}")))?;

        Ok(result.into_question())
    }

    /// 更新题目
    pub async fn update_question_impl(
        &self,
        question_id: i64,
        draft: QuestionDraft,
    ) -> Result<Option<Question>> {
        let existing = ExamQuestions::find_by_id(question_id)
            .one(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询题目失败: {e}")))?;

        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut model: QuestionActiveModel = existing.into();
        model.question_type = Set(draft.question_type.to_string());
        model.text = Set(draft.text);
        model.options = Set(options_to_storage(&draft.options)?);
        model.correct_answer = Set(draft.correct_answer.to_storage());
        model.allow_multiple_answers = Set(draft.allow_multiple_answers);
        model.points = Set(draft.points);
        model.position = Set(draft.position);
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("更新题目失败: {e}")))?;

        Ok(Some(result.into_question()))
    }
}
