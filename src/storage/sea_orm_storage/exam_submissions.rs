//! 考试提交存储操作

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::exam_submissions::{ActiveModel, Column, Entity as ExamSubmissions};
use crate::entity::student_answers::{
    ActiveModel as AnswerActiveModel, Column as AnswerColumn, Entity as StudentAnswers,
};
use crate::errors::{ExamSystemError, Result};
use crate::models::{
    PaginationInfo,
    exam_submissions::{
        entities::{ExamSubmission, StudentAnswer, SubmissionStatus, SubmittedAnswer},
        requests::SubmissionListQuery,
        responses::SubmissionListResponse,
    },
    exams::entities::Question,
};
use crate::storage::GradeFn;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
    sea_query::{Expr, OnConflict},
};
use tracing::debug;

impl SeaOrmStorage {
    /// 通过 ID 获取提交
    pub async fn get_submission_by_id_impl(
        &self,
        submission_id: i64,
    ) -> Result<Option<ExamSubmission>> {
        let result = ExamSubmissions::find_by_id(submission_id)
            .one(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询提交失败: {e}")))?;

        Ok(result.map(|m| m.into_submission()))
    }

    /// 获取学生某场考试的提交
    pub async fn get_submission_by_exam_and_student_impl(
        &self,
        exam_id: i64,
        student_id: i64,
    ) -> Result<Option<ExamSubmission>> {
        let result = ExamSubmissions::find()
            .filter(Column::ExamId.eq(exam_id))
            .filter(Column::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询提交失败: {e}")))?;

        Ok(result.map(|m| m.into_submission()))
    }

    /// 创建提交
    ///
    /// (exam_id, student_id) 唯一；并发创建时输的一方读取赢家的记录。
    pub async fn create_submission_impl(
        &self,
        exam_id: i64,
        student_id: i64,
        total_points: f64,
    ) -> Result<ExamSubmission> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            exam_id: Set(exam_id),
            student_id: Set(student_id),
            started_at: Set(now),
            submitted_at: Set(None),
            score: Set(None),
            total_points: Set(total_points),
            is_graded: Set(false),
            status: Set(SubmissionStatus::InProgress.to_string()),
            updated_at: Set(now),
            ..Default::default()
        };

        match model.insert(&self.db).await {
            Ok(result) => Ok(result.into_submission()),
            Err(insert_err) => {
                debug!(
                    "Insert submission for exam {} student {} failed, checking for existing row: {}",
                    exam_id, student_id, insert_err
                );
                match self
                    .get_submission_by_exam_and_student_impl(exam_id, student_id)
                    .await?
                {
                    Some(existing) => Ok(existing),
                    None => Err(ExamSystemError::database_operation(format!(
                        "创建提交失败: {insert_err}"
                    ))),
                }
            }
        }
    }

    /// 保存答案
    ///
    /// 先对提交行做条件更新（submitted_at IS NULL），与交卷的抢占互斥；
    /// 已交卷时返回 None。
    pub async fn save_answer_impl(
        &self,
        submission_id: i64,
        question_id: i64,
        answer: &SubmittedAnswer,
    ) -> Result<Option<StudentAnswer>> {
        let now = chrono::Utc::now().timestamp();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("开启事务失败: {e}")))?;

        let touched = ExamSubmissions::update_many()
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(submission_id))
            .filter(Column::SubmittedAt.is_null())
            .exec(&txn)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("更新提交失败: {e}")))?;

        if touched.rows_affected == 0 {
            txn.rollback()
                .await
                .map_err(|e| ExamSystemError::database_operation(format!("回滚事务失败: {e}")))?;
            return Ok(None);
        }

        let model = AnswerActiveModel {
            submission_id: Set(submission_id),
            question_id: Set(question_id),
            student_answer: Set(answer.to_storage()),
            is_correct: Set(None),
            points_earned: Set(None),
            updated_at: Set(now),
            ..Default::default()
        };

        StudentAnswers::insert(model)
            .on_conflict(
                OnConflict::columns([AnswerColumn::SubmissionId, AnswerColumn::QuestionId])
                    .update_columns([AnswerColumn::StudentAnswer, AnswerColumn::UpdatedAt])
                    .to_owned(),
            )
            .exec(&txn)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("保存答案失败: {e}")))?;

        let saved = StudentAnswers::find()
            .filter(AnswerColumn::SubmissionId.eq(submission_id))
            .filter(AnswerColumn::QuestionId.eq(question_id))
            .one(&txn)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询答案失败: {e}")))?
            .ok_or_else(|| ExamSystemError::database_operation("保存答案后未能读取答案"))?;

        txn.commit()
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(Some(saved.into_answer()))
    }

    /// 列出提交的全部答案
    pub async fn list_submission_answers_impl(
        &self,
        submission_id: i64,
    ) -> Result<Vec<StudentAnswer>> {
        let results = StudentAnswers::find()
            .filter(AnswerColumn::SubmissionId.eq(submission_id))
            .order_by_asc(AnswerColumn::QuestionId)
            .all(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询答案失败: {e}")))?;

        Ok(results.into_iter().map(|m| m.into_answer()).collect())
    }

    /// 交卷并评分
    ///
    /// 事务内第一条语句即为抢占：`UPDATE ... SET submitted_at = now WHERE submitted_at IS NULL`。
    /// 抢占失败（已被其他请求交卷）时回滚并返回 None；
    /// 之后对每道题评分，缺答的题写入 0 分错误记录，最后写入总分并置为 graded。
    pub async fn submit_and_grade_impl(
        &self,
        submission_id: i64,
        questions: &[Question],
        grade: GradeFn,
    ) -> Result<Option<ExamSubmission>> {
        let now = chrono::Utc::now().timestamp();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("开启事务失败: {e}")))?;

        let claimed = ExamSubmissions::update_many()
            .col_expr(Column::SubmittedAt, Expr::value(now))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(submission_id))
            .filter(Column::SubmittedAt.is_null())
            .exec(&txn)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("交卷失败: {e}")))?;

        if claimed.rows_affected == 0 {
            txn.rollback()
                .await
                .map_err(|e| ExamSystemError::database_operation(format!("回滚事务失败: {e}")))?;
            return Ok(None);
        }

        let existing: HashMap<i64, _> = StudentAnswers::find()
            .filter(AnswerColumn::SubmissionId.eq(submission_id))
            .all(&txn)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询答案失败: {e}")))?
            .into_iter()
            .map(|m| (m.question_id, m))
            .collect();

        let mut score = 0.0;
        let mut total_points = 0.0;

        for question in questions {
            total_points += question.points;

            match existing.get(&question.id) {
                Some(row) => {
                    let submitted = SubmittedAnswer::from_storage(&row.student_answer);
                    let outcome = grade(question, Some(&submitted));
                    if outcome.is_correct {
                        score += outcome.points_earned;
                    }

                    let mut model: AnswerActiveModel = row.clone().into();
                    model.is_correct = Set(Some(outcome.is_correct));
                    model.points_earned = Set(Some(outcome.points_earned));
                    model.updated_at = Set(now);
                    model.update(&txn).await.map_err(|e| {
                        ExamSystemError::database_operation(format!("写入评分失败: {e}"))
                    })?;
                }
                None => {
                    let outcome = grade(question, None);
                    let model = AnswerActiveModel {
                        submission_id: Set(submission_id),
                        question_id: Set(question.id),
                        student_answer: Set(String::new()),
                        is_correct: Set(Some(outcome.is_correct)),
                        points_earned: Set(Some(outcome.points_earned)),
                        updated_at: Set(now),
                        ..Default::default()
                    };
                    model.insert(&txn).await.map_err(|e| {
                        ExamSystemError::database_operation(format!("写入缺答记录失败: {e}"))
                    })?;
                }
            }
        }

        ExamSubmissions::update_many()
            .col_expr(Column::Score, Expr::value(Some(score)))
            .col_expr(Column::TotalPoints, Expr::value(total_points))
            .col_expr(Column::IsGraded, Expr::value(true))
            .col_expr(
                Column::Status,
                Expr::value(SubmissionStatus::Graded.to_string()),
            )
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(submission_id))
            .exec(&txn)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("写入总分失败: {e}")))?;

        let graded = ExamSubmissions::find_by_id(submission_id)
            .one(&txn)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询提交失败: {e}")))?
            .ok_or_else(|| ExamSystemError::not_found("提交不存在"))?;

        txn.commit()
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(Some(graded.into_submission()))
    }

    /// 列出某场考试的提交（分页）
    pub async fn list_exam_submissions_with_pagination_impl(
        &self,
        exam_id: i64,
        query: SubmissionListQuery,
    ) -> Result<SubmissionListResponse> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(10).clamp(1, 100) as u64;

        let mut select = ExamSubmissions::find().filter(Column::ExamId.eq(exam_id));

        // 状态筛选
        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }

        select = select
            .order_by_desc(Column::UpdatedAt)
            .order_by_desc(Column::Id);

        // 分页查询
        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询提交总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询提交页数失败: {e}")))?;

        let submissions = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询提交列表失败: {e}")))?;

        Ok(SubmissionListResponse {
            items: submissions
                .into_iter()
                .map(|m| m.into_submission())
                .collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }
}
