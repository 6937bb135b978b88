//! 复查与成绩变更日志存储操作

use std::collections::{HashMap, HashSet};

use super::SeaOrmStorage;
use crate::entity::exam_questions::{Column as QuestionColumn, Entity as ExamQuestions};
use crate::entity::exam_recheck_requests::{
    ActiveModel as RecheckActiveModel, Column as RecheckColumn, Entity as RecheckRequests,
};
use crate::entity::exam_submissions::{Column, Entity as ExamSubmissions};
use crate::entity::grade_change_logs::{
    ActiveModel as LogActiveModel, Column as LogColumn, Entity as GradeChangeLogs,
};
use crate::entity::student_answers::{
    ActiveModel as AnswerActiveModel, Column as AnswerColumn, Entity as StudentAnswers,
};
use crate::errors::{ExamSystemError, Result};
use crate::models::exam_submissions::{
    entities::{
        ExamSubmission, GradeChangeLogEntry, RecheckRequest, RecheckRequestStatus,
        SubmissionStatus,
    },
    requests::AnswerOverride,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait, sea_query::Expr,
};

/// 进行中的复查申请状态
fn active_request_statuses() -> [String; 2] {
    [
        RecheckRequestStatus::Pending.to_string(),
        RecheckRequestStatus::InProgress.to_string(),
    ]
}

async fn rollback(txn: DatabaseTransaction) -> Result<()> {
    txn.rollback()
        .await
        .map_err(|e| ExamSystemError::database_operation(format!("回滚事务失败: {e}")))
}

impl SeaOrmStorage {
    /// 获取提交最近一次复查申请
    pub async fn get_latest_recheck_request_impl(
        &self,
        submission_id: i64,
    ) -> Result<Option<RecheckRequest>> {
        let result = RecheckRequests::find()
            .filter(RecheckColumn::SubmissionId.eq(submission_id))
            .order_by_desc(RecheckColumn::CreatedAt)
            .order_by_desc(RecheckColumn::Id)
            .one(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询复查申请失败: {e}")))?;

        Ok(result.map(|m| m.into_recheck_request()))
    }

    /// 创建复查申请
    ///
    /// 第一条语句把提交从 graded / recheck_completed 条件更新为 recheck_requested，
    /// 失败说明状态不允许；随后在同一事务内检查是否已有进行中的申请。
    pub async fn create_recheck_request_impl(
        &self,
        submission_id: i64,
        student_id: i64,
        reason: &str,
    ) -> Result<RecheckRequest> {
        let now = chrono::Utc::now().timestamp();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("开启事务失败: {e}")))?;

        let claimed = ExamSubmissions::update_many()
            .col_expr(
                Column::Status,
                Expr::value(SubmissionStatus::RecheckRequested.to_string()),
            )
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(submission_id))
            .filter(Column::SubmittedAt.is_not_null())
            .filter(Column::Status.is_in([
                SubmissionStatus::Graded.to_string(),
                SubmissionStatus::RecheckCompleted.to_string(),
            ]))
            .exec(&txn)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("更新提交状态失败: {e}")))?;

        if claimed.rows_affected == 0 {
            rollback(txn).await?;
            return Err(ExamSystemError::invalid_transition(
                "当前提交状态不允许申请复查",
            ));
        }

        let active = RecheckRequests::find()
            .filter(RecheckColumn::SubmissionId.eq(submission_id))
            .filter(RecheckColumn::Status.is_in(active_request_statuses()))
            .one(&txn)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询复查申请失败: {e}")))?;

        if active.is_some() {
            rollback(txn).await?;
            return Err(ExamSystemError::conflict("已有进行中的复查申请"));
        }

        let model = RecheckActiveModel {
            submission_id: Set(submission_id),
            student_id: Set(student_id),
            reason: Set(reason.to_string()),
            status: Set(RecheckRequestStatus::Pending.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let created = model
            .insert(&txn)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("创建复查申请失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(created.into_recheck_request())
    }

    /// 推进复查状态
    ///
    /// 提交状态从 `from` 条件更新到 `to`，进行中的复查申请同步置为 `request_to`。
    /// 状态已被其他请求修改时返回 None。
    pub async fn transition_recheck_status_impl(
        &self,
        submission_id: i64,
        from: SubmissionStatus,
        to: SubmissionStatus,
        request_to: RecheckRequestStatus,
    ) -> Result<Option<ExamSubmission>> {
        let now = chrono::Utc::now().timestamp();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("开启事务失败: {e}")))?;

        let claimed = ExamSubmissions::update_many()
            .col_expr(Column::Status, Expr::value(to.to_string()))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(submission_id))
            .filter(Column::Status.eq(from.to_string()))
            .exec(&txn)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("更新提交状态失败: {e}")))?;

        if claimed.rows_affected == 0 {
            rollback(txn).await?;
            return Ok(None);
        }

        RecheckRequests::update_many()
            .col_expr(RecheckColumn::Status, Expr::value(request_to.to_string()))
            .col_expr(RecheckColumn::UpdatedAt, Expr::value(now))
            .filter(RecheckColumn::SubmissionId.eq(submission_id))
            .filter(RecheckColumn::Status.is_in(active_request_statuses()))
            .exec(&txn)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("更新复查申请失败: {e}")))?;

        let updated = ExamSubmissions::find_by_id(submission_id)
            .one(&txn)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询提交失败: {e}")))?
            .ok_or_else(|| ExamSystemError::not_found("提交不存在"))?;

        txn.commit()
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(Some(updated.into_submission()))
    }

    /// 人工改分
    ///
    /// 单事务：先锁定已交卷的提交行，读取改分前的总分，写入各答案，
    /// 新总分为各条改分（截断后）之和，最后追加成绩变更日志。状态不变。
    /// 改分列表必须恰好覆盖该提交的全部答案。
    pub async fn apply_recheck_grades_impl(
        &self,
        submission_id: i64,
        actor_id: i64,
        overrides: &[AnswerOverride],
        notes: Option<String>,
    ) -> Result<(ExamSubmission, GradeChangeLogEntry)> {
        let now = chrono::Utc::now().timestamp();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("开启事务失败: {e}")))?;

        let touched = ExamSubmissions::update_many()
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(submission_id))
            .filter(Column::SubmittedAt.is_not_null())
            .exec(&txn)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("更新提交失败: {e}")))?;

        if touched.rows_affected == 0 {
            rollback(txn).await?;
            return Err(ExamSystemError::invalid_transition("提交尚未交卷，不能改分"));
        }

        let previous = ExamSubmissions::find_by_id(submission_id)
            .one(&txn)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询提交失败: {e}")))?
            .ok_or_else(|| ExamSystemError::not_found("提交不存在"))?;

        let answers: HashMap<i64, _> = StudentAnswers::find()
            .filter(AnswerColumn::SubmissionId.eq(submission_id))
            .all(&txn)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询答案失败: {e}")))?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        let question_points: HashMap<i64, f64> = ExamQuestions::find()
            .filter(QuestionColumn::ExamId.eq(previous.exam_id))
            .all(&txn)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询题目失败: {e}")))?
            .into_iter()
            .map(|q| (q.id, q.points))
            .collect();

        if let Some(item) = overrides.iter().find(|o| !answers.contains_key(&o.answer_id)) {
            rollback(txn).await?;
            return Err(ExamSystemError::not_found(format!(
                "答案 {} 不属于该提交",
                item.answer_id
            )));
        }

        // 改分必须覆盖全部答案，总分才等于各条改分之和
        let covered: HashSet<i64> = overrides.iter().map(|o| o.answer_id).collect();
        if covered.len() != answers.len() || covered.len() != overrides.len() {
            rollback(txn).await?;
            return Err(ExamSystemError::validation(format!(
                "改分需要覆盖该提交的全部 {} 道答案",
                answers.len()
            )));
        }

        let mut new_score = 0.0;
        for item in overrides {
            let row = &answers[&item.answer_id];
            let max_points = question_points.get(&row.question_id).copied().unwrap_or(0.0);
            let points = if item.is_correct {
                item.points_earned.clamp(0.0, max_points.max(0.0))
            } else {
                0.0
            };
            new_score += points;

            let mut model: AnswerActiveModel = row.clone().into();
            model.is_correct = Set(Some(item.is_correct));
            model.points_earned = Set(Some(points));
            model.updated_at = Set(now);
            model
                .update(&txn)
                .await
                .map_err(|e| ExamSystemError::database_operation(format!("更新答案失败: {e}")))?;
        }

        ExamSubmissions::update_many()
            .col_expr(Column::Score, Expr::value(Some(new_score)))
            .col_expr(Column::IsGraded, Expr::value(true))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(submission_id))
            .exec(&txn)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("写入总分失败: {e}")))?;

        let log = LogActiveModel {
            submission_id: Set(submission_id),
            actor_id: Set(actor_id),
            previous_score: Set(previous.score),
            new_score: Set(new_score),
            notes: Set(notes),
            changed_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| ExamSystemError::database_operation(format!("写入成绩变更日志失败: {e}")))?;

        let updated = ExamSubmissions::find_by_id(submission_id)
            .one(&txn)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询提交失败: {e}")))?
            .ok_or_else(|| ExamSystemError::not_found("提交不存在"))?;

        txn.commit()
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("提交事务失败: {e}")))?;

        Ok((updated.into_submission(), log.into_log_entry()))
    }

    /// 成绩变更历史（最新在前，同一时间按 ID 倒序）
    pub async fn list_grade_change_logs_impl(
        &self,
        submission_id: i64,
    ) -> Result<Vec<GradeChangeLogEntry>> {
        let results = GradeChangeLogs::find()
            .filter(LogColumn::SubmissionId.eq(submission_id))
            .order_by_desc(LogColumn::ChangedAt)
            .order_by_desc(LogColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| {
                ExamSystemError::database_operation(format!("查询成绩变更日志失败: {e}"))
            })?;

        Ok(results.into_iter().map(|m| m.into_log_entry()).collect())
    }
}
