//! 考试提交状态机
//!
//! 学生：开始考试、保存答案、交卷、申请复查。
//! 考试负责人或管理员：推进复查状态、人工改分、查看成绩变更历史。
//!
//! 所有状态变更都在存储层以条件更新落地，这里负责前置校验、权限与通知。

use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

use super::deadline::DueDatePolicy;
use crate::errors::{ExamSystemError, Result};
use crate::models::{
    exam_submissions::{
        entities::{
            ExamSubmission, GradeChangeLogEntry, RecheckRequest, RecheckRequestStatus,
            StudentAnswer, SubmissionStatus,
        },
        requests::{RecheckGradesRequest, SaveAnswerRequest},
        responses::{MyResultResponse, SubmissionDetailResponse},
    },
    exams::entities::Exam,
    notifications::entities::NotificationType,
    users::entities::User,
};
use crate::services::grading;
use crate::services::notifications::NotificationSink;
use crate::storage::Storage;

pub struct SubmissionWorkflow {
    storage: Arc<dyn Storage>,
    notifier: Arc<dyn NotificationSink>,
    due_dates: Arc<dyn DueDatePolicy>,
}

impl SubmissionWorkflow {
    pub fn new(
        storage: Arc<dyn Storage>,
        notifier: Arc<dyn NotificationSink>,
        due_dates: Arc<dyn DueDatePolicy>,
    ) -> Self {
        Self {
            storage,
            notifier,
            due_dates,
        }
    }

    async fn load_exam(&self, exam_id: i64) -> Result<Exam> {
        self.storage
            .get_exam_by_id(exam_id)
            .await?
            .ok_or_else(|| ExamSystemError::not_found(format!("考试 {exam_id} 不存在")))
    }

    async fn load_submission(&self, submission_id: i64) -> Result<(ExamSubmission, Exam)> {
        let submission = self
            .storage
            .get_submission_by_id(submission_id)
            .await?
            .ok_or_else(|| ExamSystemError::not_found(format!("提交 {submission_id} 不存在")))?;
        let exam = self.load_exam(submission.exam_id).await?;
        Ok((submission, exam))
    }

    /// 学生只能操作自己的提交
    fn ensure_owner(submission: &ExamSubmission, user: &User) -> Result<()> {
        if submission.student_id == user.id {
            Ok(())
        } else {
            Err(ExamSystemError::authorization("只能操作自己的提交"))
        }
    }

    /// 考试负责人或管理员
    fn ensure_manager(exam: &Exam, user: &User) -> Result<()> {
        if user.is_admin() || exam.is_owned_by(user.id) {
            Ok(())
        } else {
            Err(ExamSystemError::authorization("只有考试负责人或管理员可以执行此操作"))
        }
    }

    fn ensure_not_past_due(&self, exam: &Exam) -> Result<()> {
        if self.due_dates.is_past_due(exam) {
            Err(ExamSystemError::past_due("考试已截止"))
        } else {
            Ok(())
        }
    }

    /// 通知失败只记录日志，不影响已经提交的事务
    async fn send(
        &self,
        user_id: i64,
        kind: NotificationType,
        message: String,
        metadata: serde_json::Value,
    ) {
        if let Err(e) = self.notifier.notify(user_id, kind, message, metadata).await {
            warn!(
                "Failed to deliver {} notification to user {}: {}",
                kind, user_id, e
            );
        }
    }

    /// 开始考试
    ///
    /// 已有未交卷的提交时直接返回它。
    pub async fn start(&self, exam_id: i64, student: &User) -> Result<ExamSubmission> {
        let exam = self.load_exam(exam_id).await?;
        if !exam.is_published() {
            return Err(ExamSystemError::invalid_transition("考试尚未发布"));
        }

        if let Some(existing) = self
            .storage
            .get_submission_by_exam_and_student(exam_id, student.id)
            .await?
        {
            if existing.is_submitted() {
                return Err(ExamSystemError::already_submitted("该考试已交卷"));
            }
            return Ok(existing);
        }

        self.ensure_not_past_due(&exam)?;

        let questions = self.storage.list_exam_questions(exam_id).await?;
        let total_points: f64 = questions.iter().map(|q| q.points).sum();

        let submission = self
            .storage
            .create_submission(exam_id, student.id, total_points)
            .await?;

        // 并发开始时拿到的可能是另一请求已经交卷的记录
        if submission.is_submitted() {
            return Err(ExamSystemError::already_submitted("该考试已交卷"));
        }

        info!(
            "Student {} started exam {} (submission {})",
            student.id, exam_id, submission.id
        );
        Ok(submission)
    }

    /// 保存答案（后写覆盖先写）
    pub async fn save_answer(
        &self,
        submission_id: i64,
        student: &User,
        req: SaveAnswerRequest,
    ) -> Result<StudentAnswer> {
        let (submission, exam) = self.load_submission(submission_id).await?;
        Self::ensure_owner(&submission, student)?;

        if submission.is_submitted() {
            return Err(ExamSystemError::already_submitted("该考试已交卷"));
        }
        self.ensure_not_past_due(&exam)?;

        match self.storage.get_question_by_id(req.question_id).await? {
            Some(question) if question.exam_id == exam.id => {}
            _ => {
                return Err(ExamSystemError::not_found(format!(
                    "题目 {} 不属于该考试",
                    req.question_id
                )));
            }
        }

        self.storage
            .save_answer(submission_id, req.question_id, &req.answer)
            .await?
            .ok_or_else(|| ExamSystemError::already_submitted("该考试已交卷"))
    }

    /// 交卷并自动评分
    ///
    /// 并发交卷时只有一个请求能抢到提交行，其余返回 AlreadySubmitted。
    pub async fn submit(&self, submission_id: i64, student: &User) -> Result<ExamSubmission> {
        let (submission, exam) = self.load_submission(submission_id).await?;
        Self::ensure_owner(&submission, student)?;

        if submission.is_submitted() {
            return Err(ExamSystemError::already_submitted("该考试已交卷"));
        }
        self.ensure_not_past_due(&exam)?;

        let questions = self.storage.list_exam_questions(exam.id).await?;

        let graded = self
            .storage
            .submit_and_grade(submission_id, &questions, grading::grade)
            .await?
            .ok_or_else(|| ExamSystemError::already_submitted("该考试已交卷"))?;

        info!(
            "Submission {} graded: {:?}/{}",
            graded.id, graded.score, graded.total_points
        );
        Ok(graded)
    }

    /// 学生申请复查
    pub async fn request_recheck(
        &self,
        exam_id: i64,
        student: &User,
        reason: &str,
    ) -> Result<RecheckRequest> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ExamSystemError::validation("复查理由不能为空"));
        }

        let exam = self.load_exam(exam_id).await?;
        let submission = self
            .storage
            .get_submission_by_exam_and_student(exam_id, student.id)
            .await?
            .ok_or_else(|| ExamSystemError::not_found("未找到该考试的提交"))?;

        if !submission.is_submitted() {
            return Err(ExamSystemError::invalid_transition("交卷后才能申请复查"));
        }

        if let Some(latest) = self.storage.get_latest_recheck_request(submission.id).await?
            && latest.status.is_active()
        {
            return Err(ExamSystemError::conflict("已有进行中的复查申请"));
        }

        if !submission
            .status
            .can_transition_to(SubmissionStatus::RecheckRequested)
        {
            return Err(ExamSystemError::invalid_transition(format!(
                "当前状态 {} 不能申请复查",
                submission.status
            )));
        }

        let request = self
            .storage
            .create_recheck_request(submission.id, student.id, reason)
            .await?;

        info!(
            "Student {} requested recheck for submission {}",
            student.id, submission.id
        );

        self.send(
            exam.created_by,
            NotificationType::RecheckRequested,
            format!("《{}》收到新的复查申请：{}", exam.title, reason),
            json!({
                "exam_id": exam.id,
                "submission_id": submission.id,
                "recheck_request_id": request.id,
                "student_id": student.id,
            }),
        )
        .await;

        Ok(request)
    }

    /// 开始复查：recheck_requested -> rechecking
    pub async fn begin_recheck(&self, submission_id: i64, actor: &User) -> Result<ExamSubmission> {
        self.advance_recheck(
            submission_id,
            actor,
            SubmissionStatus::RecheckRequested,
            SubmissionStatus::Rechecking,
            RecheckRequestStatus::InProgress,
            NotificationType::RecheckStarted,
        )
        .await
    }

    /// 完成复查：rechecking -> recheck_completed
    pub async fn complete_recheck(
        &self,
        submission_id: i64,
        actor: &User,
    ) -> Result<ExamSubmission> {
        self.advance_recheck(
            submission_id,
            actor,
            SubmissionStatus::Rechecking,
            SubmissionStatus::RecheckCompleted,
            RecheckRequestStatus::Completed,
            NotificationType::RecheckCompleted,
        )
        .await
    }

    /// 按目标状态推进复查
    pub async fn update_status(
        &self,
        submission_id: i64,
        actor: &User,
        target: SubmissionStatus,
    ) -> Result<ExamSubmission> {
        match target {
            SubmissionStatus::Rechecking => self.begin_recheck(submission_id, actor).await,
            SubmissionStatus::RecheckCompleted => self.complete_recheck(submission_id, actor).await,
            other => Err(ExamSystemError::invalid_transition(format!(
                "不能手动把状态改为 {other}"
            ))),
        }
    }

    async fn advance_recheck(
        &self,
        submission_id: i64,
        actor: &User,
        from: SubmissionStatus,
        to: SubmissionStatus,
        request_to: RecheckRequestStatus,
        kind: NotificationType,
    ) -> Result<ExamSubmission> {
        let (submission, exam) = self.load_submission(submission_id).await?;
        Self::ensure_manager(&exam, actor)?;

        if submission.status != from || !from.can_transition_to(to) {
            return Err(ExamSystemError::invalid_transition(format!(
                "当前状态 {} 不能变更为 {}",
                submission.status, to
            )));
        }

        let updated = self
            .storage
            .transition_recheck_status(submission_id, from, to, request_to)
            .await?
            .ok_or_else(|| ExamSystemError::invalid_transition("提交状态已被修改，请刷新后重试"))?;

        info!(
            "Submission {} moved {} -> {} by user {}",
            submission_id, from, to, actor.id
        );

        self.send(
            updated.student_id,
            kind,
            format!("《{}》的复查状态已更新为 {}", exam.title, to),
            json!({
                "exam_id": exam.id,
                "submission_id": updated.id,
                "status": to,
            }),
        )
        .await;

        Ok(updated)
    }

    /// 人工改分
    ///
    /// 分数在这里校验：必须是有限数值，每道答案最多出现一次。
    /// 存储层要求覆盖该提交的全部答案，并按题目分值截断到 [0, points]，
    /// 因此新总分即为各条改分之和。
    pub async fn recheck_grades(
        &self,
        submission_id: i64,
        actor: &User,
        req: RecheckGradesRequest,
    ) -> Result<(ExamSubmission, GradeChangeLogEntry)> {
        let (submission, exam) = self.load_submission(submission_id).await?;
        Self::ensure_manager(&exam, actor)?;

        if !submission.is_submitted() {
            return Err(ExamSystemError::invalid_transition("提交尚未交卷，不能改分"));
        }
        if req.answers.is_empty() {
            return Err(ExamSystemError::validation("至少需要修改一道题的成绩"));
        }
        if let Some(bad) = req.answers.iter().find(|a| !a.points_earned.is_finite()) {
            return Err(ExamSystemError::validation(format!(
                "答案 {} 的分数无效",
                bad.answer_id
            )));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = req.answers.iter().find(|a| !seen.insert(a.answer_id)) {
            return Err(ExamSystemError::validation(format!(
                "答案 {} 重复出现",
                dup.answer_id
            )));
        }

        let notes = req
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let (updated, log_entry) = self
            .storage
            .apply_recheck_grades(submission_id, actor.id, &req.answers, notes)
            .await?;

        info!(
            "Submission {} regraded by user {}: {:?} -> {}",
            submission_id, actor.id, log_entry.previous_score, log_entry.new_score
        );

        self.send(
            updated.student_id,
            NotificationType::GradeUpdated,
            format!("《{}》的成绩已更新为 {}", exam.title, log_entry.new_score),
            json!({
                "exam_id": exam.id,
                "submission_id": updated.id,
                "previous_score": log_entry.previous_score,
                "new_score": log_entry.new_score,
            }),
        )
        .await;

        Ok((updated, log_entry))
    }

    /// 成绩变更历史
    pub async fn history(
        &self,
        submission_id: i64,
        viewer: &User,
    ) -> Result<Vec<GradeChangeLogEntry>> {
        let (_, exam) = self.load_submission(submission_id).await?;
        Self::ensure_manager(&exam, viewer)?;
        self.storage.list_grade_change_logs(submission_id).await
    }

    /// 提交详情：提交者本人、考试负责人或管理员可见
    pub async fn submission_detail(
        &self,
        submission_id: i64,
        viewer: &User,
    ) -> Result<SubmissionDetailResponse> {
        let (submission, exam) = self.load_submission(submission_id).await?;
        if submission.student_id != viewer.id {
            Self::ensure_manager(&exam, viewer)?;
        }

        let answers = self.storage.list_submission_answers(submission_id).await?;
        Ok(SubmissionDetailResponse {
            submission,
            answers,
        })
    }

    /// 学生查看自己的考试结果
    pub async fn my_result(&self, exam_id: i64, student: &User) -> Result<MyResultResponse> {
        let submission = self
            .storage
            .get_submission_by_exam_and_student(exam_id, student.id)
            .await?
            .ok_or_else(|| ExamSystemError::not_found("未找到该考试的提交"))?;

        let answers = self.storage.list_submission_answers(submission.id).await?;
        let recheck_request = self
            .storage
            .get_latest_recheck_request(submission.id)
            .await?;

        Ok(MyResultResponse {
            submission,
            answers,
            recheck_request,
        })
    }
}
