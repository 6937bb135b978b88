use crate::models::{
    exam_submissions::{
        entities::{
            ExamSubmission, GradeChangeLogEntry, GradeOutcome, RecheckRequest,
            RecheckRequestStatus, StudentAnswer, SubmissionStatus, SubmittedAnswer,
        },
        requests::{AnswerOverride, SubmissionListQuery},
        responses::SubmissionListResponse,
    },
    exams::{
        entities::{Exam, Question},
        requests::{CreateExamRequest, QuestionDraft},
    },
    notifications::{
        entities::Notification,
        requests::{CreateNotificationRequest, NotificationListQuery},
        responses::NotificationListResponse,
    },
    users::{entities::User, requests::CreateUserRequest},
};

use crate::errors::Result;

pub mod sea_orm_storage;

/// 评分函数：题目 + 学生答案 -> 评分结果
pub type GradeFn = fn(&Question, Option<&SubmittedAnswer>) -> GradeOutcome;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户（LMS 同步）
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;

    /// 考试管理方法
    // 创建考试（草稿）
    async fn create_exam(&self, created_by: i64, req: CreateExamRequest) -> Result<Exam>;
    // 通过ID获取考试
    async fn get_exam_by_id(&self, exam_id: i64) -> Result<Option<Exam>>;
    // 发布考试（仅草稿可发布），返回是否发生了状态变化
    async fn publish_exam(&self, exam_id: i64) -> Result<bool>;
    // 列出考试题目（按 position、id 排序）
    async fn list_exam_questions(&self, exam_id: i64) -> Result<Vec<Question>>;
    // 通过ID获取题目
    async fn get_question_by_id(&self, question_id: i64) -> Result<Option<Question>>;
    // 添加题目
    async fn create_question(&self, exam_id: i64, draft: QuestionDraft) -> Result<Question>;
    // 更新题目
    async fn update_question(
        &self,
        question_id: i64,
        draft: QuestionDraft,
    ) -> Result<Option<Question>>;

    /// 考试提交方法
    // 通过ID获取提交
    async fn get_submission_by_id(&self, submission_id: i64) -> Result<Option<ExamSubmission>>;
    // 获取学生某场考试的提交
    async fn get_submission_by_exam_and_student(
        &self,
        exam_id: i64,
        student_id: i64,
    ) -> Result<Option<ExamSubmission>>;
    // 创建提交；唯一键冲突时返回已存在的提交
    async fn create_submission(
        &self,
        exam_id: i64,
        student_id: i64,
        total_points: f64,
    ) -> Result<ExamSubmission>;
    // 保存答案（upsert）；提交已交卷时返回 None
    async fn save_answer(
        &self,
        submission_id: i64,
        question_id: i64,
        answer: &SubmittedAnswer,
    ) -> Result<Option<StudentAnswer>>;
    // 列出提交的全部答案
    async fn list_submission_answers(&self, submission_id: i64) -> Result<Vec<StudentAnswer>>;
    // 交卷并评分（单事务）；抢占失败时返回 None
    async fn submit_and_grade(
        &self,
        submission_id: i64,
        questions: &[Question],
        grade: GradeFn,
    ) -> Result<Option<ExamSubmission>>;
    // 列出某场考试的提交（分页）
    async fn list_exam_submissions_with_pagination(
        &self,
        exam_id: i64,
        query: SubmissionListQuery,
    ) -> Result<SubmissionListResponse>;

    /// 复查方法
    // 获取提交最近一次复查申请
    async fn get_latest_recheck_request(
        &self,
        submission_id: i64,
    ) -> Result<Option<RecheckRequest>>;
    // 创建复查申请并把提交置为 recheck_requested（单事务）
    async fn create_recheck_request(
        &self,
        submission_id: i64,
        student_id: i64,
        reason: &str,
    ) -> Result<RecheckRequest>;
    // 推进复查状态，同时推进进行中的复查申请；状态已被修改时返回 None
    async fn transition_recheck_status(
        &self,
        submission_id: i64,
        from: SubmissionStatus,
        to: SubmissionStatus,
        request_to: RecheckRequestStatus,
    ) -> Result<Option<ExamSubmission>>;
    // 人工改分并写入成绩变更日志（单事务）
    async fn apply_recheck_grades(
        &self,
        submission_id: i64,
        actor_id: i64,
        overrides: &[AnswerOverride],
        notes: Option<String>,
    ) -> Result<(ExamSubmission, GradeChangeLogEntry)>;
    // 成绩变更历史（最新在前）
    async fn list_grade_change_logs(&self, submission_id: i64)
    -> Result<Vec<GradeChangeLogEntry>>;

    /// 通知方法
    // 创建通知
    async fn create_notification(&self, req: CreateNotificationRequest) -> Result<Notification>;
    // 列出用户通知（分页）
    async fn list_notifications_with_pagination(
        &self,
        user_id: i64,
        query: NotificationListQuery,
    ) -> Result<NotificationListResponse>;
    // 标记通知为已读
    async fn mark_notification_as_read(&self, notification_id: i64, user_id: i64)
    -> Result<bool>;
}
