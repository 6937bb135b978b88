use serde::Deserialize;
use ts_rs::TS;

use super::entities::{SubmissionStatus, SubmittedAnswer};

/// 保存（自动保存）答案请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "exam_submission.ts")]
pub struct SaveAnswerRequest {
    pub question_id: i64,
    pub answer: SubmittedAnswer,
}

/// 学生发起复查请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "exam_submission.ts")]
pub struct RecheckRequestBody {
    pub reason: String,
}

/// 教师推进复查状态
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "exam_submission.ts")]
pub struct UpdateSubmissionStatusRequest {
    pub status: SubmissionStatus,
}

/// 单条答案的人工改分
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "exam_submission.ts")]
pub struct AnswerOverride {
    pub answer_id: i64,
    pub is_correct: bool,
    pub points_earned: f64,
}

/// 人工复查改分请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "exam_submission.ts")]
pub struct RecheckGradesRequest {
    pub answers: Vec<AnswerOverride>,
    pub notes: Option<String>,
}

/// 提交列表查询参数
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub status: Option<SubmissionStatus>,
}
