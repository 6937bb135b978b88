use serde::Serialize;
use ts_rs::TS;

use super::entities::{ExamSubmission, GradeChangeLogEntry, RecheckRequest, StudentAnswer};
use crate::models::PaginationInfo;

/// 提交详情（含答案）
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "exam_submission.ts")]
pub struct SubmissionDetailResponse {
    pub submission: ExamSubmission,
    pub answers: Vec<StudentAnswer>,
}

/// 学生查看自己的考试结果
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "exam_submission.ts")]
pub struct MyResultResponse {
    pub submission: ExamSubmission,
    pub answers: Vec<StudentAnswer>,
    pub recheck_request: Option<RecheckRequest>,
}

/// 提交列表响应
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "exam_submission.ts")]
pub struct SubmissionListResponse {
    pub items: Vec<ExamSubmission>,
    pub pagination: PaginationInfo,
}

/// 成绩变更历史响应
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "exam_submission.ts")]
pub struct GradeHistoryResponse {
    pub items: Vec<GradeChangeLogEntry>,
}

/// 人工改分结果
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "exam_submission.ts")]
pub struct RecheckGradesResponse {
    pub submission: ExamSubmission,
    pub log_entry: GradeChangeLogEntry,
}
