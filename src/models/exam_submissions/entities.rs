use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 提交状态
//
// in_progress -> graded -> recheck_requested -> rechecking -> recheck_completed
// recheck_completed 可以再次进入 recheck_requested
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "exam_submission.ts")]
pub enum SubmissionStatus {
    InProgress,
    Graded,
    RecheckRequested,
    Rechecking,
    RecheckCompleted,
}

impl SubmissionStatus {
    /// 状态机允许的迁移
    pub fn can_transition_to(self, target: SubmissionStatus) -> bool {
        use SubmissionStatus::*;
        matches!(
            (self, target),
            (InProgress, Graded)
                | (Graded, RecheckRequested)
                | (RecheckCompleted, RecheckRequested)
                | (RecheckRequested, Rechecking)
                | (Rechecking, RecheckCompleted)
        )
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionStatus::InProgress => write!(f, "in_progress"),
            SubmissionStatus::Graded => write!(f, "graded"),
            SubmissionStatus::RecheckRequested => write!(f, "recheck_requested"),
            SubmissionStatus::Rechecking => write!(f, "rechecking"),
            SubmissionStatus::RecheckCompleted => write!(f, "recheck_completed"),
        }
    }
}

impl std::str::FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(SubmissionStatus::InProgress),
            "graded" => Ok(SubmissionStatus::Graded),
            "recheck_requested" => Ok(SubmissionStatus::RecheckRequested),
            "rechecking" => Ok(SubmissionStatus::Rechecking),
            "recheck_completed" => Ok(SubmissionStatus::RecheckCompleted),
            _ => Err(format!("Invalid submission status: {s}")),
        }
    }
}

// 复查申请状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "exam_submission.ts")]
pub enum RecheckRequestStatus {
    Pending,
    InProgress,
    Completed,
}

impl RecheckRequestStatus {
    /// pending 与 in_progress 视为进行中
    pub fn is_active(self) -> bool {
        matches!(
            self,
            RecheckRequestStatus::Pending | RecheckRequestStatus::InProgress
        )
    }
}

impl std::fmt::Display for RecheckRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecheckRequestStatus::Pending => write!(f, "pending"),
            RecheckRequestStatus::InProgress => write!(f, "in_progress"),
            RecheckRequestStatus::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for RecheckRequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RecheckRequestStatus::Pending),
            "in_progress" => Ok(RecheckRequestStatus::InProgress),
            "completed" => Ok(RecheckRequestStatus::Completed),
            _ => Err(format!("Invalid recheck request status: {s}")),
        }
    }
}

// 考试提交实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "exam_submission.ts")]
pub struct ExamSubmission {
    pub id: i64,
    pub exam_id: i64,
    pub student_id: i64,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub score: Option<f64>,
    pub total_points: f64,
    pub is_graded: bool,
    pub status: SubmissionStatus,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl ExamSubmission {
    pub fn is_submitted(&self) -> bool {
        self.submitted_at.is_some()
    }
}

/// 学生提交的答案
///
/// 选择题可以提交选项列表，也可以提交逗号分隔的字符串；选项既可以是文本也可以是下标。
#[derive(Debug, Clone, Serialize, PartialEq, TS)]
#[serde(untagged)]
#[ts(export, export_to = "exam_submission.ts")]
pub enum SubmittedAnswer {
    Choices(Vec<String>),
    Text(String),
}

// 列表元素与单值都接受数字，统一转为字符串
impl<'de> Deserialize<'de> for SubmittedAnswer {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) => Ok(SubmittedAnswer::Text(s)),
            serde_json::Value::Number(n) => Ok(SubmittedAnswer::Text(n.to_string())),
            serde_json::Value::Array(items) => Ok(SubmittedAnswer::Choices(
                items.into_iter().map(json_scalar_to_string).collect(),
            )),
            other => Err(serde::de::Error::custom(format!(
                "无效的答案格式: {other}. 支持字符串、数字或列表"
            ))),
        }
    }
}

fn json_scalar_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

impl SubmittedAnswer {
    /// 序列化为存储格式：文本原样保存，列表保存为 JSON 数组
    pub fn to_storage(&self) -> String {
        match self {
            SubmittedAnswer::Text(text) => text.clone(),
            SubmittedAnswer::Choices(choices) => {
                serde_json::to_string(choices).unwrap_or_default()
            }
        }
    }

    /// 从存储格式读取
    pub fn from_storage(raw: &str) -> Self {
        if raw.trim_start().starts_with('[')
            && let Ok(serde_json::Value::Array(items)) = serde_json::from_str(raw)
        {
            return SubmittedAnswer::Choices(items.into_iter().map(json_scalar_to_string).collect());
        }
        SubmittedAnswer::Text(raw.to_string())
    }

    /// 作为单个文本使用（填空题）
    pub fn as_text(&self) -> String {
        match self {
            SubmittedAnswer::Text(text) => text.clone(),
            SubmittedAnswer::Choices(choices) => choices.join(", "),
        }
    }
}

/// 单题评分结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "exam_submission.ts")]
pub struct GradeOutcome {
    pub is_correct: bool,
    pub points_earned: f64,
}

impl GradeOutcome {
    pub const INCORRECT: GradeOutcome = GradeOutcome {
        is_correct: false,
        points_earned: 0.0,
    };
}

// 学生答案实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "exam_submission.ts")]
pub struct StudentAnswer {
    pub id: i64,
    pub submission_id: i64,
    pub question_id: i64,
    pub student_answer: SubmittedAnswer,
    pub is_correct: Option<bool>,
    pub points_earned: Option<f64>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 成绩变更日志（只追加）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "exam_submission.ts")]
pub struct GradeChangeLogEntry {
    pub id: i64,
    pub submission_id: i64,
    pub actor_id: i64,
    pub previous_score: Option<f64>,
    pub new_score: f64,
    pub notes: Option<String>,
    pub changed_at: chrono::DateTime<chrono::Utc>,
}

// 复查申请实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "exam_submission.ts")]
pub struct RecheckRequest {
    pub id: i64,
    pub submission_id: i64,
    pub student_id: i64,
    pub reason: String,
    pub status: RecheckRequestStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use SubmissionStatus::*;

    #[test]
    fn test_forward_transitions() {
        assert!(InProgress.can_transition_to(Graded));
        assert!(Graded.can_transition_to(RecheckRequested));
        assert!(RecheckRequested.can_transition_to(Rechecking));
        assert!(Rechecking.can_transition_to(RecheckCompleted));
        // 复查完成后可再次申请
        assert!(RecheckCompleted.can_transition_to(RecheckRequested));
    }

    #[test]
    fn test_rejected_transitions() {
        assert!(!InProgress.can_transition_to(RecheckRequested));
        assert!(!Graded.can_transition_to(InProgress));
        assert!(!Graded.can_transition_to(Rechecking));
        assert!(!RecheckRequested.can_transition_to(RecheckCompleted));
        assert!(!Rechecking.can_transition_to(Graded));
        assert!(!RecheckCompleted.can_transition_to(Rechecking));
    }

    #[test]
    fn test_status_string_roundtrip() {
        for status in [InProgress, Graded, RecheckRequested, Rechecking, RecheckCompleted] {
            assert_eq!(status.to_string().parse::<SubmissionStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_submitted_answer_storage() {
        let choices = SubmittedAnswer::Choices(vec!["0".into(), "tet".into()]);
        assert_eq!(SubmittedAnswer::from_storage(&choices.to_storage()), choices);

        let text = SubmittedAnswer::Text("0, 1".into());
        assert_eq!(SubmittedAnswer::from_storage(&text.to_storage()), text);

        // 数字数组也能读回
        assert_eq!(
            SubmittedAnswer::from_storage("[0, 2]"),
            SubmittedAnswer::Choices(vec!["0".into(), "2".into()])
        );
    }

    #[test]
    fn test_submitted_answer_deserialize() {
        let numbers: SubmittedAnswer = serde_json::from_str("[0, 1]").unwrap();
        assert_eq!(
            numbers,
            SubmittedAnswer::Choices(vec!["0".into(), "1".into()])
        );
        let text: SubmittedAnswer = serde_json::from_str("\"Manila\"").unwrap();
        assert_eq!(text, SubmittedAnswer::Text("Manila".into()));
        assert!(serde_json::from_str::<SubmittedAnswer>("{\"a\": 1}").is_err());
    }

    #[test]
    fn test_recheck_request_active() {
        assert!(RecheckRequestStatus::Pending.is_active());
        assert!(RecheckRequestStatus::InProgress.is_active());
        assert!(!RecheckRequestStatus::Completed.is_active());
    }
}
