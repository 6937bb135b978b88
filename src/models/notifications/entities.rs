use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 通知类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "notification.ts")]
pub enum NotificationType {
    RecheckRequested, // 学生申请复查（发给考试负责人）
    RecheckStarted,   // 开始复查
    RecheckCompleted, // 复查完成
    GradeUpdated,     // 成绩被人工修改
}

impl NotificationType {
    /// 默认标题
    pub fn default_title(self) -> &'static str {
        match self {
            NotificationType::RecheckRequested => "收到复查申请",
            NotificationType::RecheckStarted => "复查已开始",
            NotificationType::RecheckCompleted => "复查已完成",
            NotificationType::GradeUpdated => "成绩已更新",
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationType::RecheckRequested => write!(f, "recheck_requested"),
            NotificationType::RecheckStarted => write!(f, "recheck_started"),
            NotificationType::RecheckCompleted => write!(f, "recheck_completed"),
            NotificationType::GradeUpdated => write!(f, "grade_updated"),
        }
    }
}

impl std::str::FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recheck_requested" => Ok(NotificationType::RecheckRequested),
            "recheck_started" => Ok(NotificationType::RecheckStarted),
            "recheck_completed" => Ok(NotificationType::RecheckCompleted),
            "grade_updated" => Ok(NotificationType::GradeUpdated),
            _ => Err(format!("Invalid notification type: {s}")),
        }
    }
}

// 通知关联对象类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "notification.ts")]
pub enum ReferenceType {
    Exam,
    ExamSubmission,
}

impl std::fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceType::Exam => write!(f, "exam"),
            ReferenceType::ExamSubmission => write!(f, "exam_submission"),
        }
    }
}

impl std::str::FromStr for ReferenceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exam" => Ok(ReferenceType::Exam),
            "exam_submission" => Ok(ReferenceType::ExamSubmission),
            _ => Err(format!("Invalid reference type: {s}")),
        }
    }
}

// 通知实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "notification.ts")]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub notification_type: NotificationType,
    pub title: String,
    pub content: Option<String>,
    pub reference_type: Option<ReferenceType>,
    pub reference_id: Option<i64>,
    pub metadata: Option<serde_json::Value>,
    pub is_read: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
