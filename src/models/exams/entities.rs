use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::utils::array_codec;

// 考试状态
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "exam.ts")]
pub enum ExamStatus {
    Draft,     // 草稿，可编辑题目
    Published, // 已发布，题目不可再改
}

impl std::fmt::Display for ExamStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExamStatus::Draft => write!(f, "draft"),
            ExamStatus::Published => write!(f, "published"),
        }
    }
}

impl std::str::FromStr for ExamStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ExamStatus::Draft),
            "published" => Ok(ExamStatus::Published),
            _ => Err(format!("Invalid exam status: {s}")),
        }
    }
}

// 考试实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "exam.ts")]
pub struct Exam {
    pub id: i64,
    pub course_id: i64,
    pub created_by: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: ExamStatus,
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Exam {
    pub fn is_published(&self) -> bool {
        self.status == ExamStatus::Published
    }

    /// 考试负责人：创建者即课程负责人
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.created_by == user_id
    }
}

// 题目类型
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "exam.ts")]
pub enum QuestionType {
    Identification, // 填空/识别题
    MultipleChoice, // 选择题
    Unknown,        // 存储中出现的未知类型，一律判错
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuestionType::Identification => write!(f, "identification"),
            QuestionType::MultipleChoice => write!(f, "multiple_choice"),
            QuestionType::Unknown => write!(f, "unknown"),
        }
    }
}

impl QuestionType {
    /// 从存储字符串解析，无法识别时返回 Unknown
    pub fn from_storage(s: &str) -> Self {
        match s {
            "identification" => QuestionType::Identification,
            "multiple_choice" => QuestionType::MultipleChoice,
            _ => QuestionType::Unknown,
        }
    }
}

/// 正确答案
///
/// 单个文本答案或答案列表，以带标签的 JSON 持久化。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
#[ts(export, export_to = "exam.ts")]
pub enum CorrectAnswer {
    Single(String),
    Multiple(Vec<String>),
}

impl CorrectAnswer {
    /// 展开为答案列表
    pub fn values(&self) -> Vec<String> {
        match self {
            CorrectAnswer::Single(value) => vec![value.clone()],
            CorrectAnswer::Multiple(values) => values.clone(),
        }
    }

    /// 是否至少含有一个非空答案
    pub fn has_any(&self) -> bool {
        self.values().iter().any(|v| !v.trim().is_empty())
    }

    /// 序列化为存储格式
    pub fn to_storage(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// 从存储格式读取
    ///
    /// 无法按 JSON 解析的旧数据按花括号数组编码解码。
    pub fn from_storage(raw: &str) -> Self {
        if let Ok(answer) = serde_json::from_str::<CorrectAnswer>(raw) {
            return answer;
        }
        Self::from_values(array_codec::decode(raw))
    }

    /// 由列表构造：单个元素为 Single，否则为 Multiple
    pub fn from_values(mut values: Vec<String>) -> Self {
        if values.len() == 1 {
            CorrectAnswer::Single(values.remove(0))
        } else {
            CorrectAnswer::Multiple(values)
        }
    }
}

// 题目实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "exam.ts")]
pub struct Question {
    pub id: i64,
    pub exam_id: i64,
    pub question_type: QuestionType,
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: CorrectAnswer,
    pub allow_multiple_answers: bool,
    pub points: f64,
    pub position: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_answer_storage_roundtrip() {
        let answer = CorrectAnswer::Multiple(vec!["tet".into(), "23".into()]);
        let raw = answer.to_storage();
        assert_eq!(CorrectAnswer::from_storage(&raw), answer);
    }

    #[test]
    fn test_correct_answer_reads_legacy_encoding() {
        let answer = CorrectAnswer::from_storage(r#"{"sdasd1","sdasd2","sdasd3"}"#);
        assert_eq!(
            answer.values(),
            vec!["sdasd1".to_string(), "sdasd2".into(), "sdasd3".into()]
        );

        let single = CorrectAnswer::from_storage("Paris");
        assert_eq!(single, CorrectAnswer::Single("Paris".into()));
    }

    #[test]
    fn test_correct_answer_legacy_broken_is_empty() {
        let answer = CorrectAnswer::from_storage(r#"{"a","b""#);
        assert!(!answer.has_any());
    }

    #[test]
    fn test_unknown_question_type() {
        assert_eq!(QuestionType::from_storage("essay"), QuestionType::Unknown);
        assert_eq!(
            QuestionType::from_storage("multiple_choice"),
            QuestionType::MultipleChoice
        );
    }
}
