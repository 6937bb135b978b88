use serde::Deserialize;
use ts_rs::TS;

use super::entities::{CorrectAnswer, Question, QuestionType};
use crate::errors::{ExamSystemError, Result};
use crate::utils::array_codec;

/// 创建考试请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "exam.ts")]
pub struct CreateExamRequest {
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
}

/// 正确答案输入：列表，或字符串（兼容花括号数组编码）
#[derive(Debug, Clone, Deserialize, TS)]
#[serde(untagged)]
#[ts(export, export_to = "exam.ts")]
pub enum CorrectAnswerInput {
    List(Vec<String>),
    Text(String),
}

impl CorrectAnswerInput {
    pub fn into_correct_answer(self) -> CorrectAnswer {
        match self {
            CorrectAnswerInput::List(values) => CorrectAnswer::Multiple(values),
            CorrectAnswerInput::Text(text) if text.trim_start().starts_with('{') => {
                CorrectAnswer::from_values(array_codec::decode(&text))
            }
            CorrectAnswerInput::Text(text) => CorrectAnswer::Single(text),
        }
    }
}

/// 添加题目请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "exam.ts")]
pub struct CreateQuestionRequest {
    pub question_type: QuestionType,
    pub text: String,
    pub options: Option<Vec<String>>,
    pub correct_answer: CorrectAnswerInput,
    pub allow_multiple_answers: Option<bool>,
    pub points: f64,
    pub position: Option<i32>,
}

/// 更新题目请求
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "exam.ts")]
pub struct UpdateQuestionRequest {
    pub question_type: Option<QuestionType>,
    pub text: Option<String>,
    pub options: Option<Vec<String>>,
    pub correct_answer: Option<CorrectAnswerInput>,
    pub allow_multiple_answers: Option<bool>,
    pub points: Option<f64>,
    pub position: Option<i32>,
}

/// 写入存储的题目数据（已校验）
#[derive(Debug, Clone)]
pub struct QuestionDraft {
    pub question_type: QuestionType,
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: CorrectAnswer,
    pub allow_multiple_answers: bool,
    pub points: f64,
    pub position: i32,
}

impl CreateQuestionRequest {
    /// 校验并转换为存储数据
    pub fn into_draft(self) -> Result<QuestionDraft> {
        QuestionDraft {
            question_type: self.question_type,
            text: self.text,
            options: self.options.unwrap_or_default(),
            correct_answer: self.correct_answer.into_correct_answer(),
            allow_multiple_answers: self.allow_multiple_answers.unwrap_or(false),
            points: self.points,
            position: self.position.unwrap_or(0),
        }
        .validated()
    }
}

impl UpdateQuestionRequest {
    /// 在现有题目上应用修改，并对结果整体校验
    pub fn apply_to(self, existing: &Question) -> Result<QuestionDraft> {
        QuestionDraft {
            question_type: self
                .question_type
                .unwrap_or_else(|| existing.question_type.clone()),
            text: self.text.unwrap_or_else(|| existing.text.clone()),
            options: self.options.unwrap_or_else(|| existing.options.clone()),
            correct_answer: self
                .correct_answer
                .map(CorrectAnswerInput::into_correct_answer)
                .unwrap_or_else(|| existing.correct_answer.clone()),
            allow_multiple_answers: self
                .allow_multiple_answers
                .unwrap_or(existing.allow_multiple_answers),
            points: self.points.unwrap_or(existing.points),
            position: self.position.unwrap_or(existing.position),
        }
        .validated()
    }
}

impl QuestionDraft {
    /// 校验题目
    ///
    /// - 题干不能为空，分值必须为正数
    /// - 选择题至少两个选项，正确答案必须出现在选项中；单选题只能有一个正确答案
    /// - 填空题不能带选项
    /// - 至少有一个非空的正确答案
    pub fn validated(mut self) -> Result<Self> {
        self.text = self.text.trim().to_string();
        if self.text.is_empty() {
            return Err(ExamSystemError::validation("题干不能为空"));
        }
        if !self.points.is_finite() || self.points <= 0.0 {
            return Err(ExamSystemError::validation("分值必须大于 0"));
        }

        self.options = self
            .options
            .iter()
            .map(|o| o.trim().to_string())
            .collect();
        if self.options.iter().any(|o| o.is_empty()) {
            return Err(ExamSystemError::validation("选项不能为空"));
        }

        if !self.correct_answer.has_any() {
            return Err(ExamSystemError::validation("正确答案不能为空"));
        }

        match self.question_type {
            QuestionType::MultipleChoice => {
                if self.options.len() < 2 {
                    return Err(ExamSystemError::validation("选择题至少需要两个选项"));
                }
                let values = self.correct_answer.values();
                if let Some(missing) = values
                    .iter()
                    .find(|v| !self.options.iter().any(|o| o == v.trim()))
                {
                    return Err(ExamSystemError::validation(format!(
                        "正确答案 {missing} 不在选项中"
                    )));
                }
                if values.len() > 1 && !self.allow_multiple_answers {
                    return Err(ExamSystemError::validation(
                        "单选题只能有一个正确答案",
                    ));
                }
            }
            QuestionType::Identification => {
                if !self.options.is_empty() {
                    return Err(ExamSystemError::validation("填空题不能设置选项"));
                }
            }
            QuestionType::Unknown => {
                return Err(ExamSystemError::validation("不支持的题目类型"));
            }
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_answer_input_variants() {
        let list: CreateQuestionRequest = serde_json::from_value(serde_json::json!({
            "question_type": "multiple_choice",
            "text": "Pick",
            "options": ["a", "b"],
            "correct_answer": ["a"],
            "points": 2.0
        }))
        .unwrap();
        assert_eq!(
            list.correct_answer.into_correct_answer(),
            CorrectAnswer::Multiple(vec!["a".into()])
        );

        let legacy = CorrectAnswerInput::Text(r#"{"x","y"}"#.into());
        assert_eq!(
            legacy.into_correct_answer(),
            CorrectAnswer::Multiple(vec!["x".into(), "y".into()])
        );

        let single = CorrectAnswerInput::Text("Paris".into());
        assert_eq!(
            single.into_correct_answer(),
            CorrectAnswer::Single("Paris".into())
        );
    }

    fn mcq(options: &[&str], correct: CorrectAnswer, multiple: bool) -> QuestionDraft {
        QuestionDraft {
            question_type: QuestionType::MultipleChoice,
            text: "Pick".into(),
            options: options.iter().map(|s| s.to_string()).collect(),
            correct_answer: correct,
            allow_multiple_answers: multiple,
            points: 1.0,
            position: 0,
        }
    }

    #[test]
    fn test_valid_multiple_choice() {
        let draft = mcq(
            &["tet", "23", "3", "4"],
            CorrectAnswer::Multiple(vec!["tet".into(), "23".into(), "3".into()]),
            true,
        );
        assert!(draft.validated().is_ok());
    }

    #[test]
    fn test_multiple_choice_rules() {
        let few_options = mcq(&["a"], CorrectAnswer::Single("a".into()), false);
        assert!(few_options.validated().is_err());

        let not_an_option = mcq(&["a", "b"], CorrectAnswer::Single("c".into()), false);
        assert!(not_an_option.validated().is_err());

        let single_with_many =
            mcq(&["a", "b"], CorrectAnswer::Multiple(vec!["a".into(), "b".into()]), false);
        let err = single_with_many.validated().unwrap_err();
        assert_eq!(err.code(), "E007");
    }

    #[test]
    fn test_identification_rules() {
        let mut draft = QuestionDraft {
            question_type: QuestionType::Identification,
            text: "  Capital of France?  ".into(),
            options: vec![],
            correct_answer: CorrectAnswer::Single("Paris".into()),
            allow_multiple_answers: false,
            points: 2.0,
            position: 1,
        };
        let ok = draft.clone().validated().unwrap();
        assert_eq!(ok.text, "Capital of France?");

        draft.options = vec!["x".into()];
        assert!(draft.clone().validated().is_err());

        draft.options = vec![];
        draft.points = 0.0;
        assert!(draft.clone().validated().is_err());

        draft.points = 1.0;
        draft.correct_answer = CorrectAnswer::Multiple(vec![]);
        assert!(draft.validated().is_err());
    }

    #[test]
    fn test_unknown_type_rejected() {
        let draft = QuestionDraft {
            question_type: QuestionType::Unknown,
            text: "q".into(),
            options: vec![],
            correct_answer: CorrectAnswer::Single("a".into()),
            allow_multiple_answers: false,
            points: 1.0,
            position: 0,
        };
        assert!(draft.validated().is_err());
    }
}
