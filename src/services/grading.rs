//! 自动评分
//!
//! 交卷时对每道题调用 [`grade`]。评分永不失败：未知题型、缺答、空答案一律判为错误、0 分。
//! 不给部分分，答对得满分，答错得 0 分；人工复查可以再改分。

use crate::models::{
    exam_submissions::entities::{GradeOutcome, SubmittedAnswer},
    exams::entities::{Question, QuestionType},
};

/// 对单道题评分
pub fn grade(question: &Question, answer: Option<&SubmittedAnswer>) -> GradeOutcome {
    let Some(answer) = answer else {
        return GradeOutcome::INCORRECT;
    };

    let is_correct = match question.question_type {
        QuestionType::Identification => grade_identification(question, answer),
        QuestionType::MultipleChoice => grade_multiple_choice(question, answer),
        QuestionType::Unknown => false,
    };

    if is_correct {
        GradeOutcome {
            is_correct: true,
            points_earned: question.points.max(0.0),
        }
    } else {
        GradeOutcome::INCORRECT
    }
}

fn normalize_text(s: &str) -> String {
    s.trim().to_lowercase()
}

/// 填空题：忽略大小写与首尾空白，命中任一非空候选答案即正确
fn grade_identification(question: &Question, answer: &SubmittedAnswer) -> bool {
    let submitted = normalize_text(&answer.as_text());
    if submitted.is_empty() {
        return false;
    }

    question
        .correct_answer
        .values()
        .iter()
        .map(|candidate| normalize_text(candidate))
        .any(|candidate| !candidate.is_empty() && candidate == submitted)
}

/// 把提交的选择题答案规整为条目列表
fn selected_entries(answer: &SubmittedAnswer) -> Vec<String> {
    let raw: Vec<&str> = match answer {
        SubmittedAnswer::Choices(choices) => choices.iter().map(String::as_str).collect(),
        SubmittedAnswer::Text(text) => text.split(',').collect(),
    };

    raw.into_iter()
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// 条目解析为选项文本：整数按下标取选项，越界返回 None
fn resolve_entry<'a>(entry: &'a str, options: &'a [String]) -> Option<&'a str> {
    if !options.is_empty()
        && let Ok(index) = entry.parse::<i64>()
    {
        return usize::try_from(index)
            .ok()
            .and_then(|i| options.get(i))
            .map(|option| option.trim());
    }
    Some(entry)
}

/// 选择题
///
/// - 多个正确选项：至少命中一个，且所有条目都必须是正确选项
/// - 单个正确选项：只能提交一个条目，且必须命中
/// - 没有正确选项：判错
fn grade_multiple_choice(question: &Question, answer: &SubmittedAnswer) -> bool {
    let correct: Vec<String> = question
        .correct_answer
        .values()
        .iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();

    if correct.is_empty() {
        return false;
    }

    let entries = selected_entries(answer);
    if entries.is_empty() {
        return false;
    }

    let matches = |entry: &String| {
        resolve_entry(entry, &question.options)
            .is_some_and(|resolved| correct.iter().any(|c| c == resolved))
    };

    if correct.len() > 1 {
        entries.iter().all(matches)
    } else {
        entries.len() == 1 && matches(&entries[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::exams::entities::CorrectAnswer;

    fn question(
        question_type: QuestionType,
        options: &[&str],
        correct: CorrectAnswer,
        points: f64,
    ) -> Question {
        let now = chrono::Utc::now();
        Question {
            id: 1,
            exam_id: 1,
            question_type,
            text: "q".to_string(),
            options: options.iter().map(|s| s.to_string()).collect(),
            correct_answer: correct,
            allow_multiple_answers: false,
            points,
            position: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn text(s: &str) -> SubmittedAnswer {
        SubmittedAnswer::Text(s.to_string())
    }

    fn choices(items: &[&str]) -> SubmittedAnswer {
        SubmittedAnswer::Choices(items.iter().map(|s| s.to_string()).collect())
    }

    fn correct_outcome(points: f64) -> GradeOutcome {
        GradeOutcome {
            is_correct: true,
            points_earned: points,
        }
    }

    #[test]
    fn test_identification_case_insensitive() {
        let q = question(
            QuestionType::Identification,
            &[],
            CorrectAnswer::Single("Answer".into()),
            2.0,
        );
        assert_eq!(grade(&q, Some(&text("ANSWER"))), grade(&q, Some(&text("answer"))));
        assert_eq!(grade(&q, Some(&text("  answer "))), correct_outcome(2.0));
        assert_eq!(grade(&q, Some(&text("answers"))), GradeOutcome::INCORRECT);
    }

    #[test]
    fn test_identification_legacy_candidates() {
        let q = question(
            QuestionType::Identification,
            &[],
            CorrectAnswer::from_storage(r#"{"sdasd1","sdasd2","sdasd3"}"#),
            1.0,
        );
        assert_eq!(grade(&q, Some(&text("sdasd3"))), correct_outcome(1.0));
        assert_eq!(grade(&q, Some(&text("SDASD1"))), correct_outcome(1.0));
        assert_eq!(grade(&q, Some(&text("sdasd4"))), GradeOutcome::INCORRECT);
    }

    #[test]
    fn test_identification_empty_inputs() {
        let q = question(
            QuestionType::Identification,
            &[],
            CorrectAnswer::Multiple(vec!["".into(), "x".into()]),
            1.0,
        );
        assert_eq!(grade(&q, Some(&text(""))), GradeOutcome::INCORRECT);
        assert_eq!(grade(&q, Some(&text("   "))), GradeOutcome::INCORRECT);
        assert_eq!(grade(&q, None), GradeOutcome::INCORRECT);
    }

    #[test]
    fn test_multiple_choice_multi_answer_example() {
        let q = question(
            QuestionType::MultipleChoice,
            &["tet", "23", "3", "4"],
            CorrectAnswer::from_storage(r#"{"tet","23","3"}"#),
            1.0,
        );
        // "0" 选中 "tet"
        assert_eq!(grade(&q, Some(&text("0"))), correct_outcome(1.0));
        // "3" 选中 "4"
        assert_eq!(grade(&q, Some(&text("3"))), GradeOutcome::INCORRECT);
    }

    #[test]
    fn test_multiple_choice_multi_answer_subsets() {
        let q = question(
            QuestionType::MultipleChoice,
            &["a", "b", "c", "d"],
            CorrectAnswer::Multiple(vec!["a".into(), "b".into(), "c".into()]),
            3.0,
        );
        // 正确选项的真子集
        assert_eq!(grade(&q, Some(&choices(&["0", "2"]))), correct_outcome(3.0));
        assert_eq!(grade(&q, Some(&text("0,1"))), correct_outcome(3.0));
        // 全部正确选项
        assert_eq!(grade(&q, Some(&text("0, 1, 2"))), correct_outcome(3.0));
        // 正确选项外加一个错误选项
        assert_eq!(
            grade(&q, Some(&choices(&["0", "1", "2", "3"]))),
            GradeOutcome::INCORRECT
        );
        // 只有错误选项
        assert_eq!(grade(&q, Some(&choices(&["3"]))), GradeOutcome::INCORRECT);
    }

    #[test]
    fn test_multiple_choice_single_answer() {
        let q = question(
            QuestionType::MultipleChoice,
            &["red", "green", "blue"],
            CorrectAnswer::Single("green".into()),
            2.0,
        );
        assert_eq!(grade(&q, Some(&text("1"))), correct_outcome(2.0));
        assert_eq!(grade(&q, Some(&text("green"))), correct_outcome(2.0));
        assert_eq!(grade(&q, Some(&text("0"))), GradeOutcome::INCORRECT);
        assert_eq!(grade(&q, Some(&text("2"))), GradeOutcome::INCORRECT);
        // 两个条目
        assert_eq!(grade(&q, Some(&choices(&["1", "0"]))), GradeOutcome::INCORRECT);
        assert_eq!(grade(&q, Some(&choices(&["1", "1"]))), GradeOutcome::INCORRECT);
    }

    #[test]
    fn test_multiple_choice_out_of_range_index() {
        let q = question(
            QuestionType::MultipleChoice,
            &["a", "b"],
            CorrectAnswer::Multiple(vec!["a".into(), "b".into()]),
            1.0,
        );
        assert_eq!(grade(&q, Some(&text("5"))), GradeOutcome::INCORRECT);
        assert_eq!(grade(&q, Some(&text("-1"))), GradeOutcome::INCORRECT);
        assert_eq!(grade(&q, Some(&choices(&["0", "9"]))), GradeOutcome::INCORRECT);
    }

    #[test]
    fn test_multiple_choice_empty_correct_set() {
        let q = question(
            QuestionType::MultipleChoice,
            &["a", "b"],
            CorrectAnswer::from_storage(r#"{"a","b""#),
            1.0,
        );
        assert_eq!(grade(&q, Some(&text("0"))), GradeOutcome::INCORRECT);
    }

    #[test]
    fn test_multiple_choice_empty_submission() {
        let q = question(
            QuestionType::MultipleChoice,
            &["a", "b"],
            CorrectAnswer::Single("a".into()),
            1.0,
        );
        assert_eq!(grade(&q, Some(&text(""))), GradeOutcome::INCORRECT);
        assert_eq!(grade(&q, Some(&choices(&[]))), GradeOutcome::INCORRECT);
        assert_eq!(grade(&q, None), GradeOutcome::INCORRECT);
    }

    #[test]
    fn test_unknown_type_is_incorrect() {
        let q = question(
            QuestionType::Unknown,
            &[],
            CorrectAnswer::Single("x".into()),
            5.0,
        );
        assert_eq!(grade(&q, Some(&text("x"))), GradeOutcome::INCORRECT);
    }
}
