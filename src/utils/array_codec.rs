//! 数组文本编解码
//!
//! 旧数据中的答案列表以 `{"a","b","c"}` 形式的文本保存（与 PostgreSQL 数组字面量一致），
//! 这里把它还原为字符串列表。解码永不失败，无法识别的输入返回空列表。

use serde_json::Value;

/// 解码文本形式的数组
///
/// - `{...}`：去掉花括号后按逗号切分，元素去空白并去掉一层双引号；引号内的逗号不切分
/// - JSON 数组文本：按 JSON 解析
/// - 其他非空文本：作为单个元素
/// - 空文本、`{}`、花括号不配对：空列表
pub fn decode(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    if trimmed.starts_with('[')
        && let Ok(value @ Value::Array(_)) = serde_json::from_str::<Value>(trimmed)
    {
        return decode_value(&value);
    }

    let (opens, closes) = count_unquoted_braces(trimmed);
    if opens == 0 && closes == 0 {
        return vec![strip_quotes(trimmed)];
    }

    if opens != closes || !trimmed.starts_with('{') || !trimmed.ends_with('}') {
        return Vec::new();
    }

    let inner = &trimmed[1..trimmed.len() - 1];
    if inner.trim().is_empty() {
        return Vec::new();
    }

    split_top_level(inner)
        .into_iter()
        .map(|item| strip_quotes(item.trim()))
        .collect()
}

/// 解码 JSON 值
///
/// 数组原样转换为字符串列表，字符串按文本规则解码。
pub fn decode_value(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        Value::String(s) => decode(s),
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}

/// 统计引号外的花括号数量
fn count_unquoted_braces(s: &str) -> (usize, usize) {
    let mut opens = 0;
    let mut closes = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for c in s.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            '{' if !in_quotes => opens += 1,
            '}' if !in_quotes => closes += 1,
            _ => {}
        }
    }

    (opens, closes)
}

/// 在最外层按逗号切分，跳过引号内与嵌套花括号内的逗号
fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            '{' if !in_quotes => depth += 1,
            '}' if !in_quotes => depth = depth.saturating_sub(1),
            ',' if !in_quotes && depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);

    parts
}

/// 去掉一层包裹的双引号，并还原引号内的 `\"` 与 `\\`
fn strip_quotes(s: &str) -> String {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        let inner = &s[1..s.len() - 1];
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            } else {
                out.push(c);
            }
        }
        out
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_quoted_elements() {
        assert_eq!(
            decode(r#"{"tet","23","3"}"#),
            strings(&["tet", "23", "3"])
        );
        assert_eq!(
            decode(r#"{"sdasd1","sdasd2","sdasd3"}"#),
            strings(&["sdasd1", "sdasd2", "sdasd3"])
        );
    }

    #[test]
    fn test_unquoted_and_whitespace() {
        assert_eq!(decode("{a, b ,c}"), strings(&["a", "b", "c"]));
        assert_eq!(decode(r#"  { "x" , y }  "#), strings(&["x", "y"]));
    }

    #[test]
    fn test_comma_inside_quotes_is_kept() {
        assert_eq!(
            decode(r#"{"Manila, Philippines","Cebu"}"#),
            strings(&["Manila, Philippines", "Cebu"])
        );
    }

    #[test]
    fn test_escaped_quote() {
        assert_eq!(decode(r#"{"say \"hi\"",b}"#), strings(&[r#"say "hi""#, "b"]));
    }

    #[test]
    fn test_empty_inputs() {
        assert!(decode("{}").is_empty());
        assert!(decode("{  }").is_empty());
        assert!(decode("").is_empty());
        assert!(decode("   ").is_empty());
    }

    #[test]
    fn test_unbalanced_braces() {
        assert!(decode(r#"{"a","b""#).is_empty());
        assert!(decode(r#""a","b"}"#).is_empty());
        assert!(decode("{a}}").is_empty());
        assert!(decode("a{b}").is_empty());
    }

    #[test]
    fn test_plain_string() {
        assert_eq!(decode("Paris"), strings(&["Paris"]));
        assert_eq!(decode(r#""Paris""#), strings(&["Paris"]));
    }

    #[test]
    fn test_json_array_text() {
        assert_eq!(decode(r#"["a", "b"]"#), strings(&["a", "b"]));
        assert_eq!(decode("[1, 2]"), strings(&["1", "2"]));
    }

    #[test]
    fn test_decode_value() {
        assert_eq!(decode_value(&json!(["a", "b"])), strings(&["a", "b"]));
        assert_eq!(decode_value(&json!("{x,y}")), strings(&["x", "y"]));
        assert!(decode_value(&json!(null)).is_empty());
        assert_eq!(decode_value(&json!(3)), strings(&["3"]));
    }
}
