//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_examsystem_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum ExamSystemError {
            $($variant(String),)*
        }

        impl ExamSystemError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(ExamSystemError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(ExamSystemError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(ExamSystemError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl ExamSystemError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        ExamSystemError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_examsystem_errors! {
    CacheConnection("E001", "Cache Connection Error"),
    DatabaseConfig("E003", "Database Configuration Error"),
    DatabaseConnection("E004", "Database Connection Error"),
    DatabaseOperation("E005", "Database Operation Error"),
    Io("E006", "IO Error"),
    Validation("E007", "Validation Error"),
    NotFound("E008", "Resource Not Found"),
    Serialization("E009", "Serialization Error"),
    DateParse("E011", "Date Parse Error"),
    Authentication("E012", "Authentication Error"),
    Authorization("E013", "Authorization Error"),
    AlreadySubmitted("E101", "Already Submitted"),
    PastDue("E102", "Past Due"),
    InvalidTransition("E103", "Invalid State Transition"),
    Conflict("E104", "Conflict"),
}

impl ExamSystemError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// 是否为内部错误（数据库、序列化等，不应把详情暴露给客户端）
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            ExamSystemError::CacheConnection(_)
                | ExamSystemError::DatabaseConfig(_)
                | ExamSystemError::DatabaseConnection(_)
                | ExamSystemError::DatabaseOperation(_)
                | ExamSystemError::Io(_)
                | ExamSystemError::Serialization(_)
                | ExamSystemError::DateParse(_)
        )
    }
}

impl fmt::Display for ExamSystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ExamSystemError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for ExamSystemError {
    fn from(err: sea_orm::DbErr) -> Self {
        ExamSystemError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for ExamSystemError {
    fn from(err: std::io::Error) -> Self {
        ExamSystemError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ExamSystemError {
    fn from(err: serde_json::Error) -> Self {
        ExamSystemError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for ExamSystemError {
    fn from(err: chrono::ParseError) -> Self {
        ExamSystemError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ExamSystemError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ExamSystemError::cache_connection("test").code(), "E001");
        assert_eq!(ExamSystemError::database_config("test").code(), "E003");
        assert_eq!(ExamSystemError::validation("test").code(), "E007");
        assert_eq!(ExamSystemError::authentication("test").code(), "E012");
        assert_eq!(ExamSystemError::already_submitted("test").code(), "E101");
        assert_eq!(ExamSystemError::past_due("test").code(), "E102");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            ExamSystemError::invalid_transition("test").error_type(),
            "Invalid State Transition"
        );
        assert_eq!(
            ExamSystemError::validation("test").error_type(),
            "Validation Error"
        );
    }

    #[test]
    fn test_error_message() {
        let err = ExamSystemError::already_submitted("Exam already submitted");
        assert_eq!(err.message(), "Exam already submitted");
    }

    #[test]
    fn test_internal_classification() {
        assert!(ExamSystemError::database_operation("boom").is_internal());
        assert!(!ExamSystemError::past_due("late").is_internal());
        assert!(!ExamSystemError::conflict("dup").is_internal());
    }

    #[test]
    fn test_db_err_conversion() {
        let err: ExamSystemError = sea_orm::DbErr::Custom("disk full".to_string()).into();
        assert_eq!(err.code(), "E005");
        assert!(err.message().contains("disk full"));
    }
}
