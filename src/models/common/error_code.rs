/// 业务错误码
///
/// 0 表示成功；1xxx 为通用错误；2xxx 考试；3xxx 提交与复查；4xxx 通知；5xxx 服务端错误。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    ValidationFailed = 1022,
    RateLimitExceeded = 1029,

    ExamNotFound = 2000,
    ExamAlreadyPublished = 2002,
    QuestionNotFound = 2003,

    AlreadySubmitted = 3001,
    PastDue = 3002,
    InvalidStatusTransition = 3003,

    NotificationNotFound = 4000,

    InternalServerError = 5000,
}
