pub mod exam_submissions;
pub mod exams;
pub mod grading;
pub mod notifications;
pub mod websocket;

pub use exam_submissions::ExamSubmissionService;
pub use exams::ExamService;
pub use notifications::NotificationService;

use actix_web::HttpResponse;
use tracing::error;

use crate::errors::ExamSystemError;
use crate::models::{ApiResponse, ErrorCode};

/// 把业务错误映射为 HTTP 响应
///
/// 内部错误只记录日志，不把详情返回给客户端。
pub(crate) fn error_response(err: &ExamSystemError) -> HttpResponse {
    if err.is_internal() {
        error!("{}", err.format_simple());
        return HttpResponse::InternalServerError().json(ApiResponse::error_empty(
            ErrorCode::InternalServerError,
            "服务器内部错误",
        ));
    }

    let message = err.message();
    match err {
        ExamSystemError::Validation(_) => HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, message)),
        ExamSystemError::NotFound(_) => HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::NotFound, message)),
        ExamSystemError::Authentication(_) => HttpResponse::Unauthorized()
            .json(ApiResponse::error_empty(ErrorCode::Unauthorized, message)),
        ExamSystemError::Authorization(_) => HttpResponse::Forbidden()
            .json(ApiResponse::error_empty(ErrorCode::Forbidden, message)),
        ExamSystemError::AlreadySubmitted(_) => HttpResponse::Conflict()
            .json(ApiResponse::error_empty(ErrorCode::AlreadySubmitted, message)),
        ExamSystemError::PastDue(_) => HttpResponse::Forbidden()
            .json(ApiResponse::error_empty(ErrorCode::PastDue, message)),
        ExamSystemError::InvalidTransition(_) => HttpResponse::Conflict().json(
            ApiResponse::error_empty(ErrorCode::InvalidStatusTransition, message),
        ),
        ExamSystemError::Conflict(_) => HttpResponse::Conflict()
            .json(ApiResponse::error_empty(ErrorCode::Conflict, message)),
        _ => HttpResponse::InternalServerError().json(ApiResponse::error_empty(
            ErrorCode::InternalServerError,
            "服务器内部错误",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (ExamSystemError::validation("x"), StatusCode::BAD_REQUEST),
            (ExamSystemError::not_found("x"), StatusCode::NOT_FOUND),
            (ExamSystemError::authentication("x"), StatusCode::UNAUTHORIZED),
            (ExamSystemError::authorization("x"), StatusCode::FORBIDDEN),
            (ExamSystemError::already_submitted("x"), StatusCode::CONFLICT),
            (ExamSystemError::past_due("x"), StatusCode::FORBIDDEN),
            (ExamSystemError::invalid_transition("x"), StatusCode::CONFLICT),
            (ExamSystemError::conflict("x"), StatusCode::CONFLICT),
            (
                ExamSystemError::database_operation("x"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(error_response(&err).status(), status, "{err}");
        }
    }
}
