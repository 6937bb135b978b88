//! 请求参数解析错误处理
//!
//! 把 actix 的 JSON / Query 解析错误转换为统一的 ApiResponse 格式。

use actix_web::{
    HttpRequest, HttpResponse, error,
    error::{JsonPayloadError, QueryPayloadError},
};
use tracing::debug;

use crate::models::{ApiResponse, ErrorCode};

/// JSON 请求体解析错误
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> error::Error {
    debug!("JSON payload error on {}: {}", req.path(), err);
    let message = match &err {
        JsonPayloadError::ContentType => "请求头 Content-Type 必须为 application/json".to_string(),
        JsonPayloadError::Deserialize(e) => format!("请求体格式错误: {e}"),
        _ => format!("请求体无效: {err}"),
    };
    let response = HttpResponse::BadRequest()
        .json(ApiResponse::error_empty(ErrorCode::BadRequest, message));
    error::InternalError::from_response(err, response).into()
}

/// Query 参数解析错误
pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> error::Error {
    debug!("Query payload error on {}: {}", req.path(), err);
    let response = HttpResponse::BadRequest().json(ApiResponse::error_empty(
        ErrorCode::BadRequest,
        format!("查询参数错误: {err}"),
    ));
    error::InternalError::from_response(err, response).into()
}
