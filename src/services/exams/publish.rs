use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{ExamService, load_managed_exam};
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;

pub async fn publish_exam(
    service: &ExamService,
    request: &HttpRequest,
    user: &User,
    exam_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let exam = match load_managed_exam(&storage, user, exam_id).await {
        Ok(exam) => exam,
        Err(resp) => return Ok(resp),
    };
    if exam.is_published() {
        return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::ExamAlreadyPublished,
            "考试已发布",
        )));
    }

    match storage.list_exam_questions(exam_id).await {
        Ok(questions) if questions.is_empty() => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::ValidationFailed,
                "考试至少需要一道题目",
            )));
        }
        Ok(_) => {}
        Err(e) => return Ok(error_response(&e)),
    }

    // 条件更新：只有草稿能被发布，并发发布时只有一个成功
    match storage.publish_exam(exam_id).await {
        Ok(true) => {}
        Ok(false) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::ExamAlreadyPublished,
                "考试已发布",
            )));
        }
        Err(e) => return Ok(error_response(&e)),
    }

    info!("Exam {} published by user {}", exam_id, user.id);

    match storage.get_exam_by_id(exam_id).await {
        Ok(Some(exam)) => Ok(HttpResponse::Ok().json(ApiResponse::success(exam, "考试已发布"))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ExamNotFound,
            "考试不存在",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}
