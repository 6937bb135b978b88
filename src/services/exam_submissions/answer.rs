use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ExamSubmissionService;
use crate::models::ApiResponse;
use crate::models::exam_submissions::requests::SaveAnswerRequest;
use crate::models::users::entities::User;
use crate::services::error_response;

pub async fn save_answer(
    service: &ExamSubmissionService,
    request: &HttpRequest,
    user: &User,
    submission_id: i64,
    req: SaveAnswerRequest,
) -> ActixResult<HttpResponse> {
    match service
        .workflow(request)
        .save_answer(submission_id, user, req)
        .await
    {
        Ok(answer) => Ok(HttpResponse::Ok().json(ApiResponse::success(answer, "答案已保存"))),
        Err(e) => Ok(error_response(&e)),
    }
}
