use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ExamSubmissionService;
use crate::models::ApiResponse;
use crate::models::users::entities::User;
use crate::services::error_response;

pub async fn submit_exam(
    service: &ExamSubmissionService,
    request: &HttpRequest,
    user: &User,
    submission_id: i64,
) -> ActixResult<HttpResponse> {
    match service.workflow(request).submit(submission_id, user).await {
        Ok(submission) => Ok(HttpResponse::Ok().json(ApiResponse::success(submission, "交卷成功"))),
        Err(e) => Ok(error_response(&e)),
    }
}
