use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ExamService;
use crate::models::exams::requests::CreateExamRequest;
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;

pub async fn create_exam(
    service: &ExamService,
    request: &HttpRequest,
    user: &User,
    mut req: CreateExamRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    req.title = req.title.trim().to_string();
    if req.title.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ValidationFailed,
            "考试标题不能为空",
        )));
    }

    match storage.create_exam(user.id, req).await {
        Ok(exam) => {
            info!("User {} created exam {}", user.id, exam.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(exam, "考试创建成功")))
        }
        Err(e) => Ok(error_response(&e)),
    }
}
