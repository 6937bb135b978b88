use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ExamSubmissionService;
use crate::models::ApiResponse;
use crate::models::exam_submissions::requests::RecheckRequestBody;
use crate::models::users::entities::User;
use crate::services::error_response;

pub async fn get_my_result(
    service: &ExamSubmissionService,
    request: &HttpRequest,
    user: &User,
    exam_id: i64,
) -> ActixResult<HttpResponse> {
    match service.workflow(request).my_result(exam_id, user).await {
        Ok(result) => Ok(HttpResponse::Ok().json(ApiResponse::success(result, "查询成功"))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn request_recheck(
    service: &ExamSubmissionService,
    request: &HttpRequest,
    user: &User,
    exam_id: i64,
    req: RecheckRequestBody,
) -> ActixResult<HttpResponse> {
    match service
        .workflow(request)
        .request_recheck(exam_id, user, &req.reason)
        .await
    {
        Ok(recheck) => Ok(HttpResponse::Created().json(ApiResponse::success(recheck, "复查申请已提交"))),
        Err(e) => Ok(error_response(&e)),
    }
}
