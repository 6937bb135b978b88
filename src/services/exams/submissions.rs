use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ExamService, load_managed_exam};
use crate::models::ApiResponse;
use crate::models::exam_submissions::requests::SubmissionListQuery;
use crate::models::users::entities::User;
use crate::services::error_response;

pub async fn list_submissions(
    service: &ExamService,
    request: &HttpRequest,
    user: &User,
    exam_id: i64,
    query: SubmissionListQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    if let Err(resp) = load_managed_exam(&storage, user, exam_id).await {
        return Ok(resp);
    }

    match storage
        .list_exam_submissions_with_pagination(exam_id, query)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(response, "查询成功"))),
        Err(e) => Ok(error_response(&e)),
    }
}
