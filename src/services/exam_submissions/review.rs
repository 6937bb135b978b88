//! 考试负责人查看与处理提交

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ExamSubmissionService;
use crate::models::ApiResponse;
use crate::models::exam_submissions::{
    requests::{RecheckGradesRequest, UpdateSubmissionStatusRequest},
    responses::{GradeHistoryResponse, RecheckGradesResponse},
};
use crate::models::users::entities::User;
use crate::services::error_response;

pub async fn get_submission(
    service: &ExamSubmissionService,
    request: &HttpRequest,
    user: &User,
    submission_id: i64,
) -> ActixResult<HttpResponse> {
    match service
        .workflow(request)
        .submission_detail(submission_id, user)
        .await
    {
        Ok(detail) => Ok(HttpResponse::Ok().json(ApiResponse::success(detail, "查询成功"))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn recheck_grades(
    service: &ExamSubmissionService,
    request: &HttpRequest,
    user: &User,
    submission_id: i64,
    req: RecheckGradesRequest,
) -> ActixResult<HttpResponse> {
    match service
        .workflow(request)
        .recheck_grades(submission_id, user, req)
        .await
    {
        Ok((submission, log_entry)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            RecheckGradesResponse {
                submission,
                log_entry,
            },
            "成绩已更新",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn update_status(
    service: &ExamSubmissionService,
    request: &HttpRequest,
    user: &User,
    submission_id: i64,
    req: UpdateSubmissionStatusRequest,
) -> ActixResult<HttpResponse> {
    match service
        .workflow(request)
        .update_status(submission_id, user, req.status)
        .await
    {
        Ok(submission) => Ok(HttpResponse::Ok().json(ApiResponse::success(submission, "状态已更新"))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn get_history(
    service: &ExamSubmissionService,
    request: &HttpRequest,
    user: &User,
    submission_id: i64,
) -> ActixResult<HttpResponse> {
    match service.workflow(request).history(submission_id, user).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            GradeHistoryResponse { items },
            "查询成功",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}
