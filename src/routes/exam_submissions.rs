use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequireJWT};
use crate::models::exam_submissions::requests::{
    RecheckGradesRequest, RecheckRequestBody, SaveAnswerRequest, UpdateSubmissionStatusRequest,
};
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::ExamSubmissionService;

// 懒加载的全局 ExamSubmissionService 实例
static SUBMISSION_SERVICE: Lazy<ExamSubmissionService> =
    Lazy::new(ExamSubmissionService::new_lazy);

fn missing_user() -> HttpResponse {
    HttpResponse::Unauthorized().json(ApiResponse::error_empty(
        ErrorCode::Unauthorized,
        "无法获取用户信息",
    ))
}

// 开始考试
pub async fn start_exam(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(&req) else {
        return Ok(missing_user());
    };
    SUBMISSION_SERVICE
        .start_exam(&req, &user, path.into_inner())
        .await
}

// 自动保存答案
pub async fn save_answer(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<SaveAnswerRequest>,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(&req) else {
        return Ok(missing_user());
    };
    SUBMISSION_SERVICE
        .save_answer(&req, &user, path.into_inner(), body.into_inner())
        .await
}

// 交卷
pub async fn submit_exam(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(&req) else {
        return Ok(missing_user());
    };
    SUBMISSION_SERVICE
        .submit_exam(&req, &user, path.into_inner())
        .await
}

// 查看自己的考试结果
pub async fn get_my_result(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(&req) else {
        return Ok(missing_user());
    };
    SUBMISSION_SERVICE
        .get_my_result(&req, &user, path.into_inner())
        .await
}

// 申请复查
pub async fn request_recheck(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<RecheckRequestBody>,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(&req) else {
        return Ok(missing_user());
    };
    SUBMISSION_SERVICE
        .request_recheck(&req, &user, path.into_inner(), body.into_inner())
        .await
}

// 提交详情
pub async fn get_submission(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(&req) else {
        return Ok(missing_user());
    };
    SUBMISSION_SERVICE
        .get_submission(&req, &user, path.into_inner())
        .await
}

// 人工改分
pub async fn recheck_grades(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<RecheckGradesRequest>,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(&req) else {
        return Ok(missing_user());
    };
    SUBMISSION_SERVICE
        .recheck_grades(&req, &user, path.into_inner(), body.into_inner())
        .await
}

// 推进复查状态
pub async fn update_status(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<UpdateSubmissionStatusRequest>,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(&req) else {
        return Ok(missing_user());
    };
    SUBMISSION_SERVICE
        .update_status(&req, &user, path.into_inner(), body.into_inner())
        .await
}

// 成绩变更历史
pub async fn get_history(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(&req) else {
        return Ok(missing_user());
    };
    SUBMISSION_SERVICE
        .get_history(&req, &user, path.into_inner())
        .await
}

// 配置路由
pub fn configure_exam_submissions_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/exam-submissions")
            .wrap(middlewares::RequireJWT)
            .service(web::resource("/start/{exam_id}").route(web::post().to(start_exam)))
            // 自动保存频率受限
            .service(
                web::resource("/answer/{submission_id}")
                    .wrap(middlewares::RateLimit::answer_autosave())
                    .route(web::post().to(save_answer)),
            )
            .service(web::resource("/submit/{submission_id}").route(web::post().to(submit_exam)))
            .service(web::resource("/results/{exam_id}").route(web::get().to(get_my_result)))
            .service(
                web::resource("/results/{exam_id}/recheck-request")
                    .route(web::post().to(request_recheck)),
            )
            // 学生可以查看自己的提交，业务层校验
            .service(web::resource("/submissions/{id}").route(web::get().to(get_submission)))
            .service(
                web::resource("/submissions/{id}/recheck")
                    .wrap(middlewares::RequireRole::new_any(UserRole::professor_roles()))
                    .route(web::put().to(recheck_grades)),
            )
            .service(
                web::resource("/submissions/{id}/status")
                    .wrap(middlewares::RequireRole::new_any(UserRole::professor_roles()))
                    .route(web::put().to(update_status)),
            )
            .service(
                web::resource("/submissions/{id}/history")
                    .wrap(middlewares::RequireRole::new_any(UserRole::professor_roles()))
                    .route(web::get().to(get_history)),
            ),
    );
}
