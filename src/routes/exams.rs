use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequireJWT};
use crate::models::exam_submissions::requests::SubmissionListQuery;
use crate::models::exams::requests::{
    CreateExamRequest, CreateQuestionRequest, UpdateQuestionRequest,
};
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::ExamService;

// 懒加载的全局 ExamService 实例
static EXAM_SERVICE: Lazy<ExamService> = Lazy::new(ExamService::new_lazy);

fn missing_user() -> HttpResponse {
    HttpResponse::Unauthorized().json(ApiResponse::error_empty(
        ErrorCode::Unauthorized,
        "无法获取用户信息",
    ))
}

// 创建考试
pub async fn create_exam(
    req: HttpRequest,
    body: web::Json<CreateExamRequest>,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(&req) else {
        return Ok(missing_user());
    };
    EXAM_SERVICE
        .create_exam(&req, &user, body.into_inner())
        .await
}

// 获取考试详情
pub async fn get_exam(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(&req) else {
        return Ok(missing_user());
    };
    EXAM_SERVICE.get_exam(&req, &user, path.into_inner()).await
}

// 添加题目
pub async fn add_question(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<CreateQuestionRequest>,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(&req) else {
        return Ok(missing_user());
    };
    EXAM_SERVICE
        .add_question(&req, &user, path.into_inner(), body.into_inner())
        .await
}

// 更新题目
pub async fn update_question(
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
    body: web::Json<UpdateQuestionRequest>,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(&req) else {
        return Ok(missing_user());
    };
    let (exam_id, question_id) = path.into_inner();
    EXAM_SERVICE
        .update_question(&req, &user, exam_id, question_id, body.into_inner())
        .await
}

// 发布考试
pub async fn publish_exam(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(&req) else {
        return Ok(missing_user());
    };
    EXAM_SERVICE
        .publish_exam(&req, &user, path.into_inner())
        .await
}

// 列出考试的提交
pub async fn list_submissions(
    req: HttpRequest,
    path: web::Path<i64>,
    query: web::Query<SubmissionListQuery>,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(&req) else {
        return Ok(missing_user());
    };
    EXAM_SERVICE
        .list_submissions(&req, &user, path.into_inner(), query.into_inner())
        .await
}

// 配置路由
pub fn configure_exams_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/exams")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("").route(
                    web::post()
                        .to(create_exam)
                        .wrap(middlewares::RequireRole::new_any(UserRole::professor_roles())),
                ),
            )
            // 学生只能看到已发布的考试，业务层处理
            .service(web::resource("/{id}").route(web::get().to(get_exam)))
            // 以下接口在业务层校验考试负责人
            .service(
                web::scope("/{id}")
                    .wrap(middlewares::RequireRole::new_any(UserRole::professor_roles()))
                    .service(web::resource("/questions").route(web::post().to(add_question)))
                    .service(
                        web::resource("/questions/{question_id}")
                            .route(web::put().to(update_question)),
                    )
                    .service(web::resource("/publish").route(web::post().to(publish_exam)))
                    .service(
                        web::resource("/submissions").route(web::get().to(list_submissions)),
                    ),
            ),
    );
}
