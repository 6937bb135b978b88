use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ExamService, load_managed_exam};
use crate::models::exams::{
    entities::Exam,
    requests::{CreateQuestionRequest, UpdateQuestionRequest},
};
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;

/// 已发布的考试题目不可修改
fn ensure_draft(exam: &Exam) -> Result<(), HttpResponse> {
    if exam.is_published() {
        Err(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::ExamAlreadyPublished,
            "考试已发布，题目不可修改",
        )))
    } else {
        Ok(())
    }
}

pub async fn add_question(
    service: &ExamService,
    request: &HttpRequest,
    user: &User,
    exam_id: i64,
    req: CreateQuestionRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let exam = match load_managed_exam(&storage, user, exam_id).await {
        Ok(exam) => exam,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = ensure_draft(&exam) {
        return Ok(resp);
    }

    let draft = match req.into_draft() {
        Ok(draft) => draft,
        Err(e) => return Ok(error_response(&e)),
    };

    match storage.create_question(exam_id, draft).await {
        Ok(question) => Ok(HttpResponse::Created().json(ApiResponse::success(question, "题目添加成功"))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn update_question(
    service: &ExamService,
    request: &HttpRequest,
    user: &User,
    exam_id: i64,
    question_id: i64,
    req: UpdateQuestionRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let exam = match load_managed_exam(&storage, user, exam_id).await {
        Ok(exam) => exam,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = ensure_draft(&exam) {
        return Ok(resp);
    }

    let existing = match storage.get_question_by_id(question_id).await {
        Ok(Some(question)) if question.exam_id == exam_id => question,
        Ok(_) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::QuestionNotFound,
                "题目不存在",
            )));
        }
        Err(e) => return Ok(error_response(&e)),
    };

    let draft = match req.apply_to(&existing) {
        Ok(draft) => draft,
        Err(e) => return Ok(error_response(&e)),
    };

    match storage.update_question(question_id, draft).await {
        Ok(Some(question)) => Ok(HttpResponse::Ok().json(ApiResponse::success(question, "题目更新成功"))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::QuestionNotFound,
            "题目不存在",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}
