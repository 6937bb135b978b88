use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ExamService;
use crate::models::exams::responses::{ExamDetailResponse, QuestionView};
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;

pub async fn get_exam(
    service: &ExamService,
    request: &HttpRequest,
    user: &User,
    exam_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let exam = match storage.get_exam_by_id(exam_id).await {
        Ok(Some(exam)) => exam,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ExamNotFound,
                "考试不存在",
            )));
        }
        Err(e) => return Ok(error_response(&e)),
    };

    // 负责人与管理员能看到正确答案；其他人只能看已发布的考试，且不含答案
    let is_manager = user.is_admin() || exam.is_owned_by(user.id);
    if !is_manager && !exam.is_published() {
        return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ExamNotFound,
            "考试不存在",
        )));
    }

    let questions = match storage.list_exam_questions(exam_id).await {
        Ok(questions) => questions,
        Err(e) => return Ok(error_response(&e)),
    };

    let total_points = questions.iter().map(|q| q.points).sum();
    let detail = ExamDetailResponse {
        exam,
        questions: questions
            .into_iter()
            .map(|q| QuestionView::from_question(q, is_manager))
            .collect(),
        total_points,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(detail, "查询成功")))
}
