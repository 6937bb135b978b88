pub mod create;
pub mod detail;
pub mod publish;
pub mod questions;
pub mod submissions;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::ApiResponse;
use crate::models::ErrorCode;
use crate::models::exam_submissions::requests::SubmissionListQuery;
use crate::models::exams::{
    entities::Exam,
    requests::{CreateExamRequest, CreateQuestionRequest, UpdateQuestionRequest},
};
use crate::models::users::entities::User;
use crate::services::error_response;
use crate::storage::Storage;

pub struct ExamService {
    storage: Option<Arc<dyn Storage>>,
}

impl ExamService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    /// 创建考试
    pub async fn create_exam(
        &self,
        request: &HttpRequest,
        user: &User,
        req: CreateExamRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_exam(self, request, user, req).await
    }

    /// 获取考试详情
    pub async fn get_exam(
        &self,
        request: &HttpRequest,
        user: &User,
        exam_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::get_exam(self, request, user, exam_id).await
    }

    /// 添加题目
    pub async fn add_question(
        &self,
        request: &HttpRequest,
        user: &User,
        exam_id: i64,
        req: CreateQuestionRequest,
    ) -> ActixResult<HttpResponse> {
        questions::add_question(self, request, user, exam_id, req).await
    }

    /// 更新题目
    pub async fn update_question(
        &self,
        request: &HttpRequest,
        user: &User,
        exam_id: i64,
        question_id: i64,
        req: UpdateQuestionRequest,
    ) -> ActixResult<HttpResponse> {
        questions::update_question(self, request, user, exam_id, question_id, req).await
    }

    /// 发布考试
    pub async fn publish_exam(
        &self,
        request: &HttpRequest,
        user: &User,
        exam_id: i64,
    ) -> ActixResult<HttpResponse> {
        publish::publish_exam(self, request, user, exam_id).await
    }

    /// 列出考试提交
    pub async fn list_submissions(
        &self,
        request: &HttpRequest,
        user: &User,
        exam_id: i64,
        query: SubmissionListQuery,
    ) -> ActixResult<HttpResponse> {
        submissions::list_submissions(self, request, user, exam_id, query).await
    }
}

/// 读取考试，并要求当前用户是考试负责人或管理员
async fn load_managed_exam(
    storage: &Arc<dyn Storage>,
    user: &User,
    exam_id: i64,
) -> Result<Exam, HttpResponse> {
    let exam = match storage.get_exam_by_id(exam_id).await {
        Ok(Some(exam)) => exam,
        Ok(None) => {
            return Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ExamNotFound,
                "考试不存在",
            )));
        }
        Err(e) => return Err(error_response(&e)),
    };

    if !user.is_admin() && !exam.is_owned_by(user.id) {
        return Err(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "只有考试负责人可以执行此操作",
        )));
    }

    Ok(exam)
}
