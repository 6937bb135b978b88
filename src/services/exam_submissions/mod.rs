pub mod answer;
pub mod deadline;
pub mod results;
pub mod review;
pub mod start;
pub mod submit;
pub mod workflow;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

pub use deadline::{DueDatePolicy, FixedClockPolicy, SystemClockPolicy};
pub use workflow::SubmissionWorkflow;

use crate::models::exam_submissions::requests::{
    RecheckGradesRequest, RecheckRequestBody, SaveAnswerRequest, UpdateSubmissionStatusRequest,
};
use crate::models::users::entities::User;
use crate::services::notifications::{NotificationSink, StorageNotificationSink};
use crate::storage::Storage;

pub struct ExamSubmissionService {
    storage: Option<Arc<dyn Storage>>,
}

impl ExamSubmissionService {
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

    /// 组装状态机：通知落库并推送 WebSocket，截止时间以系统时间为准
    pub(crate) fn workflow(&self, request: &HttpRequest) -> SubmissionWorkflow {
        let storage = self.get_storage(request);
        let notifier: Arc<dyn NotificationSink> =
            Arc::new(StorageNotificationSink::new(storage.clone()));
        SubmissionWorkflow::new(storage, notifier, Arc::new(SystemClockPolicy))
    }

    /// 开始考试
    pub async fn start_exam(
        &self,
        request: &HttpRequest,
        user: &User,
        exam_id: i64,
    ) -> ActixResult<HttpResponse> {
        start::start_exam(self, request, user, exam_id).await
    }

    /// 保存答案
    pub async fn save_answer(
        &self,
        request: &HttpRequest,
        user: &User,
        submission_id: i64,
        req: SaveAnswerRequest,
    ) -> ActixResult<HttpResponse> {
        answer::save_answer(self, request, user, submission_id, req).await
    }

    /// 交卷
    pub async fn submit_exam(
        &self,
        request: &HttpRequest,
        user: &User,
        submission_id: i64,
    ) -> ActixResult<HttpResponse> {
        submit::submit_exam(self, request, user, submission_id).await
    }

    /// 查看自己的考试结果
    pub async fn get_my_result(
        &self,
        request: &HttpRequest,
        user: &User,
        exam_id: i64,
    ) -> ActixResult<HttpResponse> {
        results::get_my_result(self, request, user, exam_id).await
    }

    /// 申请复查
    pub async fn request_recheck(
        &self,
        request: &HttpRequest,
        user: &User,
        exam_id: i64,
        req: RecheckRequestBody,
    ) -> ActixResult<HttpResponse> {
        results::request_recheck(self, request, user, exam_id, req).await
    }

    /// 提交详情
    pub async fn get_submission(
        &self,
        request: &HttpRequest,
        user: &User,
        submission_id: i64,
    ) -> ActixResult<HttpResponse> {
        review::get_submission(self, request, user, submission_id).await
    }

    /// 人工改分
    pub async fn recheck_grades(
        &self,
        request: &HttpRequest,
        user: &User,
        submission_id: i64,
        req: RecheckGradesRequest,
    ) -> ActixResult<HttpResponse> {
        review::recheck_grades(self, request, user, submission_id, req).await
    }

    /// 推进复查状态
    pub async fn update_status(
        &self,
        request: &HttpRequest,
        user: &User,
        submission_id: i64,
        req: UpdateSubmissionStatusRequest,
    ) -> ActixResult<HttpResponse> {
        review::update_status(self, request, user, submission_id, req).await
    }

    /// 成绩变更历史
    pub async fn get_history(
        &self,
        request: &HttpRequest,
        user: &User,
        submission_id: i64,
    ) -> ActixResult<HttpResponse> {
        review::get_history(self, request, user, submission_id).await
    }
}
