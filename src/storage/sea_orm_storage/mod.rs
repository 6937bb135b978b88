//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod exam_submissions;
mod exams;
mod notifications;
mod recheck;
mod users;

use crate::config::{AppConfig, DatabaseConfig};
use crate::errors::{ExamSystemError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 使用全局配置创建 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        Self::connect(&config.database).await
    }

    /// 连接指定数据库并运行迁移
    pub async fn connect(db_config: &DatabaseConfig) -> Result<Self> {
        let db_url = Self::build_database_url(&db_config.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, db_config).await?
        } else {
            Self::connect_generic(&db_url, db_config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, db_config: &DatabaseConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| ExamSystemError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(db_config.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(db_config.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| ExamSystemError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, db_config: &DatabaseConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(db_config.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(db_config.timeout))
            .acquire_timeout(Duration::from_secs(db_config.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| ExamSystemError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(ExamSystemError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
use crate::models::{
    exam_submissions::{
        entities::{
            ExamSubmission, GradeChangeLogEntry, RecheckRequest, RecheckRequestStatus,
            StudentAnswer, SubmissionStatus, SubmittedAnswer,
        },
        requests::{AnswerOverride, SubmissionListQuery},
        responses::SubmissionListResponse,
    },
    exams::{
        entities::{Exam, Question},
        requests::{CreateExamRequest, QuestionDraft},
    },
    notifications::{
        entities::Notification,
        requests::{CreateNotificationRequest, NotificationListQuery},
        responses::NotificationListResponse,
    },
    users::{entities::User, requests::CreateUserRequest},
};
use crate::storage::{GradeFn, Storage};
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    // 考试模块
    async fn create_exam(&self, created_by: i64, req: CreateExamRequest) -> Result<Exam> {
        self.create_exam_impl(created_by, req).await
    }

    async fn get_exam_by_id(&self, exam_id: i64) -> Result<Option<Exam>> {
        self.get_exam_by_id_impl(exam_id).await
    }

    async fn publish_exam(&self, exam_id: i64) -> Result<bool> {
        self.publish_exam_impl(exam_id).await
    }

    async fn list_exam_questions(&self, exam_id: i64) -> Result<Vec<Question>> {
        self.list_exam_questions_impl(exam_id).await
    }

    async fn get_question_by_id(&self, question_id: i64) -> Result<Option<Question>> {
        self.get_question_by_id_impl(question_id).await
    }

    async fn create_question(&self, exam_id: i64, draft: QuestionDraft) -> Result<Question> {
        self.create_question_impl(exam_id, draft).await
    }

    async fn update_question(
        &self,
        question_id: i64,
        draft: QuestionDraft,
    ) -> Result<Option<Question>> {
        self.update_question_impl(question_id, draft).await
    }

    // 考试提交模块
    async fn get_submission_by_id(&self, submission_id: i64) -> Result<Option<ExamSubmission>> {
        self.get_submission_by_id_impl(submission_id).await
    }

    async fn get_submission_by_exam_and_student(
        &self,
        exam_id: i64,
        student_id: i64,
    ) -> Result<Option<ExamSubmission>> {
        self.get_submission_by_exam_and_student_impl(exam_id, student_id)
            .await
    }

    async fn create_submission(
        &self,
        exam_id: i64,
        student_id: i64,
        total_points: f64,
    ) -> Result<ExamSubmission> {
        self.create_submission_impl(exam_id, student_id, total_points)
            .await
    }

    async fn save_answer(
        &self,
        submission_id: i64,
        question_id: i64,
        answer: &SubmittedAnswer,
    ) -> Result<Option<StudentAnswer>> {
        self.save_answer_impl(submission_id, question_id, answer)
            .await
    }

    async fn list_submission_answers(&self, submission_id: i64) -> Result<Vec<StudentAnswer>> {
        self.list_submission_answers_impl(submission_id).await
    }

    async fn submit_and_grade(
        &self,
        submission_id: i64,
        questions: &[Question],
        grade: GradeFn,
    ) -> Result<Option<ExamSubmission>> {
        self.submit_and_grade_impl(submission_id, questions, grade)
            .await
    }

    async fn list_exam_submissions_with_pagination(
        &self,
        exam_id: i64,
        query: SubmissionListQuery,
    ) -> Result<SubmissionListResponse> {
        self.list_exam_submissions_with_pagination_impl(exam_id, query)
            .await
    }

    // 复查模块
    async fn get_latest_recheck_request(
        &self,
        submission_id: i64,
    ) -> Result<Option<RecheckRequest>> {
        self.get_latest_recheck_request_impl(submission_id).await
    }

    async fn create_recheck_request(
        &self,
        submission_id: i64,
        student_id: i64,
        reason: &str,
    ) -> Result<RecheckRequest> {
        self.create_recheck_request_impl(submission_id, student_id, reason)
            .await
    }

    async fn transition_recheck_status(
        &self,
        submission_id: i64,
        from: SubmissionStatus,
        to: SubmissionStatus,
        request_to: RecheckRequestStatus,
    ) -> Result<Option<ExamSubmission>> {
        self.transition_recheck_status_impl(submission_id, from, to, request_to)
            .await
    }

    async fn apply_recheck_grades(
        &self,
        submission_id: i64,
        actor_id: i64,
        overrides: &[AnswerOverride],
        notes: Option<String>,
    ) -> Result<(ExamSubmission, GradeChangeLogEntry)> {
        self.apply_recheck_grades_impl(submission_id, actor_id, overrides, notes)
            .await
    }

    async fn list_grade_change_logs(
        &self,
        submission_id: i64,
    ) -> Result<Vec<GradeChangeLogEntry>> {
        self.list_grade_change_logs_impl(submission_id).await
    }

    // 通知模块
    async fn create_notification(&self, req: CreateNotificationRequest) -> Result<Notification> {
        self.create_notification_impl(req).await
    }

    async fn list_notifications_with_pagination(
        &self,
        user_id: i64,
        query: NotificationListQuery,
    ) -> Result<NotificationListResponse> {
        self.list_notifications_with_pagination_impl(user_id, query)
            .await
    }

    async fn mark_notification_as_read(
        &self,
        notification_id: i64,
        user_id: i64,
    ) -> Result<bool> {
        self.mark_notification_as_read_impl(notification_id, user_id)
            .await
    }
}
