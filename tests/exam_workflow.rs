// tests/exam_workflow.rs

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rust_examsystem_next::config::DatabaseConfig;
use rust_examsystem_next::errors::{ExamSystemError, Result};
use rust_examsystem_next::models::exam_submissions::entities::{
    RecheckRequestStatus, SubmissionStatus, SubmittedAnswer,
};
use rust_examsystem_next::models::exam_submissions::requests::{
    AnswerOverride, RecheckGradesRequest, SaveAnswerRequest,
};
use rust_examsystem_next::models::exams::entities::{Exam, Question, QuestionType};
use rust_examsystem_next::models::exams::requests::{
    CorrectAnswerInput, CreateExamRequest, CreateQuestionRequest,
};
use rust_examsystem_next::models::notifications::entities::NotificationType;
use rust_examsystem_next::models::notifications::requests::NotificationListQuery;
use rust_examsystem_next::models::users::entities::{User, UserRole};
use rust_examsystem_next::models::users::requests::CreateUserRequest;
use rust_examsystem_next::services::exam_submissions::{
    DueDatePolicy, FixedClockPolicy, SubmissionWorkflow, SystemClockPolicy,
};
use rust_examsystem_next::services::notifications::{
    NotificationSink, StorageNotificationSink,
};
use rust_examsystem_next::storage::{Storage, sea_orm_storage::SeaOrmStorage};
use serde_json::{Value, json};

/// 记录下来的一条通知
#[derive(Debug, Clone, PartialEq)]
struct SentNotification {
    user_id: i64,
    kind: NotificationType,
    message: String,
    metadata: Value,
}

/// 只在内存里记录通知
#[derive(Default)]
struct RecordingNotificationSink {
    sent: Mutex<Vec<SentNotification>>,
}

impl RecordingNotificationSink {
    fn new() -> Self {
        Self::default()
    }

    fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotificationSink {
    async fn notify(
        &self,
        user_id: i64,
        kind: NotificationType,
        message: String,
        metadata: Value,
    ) -> Result<()> {
        self.sent.lock().unwrap().push(SentNotification {
            user_id,
            kind,
            message,
            metadata,
        });
        Ok(())
    }
}

/// 每次投递都失败
struct FailingNotificationSink;

#[async_trait]
impl NotificationSink for FailingNotificationSink {
    async fn notify(
        &self,
        _user_id: i64,
        _kind: NotificationType,
        _message: String,
        _metadata: Value,
    ) -> Result<()> {
        Err(ExamSystemError::database_operation("notification table unavailable"))
    }
}

/// 临时 SQLite 数据库文件，测试结束后删除
struct TempDb {
    path: std::path::PathBuf,
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

struct Fixture {
    _db: TempDb,
    storage: Arc<dyn Storage>,
    professor: User,
    student: User,
    other_student: User,
    exam: Exam,
    questions: Vec<Question>,
}

async fn create_user(storage: &Arc<dyn Storage>, name: &str, role: UserRole) -> User {
    storage
        .create_user(CreateUserRequest {
            username: name.to_string(),
            email: format!("{name}@example.edu"),
            role,
            display_name: None,
        })
        .await
        .expect("Failed to create user")
}

/// 一场已发布的考试，共 6 分：
/// - 多选题（1 分）：选项 tet / 23 / 3 / 4，正确答案 {tet, 23, 3}
/// - 填空题（2 分）：旧格式候选答案 {"sdasd1","sdasd2","sdasd3"}
/// - 填空题（3 分）：Paris
async fn setup(due_date: Option<chrono::DateTime<Utc>>) -> Fixture {
    let path = std::env::temp_dir().join(format!("examsystem-test-{}.db", uuid::Uuid::new_v4()));
    let db = TempDb { path: path.clone() };

    // 单连接：并发请求在连接池上排队，结果可复现
    let config = DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", path.display()),
        pool_size: 1,
        timeout: 10,
    };
    let storage: Arc<dyn Storage> = Arc::new(
        SeaOrmStorage::connect(&config)
            .await
            .expect("Failed to open test database"),
    );

    let professor = create_user(&storage, "prof", UserRole::Professor).await;
    let student = create_user(&storage, "alice", UserRole::Student).await;
    let other_student = create_user(&storage, "bob", UserRole::Student).await;

    let exam = storage
        .create_exam(
            professor.id,
            CreateExamRequest {
                course_id: 1,
                title: "Midterm".to_string(),
                description: None,
                due_date,
            },
        )
        .await
        .unwrap();

    let requests = vec![
        CreateQuestionRequest {
            question_type: QuestionType::MultipleChoice,
            text: "Pick the listed values".to_string(),
            options: Some(vec!["tet".into(), "23".into(), "3".into(), "4".into()]),
            correct_answer: CorrectAnswerInput::Text(r#"{"tet","23","3"}"#.to_string()),
            allow_multiple_answers: Some(true),
            points: 1.0,
            position: Some(0),
        },
        CreateQuestionRequest {
            question_type: QuestionType::Identification,
            text: "Name one sample".to_string(),
            options: None,
            correct_answer: CorrectAnswerInput::Text(r#"{"sdasd1","sdasd2","sdasd3"}"#.to_string()),
            allow_multiple_answers: None,
            points: 2.0,
            position: Some(1),
        },
        CreateQuestionRequest {
            question_type: QuestionType::Identification,
            text: "Capital of France".to_string(),
            options: None,
            correct_answer: CorrectAnswerInput::Text("Paris".to_string()),
            allow_multiple_answers: None,
            points: 3.0,
            position: Some(2),
        },
    ];

    let mut questions = Vec::new();
    for req in requests {
        let draft = req.into_draft().unwrap();
        questions.push(storage.create_question(exam.id, draft).await.unwrap());
    }

    assert!(storage.publish_exam(exam.id).await.unwrap());
    let exam = storage.get_exam_by_id(exam.id).await.unwrap().unwrap();

    Fixture {
        _db: db,
        storage,
        professor,
        student,
        other_student,
        exam,
        questions,
    }
}

fn workflow_with(
    fx: &Fixture,
    sink: Arc<dyn NotificationSink>,
    policy: Arc<dyn DueDatePolicy>,
) -> SubmissionWorkflow {
    SubmissionWorkflow::new(fx.storage.clone(), sink, policy)
}

fn workflow(fx: &Fixture) -> (SubmissionWorkflow, Arc<RecordingNotificationSink>) {
    let sink = Arc::new(RecordingNotificationSink::new());
    (
        workflow_with(fx, sink.clone(), Arc::new(SystemClockPolicy)),
        sink,
    )
}

fn answer(question_id: i64, value: &str) -> SaveAnswerRequest {
    SaveAnswerRequest {
        question_id,
        answer: SubmittedAnswer::Text(value.to_string()),
    }
}

/// 开始考试并按给定答案作答后交卷
async fn submit_with(
    fx: &Fixture,
    wf: &SubmissionWorkflow,
    answers: &[(usize, &str)],
) -> i64 {
    let submission = wf.start(fx.exam.id, &fx.student).await.unwrap();
    for (index, value) in answers {
        wf.save_answer(
            submission.id,
            &fx.student,
            answer(fx.questions[*index].id, value),
        )
        .await
        .unwrap();
    }
    wf.submit(submission.id, &fx.student).await.unwrap();
    submission.id
}

#[tokio::test]
async fn submit_grades_every_question() {
    let fx = setup(None).await;
    let (wf, _) = workflow(&fx);

    let submission = wf.start(fx.exam.id, &fx.student).await.unwrap();
    assert_eq!(submission.status, SubmissionStatus::InProgress);
    assert_eq!(submission.total_points, 6.0);

    // "0" 选中 tet；旧格式候选答案忽略大小写
    wf.save_answer(submission.id, &fx.student, answer(fx.questions[0].id, "0"))
        .await
        .unwrap();
    wf.save_answer(submission.id, &fx.student, answer(fx.questions[1].id, "wrong"))
        .await
        .unwrap();
    // 覆盖之前的答案
    wf.save_answer(submission.id, &fx.student, answer(fx.questions[1].id, "SDASD3"))
        .await
        .unwrap();

    let graded = wf.submit(submission.id, &fx.student).await.unwrap();
    assert_eq!(graded.status, SubmissionStatus::Graded);
    assert!(graded.is_graded);
    assert!(graded.submitted_at.is_some());
    assert_eq!(graded.score, Some(3.0));
    assert_eq!(graded.total_points, 6.0);

    let answers = fx
        .storage
        .list_submission_answers(submission.id)
        .await
        .unwrap();
    assert_eq!(answers.len(), 3);
    let unanswered = answers
        .iter()
        .find(|a| a.question_id == fx.questions[2].id)
        .unwrap();
    assert_eq!(unanswered.is_correct, Some(false));
    assert_eq!(unanswered.points_earned, Some(0.0));
}

#[tokio::test]
async fn index_selecting_wrong_option_is_incorrect() {
    let fx = setup(None).await;
    let (wf, _) = workflow(&fx);

    // "3" 选中的是 "4"，不是正确答案中的 "3"
    let id = submit_with(&fx, &wf, &[(0, "3")]).await;
    let submission = fx.storage.get_submission_by_id(id).await.unwrap().unwrap();
    assert_eq!(submission.score, Some(0.0));
}

#[tokio::test]
async fn concurrent_submit_grades_exactly_once() {
    let fx = setup(None).await;
    let (wf, _) = workflow(&fx);

    let submission = wf.start(fx.exam.id, &fx.student).await.unwrap();
    wf.save_answer(submission.id, &fx.student, answer(fx.questions[2].id, "paris"))
        .await
        .unwrap();

    let (first, second) = tokio::join!(
        wf.submit(submission.id, &fx.student),
        wf.submit(submission.id, &fx.student)
    );

    let results = [first, second];
    let succeeded: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(succeeded.len(), 1);
    assert_eq!(succeeded[0].score, Some(3.0));
    assert!(
        results
            .iter()
            .any(|r| matches!(r, Err(ExamSystemError::AlreadySubmitted(_))))
    );

    // 再次交卷不会重新评分
    let again = wf.submit(submission.id, &fx.student).await;
    assert!(matches!(again, Err(ExamSystemError::AlreadySubmitted(_))));
    let stored = fx
        .storage
        .get_submission_by_id(submission.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.score, Some(3.0));

    // 交卷后不能再改答案
    let late = wf
        .save_answer(submission.id, &fx.student, answer(fx.questions[0].id, "0"))
        .await;
    assert!(matches!(late, Err(ExamSystemError::AlreadySubmitted(_))));
    assert!(
        fx.storage
            .save_answer(
                submission.id,
                fx.questions[0].id,
                &SubmittedAnswer::Text("0".into())
            )
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn past_due_rejects_answers_and_submit() {
    let due = Utc::now() + Duration::hours(1);
    let fx = setup(Some(due)).await;
    let sink = Arc::new(RecordingNotificationSink::new());

    let on_time = workflow_with(
        &fx,
        sink.clone(),
        Arc::new(FixedClockPolicy {
            now: due - Duration::minutes(5),
        }),
    );
    let submission = on_time.start(fx.exam.id, &fx.student).await.unwrap();

    let late = workflow_with(
        &fx,
        sink,
        Arc::new(FixedClockPolicy {
            now: due + Duration::seconds(1),
        }),
    );
    let saved = late
        .save_answer(submission.id, &fx.student, answer(fx.questions[0].id, "0"))
        .await;
    assert!(matches!(saved, Err(ExamSystemError::PastDue(_))));
    let submitted = late.submit(submission.id, &fx.student).await;
    assert!(matches!(submitted, Err(ExamSystemError::PastDue(_))));

    let stored = fx
        .storage
        .get_submission_by_id(submission.id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.submitted_at.is_none());
    assert_eq!(stored.status, SubmissionStatus::InProgress);
}

#[tokio::test]
async fn start_is_idempotent_and_requires_published_exam() {
    let fx = setup(None).await;
    let (wf, _) = workflow(&fx);

    let draft = fx
        .storage
        .create_exam(
            fx.professor.id,
            CreateExamRequest {
                course_id: 1,
                title: "Draft".to_string(),
                description: None,
                due_date: None,
            },
        )
        .await
        .unwrap();
    let result = wf.start(draft.id, &fx.student).await;
    assert!(matches!(result, Err(ExamSystemError::InvalidTransition(_))));

    let first = wf.start(fx.exam.id, &fx.student).await.unwrap();
    let second = wf.start(fx.exam.id, &fx.student).await.unwrap();
    assert_eq!(first.id, second.id);

    wf.submit(first.id, &fx.student).await.unwrap();
    let after = wf.start(fx.exam.id, &fx.student).await;
    assert!(matches!(after, Err(ExamSystemError::AlreadySubmitted(_))));
}

#[tokio::test]
async fn answers_are_scoped_to_owner_and_exam() {
    let fx = setup(None).await;
    let (wf, _) = workflow(&fx);
    let submission = wf.start(fx.exam.id, &fx.student).await.unwrap();

    let foreign = wf
        .save_answer(
            submission.id,
            &fx.other_student,
            answer(fx.questions[0].id, "0"),
        )
        .await;
    assert!(matches!(foreign, Err(ExamSystemError::Authorization(_))));

    let unknown = wf
        .save_answer(submission.id, &fx.student, answer(9_999, "0"))
        .await;
    assert!(matches!(unknown, Err(ExamSystemError::NotFound(_))));

    let submit = wf.submit(submission.id, &fx.other_student).await;
    assert!(matches!(submit, Err(ExamSystemError::Authorization(_))));
}

#[tokio::test]
async fn recheck_request_cycle() {
    let fx = setup(None).await;
    let (wf, sink) = workflow(&fx);

    // 交卷前不能申请
    let submission = wf.start(fx.exam.id, &fx.student).await.unwrap();
    let early = wf
        .request_recheck(fx.exam.id, &fx.student, "please check")
        .await;
    assert!(matches!(early, Err(ExamSystemError::InvalidTransition(_))));
    wf.submit(submission.id, &fx.student).await.unwrap();

    let blank = wf.request_recheck(fx.exam.id, &fx.student, "   ").await;
    assert!(matches!(blank, Err(ExamSystemError::Validation(_))));

    let request = wf
        .request_recheck(fx.exam.id, &fx.student, "  Question 2 is right  ")
        .await
        .unwrap();
    assert_eq!(request.status, RecheckRequestStatus::Pending);
    assert_eq!(request.reason, "Question 2 is right");

    let duplicate = wf
        .request_recheck(fx.exam.id, &fx.student, "again")
        .await;
    assert!(matches!(duplicate, Err(ExamSystemError::Conflict(_))));

    // 学生不能推进复查
    let denied = wf.begin_recheck(submission.id, &fx.student).await;
    assert!(matches!(denied, Err(ExamSystemError::Authorization(_))));

    // 跳过 rechecking 直接完成
    let skipped = wf.complete_recheck(submission.id, &fx.professor).await;
    assert!(matches!(skipped, Err(ExamSystemError::InvalidTransition(_))));

    let rechecking = wf
        .update_status(submission.id, &fx.professor, SubmissionStatus::Rechecking)
        .await
        .unwrap();
    assert_eq!(rechecking.status, SubmissionStatus::Rechecking);
    let latest = fx
        .storage
        .get_latest_recheck_request(submission.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(latest.status, RecheckRequestStatus::InProgress);

    let graded = wf
        .update_status(submission.id, &fx.professor, SubmissionStatus::Graded)
        .await;
    assert!(matches!(graded, Err(ExamSystemError::InvalidTransition(_))));

    let completed = wf
        .update_status(
            submission.id,
            &fx.professor,
            SubmissionStatus::RecheckCompleted,
        )
        .await
        .unwrap();
    assert_eq!(completed.status, SubmissionStatus::RecheckCompleted);
    let latest = fx
        .storage
        .get_latest_recheck_request(submission.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(latest.status, RecheckRequestStatus::Completed);

    // 复查完成后可以再次申请
    let second = wf
        .request_recheck(fx.exam.id, &fx.student, "still wrong")
        .await
        .unwrap();
    assert_ne!(second.id, request.id);

    let kinds: Vec<_> = sink.sent().iter().map(|n| (n.user_id, n.kind)).collect();
    assert_eq!(
        kinds,
        vec![
            (fx.professor.id, NotificationType::RecheckRequested),
            (fx.student.id, NotificationType::RecheckStarted),
            (fx.student.id, NotificationType::RecheckCompleted),
            (fx.professor.id, NotificationType::RecheckRequested),
        ]
    );
    assert_eq!(sink.sent()[0].metadata["submission_id"], json!(submission.id));
}

fn regrade(answer_id: i64, is_correct: bool, points_earned: f64) -> AnswerOverride {
    AnswerOverride {
        answer_id,
        is_correct,
        points_earned,
    }
}

/// 按题目顺序返回提交中各答案的 ID
async fn answer_ids(fx: &Fixture, submission_id: i64) -> Vec<i64> {
    let answers = fx
        .storage
        .list_submission_answers(submission_id)
        .await
        .unwrap();
    fx.questions
        .iter()
        .map(|question| {
            answers
                .iter()
                .find(|a| a.question_id == question.id)
                .map(|a| a.id)
                .unwrap()
        })
        .collect()
}

#[tokio::test]
async fn regrade_rejects_invalid_override_lists() {
    let fx = setup(None).await;
    let (wf, sink) = workflow(&fx);

    // 多选题答对 1 分，第二题答错，第三题未作答
    let submission_id = submit_with(&fx, &wf, &[(0, "0,1"), (1, "nope")]).await;
    let ids = answer_ids(&fx, submission_id).await;
    let (mcq, second, third) = (ids[0], ids[1], ids[2]);
    let full = || {
        vec![
            regrade(mcq, true, 1.0),
            regrade(second, true, 2.0),
            regrade(third, true, 3.0),
        ]
    };

    let denied = wf
        .recheck_grades(
            submission_id,
            &fx.student,
            RecheckGradesRequest {
                answers: full(),
                notes: None,
            },
        )
        .await;
    assert!(matches!(denied, Err(ExamSystemError::Authorization(_))));

    let invalid_lists = vec![
        vec![],
        vec![
            regrade(mcq, true, 1.0),
            regrade(second, true, 2.0),
            regrade(third, true, f64::NAN),
        ],
        vec![
            regrade(mcq, true, 1.0),
            regrade(mcq, false, 0.0),
            regrade(second, true, 2.0),
            regrade(third, true, 3.0),
        ],
        // 只改部分答案时总分无法等于改分之和
        vec![regrade(second, true, 2.0)],
    ];
    for answers in invalid_lists {
        let result = wf
            .recheck_grades(
                submission_id,
                &fx.professor,
                RecheckGradesRequest {
                    answers,
                    notes: None,
                },
            )
            .await;
        assert!(matches!(result, Err(ExamSystemError::Validation(_))));
    }

    // 其他提交的答案不能在这里修改
    let other = wf.start(fx.exam.id, &fx.other_student).await.unwrap();
    let other_answer = wf
        .save_answer(other.id, &fx.other_student, answer(fx.questions[2].id, "Paris"))
        .await
        .unwrap();
    let mut with_foreign = full();
    with_foreign[2] = regrade(other_answer.id, true, 3.0);
    let foreign = wf
        .recheck_grades(
            submission_id,
            &fx.professor,
            RecheckGradesRequest {
                answers: with_foreign,
                notes: None,
            },
        )
        .await;
    assert!(matches!(foreign, Err(ExamSystemError::NotFound(_))));

    // 失败的改分不留下任何痕迹
    let unchanged = fx
        .storage
        .get_submission_by_id(submission_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.score, Some(1.0));
    let answers = fx
        .storage
        .list_submission_answers(submission_id)
        .await
        .unwrap();
    let second_row = answers.iter().find(|a| a.id == second).unwrap();
    assert_eq!(second_row.is_correct, Some(false));
    assert!(wf.history(submission_id, &fx.professor).await.unwrap().is_empty());
    assert!(sink.sent().is_empty());
}

#[tokio::test]
async fn regrade_score_is_sum_of_clamped_overrides() {
    let fx = setup(None).await;
    let (wf, sink) = workflow(&fx);

    let submission_id = submit_with(&fx, &wf, &[(0, "0,1"), (1, "nope")]).await;
    let ids = answer_ids(&fx, submission_id).await;
    let (mcq, second, third) = (ids[0], ids[1], ids[2]);

    // 超出分值截断到题目满分；判错的题一律 0 分
    let overrides = vec![
        regrade(mcq, false, 1.0),
        regrade(second, true, 1.5),
        regrade(third, true, 10.0),
    ];
    let clamped: Vec<f64> = vec![0.0, 1.5, 3.0];
    let (updated, first_log) = wf
        .recheck_grades(
            submission_id,
            &fx.professor,
            RecheckGradesRequest {
                answers: overrides,
                notes: Some("  partial credit  ".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(first_log.new_score, clamped.iter().sum::<f64>());
    assert_eq!(updated.score, Some(4.5));
    assert!(updated.is_graded);
    assert_eq!(updated.status, SubmissionStatus::Graded);
    assert_eq!(first_log.previous_score, Some(1.0));
    assert_eq!(first_log.actor_id, fx.professor.id);
    assert_eq!(first_log.notes.as_deref(), Some("partial credit"));

    let regraded = fx
        .storage
        .list_submission_answers(submission_id)
        .await
        .unwrap();
    for (id, points) in ids.iter().zip(&clamped) {
        let row = regraded.iter().find(|a| a.id == *id).unwrap();
        assert_eq!(row.points_earned, Some(*points));
    }
    let mcq_row = regraded.iter().find(|a| a.id == mcq).unwrap();
    assert_eq!(mcq_row.is_correct, Some(false));

    // 负分截断为 0
    let (_, second_log) = wf
        .recheck_grades(
            submission_id,
            &fx.professor,
            RecheckGradesRequest {
                answers: vec![
                    regrade(mcq, true, 1.0),
                    regrade(second, true, -4.0),
                    regrade(third, true, 3.0),
                ],
                notes: Some("   ".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(second_log.previous_score, Some(4.5));
    assert_eq!(second_log.new_score, 4.0);
    assert_eq!(second_log.notes, None);

    let stored = fx
        .storage
        .get_submission_by_id(submission_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.score, Some(4.0));

    let history = wf.history(submission_id, &fx.professor).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, second_log.id);
    assert_eq!(history[1].id, first_log.id);

    let history_denied = wf.history(submission_id, &fx.student).await;
    assert!(matches!(
        history_denied,
        Err(ExamSystemError::Authorization(_))
    ));

    let updates: Vec<_> = sink
        .sent()
        .into_iter()
        .filter(|n| n.kind == NotificationType::GradeUpdated)
        .collect();
    assert_eq!(updates.len(), 2);
    assert_eq!(updates[0].user_id, fx.student.id);
    assert!(!updates[0].message.is_empty());
    assert_eq!(updates[0].metadata["previous_score"], json!(1.0));
    assert_eq!(updates[0].metadata["new_score"], json!(4.5));
}

#[tokio::test]
async fn notification_failures_keep_committed_changes() {
    let fx = setup(None).await;
    let (wf, _) = workflow(&fx);
    let submission_id = submit_with(&fx, &wf, &[(2, "Paris")]).await;
    let ids = answer_ids(&fx, submission_id).await;

    let failing = workflow_with(&fx, Arc::new(FailingNotificationSink), Arc::new(SystemClockPolicy));

    failing
        .request_recheck(fx.exam.id, &fx.student, "check question 1")
        .await
        .unwrap();
    let requested = fx
        .storage
        .get_submission_by_id(submission_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(requested.status, SubmissionStatus::RecheckRequested);

    let rechecking = failing
        .begin_recheck(submission_id, &fx.professor)
        .await
        .unwrap();
    assert_eq!(rechecking.status, SubmissionStatus::Rechecking);

    let (regraded, log_entry) = failing
        .recheck_grades(
            submission_id,
            &fx.professor,
            RecheckGradesRequest {
                answers: vec![
                    regrade(ids[0], true, 1.0),
                    regrade(ids[1], false, 0.0),
                    regrade(ids[2], true, 3.0),
                ],
                notes: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(regraded.score, Some(4.0));

    let completed = failing
        .complete_recheck(submission_id, &fx.professor)
        .await
        .unwrap();
    assert_eq!(completed.status, SubmissionStatus::RecheckCompleted);

    let stored = fx
        .storage
        .get_submission_by_id(submission_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.score, Some(4.0));
    assert_eq!(stored.status, SubmissionStatus::RecheckCompleted);
    let history = fx
        .storage
        .list_grade_change_logs(submission_id)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, log_entry.id);
    let latest = fx
        .storage
        .get_latest_recheck_request(submission_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(latest.status, RecheckRequestStatus::Completed);
}

#[tokio::test]
async fn result_views_respect_ownership() {
    let fx = setup(None).await;
    let (wf, _) = workflow(&fx);
    let submission_id = submit_with(&fx, &wf, &[(2, "Paris")]).await;

    let mine = wf.my_result(fx.exam.id, &fx.student).await.unwrap();
    assert_eq!(mine.submission.id, submission_id);
    assert_eq!(mine.answers.len(), 3);
    assert!(mine.recheck_request.is_none());

    let missing = wf.my_result(fx.exam.id, &fx.other_student).await;
    assert!(matches!(missing, Err(ExamSystemError::NotFound(_))));

    assert!(wf.submission_detail(submission_id, &fx.student).await.is_ok());
    assert!(
        wf.submission_detail(submission_id, &fx.professor)
            .await
            .is_ok()
    );
    let denied = wf.submission_detail(submission_id, &fx.other_student).await;
    assert!(matches!(denied, Err(ExamSystemError::Authorization(_))));
}

#[tokio::test]
async fn storage_sink_persists_notifications() {
    let fx = setup(None).await;
    let sink = StorageNotificationSink::new(fx.storage.clone());

    sink.notify(
        fx.student.id,
        NotificationType::GradeUpdated,
        "Midterm score updated".to_string(),
        json!({"exam_id": fx.exam.id, "submission_id": 42, "new_score": 5.0}),
    )
    .await
    .unwrap();

    let listed = fx
        .storage
        .list_notifications_with_pagination(fx.student.id, NotificationListQuery::default())
        .await
        .unwrap();
    assert_eq!(listed.items.len(), 1);
    let notification = &listed.items[0];
    assert_eq!(notification.notification_type, NotificationType::GradeUpdated);
    assert_eq!(notification.reference_id, Some(42));
    assert!(!notification.is_read);

    // 只能标记自己的通知
    assert!(
        !fx.storage
            .mark_notification_as_read(notification.id, fx.professor.id)
            .await
            .unwrap()
    );
    assert!(
        fx.storage
            .mark_notification_as_read(notification.id, fx.student.id)
            .await
            .unwrap()
    );

    let unread = fx
        .storage
        .list_notifications_with_pagination(
            fx.student.id,
            NotificationListQuery {
                unread_only: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(unread.items.is_empty());
}
