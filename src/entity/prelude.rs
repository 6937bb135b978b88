//! 预导入模块，方便使用

pub use super::exam_questions::{
    ActiveModel as ExamQuestionActiveModel, Entity as ExamQuestions, Model as ExamQuestionModel,
};
pub use super::exam_recheck_requests::{
    ActiveModel as ExamRecheckRequestActiveModel, Entity as ExamRecheckRequests,
    Model as ExamRecheckRequestModel,
};
pub use super::exam_submissions::{
    ActiveModel as ExamSubmissionActiveModel, Entity as ExamSubmissions,
    Model as ExamSubmissionModel,
};
pub use super::exams::{ActiveModel as ExamActiveModel, Entity as Exams, Model as ExamModel};
pub use super::grade_change_logs::{
    ActiveModel as GradeChangeLogActiveModel, Entity as GradeChangeLogs,
    Model as GradeChangeLogModel,
};
pub use super::notifications::{
    ActiveModel as NotificationActiveModel, Entity as Notifications, Model as NotificationModel,
};
pub use super::student_answers::{
    ActiveModel as StudentAnswerActiveModel, Entity as StudentAnswers,
    Model as StudentAnswerModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
