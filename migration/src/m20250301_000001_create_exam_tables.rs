use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建用户表（由 LMS 同步，仅保留评分相关字段）
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(ColumnDef::new(Users::Status).string().not_null())
                    .col(ColumnDef::new(Users::DisplayName).string().null())
                    .col(ColumnDef::new(Users::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建考试表
        manager
            .create_table(
                Table::create()
                    .table(Exams::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Exams::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Exams::CourseId).big_integer().not_null())
                    .col(ColumnDef::new(Exams::CreatedBy).big_integer().not_null())
                    .col(ColumnDef::new(Exams::Title).string().not_null())
                    .col(ColumnDef::new(Exams::Description).text().null())
                    .col(ColumnDef::new(Exams::Status).string().not_null())
                    .col(ColumnDef::new(Exams::DueDate).big_integer().null())
                    .col(ColumnDef::new(Exams::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Exams::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Exams::Table, Exams::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建考试题目表
        manager
            .create_table(
                Table::create()
                    .table(ExamQuestions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExamQuestions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ExamQuestions::ExamId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExamQuestions::QuestionType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExamQuestions::Text).text().not_null())
                    .col(ColumnDef::new(ExamQuestions::Options).text().null())
                    .col(
                        ColumnDef::new(ExamQuestions::CorrectAnswer)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExamQuestions::AllowMultipleAnswers)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(ExamQuestions::Points).double().not_null())
                    .col(
                        ColumnDef::new(ExamQuestions::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ExamQuestions::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExamQuestions::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ExamQuestions::Table, ExamQuestions::ExamId)
                            .to(Exams::Table, Exams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建考试提交表
        manager
            .create_table(
                Table::create()
                    .table(ExamSubmissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExamSubmissions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ExamSubmissions::ExamId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExamSubmissions::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExamSubmissions::StartedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExamSubmissions::SubmittedAt)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(ExamSubmissions::Score).double().null())
                    .col(
                        ColumnDef::new(ExamSubmissions::TotalPoints)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(ExamSubmissions::IsGraded)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(ExamSubmissions::Status).string().not_null())
                    .col(
                        ColumnDef::new(ExamSubmissions::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ExamSubmissions::Table, ExamSubmissions::ExamId)
                            .to(Exams::Table, Exams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ExamSubmissions::Table, ExamSubmissions::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建学生答案表
        manager
            .create_table(
                Table::create()
                    .table(StudentAnswers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StudentAnswers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(StudentAnswers::SubmissionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentAnswers::QuestionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentAnswers::StudentAnswer)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(StudentAnswers::IsCorrect).boolean().null())
                    .col(
                        ColumnDef::new(StudentAnswers::PointsEarned)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(StudentAnswers::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StudentAnswers::Table, StudentAnswers::SubmissionId)
                            .to(ExamSubmissions::Table, ExamSubmissions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StudentAnswers::Table, StudentAnswers::QuestionId)
                            .to(ExamQuestions::Table, ExamQuestions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建成绩变更日志表（只追加）
        manager
            .create_table(
                Table::create()
                    .table(GradeChangeLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GradeChangeLogs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GradeChangeLogs::SubmissionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradeChangeLogs::ActorId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradeChangeLogs::PreviousScore)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(GradeChangeLogs::NewScore)
                            .double()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GradeChangeLogs::Notes).text().null())
                    .col(
                        ColumnDef::new(GradeChangeLogs::ChangedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GradeChangeLogs::Table, GradeChangeLogs::SubmissionId)
                            .to(ExamSubmissions::Table, ExamSubmissions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建复查申请表
        manager
            .create_table(
                Table::create()
                    .table(ExamRecheckRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExamRecheckRequests::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ExamRecheckRequests::SubmissionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExamRecheckRequests::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExamRecheckRequests::Reason).text().not_null())
                    .col(
                        ColumnDef::new(ExamRecheckRequests::Status)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExamRecheckRequests::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExamRecheckRequests::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ExamRecheckRequests::Table, ExamRecheckRequests::SubmissionId)
                            .to(ExamSubmissions::Table, ExamSubmissions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建索引
        // 每个学生每场考试只有一份提交
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_exam_submissions_exam_student")
                    .table(ExamSubmissions::Table)
                    .col(ExamSubmissions::ExamId)
                    .col(ExamSubmissions::StudentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 每份提交每道题只有一条答案（upsert 依赖此约束）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_student_answers_submission_question")
                    .table(StudentAnswers::Table)
                    .col(StudentAnswers::SubmissionId)
                    .col(StudentAnswers::QuestionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_exam_questions_exam_id")
                    .table(ExamQuestions::Table)
                    .col(ExamQuestions::ExamId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_grade_change_logs_submission_id")
                    .table(GradeChangeLogs::Table)
                    .col(GradeChangeLogs::SubmissionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_exam_recheck_requests_submission_id")
                    .table(ExamRecheckRequests::Table)
                    .col(ExamRecheckRequests::SubmissionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按照创建的相反顺序删除
        manager
            .drop_table(Table::drop().table(ExamRecheckRequests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GradeChangeLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StudentAnswers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExamSubmissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExamQuestions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Exams::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Username,
    Email,
    Role,
    Status,
    DisplayName,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Exams {
    #[sea_orm(iden = "exams")]
    Table,
    Id,
    CourseId,
    CreatedBy,
    Title,
    Description,
    Status,
    DueDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ExamQuestions {
    #[sea_orm(iden = "exam_questions")]
    Table,
    Id,
    ExamId,
    QuestionType,
    Text,
    Options,
    CorrectAnswer,
    AllowMultipleAnswers,
    Points,
    Position,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ExamSubmissions {
    #[sea_orm(iden = "exam_submissions")]
    Table,
    Id,
    ExamId,
    StudentId,
    StartedAt,
    SubmittedAt,
    Score,
    TotalPoints,
    IsGraded,
    Status,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum StudentAnswers {
    #[sea_orm(iden = "student_answers")]
    Table,
    Id,
    SubmissionId,
    QuestionId,
    StudentAnswer,
    IsCorrect,
    PointsEarned,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum GradeChangeLogs {
    #[sea_orm(iden = "grade_change_logs")]
    Table,
    Id,
    SubmissionId,
    ActorId,
    PreviousScore,
    NewScore,
    Notes,
    ChangedAt,
}

#[derive(DeriveIden)]
enum ExamRecheckRequests {
    #[sea_orm(iden = "exam_recheck_requests")]
    Table,
    Id,
    SubmissionId,
    StudentId,
    Reason,
    Status,
    CreatedAt,
    UpdatedAt,
}
