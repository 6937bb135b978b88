//! 截止时间判断

use chrono::{DateTime, Utc};

use crate::models::exams::entities::Exam;

/// 学生修改答案或交卷前调用
pub trait DueDatePolicy: Send + Sync {
    fn is_past_due(&self, exam: &Exam) -> bool;
}

/// 以系统时间为准；没有截止时间的考试永不过期
pub struct SystemClockPolicy;

impl DueDatePolicy for SystemClockPolicy {
    fn is_past_due(&self, exam: &Exam) -> bool {
        exam.due_date.is_some_and(|due| Utc::now() > due)
    }
}

/// 固定“当前时间”
pub struct FixedClockPolicy {
    pub now: DateTime<Utc>,
}

impl DueDatePolicy for FixedClockPolicy {
    fn is_past_due(&self, exam: &Exam) -> bool {
        exam.due_date.is_some_and(|due| self.now > due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::exams::entities::ExamStatus;
    use chrono::Duration;

    fn exam(due_date: Option<DateTime<Utc>>) -> Exam {
        let now = Utc::now();
        Exam {
            id: 1,
            course_id: 1,
            created_by: 1,
            title: "midterm".into(),
            description: None,
            status: ExamStatus::Published,
            due_date,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_no_due_date_never_expires() {
        assert!(!SystemClockPolicy.is_past_due(&exam(None)));
    }

    #[test]
    fn test_system_clock() {
        let past = Utc::now() - Duration::hours(1);
        let future = Utc::now() + Duration::hours(1);
        assert!(SystemClockPolicy.is_past_due(&exam(Some(past))));
        assert!(!SystemClockPolicy.is_past_due(&exam(Some(future))));
    }

    #[test]
    fn test_fixed_clock_boundary() {
        let due = Utc::now();
        let at_due = FixedClockPolicy { now: due };
        assert!(!at_due.is_past_due(&exam(Some(due))));
        let after = FixedClockPolicy {
            now: due + Duration::seconds(1),
        };
        assert!(after.is_past_due(&exam(Some(due))));
    }
}
