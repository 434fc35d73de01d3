//! Read-only aggregates over the ledger. Only active marks are counted, except
//! in [`teacher_deleted_sessions`] which lists what can still be restored.

use crate::attendance_service::owned_subject_ids;
use crate::caller::Caller;
use crate::error::{ServiceError, ServiceResult};
use chrono::NaiveDate;
use db::models::{attendance_record, student, subject};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Select,
};
use serde::Serialize;

const PRESENT_SUM: &str =
    "SUM(CASE WHEN attendance_records.status = 'Present' THEN 1 ELSE 0 END)";
const ABSENT_SUM: &str = "SUM(CASE WHEN attendance_records.status = 'Absent' THEN 1 ELSE 0 END)";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentSummary {
    pub student_id: i64,
    pub name: String,
    pub total: i64,
    pub present: i64,
    pub percentage: f64,
}

/// A soft-deleted batch, grouped for undo.
#[derive(Debug, Clone, PartialEq, Serialize, FromQueryResult)]
pub struct DeletedSession {
    pub session_id: String,
    pub date: NaiveDate,
    pub subject_name: String,
    pub session: i32,
    pub semester: String,
    pub section: String,
    pub total: i64,
}

/// Present/absent counts for one active batch.
#[derive(Debug, Clone, PartialEq, Serialize, FromQueryResult)]
pub struct SessionSummary {
    pub session_id: String,
    pub date: NaiveDate,
    pub subject_name: String,
    pub session: i32,
    pub semester: String,
    pub section: String,
    pub total: i64,
    pub present: i64,
    pub absent: i64,
}

#[derive(Debug, FromQueryResult)]
struct Counts {
    total: i64,
    present: Option<i64>,
}

/// `present / total * 100` to two decimals; zero when there is nothing to count.
pub fn percentage(present: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    (present as f64 * 100.0 / total as f64 * 100.0).round() / 100.0
}

/// Total, present and percentage for one student, computed in one query.
pub async fn attendance_counts<C>(db: &C, student_id: i64) -> ServiceResult<(i64, i64, f64)>
where
    C: ConnectionTrait,
{
    use attendance_record::{Column, Entity};

    let counts = Entity::find_active()
        .select_only()
        .column_as(Expr::col((Entity, Column::Id)).count(), "total")
        .column_as(Expr::cust(PRESENT_SUM), "present")
        .filter(Column::StudentId.eq(student_id))
        .into_model::<Counts>()
        .one(db)
        .await?;

    let (total, present) = counts
        .map(|c| (c.total, c.present.unwrap_or(0)))
        .unwrap_or((0, 0));
    Ok((total, present, percentage(present, total)))
}

/// Summary for `student_id`. Students may only see their own.
pub async fn student_summary<C>(
    db: &C,
    caller: &Caller,
    student_id: i64,
) -> ServiceResult<StudentSummary>
where
    C: ConnectionTrait,
{
    let student = match caller.student() {
        Some(s) if s.id == student_id => s.clone(),
        _ => {
            return Err(ServiceError::NotFound("Student not found".into()));
        }
    };

    let (total, present, percentage) = attendance_counts(db, student.id).await?;
    Ok(StudentSummary {
        student_id: student.id,
        name: student.full_name,
        total,
        present,
        percentage,
    })
}

/// Marks on the teacher's subjects, joined with the subject for its name and
/// grouped by batch, day, subject and period.
fn grouped_by_batch(teacher_id: i64, deleted: bool) -> Select<attendance_record::Entity> {
    use attendance_record::{Column, Entity, Relation};

    Entity::find()
        .select_only()
        .column(Column::SessionId)
        .column(Column::Date)
        .column_as(subject::Column::Name, "subject_name")
        .column(Column::Session)
        .join(JoinType::InnerJoin, Relation::Subject.def())
        .filter(Column::IsDeleted.eq(deleted))
        .filter(Column::SubjectId.in_subquery(owned_subject_ids(teacher_id)))
        .group_by(Column::SessionId)
        .group_by(Column::Date)
        .group_by(subject::Column::Name)
        .group_by(Column::Session)
        .order_by_desc(Column::Date)
        .order_by_desc(Column::Session)
}

/// Deleted batches on the teacher's subjects, newest first.
pub async fn teacher_deleted_sessions<C>(
    db: &C,
    caller: &Caller,
) -> ServiceResult<Vec<DeletedSession>>
where
    C: ConnectionTrait,
{
    use attendance_record::{Column, Entity};

    let teacher = caller.teacher_profile()?;

    let rows = grouped_by_batch(teacher.id, true)
        .column(Column::Semester)
        .column(Column::Section)
        .column_as(Expr::col((Entity, Column::Id)).count(), "total")
        .group_by(Column::Semester)
        .group_by(Column::Section)
        .into_model::<DeletedSession>()
        .all(db)
        .await?;
    Ok(rows)
}

/// Active batches on the teacher's subjects with present/absent counts, newest first.
///
/// Semester and section come from the snapshot stored on each mark, so the
/// report does not move when students change class.
pub async fn teacher_session_summary<C>(
    db: &C,
    caller: &Caller,
) -> ServiceResult<Vec<SessionSummary>>
where
    C: ConnectionTrait,
{
    use attendance_record::{Column, Entity};

    let teacher = caller.teacher_profile()?;

    let rows = grouped_by_batch(teacher.id, false)
        .column(Column::Semester)
        .column(Column::Section)
        .column_as(Expr::col((Entity, Column::Id)).count(), "total")
        .column_as(Expr::cust(PRESENT_SUM), "present")
        .column_as(Expr::cust(ABSENT_SUM), "absent")
        .group_by(Column::Semester)
        .group_by(Column::Section)
        .into_model::<SessionSummary>()
        .all(db)
        .await?;
    Ok(rows)
}

/// The calling student's profile together with their attendance figures.
#[derive(Debug, Clone, Serialize)]
pub struct StudentOverview {
    #[serde(flatten)]
    pub student: student::Model,
    pub subjects: Vec<subject::Model>,
    pub total: i64,
    pub present: i64,
    pub attendance_percentage: f64,
}

pub async fn student_overview<C>(db: &C, caller: &Caller) -> ServiceResult<StudentOverview>
where
    C: ConnectionTrait,
{
    let student = caller.student_profile()?.clone();
    let subjects = student.subjects(db).await?;
    let (total, present, attendance_percentage) = attendance_counts(db, student.id).await?;

    Ok(StudentOverview {
        student,
        subjects,
        total,
        present,
        attendance_percentage,
    })
}
