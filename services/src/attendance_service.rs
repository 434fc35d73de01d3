//! Attendance ledger: batch marking, soft delete, restore and scoped reads.
//!
//! Every write is one storage statement inside an explicit transaction, so a
//! batch either lands or changes nothing. The one-active-mark-per-slot rule is
//! left to the `ux_att_rec_active_slot` index; violations come back from the
//! store and are mapped to [`ServiceError::Conflict`].

use crate::caller::{Caller, Role};
use crate::error::{ServiceError, ServiceResult, classify_write_err};
use chrono::{DateTime, NaiveDate, Utc};
use common::csv;
use db::models::{
    attendance_record::{self, AttendanceStatus},
    student, subject, user,
};
use sea_orm::sea_query::{Expr, Query, SelectStatement};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
    TransactionTrait,
};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;
use uuid::Uuid;

const SLOT_TAKEN: &str = "Attendance already marked for this subject, date and period";

/// One mark in a create request.
#[derive(Debug, Clone)]
pub struct NewMark {
    pub student_id: i64,
    pub subject_id: i64,
    /// Defaults to today (UTC).
    pub date: Option<NaiveDate>,
    pub session: i32,
    pub status: String,
}

/// A create request. Every mark shares the batch's semester and section.
#[derive(Debug, Clone)]
pub struct CreateBatch {
    pub semester: String,
    pub section: String,
    pub items: Vec<NewMark>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchCreated {
    pub created_count: u64,
    pub session_id: String,
}

/// An attendance row joined with the names a client needs to display it.
#[derive(Debug, Clone, PartialEq, Serialize, FromQueryResult)]
pub struct RecordDetail {
    pub id: i64,
    pub student: i64,
    pub student_name: String,
    pub register_number: String,
    pub subject: i64,
    pub subject_name: String,
    pub date: NaiveDate,
    pub session: i32,
    pub status: AttendanceStatus,
    pub semester: String,
    pub section: String,
    pub session_id: String,
    pub is_deleted: bool,
    /// Username of the user who took the mark.
    pub recorded_by: String,
    pub timestamp: DateTime<Utc>,
}

/// Rejects anything that is not a hyphenated UUID.
pub fn parse_session_id(raw: &str) -> ServiceResult<String> {
    Uuid::parse_str(raw.trim())
        .map(|id| id.to_string())
        .map_err(|_| ServiceError::Validation(format!("Invalid session id '{raw}'")))
}

/// `SELECT id FROM subjects WHERE teacher_id = ?`
pub(crate) fn owned_subject_ids(teacher_id: i64) -> SelectStatement {
    Query::select()
        .column(subject::Column::Id)
        .from(subject::Entity)
        .and_where(subject::Column::TeacherId.eq(teacher_id))
        .to_owned()
}

/// Rows the caller may see: a teacher sees marks for the subjects they own, a
/// student sees their own marks, anyone else sees nothing.
fn visible_to(caller: &Caller) -> Option<Condition> {
    match &caller.role {
        Role::Teacher(t) => Some(
            Condition::all()
                .add(attendance_record::Column::SubjectId.in_subquery(owned_subject_ids(t.id))),
        ),
        Role::Student(s) => {
            Some(Condition::all().add(attendance_record::Column::StudentId.eq(s.id)))
        }
        Role::Unknown => None,
    }
}

fn detail_select() -> Select<attendance_record::Entity> {
    use attendance_record::{Column, Entity, Relation};

    Entity::find()
        .select_only()
        .column(Column::Id)
        .column_as(Column::StudentId, "student")
        .column_as(student::Column::FullName, "student_name")
        .column(student::Column::RegisterNumber)
        .column_as(Column::SubjectId, "subject")
        .column_as(subject::Column::Name, "subject_name")
        .column(Column::Date)
        .column(Column::Session)
        .column(Column::Status)
        .column(Column::Semester)
        .column(Column::Section)
        .column(Column::SessionId)
        .column(Column::IsDeleted)
        .column_as(user::Column::Username, "recorded_by")
        .column(Column::Timestamp)
        .join(JoinType::InnerJoin, Relation::Student.def())
        .join(JoinType::InnerJoin, Relation::Subject.def())
        .join(JoinType::InnerJoin, Relation::Recorder.def())
        .filter(Column::IsDeleted.eq(false))
}

/// Validates and inserts a batch of marks under one fresh session id.
///
/// All marks are inserted in a single statement inside a transaction. If any of
/// them lands on an occupied slot, including a slot repeated inside the batch,
/// nothing is written and a `Conflict` is returned.
pub async fn create_batch(
    db: &DatabaseConnection,
    caller: &Caller,
    batch: CreateBatch,
) -> ServiceResult<BatchCreated> {
    let teacher = caller.require_teacher()?;

    let semester = batch.semester.trim().to_owned();
    let section = batch.section.trim().to_owned();
    if semester.is_empty() || section.is_empty() {
        return Err(ServiceError::Validation(
            "semester and section are required".into(),
        ));
    }
    if batch.items.is_empty() {
        return Err(ServiceError::Validation(
            "At least one attendance entry is required".into(),
        ));
    }

    let today = Utc::now().date_naive();
    let mut parsed = Vec::with_capacity(batch.items.len());
    for (idx, item) in batch.items.iter().enumerate() {
        let status = AttendanceStatus::from_str(item.status.trim()).map_err(|_| {
            ServiceError::Validation(format!(
                "Entry {idx}: status must be Present or Absent, got '{}'",
                item.status
            ))
        })?;
        if item.session < 1 {
            return Err(ServiceError::Validation(format!(
                "Entry {idx}: session must be 1 or greater"
            )));
        }
        parsed.push((item, item.date.unwrap_or(today), status));
    }

    let student_ids: BTreeSet<i64> = batch.items.iter().map(|i| i.student_id).collect();
    let found: BTreeSet<i64> = student::Entity::find()
        .select_only()
        .column(student::Column::Id)
        .filter(student::Column::Id.is_in(student_ids.iter().copied()))
        .into_tuple::<i64>()
        .all(db)
        .await?
        .into_iter()
        .collect();
    if let Some(missing) = student_ids.difference(&found).next() {
        return Err(ServiceError::Validation(format!(
            "Student {missing} does not exist"
        )));
    }

    let subject_ids: BTreeSet<i64> = batch.items.iter().map(|i| i.subject_id).collect();
    let subjects: HashMap<i64, subject::Model> = subject::Entity::find()
        .filter(subject::Column::Id.is_in(subject_ids.iter().copied()))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();
    for id in &subject_ids {
        match subjects.get(id) {
            None => {
                return Err(ServiceError::Validation(format!(
                    "Subject {id} does not exist"
                )));
            }
            Some(s) if !s.is_owned_by(teacher.id) => {
                tracing::warn!(
                    user_id = caller.user_id,
                    subject_id = id,
                    "attempt to mark attendance for a subject owned by someone else"
                );
                return Err(ServiceError::Forbidden(format!(
                    "You do not teach subject {}",
                    s.code
                )));
            }
            Some(_) => {}
        }
    }

    let session_id = Uuid::new_v4().to_string();
    let now = Utc::now();
    let rows = parsed.into_iter().map(|(item, date, status)| {
        attendance_record::ActiveModel {
            student_id: Set(item.student_id),
            subject_id: Set(item.subject_id),
            date: Set(date),
            session: Set(item.session),
            status: Set(status),
            semester: Set(semester.clone()),
            section: Set(section.clone()),
            recorded_by: Set(caller.user_id),
            timestamp: Set(now),
            session_id: Set(session_id.clone()),
            is_deleted: Set(false),
            deleted_at: Set(None),
            ..Default::default()
        }
    });

    let txn = db.begin().await?;
    let created = match attendance_record::Entity::insert_many(rows)
        .exec_without_returning(&txn)
        .await
    {
        Ok(n) => n,
        Err(e) => {
            txn.rollback().await?;
            let err = classify_write_err(e, SLOT_TAKEN);
            tracing::warn!(user_id = caller.user_id, error = %err, "attendance batch rejected");
            return Err(err);
        }
    };
    txn.commit().await?;

    tracing::info!(
        user_id = caller.user_id,
        session_id = %session_id,
        created,
        "attendance batch recorded"
    );

    Ok(BatchCreated {
        created_count: created,
        session_id,
    })
}

/// Soft-deletes one active mark on a subject the caller owns.
pub async fn soft_delete_record(
    db: &DatabaseConnection,
    caller: &Caller,
    record_id: i64,
) -> ServiceResult<()> {
    use attendance_record::{Column, Entity};

    let teacher = caller.require_teacher()?;

    let res = Entity::update_many()
        .col_expr(Column::IsDeleted, Expr::value(true))
        .col_expr(Column::DeletedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(record_id))
        .filter(Column::IsDeleted.eq(false))
        .filter(Column::SubjectId.in_subquery(owned_subject_ids(teacher.id)))
        .exec(db)
        .await?;

    if res.rows_affected == 0 {
        return Err(ServiceError::NotFound("Attendance record not found".into()));
    }

    tracing::info!(user_id = caller.user_id, record_id, "attendance record deleted");
    Ok(())
}

/// Soft-deletes every active mark of a session on the caller's subjects.
/// Returns the number of marks deleted.
pub async fn soft_delete_session(
    db: &DatabaseConnection,
    caller: &Caller,
    session_id: &str,
) -> ServiceResult<u64> {
    use attendance_record::{Column, Entity};

    let teacher = caller.require_teacher()?;
    let session_id = parse_session_id(session_id)?;

    let txn = db.begin().await?;
    let res = Entity::update_many()
        .col_expr(Column::IsDeleted, Expr::value(true))
        .col_expr(Column::DeletedAt, Expr::value(Utc::now()))
        .filter(Column::SessionId.eq(session_id.as_str()))
        .filter(Column::IsDeleted.eq(false))
        .filter(Column::SubjectId.in_subquery(owned_subject_ids(teacher.id)))
        .exec(&txn)
        .await?;

    if res.rows_affected == 0 {
        txn.rollback().await?;
        return Err(ServiceError::NotFound("Session not found".into()));
    }
    txn.commit().await?;

    tracing::info!(
        user_id = caller.user_id,
        session_id = %session_id,
        affected = res.rows_affected,
        "attendance session deleted"
    );
    Ok(res.rows_affected)
}

/// Reactivates every soft-deleted mark of a session on the caller's subjects.
///
/// If any of them would collide with a mark recorded after the deletion, the
/// restore fails as a whole with `Conflict` and nothing changes.
pub async fn restore_session(
    db: &DatabaseConnection,
    caller: &Caller,
    session_id: &str,
) -> ServiceResult<u64> {
    use attendance_record::{Column, Entity};

    let teacher = caller.require_teacher()?;
    let session_id = parse_session_id(session_id)?;

    let txn = db.begin().await?;
    let res = match Entity::update_many()
        .col_expr(Column::IsDeleted, Expr::value(false))
        .col_expr(Column::DeletedAt, Expr::value(None::<DateTime<Utc>>))
        .filter(Column::SessionId.eq(session_id.as_str()))
        .filter(Column::IsDeleted.eq(true))
        .filter(Column::SubjectId.in_subquery(owned_subject_ids(teacher.id)))
        .exec(&txn)
        .await
    {
        Ok(res) => res,
        Err(e) => {
            txn.rollback().await?;
            let err = classify_write_err(
                e,
                "Cannot restore session: a newer mark occupies one of its slots",
            );
            tracing::warn!(user_id = caller.user_id, session_id = %session_id, error = %err, "restore rejected");
            return Err(err);
        }
    };

    if res.rows_affected == 0 {
        txn.rollback().await?;
        return Err(ServiceError::NotFound("No deleted session found".into()));
    }
    txn.commit().await?;

    tracing::info!(
        user_id = caller.user_id,
        session_id = %session_id,
        restored = res.rows_affected,
        "attendance session restored"
    );
    Ok(res.rows_affected)
}

/// Active marks of one session that the caller may see.
pub async fn list_by_session(
    db: &DatabaseConnection,
    caller: &Caller,
    session_id: &str,
) -> ServiceResult<Vec<RecordDetail>> {
    let session_id = parse_session_id(session_id)?;
    let not_found = || ServiceError::NotFound("No attendance found for this session".into());
    let scope = visible_to(caller).ok_or_else(not_found)?;

    let records = detail_select()
        .filter(attendance_record::Column::SessionId.eq(session_id))
        .filter(scope)
        .order_by_asc(attendance_record::Column::Id)
        .into_model::<RecordDetail>()
        .all(db)
        .await?;

    if records.is_empty() {
        return Err(not_found());
    }
    Ok(records)
}

/// Every active mark the caller may see, newest first.
pub async fn list_for_caller(
    db: &DatabaseConnection,
    caller: &Caller,
) -> ServiceResult<Vec<RecordDetail>> {
    let Some(scope) = visible_to(caller) else {
        return Ok(Vec::new());
    };

    let records = detail_select()
        .filter(scope)
        .order_by_desc(attendance_record::Column::Date)
        .order_by_desc(attendance_record::Column::Session)
        .order_by_asc(attendance_record::Column::Id)
        .into_model::<RecordDetail>()
        .all(db)
        .await?;
    Ok(records)
}

pub async fn get_record<C>(db: &C, caller: &Caller, record_id: i64) -> ServiceResult<RecordDetail>
where
    C: ConnectionTrait,
{
    let not_found = || ServiceError::NotFound("Attendance record not found".into());
    let scope = visible_to(caller).ok_or_else(not_found)?;

    detail_select()
        .filter(attendance_record::Column::Id.eq(record_id))
        .filter(scope)
        .into_model::<RecordDetail>()
        .one(db)
        .await?
        .ok_or_else(not_found)
}

/// Renders a session as CSV, one line per active mark.
pub async fn export_session_csv(
    db: &DatabaseConnection,
    caller: &Caller,
    session_id: &str,
) -> ServiceResult<String> {
    let records = list_by_session(db, caller, session_id).await?;

    let mut out = csv::write_row([
        "register_number",
        "student_name",
        "subject",
        "date",
        "session",
        "semester",
        "section",
        "status",
        "recorded_by",
    ]);
    for r in &records {
        out.push_str(&csv::write_row([
            r.register_number.as_str(),
            r.student_name.as_str(),
            r.subject_name.as_str(),
            &r.date.to_string(),
            &r.session.to_string(),
            r.semester.as_str(),
            r.section.as_str(),
            &r.status.to_string(),
            r.recorded_by.as_str(),
        ]));
    }
    Ok(out)
}
