//! Subject and roster registry: subject CRUD for their owning teacher, the
//! teacher's class roster, and bulk student import from a CSV or Excel file.

use crate::caller::Caller;
use crate::error::{ServiceError, ServiceResult, classify_write_err};
use common::{csv, spreadsheet};
use db::models::{student, subject, user};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, ModelTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use serde::Serialize;
use std::collections::HashMap;

const SUBJECT_TAKEN: &str = "A subject with this name or code already exists";

/// Columns every roster file must carry.
pub const ROSTER_COLUMNS: [&str; 6] = [
    "register_number",
    "full_name",
    "department",
    "semester",
    "year",
    "section",
];

#[derive(Debug, Clone)]
pub struct SubjectInput {
    pub name: String,
    pub code: String,
    pub sections: Vec<String>,
    pub department: Option<String>,
    pub semester: Option<String>,
}

/// Partial update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct SubjectChanges {
    pub name: Option<String>,
    pub code: Option<String>,
    pub sections: Option<Vec<String>>,
    pub department: Option<String>,
    pub semester: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeacherProfile {
    pub id: i64,
    pub department: Option<String>,
    pub user: user::Model,
    pub subjects: Vec<subject::Model>,
}

#[derive(Debug, Clone, Default)]
pub struct RosterQuery {
    pub subject_id: Option<i64>,
    pub semester: Option<String>,
    pub section: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportOutcome {
    pub processed: u64,
    pub created_users: u64,
    pub created_students: u64,
}

fn required(value: &str, field: &str) -> ServiceResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServiceError::Validation(format!("{field} is required")));
    }
    Ok(value.to_owned())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Subjects owned by the caller. Callers without a teacher profile own nothing.
pub async fn list_subjects(
    db: &DatabaseConnection,
    caller: &Caller,
) -> ServiceResult<Vec<subject::Model>> {
    match caller.teacher() {
        Some(t) => Ok(subject::Model::owned_by(db, t.id).await?),
        None => Ok(Vec::new()),
    }
}

pub async fn get_subject(
    db: &DatabaseConnection,
    caller: &Caller,
    subject_id: i64,
) -> ServiceResult<subject::Model> {
    let not_found = || ServiceError::NotFound("Subject not found".into());
    let teacher = caller.teacher().ok_or_else(not_found)?;

    subject::Entity::find_by_id(subject_id)
        .filter(subject::Column::TeacherId.eq(teacher.id))
        .one(db)
        .await?
        .ok_or_else(not_found)
}

pub async fn create_subject(
    db: &DatabaseConnection,
    caller: &Caller,
    input: SubjectInput,
) -> ServiceResult<subject::Model> {
    let teacher = caller.require_teacher()?;
    let name = required(&input.name, "name")?;
    let code = required(&input.code, "code")?;
    let department = non_blank(input.department).or_else(|| teacher.department.clone());
    let semester = non_blank(input.semester);

    let created = subject::Model::create(
        db,
        &name,
        &code,
        &input.sections,
        Some(teacher.id),
        department.as_deref(),
        semester.as_deref(),
    )
    .await
    .map_err(|e| classify_write_err(e, SUBJECT_TAKEN))?;

    tracing::info!(user_id = caller.user_id, subject_id = created.id, code = %created.code, "subject created");
    Ok(created)
}

pub async fn update_subject(
    db: &DatabaseConnection,
    caller: &Caller,
    subject_id: i64,
    changes: SubjectChanges,
) -> ServiceResult<subject::Model> {
    caller.require_teacher()?;
    let existing = get_subject(db, caller, subject_id).await?;

    let mut active: subject::ActiveModel = existing.into();
    if let Some(name) = changes.name {
        active.name = Set(required(&name, "name")?);
    }
    if let Some(code) = changes.code {
        active.code = Set(required(&code, "code")?);
    }
    if let Some(sections) = changes.sections {
        active.sections = Set(subject::sections_json(&sections));
    }
    if changes.department.is_some() {
        active.department = Set(non_blank(changes.department));
    }
    if changes.semester.is_some() {
        active.semester = Set(non_blank(changes.semester));
    }

    active
        .update(db)
        .await
        .map_err(|e| classify_write_err(e, SUBJECT_TAKEN))
}

/// Deletes an owned subject. Its attendance marks and enrolments go with it.
pub async fn delete_subject(
    db: &DatabaseConnection,
    caller: &Caller,
    subject_id: i64,
) -> ServiceResult<()> {
    caller.require_teacher()?;
    let existing = get_subject(db, caller, subject_id).await?;
    existing.delete(db).await?;

    tracing::info!(user_id = caller.user_id, subject_id, "subject deleted");
    Ok(())
}

pub async fn teacher_profile(
    db: &DatabaseConnection,
    caller: &Caller,
) -> ServiceResult<TeacherProfile> {
    let teacher = caller.teacher_profile()?;
    let user = user::Entity::find_by_id(teacher.user_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Teacher profile not found".into()))?;
    let subjects = subject::Model::owned_by(db, teacher.id).await?;

    Ok(TeacherProfile {
        id: teacher.id,
        department: teacher.department.clone(),
        user,
        subjects,
    })
}

/// Students a teacher may mark for one of their subjects.
///
/// The subject must belong to the teacher in the requested semester and must
/// declare the requested section; anything else is a validation error rather
/// than an empty roster.
pub async fn students_for_teacher(
    db: &DatabaseConnection,
    caller: &Caller,
    query: RosterQuery,
) -> ServiceResult<Vec<student::Model>> {
    let teacher = caller.teacher_profile()?;

    let semester = non_blank(query.semester);
    let section = non_blank(query.section);
    let (Some(semester), Some(section)) = (semester, section) else {
        return Err(ServiceError::Validation(
            "section and semester are required".into(),
        ));
    };

    let invalid_subject = || ServiceError::Validation("Invalid subject for this teacher".into());
    let subject_id = query.subject_id.ok_or_else(invalid_subject)?;
    let subject = subject::Entity::find_by_id(subject_id)
        .filter(subject::Column::TeacherId.eq(teacher.id))
        .filter(subject::Column::Semester.eq(semester.as_str()))
        .one(db)
        .await?
        .ok_or_else(invalid_subject)?;

    if !subject.covers_section(&section) {
        return Err(ServiceError::Validation(
            "Teacher does not handle this section for the subject".into(),
        ));
    }

    let Some(department) = teacher.department.as_deref() else {
        return Ok(Vec::new());
    };

    let students = student::Entity::find()
        .filter(student::Column::Department.eq(department))
        .filter(student::Column::Semester.eq(semester))
        .filter(student::Column::Section.eq(section))
        .order_by_asc(student::Column::RegisterNumber)
        .all(db)
        .await?;
    Ok(students)
}

/// Splits an uploaded roster into a header and rows. Workbooks (`.xlsx`,
/// `.xls`, `.ods`) are read from their first sheet; anything else must be
/// UTF-8 CSV.
pub fn read_roster_file(bytes: &[u8]) -> ServiceResult<(Vec<String>, Vec<Vec<String>>)> {
    let table = if spreadsheet::is_workbook(bytes) {
        spreadsheet::parse_first_sheet(bytes).map_err(|e| {
            tracing::warn!(error = %e, "unreadable roster workbook");
            ServiceError::Validation("Uploaded workbook could not be read".into())
        })?
    } else {
        let text = std::str::from_utf8(bytes).map_err(|_| {
            ServiceError::Validation("Uploaded file must be an Excel workbook or UTF-8 CSV".into())
        })?;
        csv::parse_document(text)
    };
    table.ok_or_else(|| ServiceError::Validation("Uploaded file is empty".into()))
}

/// Imports a roster file. Users and students are created only when absent;
/// a new user gets the register number as both username and password.
///
/// The whole file is one transaction: a bad row leaves the registry untouched.
pub async fn import_roster(
    db: &DatabaseConnection,
    caller: &Caller,
    file: &[u8],
) -> ServiceResult<ImportOutcome> {
    caller.require_teacher()?;

    let (header, rows) = read_roster_file(file)?;
    let index: HashMap<&str, usize> = header
        .iter()
        .enumerate()
        .map(|(i, h)| (h.as_str(), i))
        .collect();
    for column in ROSTER_COLUMNS {
        if !index.contains_key(column) {
            return Err(ServiceError::Validation(format!(
                "Missing column '{column}'"
            )));
        }
    }

    let txn = db.begin().await?;
    let outcome = match import_rows(&txn, &index, &rows).await {
        Ok(outcome) => outcome,
        Err(e) => {
            txn.rollback().await?;
            tracing::warn!(user_id = caller.user_id, error = %e, "roster import rejected");
            return Err(e);
        }
    };
    txn.commit().await?;

    tracing::info!(
        user_id = caller.user_id,
        processed = outcome.processed,
        created_users = outcome.created_users,
        created_students = outcome.created_students,
        "roster imported"
    );
    Ok(outcome)
}

async fn import_rows(
    txn: &DatabaseTransaction,
    index: &HashMap<&str, usize>,
    rows: &[Vec<String>],
) -> ServiceResult<ImportOutcome> {
    let cell = |row: &Vec<String>, column: &str| -> Option<String> {
        index
            .get(column)
            .and_then(|&i| row.get(i))
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
    };

    let mut outcome = ImportOutcome::default();

    for (n, row) in rows.iter().enumerate() {
        let line = n + 2;
        let need = |column: &str| {
            cell(row, column).ok_or_else(|| {
                ServiceError::Validation(format!("Row {line}: {column} is required"))
            })
        };
        let register_number = need("register_number")?;
        let full_name = need("full_name")?;

        let account = match user::Model::find_by_username(txn, &register_number).await? {
            Some(u) => u,
            None => {
                outcome.created_users += 1;
                user::Model::create(
                    txn,
                    &register_number,
                    None,
                    Some(&full_name),
                    &register_number,
                    false,
                )
                .await?
            }
        };

        if student::Model::find_by_register_number(txn, &register_number)
            .await?
            .is_none()
        {
            student::Model::create(
                txn,
                student::NewStudent {
                    user_id: account.id,
                    full_name,
                    register_number: register_number.clone(),
                    roll_number: cell(row, "roll_number"),
                    department: need("department")?,
                    semester: need("semester")?,
                    year: cell(row, "year"),
                    section: need("section")?,
                    course: cell(row, "course"),
                },
            )
            .await
            .map_err(|e| {
                classify_write_err(
                    e,
                    &format!("Row {line}: student {register_number} clashes with an existing profile"),
                )
            })?;
            outcome.created_students += 1;
        }

        outcome.processed += 1;
    }

    Ok(outcome)
}
