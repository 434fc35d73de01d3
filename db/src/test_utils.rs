//! Helpers for tests that need a migrated database and a few profiles to work with.

use crate::models::{student, subject, teacher, user};
use migration::Migrator;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory db");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Creates a user with a teacher profile in `department`.
pub async fn seed_teacher(
    db: &DatabaseConnection,
    username: &str,
    department: &str,
) -> (user::Model, teacher::Model) {
    let u = user::Model::create(db, username, None, Some(username), "password123", false)
        .await
        .expect("create teacher user");
    let t = teacher::Model::create(db, u.id, Some(department))
        .await
        .expect("create teacher profile");
    (u, t)
}

/// Creates a user with a student profile. The register number doubles as the username.
pub async fn seed_student(
    db: &DatabaseConnection,
    register_number: &str,
    department: &str,
    semester: &str,
    section: &str,
) -> (user::Model, student::Model) {
    let u = user::Model::create(db, register_number, None, None, "password123", false)
        .await
        .expect("create student user");
    let s = student::Model::create(
        db,
        student::NewStudent {
            user_id: u.id,
            full_name: format!("Student {register_number}"),
            register_number: register_number.to_owned(),
            roll_number: None,
            department: department.to_owned(),
            semester: semester.to_owned(),
            year: None,
            section: section.to_owned(),
            course: None,
        },
    )
    .await
    .expect("create student profile");
    (u, s)
}

pub async fn seed_subject(
    db: &DatabaseConnection,
    teacher_id: Option<i64>,
    code: &str,
    semester: &str,
    sections: &[&str],
) -> subject::Model {
    let sections: Vec<String> = sections.iter().map(|s| s.to_string()).collect();
    subject::Model::create(
        db,
        &format!("Subject {code}"),
        code,
        &sections,
        teacher_id,
        Some("CSE"),
        Some(semester),
    )
    .await
    .expect("create subject")
}
