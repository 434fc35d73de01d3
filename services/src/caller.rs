//! Request-scoped caller identity.
//!
//! The role is resolved once per request and threaded explicitly into every
//! service call; nothing below this module looks up profile membership itself.

use crate::error::{ServiceError, ServiceResult};
use db::models::{student, teacher};
use sea_orm::{ConnectionTrait, DbErr};

#[derive(Debug, Clone, PartialEq)]
pub enum Role {
    Teacher(teacher::Model),
    Student(student::Model),
    /// Authenticated but with neither profile.
    Unknown,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Teacher(_) => "teacher",
            Role::Student(_) => "student",
            Role::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Caller {
    pub user_id: i64,
    pub role: Role,
}

impl Caller {
    /// Looks up the profiles attached to `user_id`. A teacher profile wins over a
    /// student profile when a user has both.
    pub async fn resolve<C>(db: &C, user_id: i64) -> Result<Caller, DbErr>
    where
        C: ConnectionTrait,
    {
        let role = if let Some(t) = teacher::Model::find_by_user(db, user_id).await? {
            Role::Teacher(t)
        } else if let Some(s) = student::Model::find_by_user(db, user_id).await? {
            Role::Student(s)
        } else {
            Role::Unknown
        };

        Ok(Caller { user_id, role })
    }

    pub fn teacher(&self) -> Option<&teacher::Model> {
        match &self.role {
            Role::Teacher(t) => Some(t),
            _ => None,
        }
    }

    pub fn student(&self) -> Option<&student::Model> {
        match &self.role {
            Role::Student(s) => Some(s),
            _ => None,
        }
    }

    /// Gate for ledger writes.
    pub fn require_teacher(&self) -> ServiceResult<&teacher::Model> {
        self.teacher().ok_or_else(|| {
            tracing::warn!(user_id = self.user_id, role = self.role.as_str(), "teacher-only operation denied");
            ServiceError::Forbidden("Only teachers can perform this action".into())
        })
    }

    /// Gate for teacher-scoped reads, where a missing profile reads as absent data.
    pub fn teacher_profile(&self) -> ServiceResult<&teacher::Model> {
        self.teacher()
            .ok_or_else(|| ServiceError::NotFound("Teacher profile not found".into()))
    }

    pub fn student_profile(&self) -> ServiceResult<&student::Model> {
        self.student()
            .ok_or_else(|| ServiceError::NotFound("Student profile not found".into()))
    }
}
