//! Credential checks and password changes.

use crate::caller::Caller;
use crate::error::{ServiceError, ServiceResult};
use db::models::user;
use sea_orm::{DatabaseConnection, EntityTrait};

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: user::Model,
    pub caller: Caller,
    /// Set while the password is still the register-number default from import.
    pub must_change_password: bool,
}

/// Verifies a username/password pair. `Ok(None)` means the credentials are wrong;
/// unknown users and bad passwords are indistinguishable to the caller.
pub async fn authenticate(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> ServiceResult<Option<LoginOutcome>> {
    let Some(user) = user::Model::find_by_username(db, username).await? else {
        tracing::warn!(username, "login for unknown user");
        return Ok(None);
    };
    if !user.verify_password(password) {
        tracing::warn!(user_id = user.id, "login with wrong password");
        return Ok(None);
    }

    let caller = Caller::resolve(db, user.id).await?;
    let must_change_password = user.verify_password(&user.username);

    Ok(Some(LoginOutcome {
        user,
        caller,
        must_change_password,
    }))
}

pub async fn change_password(
    db: &DatabaseConnection,
    user_id: i64,
    old_password: &str,
    new_password: &str,
) -> ServiceResult<()> {
    if old_password.is_empty() || new_password.is_empty() {
        return Err(ServiceError::Validation("Both passwords are required".into()));
    }

    let user = user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("User not found".into()))?;

    if !user.verify_password(old_password) {
        return Err(ServiceError::Validation("Old password is incorrect".into()));
    }
    if new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ServiceError::Validation(format!(
            "New password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if new_password == user.username {
        return Err(ServiceError::Validation(
            "New password must differ from the username".into(),
        ));
    }

    user::Model::set_password(db, user.id, new_password).await?;
    tracing::info!(user_id, "password changed");
    Ok(())
}
