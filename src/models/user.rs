// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::{AppError, AppResult};

/// Represents the 'users' table in the database.
/// Accounts are created by the auth service; this crate only reads them.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// User role: 'user' or 'admin'.
    pub role: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(AppError::AuthError(format!("Unknown role '{}'", other))),
        }
    }
}

/// The authenticated identity handed to every operation.
/// Resolved once from the bearer token; nothing below the handlers reads tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i64,
    pub role: Role,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> AppResult<()> {
        if !self.is_admin() {
            return Err(AppError::Forbidden(
                "Access denied. Admin privileges required.".to_string(),
            ));
        }
        Ok(())
    }

    pub fn require_self_or_admin(&self, user_id: i64) -> AppResult<()> {
        if !self.is_admin() && self.user_id != user_id {
            return Err(AppError::Forbidden(
                "You can only access your own results".to_string(),
            ));
        }
        Ok(())
    }
}
