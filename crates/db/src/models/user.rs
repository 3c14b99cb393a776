//! User entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use taskboard_core::types::{DbId, Timestamp};
use validator::Validate;

/// A user row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub display_name: String,
    pub email: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for creating a new user.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUser {
    pub display_name: String,
    #[validate(email)]
    pub email: Option<String>,
}

/// DTO for updating an existing user. All fields are optional;
/// `email` may be sent as `null` to clear it.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUser {
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "taskboard_core::patch::nullable")]
    #[validate(email)]
    pub email: Option<Option<String>>,
}
