use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn display_name(&self) -> String {
        display_name(
            self.first_name.as_deref(),
            self.last_name.as_deref(),
            &self.email,
        )
    }
}

/// Best-effort full name, falling back to the email when both parts are
/// blank. Used for `assigned_to` defaulting and the `owner_name` field.
pub fn display_name(first_name: Option<&str>, last_name: Option<&str>, email: &str) -> String {
    let first = first_name.unwrap_or("").trim();
    let last = last_name.unwrap_or("").trim();
    let full = format!("{first} {last}").trim().to_string();
    if full.is_empty() {
        email.to_string()
    } else {
        full
    }
}
