use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Activity {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub user_id: Option<Uuid>,
    pub activity_type: String,
    pub title: Option<String>,
    pub notes: Option<String>,
    pub duration: Option<i32>,
    pub activity_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Payload for logging an activity against a lead. `activity_date` defaults
/// to the write-time instant when omitted.
#[derive(Debug, Deserialize)]
pub struct NewActivity {
    pub activity_type: String,
    pub title: Option<String>,
    pub notes: Option<String>,
    pub duration: Option<i32>,
    pub activity_date: Option<DateTime<Utc>>,
}
