use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Activity, NewActivity};

/// Activities for one lead, newest first. `created_at` breaks ties among
/// entries logged with the same `activity_date`.
pub async fn list_for_lead(pool: &PgPool, lead_id: Uuid) -> Result<Vec<Activity>, sqlx::Error> {
    sqlx::query_as::<_, Activity>(
        "SELECT * FROM activities WHERE lead_id = $1
         ORDER BY activity_date DESC, created_at DESC",
    )
    .bind(lead_id)
    .fetch_all(pool)
    .await
}

pub async fn create(
    pool: &PgPool,
    lead_id: Uuid,
    actor_id: Uuid,
    activity: &NewActivity,
) -> Result<Activity, sqlx::Error> {
    sqlx::query_as::<_, Activity>(
        "INSERT INTO activities (lead_id, user_id, activity_type, title, notes, duration, activity_date)
         VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, now())) RETURNING *",
    )
    .bind(lead_id)
    .bind(actor_id)
    .bind(&activity.activity_type)
    .bind(&activity.title)
    .bind(&activity.notes)
    .bind(activity.duration)
    .bind(activity.activity_date)
    .fetch_one(pool)
    .await
}
