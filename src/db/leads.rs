use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Lead, LeadWithOwner, NewLead};

/// Typed lead filters, already validated by the query layer.
#[derive(Debug, Default, Clone)]
pub struct LeadFilters {
    pub q: Option<String>,
    pub status: Option<String>,
    pub source: Option<String>,
    pub budget_min: Option<i32>,
    pub budget_max: Option<i32>,
}

/// The scoping rule plus the list filters, as one reusable WHERE body.
///
/// Visibility is owner-or-admin over active rows: `$1` is NULL for admins
/// and the caller id otherwise. Every lead query in this module goes through
/// this clause (or its single-row equivalent in `find_by_id`) so list, get,
/// update, delete and export cannot disagree about who sees what.
/// Budget bounds ignore rows where the corresponding column is NULL.
const SCOPED_FILTER: &str = "l.is_active = TRUE
       AND ($1::uuid IS NULL OR l.user_id = $1)
       AND ($2::text IS NULL OR l.first_name ILIKE $2 OR l.last_name ILIKE $2 OR l.email ILIKE $2)
       AND ($3::text IS NULL OR l.status = $3)
       AND ($4::text IS NULL OR l.source = $4)
       AND ($5::int4 IS NULL OR (l.budget_min IS NOT NULL AND l.budget_min >= $5))
       AND ($6::int4 IS NULL OR (l.budget_max IS NOT NULL AND l.budget_max <= $6))";

const OWNER_COLUMNS: &str = "l.*, u.first_name AS owner_first_name,
       u.last_name AS owner_last_name, u.email AS owner_email";

fn like_pattern(filters: &LeadFilters) -> Option<String> {
    filters.q.as_ref().map(|q| format!("%{q}%"))
}

pub async fn list(
    pool: &PgPool,
    owner: Option<Uuid>,
    filters: &LeadFilters,
    limit: i64,
    offset: i64,
) -> Result<Vec<LeadWithOwner>, sqlx::Error> {
    sqlx::query_as::<_, LeadWithOwner>(&format!(
        "SELECT {OWNER_COLUMNS}
         FROM leads l JOIN users u ON l.user_id = u.id
         WHERE {SCOPED_FILTER}
         ORDER BY l.created_at DESC LIMIT $7 OFFSET $8"
    ))
    .bind(owner)
    .bind(like_pattern(filters))
    .bind(&filters.status)
    .bind(&filters.source)
    .bind(filters.budget_min)
    .bind(filters.budget_max)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

/// Filtered count before pagination.
pub async fn count(
    pool: &PgPool,
    owner: Option<Uuid>,
    filters: &LeadFilters,
) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(&format!(
        "SELECT COUNT(*) FROM leads l WHERE {SCOPED_FILTER}"
    ))
    .bind(owner)
    .bind(like_pattern(filters))
    .bind(&filters.status)
    .bind(&filters.source)
    .bind(filters.budget_min)
    .bind(filters.budget_max)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

/// Same scope and filters as `list`, without pagination.
pub async fn export(
    pool: &PgPool,
    owner: Option<Uuid>,
    filters: &LeadFilters,
) -> Result<Vec<LeadWithOwner>, sqlx::Error> {
    sqlx::query_as::<_, LeadWithOwner>(&format!(
        "SELECT {OWNER_COLUMNS}
         FROM leads l JOIN users u ON l.user_id = u.id
         WHERE {SCOPED_FILTER}
         ORDER BY l.created_at DESC"
    ))
    .bind(owner)
    .bind(like_pattern(filters))
    .bind(&filters.status)
    .bind(&filters.source)
    .bind(filters.budget_min)
    .bind(filters.budget_max)
    .fetch_all(pool)
    .await
}

/// Scoped single-row fetch. An inactive row and a row owned by someone else
/// both come back as None.
pub async fn find_by_id(
    pool: &PgPool,
    id: Uuid,
    owner: Option<Uuid>,
) -> Result<Option<LeadWithOwner>, sqlx::Error> {
    sqlx::query_as::<_, LeadWithOwner>(&format!(
        "SELECT {OWNER_COLUMNS}
         FROM leads l JOIN users u ON l.user_id = u.id
         WHERE l.id = $1 AND l.is_active = TRUE AND ($2::uuid IS NULL OR l.user_id = $2)"
    ))
    .bind(id)
    .bind(owner)
    .fetch_optional(pool)
    .await
}

pub async fn create(pool: &PgPool, owner_id: Uuid, lead: &NewLead) -> Result<Lead, sqlx::Error> {
    sqlx::query_as::<_, Lead>(
        "INSERT INTO leads (user_id, first_name, last_name, email, phone, status, source,
                            budget_min, budget_max, property_interest, location, assigned_to, notes)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) RETURNING *",
    )
    .bind(owner_id)
    .bind(&lead.first_name)
    .bind(&lead.last_name)
    .bind(&lead.email)
    .bind(&lead.phone)
    .bind(&lead.status)
    .bind(&lead.source)
    .bind(lead.budget_min)
    .bind(lead.budget_max)
    .bind(&lead.property_interest)
    .bind(&lead.location)
    .bind(&lead.assigned_to)
    .bind(&lead.notes)
    .fetch_one(pool)
    .await
}

/// Write back a fetched-and-mutated lead. The store refreshes `updated_at`
/// on every write.
pub async fn update(pool: &PgPool, lead: &Lead) -> Result<Lead, sqlx::Error> {
    sqlx::query_as::<_, Lead>(
        "UPDATE leads SET first_name = $2, last_name = $3, email = $4, phone = $5,
                status = $6, source = $7, budget_min = $8, budget_max = $9,
                property_interest = $10, location = $11, assigned_to = $12, notes = $13,
                is_active = $14, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(lead.id)
    .bind(&lead.first_name)
    .bind(&lead.last_name)
    .bind(&lead.email)
    .bind(&lead.phone)
    .bind(&lead.status)
    .bind(&lead.source)
    .bind(lead.budget_min)
    .bind(lead.budget_max)
    .bind(&lead.property_interest)
    .bind(&lead.location)
    .bind(&lead.assigned_to)
    .bind(&lead.notes)
    .bind(lead.is_active)
    .fetch_one(pool)
    .await
}

/// Scoped soft delete. Returns false when the lead does not exist, is not
/// visible to the caller, or was already deactivated — callers answer 404
/// for all three.
pub async fn soft_delete(
    pool: &PgPool,
    id: Uuid,
    owner: Option<Uuid>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE leads SET is_active = FALSE, updated_at = now()
         WHERE id = $1 AND is_active = TRUE AND ($2::uuid IS NULL OR user_id = $2)",
    )
    .bind(id)
    .bind(owner)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
