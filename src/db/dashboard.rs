use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::dashboard::{DashboardSnapshot, RecentActivity, RecentLead, WeekBucket};
use crate::models::{Activity, Lead};

/// Compute the dashboard snapshot for one caller scope.
///
/// `owner` is NULL for admins (global totals) and the caller id otherwise —
/// the same rule the lead store applies. `now` is taken once by the caller
/// and reused for every window below, so all sub-aggregates describe the
/// same instant.
///
/// Lead metrics count active rows only. Activity metrics scope through a
/// join on ownership alone: an activity stays countable after its parent
/// lead is soft-deleted.
pub async fn snapshot(
    pool: &PgPool,
    owner: Option<Uuid>,
    now: DateTime<Utc>,
) -> Result<DashboardSnapshot, sqlx::Error> {
    let d7_ago = now - Duration::days(7);
    let d30_ago = now - Duration::days(30);
    let today = now.date_naive();
    let start_8w = now - Duration::weeks(7);

    let total_leads = count_leads(pool, owner).await?;
    let total_activities = count_activities(pool, owner).await?;

    let leads_by_status: BTreeMap<String, i64> = leads_by_status(pool, owner)
        .await?
        .into_iter()
        .collect();

    let leads_by_source: BTreeMap<String, i64> = leads_by_source(pool, owner)
        .await?
        .into_iter()
        .map(|(source, count)| (source.unwrap_or_else(|| "unknown".to_string()), count))
        .collect();

    let new_leads_today = count_leads_created_on(pool, owner, today).await?;
    let new_leads_7d = count_leads_created_since(pool, owner, d7_ago).await?;
    let new_leads_30d = count_leads_created_since(pool, owner, d30_ago).await?;
    let new_leads_this_week =
        count_leads_created_since(pool, owner, week_start_monday(now)).await?;

    let won_30d = count_leads_closed_since(pool, owner, "won", d30_ago).await?;
    let lost_30d = count_leads_closed_since(pool, owner, "lost", d30_ago).await?;
    let closed_leads_this_month =
        count_leads_closed_since(pool, owner, "won", month_start(now)).await?;

    let denom = won_30d + lost_30d;
    let win_rate_30d = if denom > 0 {
        won_30d as f64 / denom as f64
    } else {
        0.0
    };

    let activities_by_type_30d: BTreeMap<String, i64> =
        activities_by_type_since(pool, owner, d30_ago)
            .await?
            .into_iter()
            .collect();

    let activity_count_30d = count_activities_since(pool, owner, d30_ago).await?;
    let avg_activities_per_lead_30d = if total_leads > 0 {
        activity_count_30d as f64 / total_leads as f64
    } else {
        0.0
    };

    // Two week-numbering schemes meet here: grouping is ISO-aligned
    // (date_trunc('week') buckets on Mondays) while the 8 labels are offset
    // from `now` in 7-day steps. They are reconciled by date equality, so a
    // label that does not land on a Monday reads 0.
    let week_counts: HashMap<NaiveDate, i64> = weekly_lead_counts(pool, owner, start_8w)
        .await?
        .into_iter()
        .collect();
    let leads_trend_8w = (0..8)
        .map(|i| {
            let week_start = (start_8w + Duration::weeks(i)).date_naive();
            WeekBucket {
                week_start,
                count: week_counts.get(&week_start).copied().unwrap_or(0),
            }
        })
        .collect();

    let recent_activities = recent_activities(pool, owner, 10)
        .await?
        .into_iter()
        .map(|a: Activity| RecentActivity {
            id: a.id,
            lead_id: a.lead_id,
            activity_type: a.activity_type,
            title: a.title,
            at: a.activity_date,
        })
        .collect();

    let recent_leads = recent_leads(pool, owner, 5)
        .await?
        .into_iter()
        .map(|l: Lead| RecentLead {
            id: l.id,
            name: format!("{} {}", l.first_name, l.last_name).trim().to_string(),
            status: l.status,
            source: l.source.unwrap_or_else(|| "unknown".to_string()),
            created_at: l.created_at,
        })
        .collect();

    Ok(DashboardSnapshot {
        total_leads,
        total_activities,
        leads_by_status,
        leads_by_source,
        new_leads_today,
        new_leads_7d,
        new_leads_30d,
        new_leads_this_week,
        won_30d,
        lost_30d,
        closed_leads_this_month,
        win_rate_30d,
        activities_by_type_30d,
        avg_activities_per_lead_30d,
        leads_trend_8w,
        recent_activities,
        recent_leads,
    })
}

/// Most recent Monday 00:00 UTC at or before `now`.
fn week_start_monday(now: DateTime<Utc>) -> DateTime<Utc> {
    let days_into_week = now.weekday().num_days_from_monday() as i64;
    (now.date_naive() - Duration::days(days_into_week))
        .and_time(NaiveTime::MIN)
        .and_utc()
}

/// First day of the current calendar month, 00:00 UTC.
fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    (now.date_naive() - Duration::days(now.day() as i64 - 1))
        .and_time(NaiveTime::MIN)
        .and_utc()
}

async fn count_leads(pool: &PgPool, owner: Option<Uuid>) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM leads l
         WHERE l.is_active = TRUE AND ($1::uuid IS NULL OR l.user_id = $1)",
    )
    .bind(owner)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

async fn count_activities(pool: &PgPool, owner: Option<Uuid>) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM activities a
         JOIN leads l ON a.lead_id = l.id
         WHERE ($1::uuid IS NULL OR l.user_id = $1)",
    )
    .bind(owner)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

async fn leads_by_status(
    pool: &PgPool,
    owner: Option<Uuid>,
) -> Result<Vec<(String, i64)>, sqlx::Error> {
    sqlx::query_as(
        "SELECT l.status, COUNT(*) FROM leads l
         WHERE l.is_active = TRUE AND ($1::uuid IS NULL OR l.user_id = $1)
         GROUP BY l.status",
    )
    .bind(owner)
    .fetch_all(pool)
    .await
}

async fn leads_by_source(
    pool: &PgPool,
    owner: Option<Uuid>,
) -> Result<Vec<(Option<String>, i64)>, sqlx::Error> {
    sqlx::query_as(
        "SELECT l.source, COUNT(*) FROM leads l
         WHERE l.is_active = TRUE AND ($1::uuid IS NULL OR l.user_id = $1)
         GROUP BY l.source",
    )
    .bind(owner)
    .fetch_all(pool)
    .await
}

async fn count_leads_created_on(
    pool: &PgPool,
    owner: Option<Uuid>,
    day: NaiveDate,
) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM leads l
         WHERE l.is_active = TRUE AND ($1::uuid IS NULL OR l.user_id = $1)
           AND (l.created_at AT TIME ZONE 'UTC')::date = $2",
    )
    .bind(owner)
    .bind(day)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

async fn count_leads_created_since(
    pool: &PgPool,
    owner: Option<Uuid>,
    since: DateTime<Utc>,
) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM leads l
         WHERE l.is_active = TRUE AND ($1::uuid IS NULL OR l.user_id = $1)
           AND l.created_at >= $2",
    )
    .bind(owner)
    .bind(since)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

/// Leads in a terminal status whose last mutation falls inside the window.
async fn count_leads_closed_since(
    pool: &PgPool,
    owner: Option<Uuid>,
    status: &str,
    since: DateTime<Utc>,
) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM leads l
         WHERE l.is_active = TRUE AND ($1::uuid IS NULL OR l.user_id = $1)
           AND l.status = $2 AND l.updated_at >= $3",
    )
    .bind(owner)
    .bind(status)
    .bind(since)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

async fn count_activities_since(
    pool: &PgPool,
    owner: Option<Uuid>,
    since: DateTime<Utc>,
) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM activities a
         JOIN leads l ON a.lead_id = l.id
         WHERE ($1::uuid IS NULL OR l.user_id = $1) AND a.activity_date >= $2",
    )
    .bind(owner)
    .bind(since)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

async fn activities_by_type_since(
    pool: &PgPool,
    owner: Option<Uuid>,
    since: DateTime<Utc>,
) -> Result<Vec<(String, i64)>, sqlx::Error> {
    sqlx::query_as(
        "SELECT a.activity_type, COUNT(*) FROM activities a
         JOIN leads l ON a.lead_id = l.id
         WHERE ($1::uuid IS NULL OR l.user_id = $1) AND a.activity_date >= $2
         GROUP BY a.activity_type",
    )
    .bind(owner)
    .bind(since)
    .fetch_all(pool)
    .await
}

/// Active lead counts grouped into ISO weeks (date_trunc('week') is
/// Monday-aligned) for rows created since the window start.
async fn weekly_lead_counts(
    pool: &PgPool,
    owner: Option<Uuid>,
    since: DateTime<Utc>,
) -> Result<Vec<(NaiveDate, i64)>, sqlx::Error> {
    sqlx::query_as(
        "SELECT (date_trunc('week', l.created_at AT TIME ZONE 'UTC'))::date AS week_start,
                COUNT(*)
         FROM leads l
         WHERE l.is_active = TRUE AND ($1::uuid IS NULL OR l.user_id = $1)
           AND l.created_at >= $2
         GROUP BY week_start
         ORDER BY week_start",
    )
    .bind(owner)
    .bind(since)
    .fetch_all(pool)
    .await
}

async fn recent_activities(
    pool: &PgPool,
    owner: Option<Uuid>,
    limit: i64,
) -> Result<Vec<Activity>, sqlx::Error> {
    sqlx::query_as::<_, Activity>(
        "SELECT a.* FROM activities a
         JOIN leads l ON a.lead_id = l.id
         WHERE ($1::uuid IS NULL OR l.user_id = $1)
         ORDER BY a.activity_date DESC, a.created_at DESC
         LIMIT $2",
    )
    .bind(owner)
    .bind(limit)
    .fetch_all(pool)
    .await
}

async fn recent_leads(
    pool: &PgPool,
    owner: Option<Uuid>,
    limit: i64,
) -> Result<Vec<Lead>, sqlx::Error> {
    sqlx::query_as::<_, Lead>(
        "SELECT l.* FROM leads l
         WHERE l.is_active = TRUE AND ($1::uuid IS NULL OR l.user_id = $1)
         ORDER BY l.created_at DESC
         LIMIT $2",
    )
    .bind(owner)
    .bind(limit)
    .fetch_all(pool)
    .await
}
