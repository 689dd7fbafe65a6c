use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Point-in-time dashboard payload. Every window is derived from the single
/// `now` the snapshot was computed with.
#[derive(Debug, Serialize)]
pub struct DashboardSnapshot {
    pub total_leads: i64,
    pub total_activities: i64,
    pub leads_by_status: BTreeMap<String, i64>,
    pub leads_by_source: BTreeMap<String, i64>,
    pub new_leads_today: i64,
    pub new_leads_7d: i64,
    pub new_leads_30d: i64,
    pub new_leads_this_week: i64,
    pub won_30d: i64,
    pub lost_30d: i64,
    pub closed_leads_this_month: i64,
    pub win_rate_30d: f64,
    pub activities_by_type_30d: BTreeMap<String, i64>,
    pub avg_activities_per_lead_30d: f64,
    pub leads_trend_8w: Vec<WeekBucket>,
    pub recent_activities: Vec<RecentActivity>,
    pub recent_leads: Vec<RecentLead>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekBucket {
    pub week_start: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct RecentActivity {
    pub id: Uuid,
    pub lead_id: Uuid,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub title: Option<String>,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct RecentLead {
    pub id: Uuid,
    pub name: String,
    pub status: String,
    pub source: String,
    pub created_at: DateTime<Utc>,
}
