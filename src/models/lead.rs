use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::models::user::display_name;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Lead {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: String,
    pub source: Option<String>,
    pub budget_min: Option<i32>,
    pub budget_max: Option<i32>,
    pub property_interest: Option<String>,
    pub location: Option<String>,
    pub assigned_to: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a lead.
#[derive(Debug, Deserialize)]
pub struct NewLead {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    pub source: Option<String>,
    pub budget_min: Option<i32>,
    pub budget_max: Option<i32>,
    pub property_interest: Option<String>,
    pub location: Option<String>,
    pub assigned_to: Option<String>,
    pub notes: Option<String>,
}

fn default_status() -> String {
    "new".to_string()
}

/// Sparse update payload. For nullable columns the outer `Option` tracks
/// whether the caller supplied the field at all; the inner one carries the
/// new value, so an explicit `null` clears the column while an absent field
/// leaves it untouched.
#[derive(Debug, Default, Deserialize)]
pub struct LeadUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub source: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub budget_min: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub budget_max: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub property_interest: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub assigned_to: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
    pub is_active: Option<bool>,
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl LeadUpdate {
    /// Assign only the fields the caller supplied onto the fetched entity.
    pub fn apply(self, lead: &mut Lead) {
        if let Some(v) = self.first_name {
            lead.first_name = v;
        }
        if let Some(v) = self.last_name {
            lead.last_name = v;
        }
        if let Some(v) = self.status {
            lead.status = v;
        }
        if let Some(v) = self.email {
            lead.email = v;
        }
        if let Some(v) = self.phone {
            lead.phone = v;
        }
        if let Some(v) = self.source {
            lead.source = v;
        }
        if let Some(v) = self.budget_min {
            lead.budget_min = v;
        }
        if let Some(v) = self.budget_max {
            lead.budget_max = v;
        }
        if let Some(v) = self.property_interest {
            lead.property_interest = v;
        }
        if let Some(v) = self.location {
            lead.location = v;
        }
        if let Some(v) = self.assigned_to {
            lead.assigned_to = v;
        }
        if let Some(v) = self.notes {
            lead.notes = v;
        }
        if let Some(v) = self.is_active {
            lead.is_active = v;
        }
    }
}

/// A lead row joined with its owner's name parts.
#[derive(Debug, sqlx::FromRow)]
pub struct LeadWithOwner {
    #[sqlx(flatten)]
    pub lead: Lead,
    pub owner_first_name: Option<String>,
    pub owner_last_name: Option<String>,
    pub owner_email: String,
}

impl LeadWithOwner {
    pub fn owner_name(&self) -> String {
        display_name(
            self.owner_first_name.as_deref(),
            self.owner_last_name.as_deref(),
            &self.owner_email,
        )
    }
}

#[derive(Debug, Serialize)]
pub struct LeadResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: String,
    pub source: Option<String>,
    pub budget_min: Option<i32>,
    pub budget_max: Option<i32>,
    pub property_interest: Option<String>,
    pub location: Option<String>,
    pub assigned_to: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner_name: String,
}

impl From<LeadWithOwner> for LeadResponse {
    fn from(row: LeadWithOwner) -> Self {
        let owner_name = row.owner_name();
        let lead = row.lead;
        LeadResponse {
            id: lead.id,
            user_id: lead.user_id,
            first_name: lead.first_name,
            last_name: lead.last_name,
            email: lead.email,
            phone: lead.phone,
            status: lead.status,
            source: lead.source,
            budget_min: lead.budget_min,
            budget_max: lead.budget_max,
            property_interest: lead.property_interest,
            location: lead.location,
            assigned_to: lead.assigned_to,
            notes: lead.notes,
            is_active: lead.is_active,
            created_at: lead.created_at,
            updated_at: lead.updated_at,
            owner_name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LeadPage {
    pub items: Vec<LeadResponse>,
    pub total: i64,
    pub page: i64,
    pub size: i64,
}
