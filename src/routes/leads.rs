use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::db::leads::LeadFilters;
use crate::error::AppError;
use crate::middleware::audit;
use crate::models::{LeadPage, LeadResponse, LeadUpdate, LeadWithOwner, NewLead};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct LeadListParams {
    pub q: Option<String>,
    pub status: Option<String>,
    pub source: Option<String>,
    /// Budget bounds arrive as raw strings: blank means "no filter",
    /// anything non-numeric is a client error.
    pub min_budget: Option<String>,
    pub max_budget: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

fn parse_budget(raw: Option<&str>, field: &str) -> Result<Option<i32>, AppError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(value) = trimmed.parse::<i32>() {
            return Ok(Some(value));
        }
    }
    tracing::error!("Invalid {field} filter input: {raw}");
    Err(AppError::BadRequest(format!(
        "Invalid filter input for {field}"
    )))
}

fn parse_filters(params: &LeadListParams) -> Result<LeadFilters, AppError> {
    Ok(LeadFilters {
        q: params.q.clone().filter(|s| !s.is_empty()),
        status: params.status.clone().filter(|s| !s.is_empty()),
        source: params.source.clone().filter(|s| !s.is_empty()),
        budget_min: parse_budget(params.min_budget.as_deref(), "min_budget")?,
        budget_max: parse_budget(params.max_budget.as_deref(), "max_budget")?,
    })
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(mut req): Json<NewLead>,
) -> Result<(StatusCode, Json<LeadResponse>), AppError> {
    let assigned_blank = req
        .assigned_to
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .is_none();
    if assigned_blank {
        req.assigned_to = Some(auth.display_name());
    }

    let lead = db::leads::create(&state.pool, auth.user_id, &req).await?;

    tracing::info!("Lead created with id={} by user_id={}", lead.id, auth.user_id);

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "lead.created",
        "lead",
        Some(lead.id),
        None,
    )
    .await;

    let row = LeadWithOwner {
        lead,
        owner_first_name: auth.first_name.clone(),
        owner_last_name: auth.last_name.clone(),
        owner_email: auth.email.clone(),
    };
    Ok((StatusCode::CREATED, Json(LeadResponse::from(row))))
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(params): Query<LeadListParams>,
) -> Result<Json<LeadPage>, AppError> {
    let filters = parse_filters(&params)?;
    let owner = auth.lead_scope();

    let page = params.page.unwrap_or(1).max(1);
    let size = params.page_size.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * size;

    let total = db::leads::count(&state.pool, owner, &filters).await?;
    let items = db::leads::list(&state.pool, owner, &filters, size, offset)
        .await?
        .into_iter()
        .map(LeadResponse::from)
        .collect();

    Ok(Json(LeadPage {
        items,
        total,
        page,
        size,
    }))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LeadResponse>, AppError> {
    let row = db::leads::find_by_id(&state.pool, id, auth.lead_scope())
        .await?
        .ok_or_else(|| AppError::NotFound("Lead not found".to_string()))?;
    Ok(Json(LeadResponse::from(row)))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LeadUpdate>,
) -> Result<Json<LeadResponse>, AppError> {
    let row = db::leads::find_by_id(&state.pool, id, auth.lead_scope())
        .await?
        .ok_or_else(|| AppError::NotFound("Lead not found".to_string()))?;

    let LeadWithOwner {
        mut lead,
        owner_first_name,
        owner_last_name,
        owner_email,
    } = row;

    payload.apply(&mut lead);
    let updated = db::leads::update(&state.pool, &lead).await?;

    tracing::info!("Lead updated with id={id} by user_id={}", auth.user_id);

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "lead.updated",
        "lead",
        Some(id),
        None,
    )
    .await;

    Ok(Json(LeadResponse::from(LeadWithOwner {
        lead: updated,
        owner_first_name,
        owner_last_name,
        owner_email,
    })))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = db::leads::soft_delete(&state.pool, id, auth.lead_scope()).await?;
    if !deleted {
        return Err(AppError::NotFound("Lead not found".to_string()));
    }

    tracing::info!("Lead soft deleted with id={id} by user_id={}", auth.user_id);

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "lead.deleted",
        "lead",
        Some(id),
        None,
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct ExportParams {
    pub q: Option<String>,
    pub status: Option<String>,
    pub source: Option<String>,
    pub min_budget: Option<String>,
    pub max_budget: Option<String>,
}

pub async fn export(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(params): Query<ExportParams>,
) -> Result<impl IntoResponse, AppError> {
    let filters = parse_filters(&LeadListParams {
        q: params.q,
        status: params.status,
        source: params.source,
        min_budget: params.min_budget,
        max_budget: params.max_budget,
        page: None,
        page_size: None,
    })?;

    let rows = db::leads::export(&state.pool, auth.lead_scope(), &filters).await?;

    tracing::info!(
        "Leads CSV exported by user_id={}, rows={}",
        auth.user_id,
        rows.len()
    );

    let csv = export_csv(&rows);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"leads.csv\"",
            ),
        ],
        csv,
    ))
}

fn export_csv(rows: &[LeadWithOwner]) -> String {
    use std::fmt::Write;
    let mut csv = String::new();

    let _ = writeln!(
        csv,
        "id,first_name,last_name,email,phone,status,source,budget_min,budget_max,property_interest,created_at,updated_at,owner_name"
    );

    for row in rows {
        let owner_name = row.owner_name();
        let l = &row.lead;
        let fields = [
            l.id.to_string(),
            csv_escape(&l.first_name),
            csv_escape(&l.last_name),
            csv_escape(l.email.as_deref().unwrap_or("")),
            csv_escape(l.phone.as_deref().unwrap_or("")),
            csv_escape(&l.status),
            csv_escape(l.source.as_deref().unwrap_or("")),
            l.budget_min.map(|v| v.to_string()).unwrap_or_default(),
            l.budget_max.map(|v| v.to_string()).unwrap_or_default(),
            csv_escape(l.property_interest.as_deref().unwrap_or("")),
            l.created_at.to_rfc3339(),
            l.updated_at.to_rfc3339(),
            csv_escape(&owner_name),
        ];
        let _ = writeln!(csv, "{}", fields.join(","));
    }

    csv
}

fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
