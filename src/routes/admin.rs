use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::models::AuditEvent;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct AuditListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Admin-only view of the audit trail. Soft-deleted leads stay reachable
/// here through their recorded events even though the scoped lead queries
/// no longer return them.
pub async fn list_audit_events(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(params): Query<AuditListParams>,
) -> Result<Json<Vec<AuditEvent>>, AppError> {
    auth.require_admin()?;

    let limit = params.limit.unwrap_or(50).clamp(1, 200);
    let offset = params.offset.unwrap_or(0).max(0);

    let events = db::audit::list(&state.pool, limit, offset).await?;
    Ok(Json(events))
}
