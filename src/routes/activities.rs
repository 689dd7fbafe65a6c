use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::middleware::audit;
use crate::models::{Activity, NewActivity};
use crate::state::SharedState;

/// Resolve the parent lead through the lead scoping rule. Invisible and
/// absent leads are indistinguishable to the caller.
async fn resolve_lead(
    state: &SharedState,
    auth: &AuthUser,
    lead_id: Uuid,
) -> Result<(), AppError> {
    db::leads::find_by_id(&state.pool, lead_id, auth.lead_scope())
        .await?
        .ok_or_else(|| AppError::NotFound("Lead not found".to_string()))?;
    Ok(())
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(lead_id): Path<Uuid>,
) -> Result<Json<Vec<Activity>>, AppError> {
    resolve_lead(&state, &auth, lead_id).await?;
    let activities = db::activities::list_for_lead(&state.pool, lead_id).await?;
    Ok(Json(activities))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(lead_id): Path<Uuid>,
    Json(req): Json<NewActivity>,
) -> Result<(StatusCode, Json<Activity>), AppError> {
    resolve_lead(&state, &auth, lead_id).await?;

    // Call activities must carry how long the call took.
    if req.activity_type == "call" && !req.duration.is_some_and(|d| d > 0) {
        return Err(AppError::BadRequest(
            "Call activities require a positive duration in minutes".to_string(),
        ));
    }

    let activity = db::activities::create(&state.pool, lead_id, auth.user_id, &req).await?;

    tracing::info!(
        "Activity created with id={} on lead_id={lead_id} by user_id={}",
        activity.id,
        auth.user_id
    );

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "activity.created",
        "activity",
        Some(activity.id),
        None,
    )
    .await;

    Ok((StatusCode::CREATED, Json(activity)))
}
