use axum::extract::State;
use axum::Json;
use chrono::Utc;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::models::DashboardSnapshot;
use crate::state::SharedState;

pub async fn dashboard(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<DashboardSnapshot>, AppError> {
    // One instant for every window in the snapshot.
    let now = Utc::now();
    let snapshot = db::dashboard::snapshot(&state.pool, auth.lead_scope(), now).await?;
    Ok(Json(snapshot))
}
