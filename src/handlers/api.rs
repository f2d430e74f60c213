//! JSON endpoints used by the verse page script.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::auth::AuthContext;
use crate::db::try_lock;
use crate::error::ApiError;
use crate::memorize::{SessionReport, VerseFeedback};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SubmitRequest {
    pub text: String,
}

/// POST /api/sessions/{id}/verses/{index}
pub async fn submit_verse_json(
    State(state): State<AppState>,
    auth: AuthContext,
    Path((session_id, verse_index)): Path<(i64, usize)>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<VerseFeedback>, ApiError> {
    let conn = try_lock(&state.db)?;
    let feedback = state
        .aggregator(&conn)
        .submit(auth.user_id, session_id, verse_index, &request.text)?;
    Ok(Json(feedback))
}

/// GET /api/sessions/{id}/report
pub async fn session_report_json(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(session_id): Path<i64>,
) -> Result<Json<SessionReport>, ApiError> {
    let conn = try_lock(&state.db)?;
    let report = state.aggregator(&conn).report(auth.user_id, session_id)?;
    Ok(Json(report))
}
