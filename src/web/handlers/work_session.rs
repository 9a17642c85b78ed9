//! Work session handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::db::{NewWorkSession, WorkSessionRepository};
use crate::web::dto::{CreateWorkSessionRequest, ValidatedJson, WorkSessionResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::CurrentMachine;

/// POST /api/work-sessions - Record a work session.
///
/// The session is attributed to the authenticated machine.
pub async fn create_work_session(
    State(state): State<Arc<AppState>>,
    CurrentMachine(machine): CurrentMachine,
    ValidatedJson(req): ValidatedJson<CreateWorkSessionRequest>,
) -> Result<(StatusCode, Json<WorkSessionResponse>), ApiError> {
    if let Err(e) = req.check_time_order() {
        let message = e
            .message
            .map(|m| m.to_string())
            .unwrap_or_else(|| "Invalid time range".to_string());
        return Err(ApiError::validation(HashMap::from([(
            "end_time".to_string(),
            vec![message],
        )])));
    }

    let session = WorkSessionRepository::new(state.db.pool())
        .create(machine.id, &NewWorkSession::from(req))
        .await?;

    tracing::info!(
        machine_id = %machine.machine_id,
        user_id = session.user_id,
        duration_seconds = session.duration_seconds,
        "Work session recorded"
    );

    Ok((StatusCode::CREATED, Json(WorkSessionResponse::from(session))))
}

/// GET /api/work-sessions - List all work sessions.
pub async fn list_work_sessions(
    State(state): State<Arc<AppState>>,
    CurrentMachine(_caller): CurrentMachine,
) -> Result<Json<Vec<WorkSessionResponse>>, ApiError> {
    let sessions = WorkSessionRepository::new(state.db.pool()).list_all().await?;

    Ok(Json(sessions.into_iter().map(WorkSessionResponse::from).collect()))
}

/// GET /api/work-sessions/user/:user_id - List one user's work sessions.
pub async fn list_user_work_sessions(
    State(state): State<Arc<AppState>>,
    CurrentMachine(_caller): CurrentMachine,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<WorkSessionResponse>>, ApiError> {
    let sessions = WorkSessionRepository::new(state.db.pool())
        .list_by_user(user_id)
        .await?;

    Ok(Json(sessions.into_iter().map(WorkSessionResponse::from).collect()))
}

/// GET /api/work-sessions/machine/:machine_id - List sessions recorded by
/// one machine (internal ID).
pub async fn list_machine_work_sessions(
    State(state): State<Arc<AppState>>,
    CurrentMachine(_caller): CurrentMachine,
    Path(machine_pk): Path<i64>,
) -> Result<Json<Vec<WorkSessionResponse>>, ApiError> {
    let sessions = WorkSessionRepository::new(state.db.pool())
        .list_by_machine(machine_pk)
        .await?;

    Ok(Json(sessions.into_iter().map(WorkSessionResponse::from).collect()))
}
