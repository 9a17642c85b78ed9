//! Machine management handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::auth::{register_machine, reset_machine_password};
use crate::db::MachineRepository;
use crate::web::dto::{
    CreateMachineRequest, MachineResponse, MessageResponse, ResetPasswordRequest, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::CurrentMachine;

/// POST /api/machines - Provision a machine.
pub async fn create_machine(
    State(state): State<Arc<AppState>>,
    CurrentMachine(caller): CurrentMachine,
    ValidatedJson(req): ValidatedJson<CreateMachineRequest>,
) -> Result<(StatusCode, Json<MachineResponse>), ApiError> {
    let machine = register_machine(&state.db, &state.hasher, &req.machine_id, &req.password).await?;
    tracing::info!(
        created_by = %caller.machine_id,
        machine_id = %machine.machine_id,
        "Machine provisioned"
    );

    Ok((StatusCode::CREATED, Json(MachineResponse::from(machine))))
}

/// GET /api/machines - List active machines.
pub async fn list_machines(
    State(state): State<Arc<AppState>>,
    CurrentMachine(_caller): CurrentMachine,
) -> Result<Json<Vec<MachineResponse>>, ApiError> {
    let machines = MachineRepository::new(state.db.pool()).list_active().await?;

    Ok(Json(machines.into_iter().map(MachineResponse::from).collect()))
}

/// PUT /api/machines/:id/reset-password - Replace a machine's password.
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    CurrentMachine(_caller): CurrentMachine,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<ResetPasswordRequest>,
) -> Result<Json<MachineResponse>, ApiError> {
    let machine = reset_machine_password(&state.db, &state.hasher, id, &req.new_password).await?;

    Ok(Json(MachineResponse::from(machine)))
}

/// DELETE /api/machines/:id - Deactivate a machine.
///
/// Outstanding tokens of the machine stop working immediately.
pub async fn delete_machine(
    State(state): State<Arc<AppState>>,
    CurrentMachine(_caller): CurrentMachine,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let found = MachineRepository::new(state.db.pool()).deactivate(id).await?;
    if !found {
        return Err(ApiError::not_found("Machine not found"));
    }

    Ok(Json(MessageResponse::new("Machine deleted successfully")))
}
