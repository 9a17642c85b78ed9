//! Machine authentication handlers.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::auth::login_machine;
use crate::web::dto::{LoginRequest, MachineResponse, TokenResponse, ValidatedJson};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::CurrentMachine;

/// POST /api/machines/login - Machine login.
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let outcome = login_machine(
        &state.db,
        &state.tokens,
        &state.hasher,
        &req.machine_id,
        &req.password,
    )
    .await?;

    Ok(Json(TokenResponse::bearer(
        outcome.access_token,
        outcome.machine.machine_id,
    )))
}

/// GET /api/machines/me - The machine behind the presented token.
pub async fn current_machine(
    CurrentMachine(machine): CurrentMachine,
) -> Json<MachineResponse> {
    Json(MachineResponse::from(machine))
}
