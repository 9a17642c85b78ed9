//! Reference catalog handlers (part numbers, order numbers, performance IDs).
//!
//! The three catalogs behave identically; each route is a thin wrapper that
//! fixes the [`CodeKind`].

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::db::{CodeKind, CodeRepository, CodeUpdate, NewCode};
use crate::web::dto::{
    CodeResponse, CreateOrderNumberRequest, CreatePartNumberRequest, CreatePerformanceIdRequest,
    MessageResponse, UpdateCodeRequest, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::CurrentMachine;

type Created = (StatusCode, Json<CodeResponse>);

async fn create_code(
    state: &AppState,
    kind: CodeKind,
    new_code: NewCode,
) -> Result<Created, ApiError> {
    let entry = CodeRepository::new(state.db.pool(), kind)
        .create(&new_code)
        .await?;

    Ok((StatusCode::CREATED, Json(CodeResponse::new(kind, entry))))
}

async fn list_codes(
    state: &AppState,
    kind: CodeKind,
) -> Result<Json<Vec<CodeResponse>>, ApiError> {
    let entries = CodeRepository::new(state.db.pool(), kind)
        .list_active()
        .await?;

    Ok(Json(
        entries
            .into_iter()
            .map(|entry| CodeResponse::new(kind, entry))
            .collect(),
    ))
}

async fn update_code(
    state: &AppState,
    kind: CodeKind,
    id: i64,
    update: CodeUpdate,
) -> Result<Json<CodeResponse>, ApiError> {
    let entry = CodeRepository::new(state.db.pool(), kind)
        .update(id, &update)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("{} not found", kind.label())))?;

    Ok(Json(CodeResponse::new(kind, entry)))
}

async fn delete_code(
    state: &AppState,
    kind: CodeKind,
    id: i64,
) -> Result<Json<MessageResponse>, ApiError> {
    let found = CodeRepository::new(state.db.pool(), kind)
        .deactivate(id)
        .await?;
    if !found {
        return Err(ApiError::not_found(format!("{} not found", kind.label())));
    }

    Ok(Json(MessageResponse::new(format!(
        "{} deleted successfully",
        kind.label()
    ))))
}

// ============================================================================
// Part numbers
// ============================================================================

/// POST /api/part-numbers - Create a part number.
pub async fn create_part_number(
    State(state): State<Arc<AppState>>,
    CurrentMachine(_caller): CurrentMachine,
    ValidatedJson(req): ValidatedJson<CreatePartNumberRequest>,
) -> Result<Created, ApiError> {
    create_code(&state, CodeKind::PartNumber, req.into()).await
}

/// GET /api/part-numbers - List active part numbers.
pub async fn list_part_numbers(
    State(state): State<Arc<AppState>>,
    CurrentMachine(_caller): CurrentMachine,
) -> Result<Json<Vec<CodeResponse>>, ApiError> {
    list_codes(&state, CodeKind::PartNumber).await
}

/// PUT /api/part-numbers/:id - Update a part number.
pub async fn update_part_number(
    State(state): State<Arc<AppState>>,
    CurrentMachine(_caller): CurrentMachine,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateCodeRequest>,
) -> Result<Json<CodeResponse>, ApiError> {
    update_code(&state, CodeKind::PartNumber, id, req.into()).await
}

/// DELETE /api/part-numbers/:id - Deactivate a part number.
pub async fn delete_part_number(
    State(state): State<Arc<AppState>>,
    CurrentMachine(_caller): CurrentMachine,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    delete_code(&state, CodeKind::PartNumber, id).await
}

// ============================================================================
// Order numbers
// ============================================================================

/// POST /api/order-numbers - Create an order number.
pub async fn create_order_number(
    State(state): State<Arc<AppState>>,
    CurrentMachine(_caller): CurrentMachine,
    ValidatedJson(req): ValidatedJson<CreateOrderNumberRequest>,
) -> Result<Created, ApiError> {
    create_code(&state, CodeKind::OrderNumber, req.into()).await
}

/// GET /api/order-numbers - List active order numbers.
pub async fn list_order_numbers(
    State(state): State<Arc<AppState>>,
    CurrentMachine(_caller): CurrentMachine,
) -> Result<Json<Vec<CodeResponse>>, ApiError> {
    list_codes(&state, CodeKind::OrderNumber).await
}

/// PUT /api/order-numbers/:id - Update an order number.
pub async fn update_order_number(
    State(state): State<Arc<AppState>>,
    CurrentMachine(_caller): CurrentMachine,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateCodeRequest>,
) -> Result<Json<CodeResponse>, ApiError> {
    update_code(&state, CodeKind::OrderNumber, id, req.into()).await
}

/// DELETE /api/order-numbers/:id - Deactivate an order number.
pub async fn delete_order_number(
    State(state): State<Arc<AppState>>,
    CurrentMachine(_caller): CurrentMachine,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    delete_code(&state, CodeKind::OrderNumber, id).await
}

// ============================================================================
// Performance IDs
// ============================================================================

/// POST /api/performance-ids - Create a performance ID.
pub async fn create_performance_id(
    State(state): State<Arc<AppState>>,
    CurrentMachine(_caller): CurrentMachine,
    ValidatedJson(req): ValidatedJson<CreatePerformanceIdRequest>,
) -> Result<Created, ApiError> {
    create_code(&state, CodeKind::PerformanceId, req.into()).await
}

/// GET /api/performance-ids - List active performance IDs.
pub async fn list_performance_ids(
    State(state): State<Arc<AppState>>,
    CurrentMachine(_caller): CurrentMachine,
) -> Result<Json<Vec<CodeResponse>>, ApiError> {
    list_codes(&state, CodeKind::PerformanceId).await
}

/// PUT /api/performance-ids/:id - Update a performance ID.
pub async fn update_performance_id(
    State(state): State<Arc<AppState>>,
    CurrentMachine(_caller): CurrentMachine,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateCodeRequest>,
) -> Result<Json<CodeResponse>, ApiError> {
    update_code(&state, CodeKind::PerformanceId, id, req.into()).await
}

/// DELETE /api/performance-ids/:id - Deactivate a performance ID.
pub async fn delete_performance_id(
    State(state): State<Arc<AppState>>,
    CurrentMachine(_caller): CurrentMachine,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    delete_code(&state, CodeKind::PerformanceId, id).await
}
