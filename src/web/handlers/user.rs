//! User handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::db::{NewUser, UserRepository, UserUpdate};
use crate::web::dto::{
    CreateUserRequest, MessageResponse, UpdateUserRequest, UserResponse, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::CurrentMachine;

/// POST /api/users - Create a user.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    CurrentMachine(_caller): CurrentMachine,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = UserRepository::new(state.db.pool())
        .create(&NewUser::from(req))
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// GET /api/users - List active users.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    CurrentMachine(_caller): CurrentMachine,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = UserRepository::new(state.db.pool()).list_active().await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /api/users/:id - Get an active user.
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    CurrentMachine(_caller): CurrentMachine,
    Path(user_id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = UserRepository::new(state.db.pool())
        .get_by_id(user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(UserResponse::from(user)))
}

/// PUT /api/users/:id - Update a user.
///
/// Only the fields present in the body change.
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    CurrentMachine(_caller): CurrentMachine,
    Path(user_id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = UserRepository::new(state.db.pool())
        .update(user_id, &UserUpdate::from(req))
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(UserResponse::from(user)))
}

/// DELETE /api/users/:id - Deactivate a user.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    CurrentMachine(_caller): CurrentMachine,
    Path(user_id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let found = UserRepository::new(state.db.pool())
        .deactivate(user_id)
        .await?;
    if !found {
        return Err(ApiError::not_found("User not found"));
    }

    Ok(Json(MessageResponse::new("User deleted successfully")))
}
