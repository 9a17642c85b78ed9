//! Bearer authentication extractor.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;

use crate::auth::authenticate;
use crate::db::Machine;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// The authenticated, active machine behind a request.
///
/// Adding this extractor to a handler makes the route protected. A
/// missing header yields `AUTHENTICATION_REQUIRED`; any rejected token
/// yields `AUTHENTICATION_FAILED`.
#[derive(Debug, Clone)]
pub struct CurrentMachine(pub Machine);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentMachine {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let machine = authenticate(&state.db, &state.tokens, header).await?;
        Ok(CurrentMachine(machine))
    }
}
