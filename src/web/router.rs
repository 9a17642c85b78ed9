//! Router configuration for Web API.

use axum::{
    routing::{delete, get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::dto::HealthResponse;
use super::handlers::{
    create_machine, create_order_number, create_part_number, create_performance_id, create_user,
    create_work_session, current_machine, delete_machine, delete_order_number,
    delete_part_number, delete_performance_id, delete_user, get_user, list_machine_work_sessions,
    list_machines, list_order_numbers, list_part_numbers, list_performance_ids,
    list_user_work_sessions, list_users, list_work_sessions, login, reset_password,
    update_order_number, update_part_number, update_performance_id, update_user, AppState,
};
use super::middleware::create_cors_layer;

/// Create the main API router.
///
/// Authentication is enforced per handler by the `CurrentMachine`
/// extractor; only login and health are public.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let machine_routes = Router::new()
        .route("/login", post(login))
        .route("/me", get(current_machine))
        .route("/", post(create_machine).get(list_machines))
        .route("/:id", delete(delete_machine))
        .route("/:id/reset-password", put(reset_password));

    let user_routes = Router::new()
        .route("/", post(create_user).get(list_users))
        .route("/:id", get(get_user).put(update_user).delete(delete_user));

    let part_number_routes = Router::new()
        .route("/", post(create_part_number).get(list_part_numbers))
        .route("/:id", put(update_part_number).delete(delete_part_number));

    let order_number_routes = Router::new()
        .route("/", post(create_order_number).get(list_order_numbers))
        .route("/:id", put(update_order_number).delete(delete_order_number));

    let performance_id_routes = Router::new()
        .route("/", post(create_performance_id).get(list_performance_ids))
        .route("/:id", put(update_performance_id).delete(delete_performance_id));

    let work_session_routes = Router::new()
        .route("/", post(create_work_session).get(list_work_sessions))
        .route("/user/:user_id", get(list_user_work_sessions))
        .route("/machine/:machine_id", get(list_machine_work_sessions));

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .nest("/machines", machine_routes)
        .nest("/users", user_routes)
        .nest("/part-numbers", part_number_routes)
        .nest("/order-numbers", order_number_routes)
        .nest("/performance-ids", performance_id_routes)
        .nest("/work-sessions", work_session_routes);

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins)),
        )
        .with_state(app_state)
}

/// GET /api/health - Liveness probe.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}
