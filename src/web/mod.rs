//! Web API module.
//!
//! This module exposes the REST API used by the shop-floor terminals:
//! machine login, reference data, operators and work sessions.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::{ApiError, ErrorCode};
pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
