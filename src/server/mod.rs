//! HTTP server module.
//!
//! Axum router, shared handler state, and health checks.

pub mod health;
pub mod routes;
pub mod state;

pub use health::health_check;
pub use routes::build_router;
pub use state::AppState;
