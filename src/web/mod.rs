// Web layer: axum routes, DTOs and HTTP middleware on top of the app services.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod idempotency;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
