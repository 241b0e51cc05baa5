use crate::web::handlers;
use crate::web::idempotency::{replay_idempotent, IdempotencyCache};
use crate::web::middleware::correlation_id;
use crate::web::state::AppState;
use axum::{
    middleware as axum_mw,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::trace::TraceLayer;

/// Build the full axum router with all routes and middleware.
pub fn build_router(state: AppState, idempotency_ttl: Duration) -> Router {
    let cache = IdempotencyCache::new(idempotency_ttl);

    let api = Router::new()
        .route("/events", get(handlers::list_events))
        .route("/events/:event_id/outcome", post(handlers::record_outcome))
        .route(
            "/bets",
            post(handlers::place_bet)
                .layer(axum_mw::from_fn_with_state(cache, replay_idempotent)),
        )
        .route("/users/:user_id/balance", get(handlers::user_balance));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/v1", api)
        .layer(axum_mw::from_fn(correlation_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
