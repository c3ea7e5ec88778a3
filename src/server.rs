use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;

use server_timing::ServerTimingConfig;

use crate::handlers;

/// Builds the demo `Router` with the timing middleware on every route.
pub fn create_router(config: ServerTimingConfig) -> Router {
    let routes = Router::new()
        .route("/api/health", get(handlers::health::health))
        .route("/api/report", get(handlers::report::report));

    // ── Global middleware (applied bottom-up) ───────────────────
    config.attach(routes).layer(CorsLayer::permissive())
}
