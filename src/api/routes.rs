use crate::api::{ensure_session, handlers, AppState};
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health and metrics
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        // Search
        .route("/api/search", get(handlers::search_get).post(handlers::search_post))
        .route("/api/search/suggestions", get(handlers::suggestions))
        .route("/api/search/analytics", get(handlers::analytics))
        .route("/api/search/click", post(handlers::record_click))
        .route("/api/search/cache-stats", get(handlers::cache_stats))
        // Per-user history and saved searches
        .route(
            "/api/search/history",
            get(handlers::history).delete(handlers::clear_history),
        )
        .route("/api/search/popular", get(handlers::popular))
        .route(
            "/api/search/saved",
            get(handlers::list_saved).post(handlers::create_saved),
        )
        .route("/api/search/saved/:id", delete(handlers::delete_saved))
        .route("/api/search/saved/:id/use", post(handlers::use_saved))
        // Add state
        .with_state(state)
        // Add middleware
        .layer(middleware::from_fn(ensure_session))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}
