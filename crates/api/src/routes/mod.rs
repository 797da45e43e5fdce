//! API routes.

pub mod health;
pub mod history;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Creates the API router.
///
/// History routes answer with and without the trailing slash.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/browsing-history/", get(history::list_handler))
        .route("/browsing-history", get(history::list_handler))
        .route("/browsing-history/track/", post(history::track_handler))
        .route("/browsing-history/track", post(history::track_handler))
        .route(
            "/browsing-history/categories/",
            get(history::categories_handler),
        )
        .route(
            "/browsing-history/categories",
            get(history::categories_handler),
        )
        .route("/browsing-history/clear/", delete(history::clear_handler))
        .route("/browsing-history/clear", delete(history::clear_handler))
        .route("/health", get(health::health_handler))
        .route("/health/ready", get(health::ready_handler))
        .route("/health/live", get(health::live_handler))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
