use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{files, handlers, jobs, middleware::metrics_middleware, ws};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Jobs
        .route("/jobs", post(jobs::process_job))
        .route("/probe", post(jobs::probe))
        // Files
        .route("/uploads", post(files::upload_chunk))
        .route("/files/exists", get(files::file_exists))
        .route("/deletions", post(files::request_deletion))
        .route("/deletions/{token}", delete(files::cancel_deletion))
        .route("/deletions/{token}/confirm", post(files::confirm_deletion))
        // Live updates
        .route("/ws", get(ws::ws_handler))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(metrics_middleware)),
        )
}
