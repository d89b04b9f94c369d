// Route table for the CodeSync API

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers;
use crate::AppState;

/// Full application with state attached
pub fn app(state: Arc<AppState>) -> Router {
    routes().with_state(state)
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::export_metrics))
        .route("/submit", post(handlers::submit))
        .route("/execute", post(handlers::execute))
        .route("/problems", get(handlers::list_problems))
        .route("/problems/:problem_id", get(handlers::get_problem))
}
