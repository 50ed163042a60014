use axum::{routing::get, Router};
use std::sync::Arc;

use crate::features::prompts::{handlers, services::PromptService};

/// Prompt library routes for the caller's scope (authentication required)
pub fn routes(service: Arc<PromptService>) -> Router {
    Router::new()
        .route(
            "/api/prompts",
            get(handlers::list_prompts).post(handlers::create_prompt),
        )
        .route(
            "/api/prompts/{id}",
            get(handlers::get_prompt)
                .put(handlers::update_prompt)
                .delete(handlers::delete_prompt),
        )
        .with_state(service)
}

/// Public prompt search (no authentication)
pub fn public_routes(service: Arc<PromptService>) -> Router {
    Router::new()
        .route("/api/prompts/public", get(handlers::search_public_prompts))
        .with_state(service)
}
