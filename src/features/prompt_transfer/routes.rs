use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::prompt_transfer::{handlers, services::TransferService};

/// Room for multipart boundaries and the small text fields around the file
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Bulk import/export routes (authentication required)
pub fn routes(service: Arc<TransferService>) -> Router {
    let body_limit = service.max_file_size() + MULTIPART_OVERHEAD;

    Router::new()
        .route(
            "/api/prompts/bulk-import",
            post(handlers::bulk_import).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/api/prompts/bulk-export", get(handlers::bulk_export))
        .with_state(service)
}
