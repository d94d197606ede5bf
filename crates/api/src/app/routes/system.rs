use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::app::errors;
use crate::app::services::AppServices;

pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}

/// Re-read the inventory table without restarting.
pub async fn reload_inventory(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.run_blocking(|s| s.reload_inventory()).await {
        Ok(Ok(load)) => Json(serde_json::json!({
            "fixtures": load.catalog.keys().count(),
            "rows": load.catalog.len(),
            "skipped_rows": load.skipped,
        }))
        .into_response(),
        Ok(Err(e)) => errors::load_error_to_response(e),
        Err(e) => errors::join_error_to_response(e),
    }
}
