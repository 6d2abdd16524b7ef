// src/handlers/status.rs
use axum::{extract::Extension, response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::db;
use crate::AppState;

pub fn status_routes() -> Router {
    Router::new().route("/api/status", get(api_status))
}

/// GET /api/status - Health check
pub async fn api_status(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    let db_status = if db::is_healthy(&state.db_pool).await {
        "healthy"
    } else {
        "unhealthy"
    };

    Json(json!({
        "status": "operational",
        "version": env!("CARGO_PKG_VERSION"),
        "delivery": "webhook",
        "services": {
            "database": db_status,
        },
        "active_sessions": state.bot.engine().sessions().len().await,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::app_state;

    #[tokio::test]
    async fn test_status_reports_unreachable_database() {
        let Json(body) = api_status(Extension(app_state("secret"))).await;
        assert_eq!(body["status"], "operational");
        assert_eq!(body["services"]["database"], "unhealthy");
        assert_eq!(body["active_sessions"], 0);
    }
}
