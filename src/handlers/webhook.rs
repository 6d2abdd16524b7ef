// src/handlers/webhook.rs
//! Push delivery: Telegram POSTs each update to `/webhook/<token>`.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::post,
    Router,
};
use std::sync::Arc;

use crate::models::telegram::Update;
use crate::AppState;

pub fn webhook_routes() -> Router {
    Router::new().route("/webhook/:token", post(receive_update))
}

/// POST /webhook/:token - Accept one update and process it in the background
pub async fn receive_update(
    Path(token): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
    Json(update): Json<Update>,
) -> impl IntoResponse {
    if token != state.webhook_token {
        tracing::warn!("Rejected webhook call with wrong token");
        return StatusCode::NOT_FOUND;
    }

    state.bot.dispatch(vec![update]);
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::app_state;

    fn empty_update() -> Update {
        serde_json::from_value(serde_json::json!({"update_id": 1})).unwrap()
    }

    #[tokio::test]
    async fn test_wrong_token_is_rejected() {
        let state = app_state("secret");
        let response = receive_update(
            Path("guess".to_string()),
            Extension(state),
            Json(empty_update()),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_matching_token_is_accepted() {
        let state = app_state("secret");
        let response = receive_update(
            Path("secret".to_string()),
            Extension(state),
            Json(empty_update()),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
