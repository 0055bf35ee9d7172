use axum::{Extension, response::Json};
use serde_json::{Value, json};

use super::AppState;

pub async fn health(Extension(state): Extension<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": state.sessions.len().await,
        "pending_authorizations": state.broker.pending_count().await,
    }))
}
