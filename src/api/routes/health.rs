use axum::{extract::State, Json};
use serde_json::{json, Value};
use crate::api::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "fairway",
        "version": env!("CARGO_PKG_VERSION"),
        "build": {
            "timestamp": env!("BUILD_TIMESTAMP"),
            "git_hash": env!("GIT_HASH"),
        },
        "taxonomy_version": state.taxonomy.version(),
        "active_captures": state.pipeline.active_count(),
    }))
}
