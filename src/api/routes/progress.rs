use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use crate::api::errors::api_error;
use crate::api::models::PageQuery;
use crate::api::AppState;
use crate::errors::FairwayError;

pub async fn get_user_progress(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match state.db.get_progress(&user_id) {
        Ok(Some(entry)) => Ok(Json(json!(entry))),
        Ok(None) => Err(api_error(FairwayError::NotFound(format!("Progress for user '{}'", user_id)))),
        Err(e) => Err(api_error(e)),
    }
}

pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let (limit, offset) = (page.limit(), page.offset());
    let entries = state.db.leaderboard(limit, offset).map_err(api_error)?;
    let next_offset = (entries.len() == limit).then(|| offset.checked_add(limit)).flatten();
    Ok(Json(json!({ "entries": entries, "next_offset": next_offset })))
}
