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
use crate::models::AnalysisRecord;
use crate::reporting::build_view;

fn find_record(state: &AppState, capture_id: i64) -> Result<AnalysisRecord, FairwayError> {
    state.db.get_analysis_for_capture(capture_id)?
        .ok_or_else(|| FairwayError::NotFound(format!("No analysis for capture {}", capture_id)))
}

/// `{analysis, capture}`; a capture still processing has no analysis yet and yields 404.
pub async fn get_analysis(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let record = find_record(&state, id).map_err(api_error)?;
    Ok(Json(json!(record)))
}

pub async fn get_analysis_view(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let record = find_record(&state, id).map_err(api_error)?;
    let view = build_view(&record, &state.taxonomy.snapshot());
    Ok(Json(json!(view)))
}

pub async fn list_user_analyses(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let (limit, offset) = (page.limit(), page.offset());
    let records = state.db.list_analyses_for_user(&user_id, limit, offset)
        .map_err(api_error)?;
    let next_offset = (records.len() == limit).then(|| offset.checked_add(limit)).flatten();

    Ok(Json(json!({
        "user_id": user_id,
        "analyses": records,
        "next_offset": next_offset,
    })))
}
