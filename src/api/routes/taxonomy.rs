use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use crate::api::errors::api_error;
use crate::api::AppState;

fn etag_for(version: &str) -> String {
    format!("\"{}\"", version)
}

/// True when any entity tag in an `If-None-Match` header matches.
fn matches_etag(if_none_match: &str, etag: &str) -> bool {
    if_none_match.split(',')
        .map(|t| t.trim().trim_start_matches("W/"))
        .any(|t| t == "*" || t == etag)
}

/// The whole snapshot, with `ETag` set to the version marker.
pub async fn get_taxonomy(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let etag = etag_for(state.taxonomy.version());
    let fresh = headers.get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| matches_etag(v, &etag));

    let etag_header = match HeaderValue::from_str(&etag) {
        Ok(v) => v,
        Err(_) => return (StatusCode::OK, Json(json!(*state.taxonomy.snapshot()))).into_response(),
    };
    if fresh {
        return (StatusCode::NOT_MODIFIED, [(header::ETAG, etag_header)]).into_response();
    }
    (
        [
            (header::ETAG, etag_header),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
        ],
        Json(json!(*state.taxonomy.snapshot())),
    ).into_response()
}

pub async fn drills_for_error(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let drills = state.taxonomy.drills_for_error(&key).map_err(api_error)?;
    Ok(Json(json!({ "error_key": key, "drills": drills })))
}

pub async fn cues_for_error(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let cues = state.taxonomy.cues_for_error(&key).map_err(api_error)?;
    Ok(Json(json!({ "error_key": key, "cues": cues })))
}
