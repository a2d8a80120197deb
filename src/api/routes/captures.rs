use std::convert::Infallible;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::Stream;
use serde_json::{json, Value};
use tokio::sync::watch;
use crate::api::errors::api_error;
use crate::api::models::SubmitCaptureRequest;
use crate::api::AppState;
use crate::errors::FairwayError;
use crate::pipeline::CaptureStatus;

pub async fn submit_capture(
    State(state): State<AppState>,
    Json(req): Json<SubmitCaptureRequest>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let status = state.pipeline.submit(req.into()).await.map_err(api_error)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "capture_id": status.capture_id,
            "stage": status.stage,
            "percent": status.percent,
        })),
    ))
}

pub async fn get_capture(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match state.db.get_capture(id) {
        Ok(Some(capture)) => Ok(Json(json!(capture))),
        Ok(None) => Err(api_error(FairwayError::NotFound(format!("Capture {}", id)))),
        Err(e) => Err(api_error(e)),
    }
}

pub async fn get_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let status = state.pipeline.status(id).await.map_err(api_error)?;
    Ok(Json(json!(status)))
}

pub async fn cancel_capture(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let status = state.pipeline.cancel(id).await.map_err(api_error)?;
    Ok(Json(json!({
        "capture_id": id,
        "cancelling": true,
        "stage": status.stage,
    })))
}

/// Server-sent `status` events until the capture reaches a terminal stage.
pub async fn capture_events(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, (StatusCode, Json<Value>)> {
    let mut rx = state.pipeline.subscribe(id);
    let initial = match rx.as_mut() {
        Some(rx) => take_current(rx),
        None => state.pipeline.status(id).await.map_err(api_error)?,
    };
    Ok(Sse::new(status_stream(initial, rx)).keep_alive(KeepAlive::default()))
}

fn take_current(rx: &mut watch::Receiver<CaptureStatus>) -> CaptureStatus {
    rx.borrow_and_update().clone()
}

fn status_event(status: &CaptureStatus) -> Event {
    Event::default()
        .event("status")
        .data(serde_json::to_string(status).unwrap_or_default())
}

pub(crate) fn status_stream(
    initial: CaptureStatus,
    rx: Option<watch::Receiver<CaptureStatus>>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    futures::stream::unfold(
        (Some(initial), rx, false),
        |(pending, mut rx, finished)| async move {
            if finished {
                return None;
            }
            let status = match pending {
                Some(s) => s,
                None => {
                    let r = rx.as_mut()?;
                    r.changed().await.ok()?;
                    take_current(r)
                }
            };
            let done = status.is_terminal();
            Some((Ok(status_event(&status)), (None, rx, done)))
        },
    )
}
