//! Typed HTTP client for the capture, analysis, taxonomy and progress API.

use std::time::Duration;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use crate::errors::{with_retry, FairwayError, RetryConfig};
use crate::models::{AnalysisRecord, Capture, Cue, Drill, LeaderboardEntry, TaxonomySnapshot};
use crate::pipeline::{CaptureStatus, SubmitRequest};
use crate::reporting::AnalysisView;
use tracing::debug;

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:8080";

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryPage {
    pub analyses: Vec<AnalysisRecord>,
    pub next_offset: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardPage {
    pub entries: Vec<LeaderboardEntry>,
    pub next_offset: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct Submitted {
    capture_id: i64,
}

#[derive(Debug, Deserialize)]
struct DrillList {
    drills: Vec<Drill>,
}

#[derive(Debug, Deserialize)]
struct CueList {
    cues: Vec<Cue>,
}

#[derive(Clone)]
pub struct FairwayClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    retry: RetryConfig,
}

impl FairwayClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, FairwayError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| FairwayError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
            retry: RetryConfig::default(),
        })
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self.http.request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(t) => req.bearer_auth(t),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, FairwayError> {
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json::<T>().await?);
        }
        let body: Value = resp.json().await.unwrap_or(Value::Null);
        Err(error_from_response(status, &body))
    }

    /// Idempotent GET, retried on transient failures.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, FairwayError> {
        with_retry(path, &self.retry, || self.send(self.request(Method::GET, path))).await
    }

    pub async fn health(&self) -> Result<Value, FairwayError> {
        self.get("/api/health").await
    }

    /// Submit a recording; returns the capture id.
    pub async fn submit(&self, req: &SubmitRequest) -> Result<i64, FairwayError> {
        let body = serde_json::json!({
            "user_id": req.user_id,
            "video_uri": req.video_uri,
            "duration": req.duration_hint,
            "club": req.club,
            "generate_overlays": req.generate_overlays,
        });
        let submitted: Submitted = self.send(self.request(Method::POST, "/api/captures").json(&body)).await?;
        Ok(submitted.capture_id)
    }

    pub async fn status(&self, capture_id: i64) -> Result<CaptureStatus, FairwayError> {
        self.get(&format!("/api/captures/{}/status", capture_id)).await
    }

    /// Poll until the capture reaches `done` or `error`, reporting each new status.
    pub async fn wait<F>(&self, capture_id: i64, interval: Duration, mut on_update: F) -> Result<CaptureStatus, FairwayError>
    where
        F: FnMut(&CaptureStatus),
    {
        let mut last: Option<(crate::pipeline::CaptureStage, f64)> = None;
        loop {
            let status = self.status(capture_id).await?;
            if last != Some((status.stage, status.percent)) {
                on_update(&status);
                last = Some((status.stage, status.percent));
            }
            if status.is_terminal() {
                return Ok(status);
            }
            tokio::time::sleep(interval).await;
        }
    }

    pub async fn cancel(&self, capture_id: i64) -> Result<Value, FairwayError> {
        self.send(self.request(Method::POST, &format!("/api/captures/{}/cancel", capture_id))).await
    }

    pub async fn capture(&self, capture_id: i64) -> Result<Capture, FairwayError> {
        self.get(&format!("/api/captures/{}", capture_id)).await
    }

    pub async fn analysis(&self, capture_id: i64) -> Result<AnalysisRecord, FairwayError> {
        self.get(&format!("/api/captures/{}/analysis", capture_id)).await
    }

    pub async fn analysis_view(&self, capture_id: i64) -> Result<AnalysisView, FairwayError> {
        self.get(&format!("/api/captures/{}/analysis/view", capture_id)).await
    }

    pub async fn history(&self, user_id: &str, limit: usize, offset: usize) -> Result<HistoryPage, FairwayError> {
        self.get(&format!("/api/users/{}/analyses?limit={}&offset={}", user_id, limit, offset)).await
    }

    pub async fn taxonomy(&self) -> Result<TaxonomySnapshot, FairwayError> {
        self.get("/api/taxonomy").await
    }

    pub async fn drills_for_error(&self, key: &str) -> Result<Vec<Drill>, FairwayError> {
        let list: DrillList = self.get(&format!("/api/taxonomy/errors/{}/drills", key)).await?;
        Ok(list.drills)
    }

    pub async fn cues_for_error(&self, key: &str) -> Result<Vec<Cue>, FairwayError> {
        let list: CueList = self.get(&format!("/api/taxonomy/errors/{}/cues", key)).await?;
        Ok(list.cues)
    }

    pub async fn progress(&self, user_id: &str) -> Result<LeaderboardEntry, FairwayError> {
        self.get(&format!("/api/users/{}/progress", user_id)).await
    }

    pub async fn leaderboard(&self, limit: usize, offset: usize) -> Result<LeaderboardPage, FairwayError> {
        self.get(&format!("/api/leaderboard?limit={}&offset={}", limit, offset)).await
    }
}

/// Rebuild a typed error from the server's `{error, kind, retryable}` body.
pub fn error_from_response(status: StatusCode, body: &Value) -> FairwayError {
    let raw = body["error"].as_str().unwrap_or("").to_string();
    // The server message already carries the variant prefix
    let message = match raw.split_once(": ") {
        Some((_, rest)) if !rest.is_empty() => rest.to_string(),
        _ if raw.is_empty() => format!("HTTP {}", status),
        _ => raw.clone(),
    };
    debug!(%status, kind = ?body["kind"].as_str(), "API error response");

    match body["kind"].as_str() {
        Some("validation_error") => FairwayError::Validation(message),
        Some("upload_error") => FairwayError::Upload(message),
        Some("processing_error") => FairwayError::Processing(message),
        Some("not_found_error") => FairwayError::NotFound(message),
        Some("conflict_error") => FairwayError::Conflict(message),
        Some("cancelled") => FairwayError::Cancelled(message),
        Some("config_error") => FairwayError::Config(message),
        Some("authentication_error") => FairwayError::Authentication(message),
        Some("timeout_error") => FairwayError::Timeout(message),
        _ if status == StatusCode::NOT_FOUND => FairwayError::NotFound(message),
        _ if status == StatusCode::UNAUTHORIZED => FairwayError::Authentication(message),
        _ if status.is_server_error() => FairwayError::Network(message),
        _ => FairwayError::Internal(message),
    }
}
