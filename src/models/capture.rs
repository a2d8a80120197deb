use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded swing video plus session metadata. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capture {
    pub id: i64,
    pub user_id: String,
    /// Location of the ingested video inside managed storage.
    pub video_url: String,
    pub club_type: String,
    pub generate_overlays: bool,
    pub duration_secs: Option<f64>,
    pub captured_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCapture {
    pub user_id: String,
    pub video_url: String,
    pub club_type: String,
    pub generate_overlays: bool,
    pub duration_secs: Option<f64>,
}
