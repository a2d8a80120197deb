use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum CaptureStage {
    Queued,
    Uploading,
    ExtractingPose,
    Segmenting,
    Scoring,
    Done,
    Error,
}

impl CaptureStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Uploading => "uploading",
            Self::ExtractingPose => "extracting-pose",
            Self::Segmenting => "segmenting",
            Self::Scoring => "scoring",
            Self::Done => "done",
            Self::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(Self::Queued),
            "uploading" => Some(Self::Uploading),
            "extracting-pose" => Some(Self::ExtractingPose),
            "segmenting" => Some(Self::Segmenting),
            "scoring" => Some(Self::Scoring),
            "done" => Some(Self::Done),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }
}

impl std::fmt::Display for CaptureStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse outcome the UI switches on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CaptureState {
    Processing,
    Success,
    Error,
}

impl From<CaptureStage> for CaptureState {
    fn from(stage: CaptureStage) -> Self {
        match stage {
            CaptureStage::Done => CaptureState::Success,
            CaptureStage::Error => CaptureState::Error,
            _ => CaptureState::Processing,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaptureStatus {
    pub capture_id: i64,
    pub stage: CaptureStage,
    /// 0..=1, never decreases.
    pub percent: f64,
    pub state: CaptureState,
    pub error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl CaptureStatus {
    pub fn queued(capture_id: i64) -> Self {
        Self {
            capture_id,
            stage: CaptureStage::Queued,
            percent: 0.0,
            state: CaptureState::Processing,
            error: None,
            updated_at: Utc::now(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.stage.is_terminal()
    }
}

/// What the caller asked for at submit time.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitRequest {
    pub user_id: String,
    pub video_uri: String,
    pub duration_hint: Option<f64>,
    pub club: String,
    pub generate_overlays: bool,
}

#[derive(Debug, Clone)]
pub struct CaptureJob {
    pub capture_id: i64,
    pub request: SubmitRequest,
    /// Directory the capture's files live in.
    pub capture_dir: PathBuf,
}
