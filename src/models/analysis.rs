use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use super::capture::Capture;

/// Time span of one swing phase within the capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSegment {
    pub phase: String,
    pub start_secs: f64,
    pub end_secs: f64,
}

impl PhaseSegment {
    pub fn duration_secs(&self) -> f64 {
        (self.end_secs - self.start_secs).max(0.0)
    }
}

/// Scoring and diagnostic output for exactly one capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub id: i64,
    pub capture_id: i64,
    /// 0..=1
    pub overall_confidence: f64,
    /// Issue slug to severity in 0..=1.
    pub issue_scores: BTreeMap<String, f64>,
    /// Mechanic slug to score in 0..=100.
    pub mechanic_scores: BTreeMap<String, f64>,
    /// Phase slug to score in 0..=100.
    pub phase_scores: BTreeMap<String, f64>,
    pub phases: Vec<PhaseSegment>,
    pub model: String,
    pub coach_notes: String,
    pub overlay_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewAnalysis {
    pub capture_id: i64,
    pub overall_confidence: f64,
    pub issue_scores: BTreeMap<String, f64>,
    pub mechanic_scores: BTreeMap<String, f64>,
    pub phase_scores: BTreeMap<String, f64>,
    pub phases: Vec<PhaseSegment>,
    pub model: String,
    pub coach_notes: String,
    pub overlay_url: Option<String>,
}

/// An analysis together with the capture it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub analysis: Analysis,
    pub capture: Capture,
}
