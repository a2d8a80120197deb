//! Swing scoring from pose keypoints: segmentation into phases, mechanic
//! scores, issue severities and coaching notes.

pub mod issues;
pub mod mechanics;
pub mod notes;
pub mod overlay;
pub mod segment;

#[cfg(test)]
pub(crate) mod fixtures;

use std::collections::BTreeMap;
use crate::errors::FairwayError;
use crate::models::{PhaseSegment, PoseSequence, TaxonomySnapshot};
use tracing::debug;

pub use segment::{segment, Segmentation};

/// Everything an analysis needs, minus identifiers.
#[derive(Debug, Clone)]
pub struct ScoreCard {
    pub overall_confidence: f64,
    pub issue_scores: BTreeMap<String, f64>,
    pub mechanic_scores: BTreeMap<String, f64>,
    pub phase_scores: BTreeMap<String, f64>,
    pub phases: Vec<PhaseSegment>,
    pub coach_notes: String,
    pub segmentation: Segmentation,
}

#[derive(Debug, Clone)]
pub struct SwingScorer {
    pub issue_threshold: f64,
    pub model_id: String,
}

impl SwingScorer {
    pub fn new(issue_threshold: f64, model_id: impl Into<String>) -> Self {
        Self { issue_threshold, model_id: model_id.into() }
    }

    pub fn segment(&self, seq: &PoseSequence) -> Result<Segmentation, FairwayError> {
        segment::segment(seq)
    }

    pub fn score(&self, seq: &PoseSequence, seg: Segmentation, taxonomy: &TaxonomySnapshot) -> Result<ScoreCard, FairwayError> {
        let measurements = mechanics::measure(&seg, seq.handedness)?;
        debug!(?measurements, "Swing measurements");

        let mechanic_scores = mechanics::score_mechanics(&measurements);
        let phase_scores = mechanics::score_phases(&mechanic_scores);
        let issue_scores = issues::detect_issues(&measurements, self.issue_threshold);
        let coach_notes = notes::build_coach_notes(&issue_scores, &mechanic_scores, taxonomy);

        let mean_conf = seg.frames.iter().map(|f| f.mean_confidence()).sum::<f64>()
            / seg.frames.len().max(1) as f64;
        let overall_confidence = ((mean_conf * seg.coverage()).clamp(0.0, 1.0) * 1000.0).round() / 1000.0;

        Ok(ScoreCard {
            overall_confidence,
            issue_scores,
            mechanic_scores,
            phase_scores,
            phases: seg.phase_segments(),
            coach_notes,
            segmentation: seg,
        })
    }
}
