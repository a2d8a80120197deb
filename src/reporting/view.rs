use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::models::{AnalysisRecord, Cue, Drill, Lesson, TaxonomySnapshot};
use crate::scoring::issues::ranked;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseView {
    pub slug: String,
    pub name: String,
    pub score: Option<f64>,
    pub start_secs: Option<f64>,
    pub end_secs: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MechanicView {
    pub slug: String,
    pub name: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueView {
    pub slug: String,
    pub name: String,
    pub severity: f64,
    pub mechanic: Option<String>,
    pub drills: Vec<Drill>,
    pub cues: Vec<Cue>,
    pub lesson: Option<Lesson>,
}

/// An analysis resolved against the taxonomy for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisView {
    pub capture_id: i64,
    pub analysis_id: i64,
    pub user_id: String,
    pub club_type: String,
    pub captured_at: DateTime<Utc>,
    pub overall_confidence: f64,
    pub model: String,
    pub coach_notes: String,
    pub overlay_url: Option<String>,
    pub phases: Vec<PhaseView>,
    pub mechanics: Vec<MechanicView>,
    /// Worst first.
    pub issues: Vec<IssueView>,
    pub taxonomy_version: String,
}

/// Join an analysis with taxonomy names. Slugs the taxonomy does not know are dropped.
pub fn build_view(record: &AnalysisRecord, taxonomy: &TaxonomySnapshot) -> AnalysisView {
    let analysis = &record.analysis;

    let phases = taxonomy.phases.iter()
        .filter_map(|phase| {
            let score = analysis.phase_scores.get(&phase.slug).copied();
            let segment = analysis.phases.iter().find(|s| s.phase == phase.slug);
            if score.is_none() && segment.is_none() {
                return None;
            }
            Some(PhaseView {
                slug: phase.slug.clone(),
                name: phase.name.clone(),
                score,
                start_secs: segment.map(|s| s.start_secs),
                end_secs: segment.map(|s| s.end_secs),
            })
        })
        .collect();

    let mechanics = taxonomy.mechanics.iter()
        .filter_map(|m| {
            analysis.mechanic_scores.get(&m.slug).map(|score| MechanicView {
                slug: m.slug.clone(),
                name: m.name.clone(),
                score: *score,
            })
        })
        .collect();

    let issues = ranked(&analysis.issue_scores).into_iter()
        .filter_map(|(slug, severity)| {
            let error = taxonomy.error(slug)?;
            Some(IssueView {
                slug: error.slug.clone(),
                name: error.name.clone(),
                severity,
                mechanic: error.mechanic.as_deref()
                    .and_then(|m| taxonomy.mechanic(m))
                    .map(|m| m.name.clone()),
                drills: taxonomy.drills_for_error(error).into_iter().cloned().collect(),
                cues: taxonomy.cues_for_error(error).into_iter().cloned().collect(),
                lesson: error.lesson.as_deref().and_then(|l| taxonomy.lesson(l)).cloned(),
            })
        })
        .collect();

    AnalysisView {
        capture_id: record.capture.id,
        analysis_id: analysis.id,
        user_id: record.capture.user_id.clone(),
        club_type: record.capture.club_type.clone(),
        captured_at: record.capture.captured_at,
        overall_confidence: analysis.overall_confidence,
        model: analysis.model.clone(),
        coach_notes: analysis.coach_notes.clone(),
        overlay_url: analysis.overlay_url.clone(),
        phases,
        mechanics,
        issues,
        taxonomy_version: taxonomy.version.clone(),
    }
}

#[cfg(test)]
pub(crate) fn sample_record() -> AnalysisRecord {
    use std::collections::BTreeMap;
    use crate::models::{Analysis, Capture, PhaseSegment};

    AnalysisRecord {
        analysis: Analysis {
            id: 3,
            capture_id: 11,
            overall_confidence: 0.87,
            issue_scores: BTreeMap::from([
                ("sway".to_string(), 0.45),
                ("head-movement".to_string(), 0.8),
                ("reverse-pivot".to_string(), 0.9),
            ]),
            mechanic_scores: BTreeMap::from([
                ("tempo".to_string(), 92.5),
                ("hip-sway".to_string(), 55.0),
                ("wrist-hinge".to_string(), 70.0),
            ]),
            phase_scores: BTreeMap::from([
                ("address".to_string(), 95.0),
                ("backswing".to_string(), 60.0),
            ]),
            phases: vec![
                PhaseSegment { phase: "address".to_string(), start_secs: 0.0, end_secs: 0.33 },
                PhaseSegment { phase: "waggle".to_string(), start_secs: 1.8, end_secs: 2.0 },
            ],
            model: "fairway-heuristic-v1".to_string(),
            coach_notes: "Focus on Head Movement".to_string(),
            overlay_url: None,
            created_at: Utc::now(),
        },
        capture: Capture {
            id: 11,
            user_id: "golfer-1".to_string(),
            video_url: "captures/11/video.mp4".to_string(),
            club_type: "7 Iron".to_string(),
            generate_overlays: false,
            duration_secs: Some(2.0),
            captured_at: Utc::now(),
        },
    }
}
