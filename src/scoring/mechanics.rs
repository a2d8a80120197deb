use std::collections::BTreeMap;
use crate::errors::FairwayError;
use crate::models::pose::{LEFT_ELBOW, LEFT_SHOULDER, LEFT_WRIST, NOSE, RIGHT_ELBOW, RIGHT_SHOULDER, RIGHT_WRIST};
use crate::models::{Handedness, Point, PoseFrame};
use super::segment::Segmentation;

pub const IDEAL_TEMPO_RATIO: f64 = 3.0;

/// Mechanics that govern each scored phase. A phase score is the mean of
/// whichever of these were measured.
pub static PHASE_MECHANICS: &[(&str, &[&str])] = &[
    ("address", &["spine-angle"]),
    ("backswing", &["hip-sway", "lead-arm"]),
    ("downswing", &["tempo", "head-stability"]),
    ("impact", &["spine-angle", "head-stability"]),
    ("follow-through", &["finish-balance"]),
];

/// Raw geometric measurements, normalized by shoulder width where they are distances.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurements {
    pub tempo_ratio: f64,
    pub head_drift: f64,
    pub address_spine_deg: f64,
    pub impact_spine_deg: f64,
    pub hip_sway: f64,
    pub lead_elbow_deg: Option<f64>,
    pub finish_offset: Option<f64>,
}

impl Measurements {
    /// Positive when the torso is more upright at impact than at address.
    pub fn spine_loss_deg(&self) -> f64 {
        self.address_spine_deg - self.impact_spine_deg
    }
}

pub fn measure(seg: &Segmentation, handedness: Handedness) -> Result<Measurements, FairwayError> {
    let address = seg.address();
    let scale = address.shoulder_width()
        .filter(|w| *w > 0.01)
        .ok_or_else(|| FairwayError::Processing("Shoulder width too small to normalize measurements".into()))?;

    let k = seg.key;
    let min_dt = 1.0 / seg.frames.len().max(1) as f64;
    let downswing = seg.downswing_secs().max(min_dt);
    let tempo_ratio = seg.backswing_secs().max(0.0) / downswing;

    let nose0 = address.point(NOSE)
        .ok_or_else(|| FairwayError::Processing("Nose keypoint missing at address".into()))?;
    let head_drift = seg.frames[..=k.impact].iter()
        .filter_map(|f| f.point(NOSE))
        .map(|p| p.distance(nose0) / scale)
        .fold(0.0, f64::max);

    let address_spine_deg = spine_tilt_deg(address)
        .ok_or_else(|| FairwayError::Processing("Torso keypoints missing at address".into()))?;
    let impact_spine_deg = spine_tilt_deg(&seg.frames[k.impact])
        .ok_or_else(|| FairwayError::Processing("Torso keypoints missing at impact".into()))?;

    let hip0 = address.hip_mid()
        .ok_or_else(|| FairwayError::Processing("Hip keypoints missing at address".into()))?;
    let hip_sway = seg.frames[k.takeaway..=k.top].iter()
        .filter_map(|f| f.hip_mid())
        .map(|p| (p.x - hip0.x).abs() / scale)
        .fold(0.0, f64::max);

    let lead_elbow_deg = lead_elbow_angle(&seg.frames[k.top], handedness);

    let finish = &seg.frames[k.finish];
    let finish_offset = match (finish.point(NOSE), finish.ankle_mid()) {
        (Some(nose), Some(feet)) => Some((nose.x - feet.x).abs() / scale),
        _ => None,
    };

    Ok(Measurements {
        tempo_ratio,
        head_drift,
        address_spine_deg,
        impact_spine_deg,
        hip_sway,
        lead_elbow_deg,
        finish_offset,
    })
}

/// Mechanic slug to 0..=100. Mechanics whose keypoints were missing are absent.
pub fn score_mechanics(m: &Measurements) -> BTreeMap<String, f64> {
    let mut scores = BTreeMap::new();
    scores.insert("tempo".to_string(), clamp_score(100.0 - (m.tempo_ratio - IDEAL_TEMPO_RATIO).abs() * 30.0));
    scores.insert("head-stability".to_string(), clamp_score(100.0 * (1.0 - m.head_drift / 0.5)));
    let spine_change = (m.impact_spine_deg - m.address_spine_deg).abs();
    scores.insert("spine-angle".to_string(), clamp_score(100.0 * (1.0 - spine_change / 20.0)));
    scores.insert("hip-sway".to_string(), clamp_score(100.0 * (1.0 - m.hip_sway / 0.4)));
    if let Some(elbow) = m.lead_elbow_deg {
        scores.insert("lead-arm".to_string(), clamp_score(100.0 * (1.0 - (180.0 - elbow) / 60.0)));
    }
    if let Some(offset) = m.finish_offset {
        scores.insert("finish-balance".to_string(), clamp_score(100.0 * (1.0 - offset / 0.8)));
    }
    scores
}

pub fn score_phases(mechanics: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
    PHASE_MECHANICS.iter()
        .filter_map(|(phase, slugs)| {
            let vals: Vec<f64> = slugs.iter().filter_map(|s| mechanics.get(*s).copied()).collect();
            if vals.is_empty() {
                None
            } else {
                Some((phase.to_string(), round1(vals.iter().sum::<f64>() / vals.len() as f64)))
            }
        })
        .collect()
}

/// Torso tilt from vertical in degrees, hips to shoulders.
fn spine_tilt_deg(frame: &PoseFrame) -> Option<f64> {
    let hips = frame.hip_mid()?;
    let shoulders = frame.shoulder_mid()?;
    let dx = (shoulders.x - hips.x).abs();
    let dy = hips.y - shoulders.y;
    Some(dx.atan2(dy).to_degrees())
}

fn lead_elbow_angle(frame: &PoseFrame, handedness: Handedness) -> Option<f64> {
    let (shoulder, elbow, wrist) = match handedness.lead_side() {
        "left" => (LEFT_SHOULDER, LEFT_ELBOW, LEFT_WRIST),
        _ => (RIGHT_SHOULDER, RIGHT_ELBOW, RIGHT_WRIST),
    };
    Some(joint_angle_deg(frame.point(shoulder)?, frame.point(elbow)?, frame.point(wrist)?))
}

/// Angle at `b` between segments b→a and b→c.
pub fn joint_angle_deg(a: Point, b: Point, c: Point) -> f64 {
    let (v1x, v1y) = (a.x - b.x, a.y - b.y);
    let (v2x, v2y) = (c.x - b.x, c.y - b.y);
    let n1 = (v1x * v1x + v1y * v1y).sqrt();
    let n2 = (v2x * v2x + v2y * v2y).sqrt();
    if n1 < 1e-9 || n2 < 1e-9 {
        return 180.0;
    }
    let cos = ((v1x * v2x + v1y * v2y) / (n1 * n2)).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

fn clamp_score(v: f64) -> f64 {
    round1(v.clamp(0.0, 100.0))
}

pub(crate) fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
