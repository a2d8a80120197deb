//! Synthetic face-on swings for tests.

use std::collections::HashMap;
use crate::models::pose::*;
use crate::models::{Point, PoseFrame, PoseSequence};

#[derive(Debug, Clone)]
pub struct SwingParams {
    pub fps: f64,
    pub address_frames: usize,
    pub backswing_frames: usize,
    pub downswing_frames: usize,
    pub follow_frames: usize,
    pub finish_frames: usize,
    /// Lateral nose drift reached at the top, in image units.
    pub head_drift: f64,
    /// Lateral hip drift reached at the top, in image units.
    pub hip_sway: f64,
    pub confidence: f64,
}

impl Default for SwingParams {
    fn default() -> Self {
        Self {
            fps: 30.0,
            address_frames: 10,
            backswing_frames: 24,
            downswing_frames: 8,
            follow_frames: 12,
            finish_frames: 6,
            head_drift: 0.0,
            hip_sway: 0.0,
            confidence: 0.9,
        }
    }
}

const ADDRESS_HANDS: Point = Point { x: 0.5, y: 0.65 };
const TOP_HANDS: Point = Point { x: 0.35, y: 0.2 };
const IMPACT_HANDS: Point = Point { x: 0.5, y: 0.66 };
const FINISH_HANDS: Point = Point { x: 0.65, y: 0.18 };

fn lerp(a: Point, b: Point, k: usize, n: usize) -> Point {
    if k >= n {
        return b;
    }
    let f = k as f64 / n as f64;
    Point::new(a.x + (b.x - a.x) * f, a.y + (b.y - a.y) * f)
}

/// Progress through the backswing in 0..=1; drift builds to the top and is held after.
fn drift_fraction(i: usize, p: &SwingParams) -> f64 {
    if i < p.address_frames {
        0.0
    } else {
        ((i - p.address_frames + 1) as f64 / p.backswing_frames as f64).min(1.0)
    }
}

pub fn synthetic_swing(p: &SwingParams) -> PoseSequence {
    let total = p.address_frames + p.backswing_frames + p.downswing_frames + p.follow_frames + p.finish_frames;
    let back_end = p.address_frames + p.backswing_frames;
    let down_end = back_end + p.downswing_frames;
    let follow_end = down_end + p.follow_frames;

    let frames = (0..total).map(|i| {
        let hands = if i < p.address_frames {
            ADDRESS_HANDS
        } else if i < back_end {
            lerp(ADDRESS_HANDS, TOP_HANDS, i + 1 - p.address_frames, p.backswing_frames)
        } else if i < down_end {
            lerp(TOP_HANDS, IMPACT_HANDS, i + 1 - back_end, p.downswing_frames)
        } else if i < follow_end {
            lerp(IMPACT_HANDS, FINISH_HANDS, i + 1 - down_end, p.follow_frames)
        } else {
            FINISH_HANDS
        };

        let drift = drift_fraction(i, p);
        let nose = Point::new(0.5 + p.head_drift * drift, 0.2);
        let hip_dx = p.hip_sway * drift;
        let ls = Point::new(0.42, 0.35);
        let rs = Point::new(0.58, 0.35);
        let lw = Point::new(hands.x - 0.01, hands.y);
        let rw = Point::new(hands.x + 0.01, hands.y);

        let c = p.confidence;
        let mut keypoints = HashMap::new();
        let mut put = |name: &str, pt: Point| {
            keypoints.insert(name.to_string(), [pt.x, pt.y, c]);
        };
        put(NOSE, nose);
        put(LEFT_SHOULDER, ls);
        put(RIGHT_SHOULDER, rs);
        put(LEFT_ELBOW, Point::midpoint(ls, lw));
        put(RIGHT_ELBOW, Point::midpoint(rs, rw));
        put(LEFT_WRIST, lw);
        put(RIGHT_WRIST, rw);
        put(LEFT_HIP, Point::new(0.45 + hip_dx, 0.6));
        put(RIGHT_HIP, Point::new(0.55 + hip_dx, 0.6));
        put(LEFT_ANKLE, Point::new(0.44, 0.9));
        put(RIGHT_ANKLE, Point::new(0.56, 0.9));

        PoseFrame { t: i as f64 / p.fps, keypoints }
    }).collect();

    PoseSequence { fps: p.fps, handedness: Handedness::Right, frames }
}
