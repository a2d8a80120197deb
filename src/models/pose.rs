use std::collections::HashMap;
use serde::{Deserialize, Serialize};

pub const NOSE: &str = "nose";
pub const LEFT_SHOULDER: &str = "left_shoulder";
pub const RIGHT_SHOULDER: &str = "right_shoulder";
pub const LEFT_ELBOW: &str = "left_elbow";
pub const RIGHT_ELBOW: &str = "right_elbow";
pub const LEFT_WRIST: &str = "left_wrist";
pub const RIGHT_WRIST: &str = "right_wrist";
pub const LEFT_HIP: &str = "left_hip";
pub const RIGHT_HIP: &str = "right_hip";
pub const LEFT_ANKLE: &str = "left_ankle";
pub const RIGHT_ANKLE: &str = "right_ankle";

/// Keypoints every frame needs for segmentation and scoring.
pub const REQUIRED_KEYPOINTS: &[&str] = &[
    NOSE,
    LEFT_SHOULDER,
    RIGHT_SHOULDER,
    LEFT_WRIST,
    RIGHT_WRIST,
    LEFT_HIP,
    RIGHT_HIP,
];

/// Skeleton edges drawn in overlays.
pub const SKELETON: &[(&str, &str)] = &[
    (LEFT_SHOULDER, RIGHT_SHOULDER),
    (LEFT_SHOULDER, LEFT_ELBOW),
    (LEFT_ELBOW, LEFT_WRIST),
    (RIGHT_SHOULDER, RIGHT_ELBOW),
    (RIGHT_ELBOW, RIGHT_WRIST),
    (LEFT_SHOULDER, LEFT_HIP),
    (RIGHT_SHOULDER, RIGHT_HIP),
    (LEFT_HIP, RIGHT_HIP),
    (LEFT_HIP, LEFT_ANKLE),
    (RIGHT_HIP, RIGHT_ANKLE),
];

/// Keypoints below this confidence are treated as missing.
pub const MIN_KEYPOINT_CONFIDENCE: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    #[default]
    Right,
    Left,
}

impl Handedness {
    /// Side of the body facing the target: a right-handed golfer leads with the left.
    pub fn lead_side(&self) -> &'static str {
        match self {
            Handedness::Right => "left",
            Handedness::Left => "right",
        }
    }
}

/// Normalized image coordinates; `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn midpoint(a: Point, b: Point) -> Point {
        Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
    }

    pub fn distance(&self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    /// Seconds from the start of the video.
    pub t: f64,
    /// Keypoint name to `[x, y, confidence]`.
    pub keypoints: HashMap<String, [f64; 3]>,
}

impl PoseFrame {
    pub fn point(&self, name: &str) -> Option<Point> {
        self.keypoints.get(name)
            .filter(|kp| kp[2] >= MIN_KEYPOINT_CONFIDENCE)
            .map(|kp| Point::new(kp[0], kp[1]))
    }

    pub fn has_required(&self) -> bool {
        REQUIRED_KEYPOINTS.iter().all(|k| self.point(k).is_some())
    }

    pub fn hands(&self) -> Option<Point> {
        Some(Point::midpoint(self.point(LEFT_WRIST)?, self.point(RIGHT_WRIST)?))
    }

    pub fn shoulder_mid(&self) -> Option<Point> {
        Some(Point::midpoint(self.point(LEFT_SHOULDER)?, self.point(RIGHT_SHOULDER)?))
    }

    pub fn hip_mid(&self) -> Option<Point> {
        Some(Point::midpoint(self.point(LEFT_HIP)?, self.point(RIGHT_HIP)?))
    }

    pub fn shoulder_width(&self) -> Option<f64> {
        Some(self.point(LEFT_SHOULDER)?.distance(self.point(RIGHT_SHOULDER)?))
    }

    pub fn ankle_mid(&self) -> Option<Point> {
        Some(Point::midpoint(self.point(LEFT_ANKLE)?, self.point(RIGHT_ANKLE)?))
    }

    /// Mean confidence over the required keypoints that are present at all.
    pub fn mean_confidence(&self) -> f64 {
        let confs: Vec<f64> = REQUIRED_KEYPOINTS.iter()
            .filter_map(|k| self.keypoints.get(*k).map(|kp| kp[2]))
            .collect();
        if confs.is_empty() {
            0.0
        } else {
            confs.iter().sum::<f64>() / confs.len() as f64
        }
    }
}

/// Output of a pose extractor for one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseSequence {
    pub fps: f64,
    #[serde(default)]
    pub handedness: Handedness,
    pub frames: Vec<PoseFrame>,
}

impl PoseSequence {
    pub fn duration_secs(&self) -> f64 {
        match (self.frames.first(), self.frames.last()) {
            (Some(a), Some(b)) => (b.t - a.t).max(0.0),
            _ => 0.0,
        }
    }
}
