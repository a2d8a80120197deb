use crate::errors::FairwayError;
use crate::models::{PhaseSegment, Point, PoseFrame, PoseSequence};

/// Hand displacement from address that marks the takeaway.
pub const TAKEAWAY_THRESHOLD: f64 = 0.03;
/// How far above address the hands must rise before a downswing can be found.
pub const RISE_THRESHOLD: f64 = 0.15;
pub const MIN_FRAMES: usize = 8;

/// Indices into `Segmentation::frames` for the key moments of the swing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyFrames {
    pub takeaway: usize,
    pub top: usize,
    pub impact: usize,
    pub finish: usize,
}

#[derive(Debug, Clone)]
pub struct Segmentation {
    /// Usable frames (all required keypoints present), ordered by time.
    pub frames: Vec<PoseFrame>,
    pub key: KeyFrames,
    /// Frames in the source sequence before filtering.
    pub total_frames: usize,
}

impl Segmentation {
    pub fn t(&self, idx: usize) -> f64 {
        self.frames[idx].t
    }

    pub fn address(&self) -> &PoseFrame {
        &self.frames[0]
    }

    pub fn backswing_secs(&self) -> f64 {
        self.t(self.key.top) - self.t(self.key.takeaway)
    }

    pub fn downswing_secs(&self) -> f64 {
        self.t(self.key.impact) - self.t(self.key.top)
    }

    pub fn coverage(&self) -> f64 {
        if self.total_frames == 0 {
            0.0
        } else {
            self.frames.len() as f64 / self.total_frames as f64
        }
    }

    /// Phase spans: address, backswing, downswing, follow-through and finish.
    /// Impact is an instant, so it marks a boundary rather than a span.
    pub fn phase_segments(&self) -> Vec<PhaseSegment> {
        let k = self.key;
        let start = self.t(0);
        let end = self.t(self.frames.len() - 1);
        let span = |phase: &str, a: f64, b: f64| PhaseSegment {
            phase: phase.to_string(),
            start_secs: a,
            end_secs: b,
        };
        vec![
            span("address", start, self.t(k.takeaway)),
            span("backswing", self.t(k.takeaway), self.t(k.top)),
            span("downswing", self.t(k.top), self.t(k.impact)),
            span("follow-through", self.t(k.impact), self.t(k.finish)),
            span("finish", self.t(k.finish), end),
        ]
    }
}

/// Locate takeaway, top, impact and finish from the hand trajectory.
pub fn segment(seq: &PoseSequence) -> Result<Segmentation, FairwayError> {
    let mut frames: Vec<PoseFrame> = seq.frames.iter()
        .filter(|f| f.has_required())
        .cloned()
        .collect();
    frames.sort_by(|a, b| a.t.total_cmp(&b.t));

    if frames.len() < MIN_FRAMES {
        return Err(FairwayError::Processing(format!(
            "Insufficient pose data: {} usable frames of {} (need {})",
            frames.len(), seq.frames.len(), MIN_FRAMES
        )));
    }

    let hands: Vec<Point> = frames.iter()
        .map(|f| f.hands())
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| FairwayError::Processing("Hand keypoints missing from usable frame".into()))?;
    let address = hands[0];
    let n = hands.len();

    let takeaway = (1..n)
        .find(|&i| hands[i].distance(address) > TAKEAWAY_THRESHOLD)
        .ok_or_else(|| FairwayError::Processing("No swing motion detected".into()))?;

    let rise = (takeaway..n)
        .find(|&i| address.y - hands[i].y > RISE_THRESHOLD)
        .ok_or_else(|| FairwayError::Processing("Could not locate the top of the backswing".into()))?;

    // Lowest hand position once the hands have been up: the bottom of the downswing.
    let impact = argmax_by(rise + 1..n, |i| hands[i].y)
        .ok_or_else(|| FairwayError::Processing("No downswing detected".into()))?;
    if address.y - hands[impact].y > RISE_THRESHOLD {
        return Err(FairwayError::Processing("Hands never returned to the ball".into()));
    }

    let top = argmin_by(takeaway..impact, |i| hands[i].y)
        .ok_or_else(|| FairwayError::Processing("Could not locate the top of the backswing".into()))?;
    if top == takeaway {
        return Err(FairwayError::Processing("Degenerate swing ordering: no backswing frames".into()));
    }

    let finish = argmin_by(impact + 1..n, |i| hands[i].y).unwrap_or(n - 1);

    Ok(Segmentation {
        frames,
        key: KeyFrames { takeaway, top, impact, finish },
        total_frames: seq.frames.len(),
    })
}

/// First index with the smallest key.
fn argmin_by(range: std::ops::Range<usize>, key: impl Fn(usize) -> f64) -> Option<usize> {
    range.fold(None, |best: Option<usize>, i| match best {
        Some(b) if key(b) <= key(i) => Some(b),
        _ => Some(i),
    })
}

/// First index with the largest key.
fn argmax_by(range: std::ops::Range<usize>, key: impl Fn(usize) -> f64) -> Option<usize> {
    range.fold(None, |best: Option<usize>, i| match best {
        Some(b) if key(b) >= key(i) => Some(b),
        _ => Some(i),
    })
}
