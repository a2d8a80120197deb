use std::path::Path;
use serde::Serialize;
use crate::audit::atomic_write;
use crate::errors::FairwayError;
use crate::models::pose::SKELETON;
use super::segment::Segmentation;

pub const OVERLAY_FILE: &str = "overlay.json";

#[derive(Debug, Serialize)]
pub struct Overlay {
    pub capture_id: i64,
    pub fps: f64,
    pub markers: Vec<Marker>,
    pub frames: Vec<OverlayFrame>,
}

#[derive(Debug, Serialize)]
pub struct Marker {
    pub label: &'static str,
    pub t: f64,
}

#[derive(Debug, Serialize)]
pub struct OverlayFrame {
    pub t: f64,
    /// Line segments as `[x1, y1, x2, y2]` in normalized coordinates.
    pub segments: Vec<[f64; 4]>,
}

pub fn build_overlay(capture_id: i64, fps: f64, seg: &Segmentation) -> Overlay {
    let k = seg.key;
    let markers = vec![
        Marker { label: "takeaway", t: seg.t(k.takeaway) },
        Marker { label: "top", t: seg.t(k.top) },
        Marker { label: "impact", t: seg.t(k.impact) },
        Marker { label: "finish", t: seg.t(k.finish) },
    ];
    let frames = seg.frames.iter().map(|f| OverlayFrame {
        t: f.t,
        segments: SKELETON.iter()
            .filter_map(|(a, b)| {
                let (pa, pb) = (f.point(a)?, f.point(b)?);
                Some([pa.x, pa.y, pb.x, pb.y])
            })
            .collect(),
    }).collect();

    Overlay { capture_id, fps, markers, frames }
}

/// Write the overlay beside the capture's video and return its path.
pub async fn write_overlay(dir: &Path, overlay: &Overlay) -> Result<String, FairwayError> {
    let path = dir.join(OVERLAY_FILE);
    let json = serde_json::to_vec(overlay)?;
    atomic_write(&path, &json).await?;
    Ok(path.to_string_lossy().into_owned())
}
