use std::path::{Path, PathBuf};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use crate::errors::FairwayError;
use crate::models::PoseSequence;
use crate::video::SIDECAR_SUFFIX;
use super::extractor::{parse_pose_json, PoseExtractor};

/// Reads keypoints recorded on-device and stored as `<video>.pose.json`.
pub struct SidecarPoseExtractor;

impl SidecarPoseExtractor {
    pub fn sidecar_path(video: &Path) -> PathBuf {
        let mut s = video.as_os_str().to_os_string();
        s.push(SIDECAR_SUFFIX);
        PathBuf::from(s)
    }
}

#[async_trait]
impl PoseExtractor for SidecarPoseExtractor {
    async fn extract(&self, video: &Path, cancel: &CancellationToken) -> Result<PoseSequence, FairwayError> {
        if cancel.is_cancelled() {
            return Err(FairwayError::Cancelled("Pose extraction cancelled".to_string()));
        }
        let path = Self::sidecar_path(video);
        let raw = tokio::fs::read(&path).await.map_err(|e| {
            FairwayError::Processing(format!("No pose data for {} ({}): {}", video.display(), path.display(), e))
        })?;
        parse_pose_json(&raw)
    }

    fn backend_name(&self) -> &str {
        "sidecar"
    }
}
