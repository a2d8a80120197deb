use std::path::Path;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use crate::errors::FairwayError;
use crate::models::PoseSequence;

#[async_trait]
pub trait PoseExtractor: Send + Sync {
    /// Per-frame keypoints for the video at `video`.
    async fn extract(
        &self,
        video: &Path,
        cancel: &CancellationToken,
    ) -> Result<PoseSequence, FairwayError>;

    /// Backend name for logging
    fn backend_name(&self) -> &str;
}

/// Parse extractor output and reject sequences the scorer cannot use.
pub fn parse_pose_json(raw: &[u8]) -> Result<PoseSequence, FairwayError> {
    let seq: PoseSequence = serde_json::from_slice(raw)
        .map_err(|e| FairwayError::Processing(format!("Malformed pose data: {}", e)))?;
    if !(seq.fps.is_finite() && seq.fps > 0.0) {
        return Err(FairwayError::Processing(format!("Pose data has invalid fps {}", seq.fps)));
    }
    if seq.frames.is_empty() {
        return Err(FairwayError::Processing("Pose data contains no frames".to_string()));
    }
    Ok(seq)
}
