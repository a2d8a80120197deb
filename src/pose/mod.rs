pub mod command;
pub mod extractor;
pub mod sidecar;

use std::sync::Arc;
use std::time::Duration;
use crate::config::{PoseBackend, PoseConfig};
use crate::errors::FairwayError;

pub use command::CommandPoseExtractor;
pub use extractor::{parse_pose_json, PoseExtractor};
pub use sidecar::SidecarPoseExtractor;

pub fn create_extractor(config: &PoseConfig) -> Result<Arc<dyn PoseExtractor>, FairwayError> {
    match config.backend {
        PoseBackend::Sidecar => Ok(Arc::new(SidecarPoseExtractor)),
        PoseBackend::Command => {
            let command = config.command.as_deref()
                .ok_or_else(|| FairwayError::Config("pose.backend is 'command' but pose.command is unset".to_string()))?;
            Ok(Arc::new(CommandPoseExtractor::new(command, Duration::from_secs(config.timeout_secs))?))
        }
    }
}
