use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use async_trait::async_trait;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use crate::errors::FairwayError;
use crate::models::PoseSequence;
use super::extractor::{parse_pose_json, PoseExtractor};
use tracing::debug;

const VIDEO_PLACEHOLDER: &str = "{video}";

/// Runs an external pose estimator that prints pose JSON on stdout.
pub struct CommandPoseExtractor {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandPoseExtractor {
    pub fn new(command: &[String], timeout: Duration) -> Result<Self, FairwayError> {
        let (program, args) = command.split_first()
            .ok_or_else(|| FairwayError::Config("pose.command must name a program".to_string()))?;
        Ok(Self { program: program.clone(), args: args.to_vec(), timeout })
    }

    /// `{video}` is substituted; without a placeholder the path is appended.
    fn args_for(&self, video: &Path) -> Vec<String> {
        let path = video.to_string_lossy();
        let mut args: Vec<String> = self.args.iter()
            .map(|a| a.replace(VIDEO_PLACEHOLDER, &path))
            .collect();
        if !self.args.iter().any(|a| a.contains(VIDEO_PLACEHOLDER)) {
            args.push(path.into_owned());
        }
        args
    }
}

#[async_trait]
impl PoseExtractor for CommandPoseExtractor {
    async fn extract(&self, video: &Path, cancel: &CancellationToken) -> Result<PoseSequence, FairwayError> {
        let args = self.args_for(video);
        debug!(program = %self.program, ?args, "Running pose command");

        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| FairwayError::Processing(format!("Failed to start pose command '{}': {}", self.program, e)))?;

        let output = tokio::select! {
            _ = cancel.cancelled() => {
                return Err(FairwayError::Cancelled("Pose extraction cancelled".to_string()));
            }
            res = tokio::time::timeout(self.timeout, child.wait_with_output()) => match res {
                Err(_) => {
                    return Err(FairwayError::Timeout(format!(
                        "Pose command exceeded {}s", self.timeout.as_secs()
                    )));
                }
                Ok(out) => out.map_err(|e| FairwayError::Processing(format!("Pose command failed: {}", e)))?,
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FairwayError::Processing(format!(
                "Pose command exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        parse_pose_json(&output.stdout)
    }

    fn backend_name(&self) -> &str {
        "command"
    }
}
