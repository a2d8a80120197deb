use std::path::{Path, PathBuf};
use chrono::Utc;
use tokio::io::AsyncWriteExt;
use crate::errors::FairwayError;

pub const PROCESSING_LOG: &str = "processing.jsonl";

/// Append-only JSONL trail of one capture's processing, kept beside its video.
pub struct CaptureLogger {
    path: PathBuf,
    file: tokio::fs::File,
}

impl CaptureLogger {
    pub async fn open(capture_dir: &Path) -> Result<Self, FairwayError> {
        tokio::fs::create_dir_all(capture_dir).await?;
        let path = capture_dir.join(PROCESSING_LOG);
        let file = tokio::fs::OpenOptions::new()
            .create(true).append(true).open(&path).await?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn log_event(
        &mut self,
        event_type: &str,
        data: &serde_json::Value,
    ) -> Result<(), FairwayError> {
        let entry = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "event": event_type,
            "data": data,
        });
        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');
        self.file.write_all(line.as_bytes()).await?;
        self.file.flush().await?;
        Ok(())
    }
}
