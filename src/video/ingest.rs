use std::path::{Path, PathBuf};
use std::time::Duration;
use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use crate::config::ProcessingConfig;
use crate::errors::FairwayError;
use super::probe::{probe_video, VideoInfo};
use super::source::VideoSource;
use super::{SIDECAR_SUFFIX, VIDEO_STEM};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct IngestedVideo {
    pub path: PathBuf,
    pub info: VideoInfo,
    /// Set when a pose sidecar travelled with the video.
    pub sidecar: Option<PathBuf>,
}

/// Copies or downloads recordings into capture storage.
#[derive(Clone)]
pub struct Ingestor {
    http: reqwest::Client,
    config: ProcessingConfig,
}

impl Ingestor {
    pub fn new(config: ProcessingConfig) -> Result<Self, FairwayError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upload_timeout_secs))
            .build()
            .map_err(|e| FairwayError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { http, config })
    }

    /// Checks that can run before a capture id is handed out.
    pub fn preflight(&self, source: &VideoSource, hint: Option<f64>) -> Result<Option<VideoInfo>, FairwayError> {
        super::probe::check_extension(&source.name(), &self.config)?;
        match source {
            VideoSource::Local(path) => probe_video(path, hint, &self.config).map(Some),
            VideoSource::Remote(_) => {
                super::probe::check_duration(hint, &self.config)?;
                Ok(None)
            }
        }
    }

    /// Bring the video (and its sidecar, if any) into `dest_dir` as `video.<ext>`.
    pub async fn ingest(
        &self,
        source: &VideoSource,
        hint: Option<f64>,
        dest_dir: &Path,
    ) -> Result<IngestedVideo, FairwayError> {
        let ext = super::probe::check_extension(&source.name(), &self.config)?;
        tokio::fs::create_dir_all(dest_dir).await
            .map_err(|e| FairwayError::Upload(format!("Cannot create {}: {}", dest_dir.display(), e)))?;

        let partial = dest_dir.join(format!(".{}.part", uuid::Uuid::new_v4()));
        let dest = dest_dir.join(format!("{}.{}", VIDEO_STEM, ext));

        let copied = match source {
            VideoSource::Local(path) => self.copy_local(path, &partial).await,
            VideoSource::Remote(url) => self.download(url, &partial).await,
        };
        if let Err(e) = copied {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }
        tokio::fs::rename(&partial, &dest).await
            .map_err(|e| FairwayError::Upload(format!("Failed to finalize upload: {}", e)))?;

        let info = match probe_video(&dest, hint, &self.config) {
            Ok(info) => info,
            Err(e) => {
                let _ = tokio::fs::remove_file(&dest).await;
                return Err(e);
            }
        };

        let sidecar = self.fetch_sidecar(source, &dest).await;
        info!(
            path = %dest.display(),
            bytes = info.bytes,
            duration_secs = ?info.duration_secs,
            sidecar = sidecar.is_some(),
            "Video ingested"
        );
        Ok(IngestedVideo { path: dest, info, sidecar })
    }

    async fn copy_local(&self, src: &Path, dest: &Path) -> Result<(), FairwayError> {
        tokio::fs::copy(src, dest).await
            .map(|_| ())
            .map_err(|e| FairwayError::Upload(format!("Failed to copy {}: {}", src.display(), e)))
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<(), FairwayError> {
        let resp = self.http.get(url).send().await
            .map_err(|e| FairwayError::Upload(format!("Failed to fetch {}: {}", url, e)))?;
        if !resp.status().is_success() {
            return Err(FairwayError::Upload(format!("Fetching {} returned HTTP {}", url, resp.status())));
        }
        if let Some(len) = resp.content_length() {
            if len > self.config.max_video_bytes {
                return Err(FairwayError::Validation(format!(
                    "Video is {} bytes, limit is {}",
                    len, self.config.max_video_bytes
                )));
            }
        }

        let mut file = tokio::fs::File::create(dest).await
            .map_err(|e| FairwayError::Upload(format!("Cannot write {}: {}", dest.display(), e)))?;
        let mut written: u64 = 0;
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| FairwayError::Upload(format!("Download of {} interrupted: {}", url, e)))?;
            written += chunk.len() as u64;
            if written > self.config.max_video_bytes {
                return Err(FairwayError::Validation(format!(
                    "Video exceeds the {} byte limit",
                    self.config.max_video_bytes
                )));
            }
            file.write_all(&chunk).await
                .map_err(|e| FairwayError::Upload(format!("Cannot write {}: {}", dest.display(), e)))?;
        }
        file.flush().await
            .map_err(|e| FairwayError::Upload(format!("Cannot write {}: {}", dest.display(), e)))?;
        Ok(())
    }

    /// A missing sidecar is normal; failures here never fail the upload.
    async fn fetch_sidecar(&self, source: &VideoSource, video: &Path) -> Option<PathBuf> {
        let mut target = video.to_path_buf().into_os_string();
        target.push(SIDECAR_SUFFIX);
        let target = PathBuf::from(target);

        let result = match source.sidecar() {
            VideoSource::Local(path) if path.is_file() => self.copy_local(&path, &target).await,
            VideoSource::Local(_) => return None,
            VideoSource::Remote(url) => self.download(&url, &target).await,
        };
        match result {
            Ok(()) => Some(target),
            Err(e) => {
                debug!(error = %e, "No pose sidecar ingested");
                let _ = tokio::fs::remove_file(&target).await;
                None
            }
        }
    }
}
