use std::path::PathBuf;
use std::sync::Arc;
use dashmap::DashMap;
use tokio::sync::{watch, Semaphore};
use crate::audit::CaptureLogger;
use crate::config::FairwayConfig;
use crate::db::Database;
use crate::errors::FairwayError;
use crate::models::{Analysis, NewAnalysis, NewCapture};
use crate::pose::PoseExtractor;
use crate::scoring::overlay::{build_overlay, write_overlay};
use crate::scoring::SwingScorer;
use crate::taxonomy::TaxonomyStore;
use crate::video::{Ingestor, VideoSource};
use super::stage;
use super::state::{CaptureJob, CaptureStage, CaptureStatus, SubmitRequest};
use super::tracker::{self, CaptureHandle};
use tracing::{error, info, warn};

const CANCELLED: &str = "cancelled";

/// Accepts captures and drives each one through upload, pose extraction,
/// segmentation and scoring on its own task.
#[derive(Clone)]
pub struct CapturePipeline {
    db: Database,
    taxonomy: TaxonomyStore,
    ingestor: Ingestor,
    extractor: Arc<dyn PoseExtractor>,
    scorer: SwingScorer,
    captures_dir: PathBuf,
    active: Arc<DashMap<i64, Arc<CaptureHandle>>>,
    semaphore: Arc<Semaphore>,
}

impl CapturePipeline {
    pub fn new(
        config: &FairwayConfig,
        db: Database,
        taxonomy: TaxonomyStore,
        extractor: Arc<dyn PoseExtractor>,
    ) -> Result<Self, FairwayError> {
        Ok(Self {
            db,
            taxonomy,
            ingestor: Ingestor::new(config.processing.clone())?,
            extractor,
            scorer: SwingScorer::new(config.processing.issue_threshold, config.processing.model_id.clone()),
            captures_dir: config.storage.captures_dir(),
            active: Arc::new(DashMap::new()),
            semaphore: Arc::new(Semaphore::new(config.server.max_concurrent_captures.max(1))),
        })
    }

    /// Mark captures a previous process left unfinished as failed.
    pub fn recover(&self) -> Result<usize, FairwayError> {
        let count = self.db.fail_interrupted()?;
        if count > 0 {
            warn!(count, "Marked interrupted captures as failed");
        }
        Ok(count)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Validate the request, reserve a capture id and start processing.
    pub async fn submit(&self, req: SubmitRequest) -> Result<CaptureStatus, FairwayError> {
        if req.user_id.trim().is_empty() {
            return Err(FairwayError::Validation("user_id is required".to_string()));
        }
        if req.club.trim().is_empty() {
            return Err(FairwayError::Validation("club is required".to_string()));
        }
        let source = VideoSource::parse(&req.video_uri)?;
        let ingestor = self.ingestor.clone();
        let (preflight_source, hint) = (source.clone(), req.duration_hint);
        tokio::task::spawn_blocking(move || ingestor.preflight(&preflight_source, hint))
            .await
            .map_err(|e| FairwayError::Internal(format!("Preflight task failed: {}", e)))??;

        let capture_id = self.db.create_processing(&req)?;
        let handle = Arc::new(CaptureHandle::new(capture_id));
        self.active.insert(capture_id, handle.clone());
        let status = handle.status().await;

        info!(capture_id, user_id = %req.user_id, club = %req.club, "Capture submitted");
        let job = CaptureJob {
            capture_id,
            request: req,
            capture_dir: self.captures_dir.join(capture_id.to_string()),
        };
        let pipeline = self.clone();
        tokio::spawn(async move {
            pipeline.run(job, source, handle).await;
        });
        Ok(status)
    }

    pub async fn status(&self, capture_id: i64) -> Result<CaptureStatus, FairwayError> {
        if let Some(handle) = self.handle(capture_id) {
            return Ok(handle.status().await);
        }
        self.db.get_status(capture_id)?
            .ok_or_else(|| FairwayError::NotFound(format!("Capture {}", capture_id)))
    }

    /// Live updates for an in-flight capture; `None` once it has finished.
    pub fn subscribe(&self, capture_id: i64) -> Option<watch::Receiver<CaptureStatus>> {
        self.handle(capture_id).map(|h| h.subscribe())
    }

    pub async fn cancel(&self, capture_id: i64) -> Result<CaptureStatus, FairwayError> {
        match self.handle(capture_id) {
            Some(handle) => {
                info!(capture_id, "Cancellation requested");
                handle.cancel()?;
                Ok(handle.status().await)
            }
            None => {
                let status = self.status(capture_id).await?;
                Err(FairwayError::Conflict(format!(
                    "Capture {} already finished with stage '{}'",
                    capture_id, status.stage
                )))
            }
        }
    }

    /// Take one processing slot so submitted captures wait in `queued`.
    #[cfg(test)]
    pub(crate) async fn hold_slot(&self) -> tokio::sync::OwnedSemaphorePermit {
        self.semaphore.clone().acquire_owned().await.unwrap()
    }

    fn handle(&self, capture_id: i64) -> Option<Arc<CaptureHandle>> {
        self.active.get(&capture_id).map(|h| h.value().clone())
    }

    async fn run(self, job: CaptureJob, source: VideoSource, handle: Arc<CaptureHandle>) {
        let capture_id = job.capture_id;
        let cancel = handle.cancel_token();

        let mut logger = match CaptureLogger::open(&job.capture_dir).await {
            Ok(l) => Some(l),
            Err(e) => {
                warn!(capture_id, error = %e, "Processing log unavailable");
                None
            }
        };
        log(&mut logger, "submitted", serde_json::json!({
            "video_uri": job.request.video_uri,
            "club": job.request.club,
            "generate_overlays": job.request.generate_overlays,
        })).await;

        let semaphore = self.semaphore.clone();
        let permit = tokio::select! {
            _ = cancel.cancelled() => None,
            p = semaphore.acquire_owned() => p.ok(),
        };

        let result = match permit {
            Some(_permit) => self.process(&job, &source, &handle, &mut logger).await,
            None => Err(FairwayError::Cancelled(CANCELLED.to_string())),
        };

        match result {
            Ok(analysis) => {
                // Already stored as done together with the analysis
                match handle.advance(CaptureStage::Done, 1.0).await {
                    Ok(status) => {
                        log(&mut logger, "stage", serde_json::json!({ "stage": status.stage, "percent": status.percent })).await;
                    }
                    Err(e) => error!(capture_id, error = %e, "Failed to mark capture done"),
                }
                info!(capture_id, analysis_id = analysis.id, "Capture processed");
            }
            Err(e) => {
                let message = match &e {
                    FairwayError::Cancelled(_) => CANCELLED.to_string(),
                    other => other.to_string(),
                };
                warn!(capture_id, error = %message, "Capture failed");
                log(&mut logger, "failed", serde_json::json!({
                    "error": message,
                    "kind": e.classify().error_type,
                })).await;
                if let Err(e) = handle.fail(&message).await {
                    warn!(capture_id, error = %e, "Status already final");
                }
                if let Err(e) = self.db.fail_processing(capture_id, &message) {
                    error!(capture_id, error = %e, "Failed to persist capture error");
                }
            }
        }
        self.active.remove(&capture_id);
    }

    async fn process(
        &self,
        job: &CaptureJob,
        source: &VideoSource,
        handle: &CaptureHandle,
        logger: &mut Option<CaptureLogger>,
    ) -> Result<Analysis, FairwayError> {
        let capture_id = job.capture_id;
        let cancel = handle.cancel_token();
        let req = &job.request;

        self.set_stage(handle, CaptureStage::Uploading, logger).await?;
        let video = tokio::select! {
            _ = cancel.cancelled() => return Err(FairwayError::Cancelled(CANCELLED.to_string())),
            v = self.ingestor.ingest(source, req.duration_hint, &job.capture_dir) => v?,
        };
        let capture = self.db.insert_capture(capture_id, &NewCapture {
            user_id: req.user_id.clone(),
            video_url: video.path.to_string_lossy().into_owned(),
            club_type: req.club.clone(),
            generate_overlays: req.generate_overlays,
            duration_secs: video.info.duration_secs,
        })?;
        log(logger, "uploaded", serde_json::json!({
            "video_url": capture.video_url,
            "bytes": video.info.bytes,
            "duration_secs": video.info.duration_secs,
        })).await;

        self.set_stage(handle, CaptureStage::ExtractingPose, logger).await?;
        let seq = self.extractor.extract(&video.path, &cancel).await?;
        log(logger, "pose", serde_json::json!({
            "backend": self.extractor.backend_name(),
            "frames": seq.frames.len(),
            "fps": seq.fps,
        })).await;

        self.set_stage(handle, CaptureStage::Segmenting, logger).await?;
        let seg = self.scorer.segment(&seq)?;

        self.set_stage(handle, CaptureStage::Scoring, logger).await?;
        let taxonomy = self.taxonomy.snapshot();
        let card = self.scorer.score(&seq, seg, &taxonomy)?;

        let overlay_url = if req.generate_overlays {
            let overlay = build_overlay(capture_id, seq.fps, &card.segmentation);
            Some(write_overlay(&job.capture_dir, &overlay).await?)
        } else {
            None
        };

        // Cancellation wins until the commit is claimed; later cancels get a conflict
        if !handle.begin_commit() {
            return Err(FairwayError::Cancelled(CANCELLED.to_string()));
        }
        let analysis = self.db.complete_capture(&NewAnalysis {
            capture_id,
            overall_confidence: card.overall_confidence,
            issue_scores: card.issue_scores,
            mechanic_scores: card.mechanic_scores,
            phase_scores: card.phase_scores,
            phases: card.phases,
            model: self.scorer.model_id.clone(),
            coach_notes: card.coach_notes,
            overlay_url,
        })?;
        log(logger, "analysis", serde_json::json!({
            "analysis_id": analysis.id,
            "overall_confidence": analysis.overall_confidence,
            "issues": analysis.issue_scores,
        })).await;
        Ok(analysis)
    }

    async fn set_stage(
        &self,
        handle: &CaptureHandle,
        stage: CaptureStage,
        logger: &mut Option<CaptureLogger>,
    ) -> Result<(), FairwayError> {
        let percent = stage::definition(stage).map(|d| d.percent).unwrap_or(0.0);
        // The live status never runs ahead of the stored one
        let next = tracker::advance(&handle.status().await, stage, percent)?;
        self.db.update_stage(next.capture_id, stage, next.percent)?;
        let status = handle.advance(stage, percent).await?;
        info!(capture_id = status.capture_id, stage = %stage, percent = status.percent, "{}", stage::display_name(stage));
        log(logger, "stage", serde_json::json!({ "stage": stage, "percent": status.percent })).await;
        Ok(())
    }
}

async fn log(logger: &mut Option<CaptureLogger>, event: &str, data: serde_json::Value) {
    if let Some(l) = logger.as_mut() {
        if let Err(e) = l.log_event(event, &data).await {
            warn!(error = %e, event, "Failed to write processing log");
        }
    }
}
