use std::sync::atomic::{AtomicU8, Ordering};
use chrono::Utc;
use tokio::sync::{watch, RwLock};
use tokio_util::sync::CancellationToken;
use crate::errors::FairwayError;
use super::state::{CaptureStage, CaptureState, CaptureStatus};

/// Next status after moving to `stage` at `percent`.
///
/// Terminal statuses are final and percent may not go backwards; both are
/// rejected rather than silently clamped so a buggy caller shows up in logs.
pub fn advance(current: &CaptureStatus, stage: CaptureStage, percent: f64) -> Result<CaptureStatus, FairwayError> {
    if current.is_terminal() {
        return Err(FairwayError::Conflict(format!(
            "Capture {} already finished with stage '{}'",
            current.capture_id, current.stage
        )));
    }
    let percent = percent.clamp(0.0, 1.0);
    if percent < current.percent {
        return Err(FairwayError::Internal(format!(
            "Progress for capture {} would regress from {:.2} to {:.2}",
            current.capture_id, current.percent, percent
        )));
    }
    Ok(CaptureStatus {
        capture_id: current.capture_id,
        stage,
        percent,
        state: CaptureState::from(stage),
        error: None,
        updated_at: Utc::now(),
    })
}

/// Error status; percent stays where processing stopped.
pub fn fail(current: &CaptureStatus, message: &str) -> Result<CaptureStatus, FairwayError> {
    if current.is_terminal() {
        return Err(FairwayError::Conflict(format!(
            "Capture {} already finished with stage '{}'",
            current.capture_id, current.stage
        )));
    }
    Ok(CaptureStatus {
        capture_id: current.capture_id,
        stage: CaptureStage::Error,
        percent: current.percent,
        state: CaptureState::Error,
        error: Some(message.to_string()),
        updated_at: Utc::now(),
    })
}

const RUNNING: u8 = 0;
const CANCELLING: u8 = 1;
const COMMITTING: u8 = 2;

/// Live state of one in-flight capture.
pub struct CaptureHandle {
    status: RwLock<CaptureStatus>,
    tx: watch::Sender<CaptureStatus>,
    cancel: CancellationToken,
    /// Cancel and commit are mutually exclusive; whichever claims it first wins.
    gate: AtomicU8,
}

impl CaptureHandle {
    pub fn new(capture_id: i64) -> Self {
        let initial = CaptureStatus::queued(capture_id);
        let (tx, _rx) = watch::channel(initial.clone());
        Self {
            status: RwLock::new(initial),
            tx,
            cancel: CancellationToken::new(),
            gate: AtomicU8::new(RUNNING),
        }
    }

    pub async fn status(&self) -> CaptureStatus {
        self.status.read().await.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CaptureStatus> {
        self.tx.subscribe()
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Request cancellation. Repeated requests are accepted; once the
    /// capture has started committing its analysis it is too late.
    pub fn cancel(&self) -> Result<(), FairwayError> {
        match self.gate.compare_exchange(RUNNING, CANCELLING, Ordering::SeqCst, Ordering::SeqCst) {
            Ok(_) | Err(CANCELLING) => {
                self.cancel.cancel();
                Ok(())
            }
            Err(_) => Err(FairwayError::Conflict("Capture is already completing".to_string())),
        }
    }

    /// Claim the right to store the analysis; false when a cancel got there first.
    pub fn begin_commit(&self) -> bool {
        self.gate.compare_exchange(RUNNING, COMMITTING, Ordering::SeqCst, Ordering::SeqCst).is_ok()
    }

    pub async fn advance(&self, stage: CaptureStage, percent: f64) -> Result<CaptureStatus, FairwayError> {
        let mut status = self.status.write().await;
        let next = advance(&status, stage, percent)?;
        *status = next.clone();
        self.tx.send_replace(next.clone());
        Ok(next)
    }

    pub async fn fail(&self, message: &str) -> Result<CaptureStatus, FairwayError> {
        let mut status = self.status.write().await;
        let next = fail(&status, message)?;
        *status = next.clone();
        self.tx.send_replace(next.clone());
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_rejects_regression() {
        let s = CaptureStatus::queued(1);
        let s = advance(&s, CaptureStage::Segmenting, 0.6).unwrap();
        assert!(advance(&s, CaptureStage::Scoring, 0.5).is_err());
        let s = advance(&s, CaptureStage::Scoring, 0.6).unwrap();
        assert_eq!(s.percent, 0.6);
    }

    #[test]
    fn test_terminal_is_final() {
        let s = advance(&CaptureStatus::queued(1), CaptureStage::Done, 1.0).unwrap();
        assert_eq!(s.state, CaptureState::Success);
        assert!(matches!(advance(&s, CaptureStage::Scoring, 1.0), Err(FairwayError::Conflict(_))));
        assert!(fail(&s, "late").is_err());
    }

    #[test]
    fn test_fail_freezes_percent() {
        let s = advance(&CaptureStatus::queued(1), CaptureStage::ExtractingPose, 0.3).unwrap();
        let f = fail(&s, "no pose data").unwrap();
        assert_eq!(f.stage, CaptureStage::Error);
        assert_eq!(f.percent, 0.3);
        assert_eq!(f.error.as_deref(), Some("no pose data"));
    }

    #[tokio::test]
    async fn test_handle_broadcasts() {
        let handle = CaptureHandle::new(9);
        let mut rx = handle.subscribe();
        handle.advance(CaptureStage::Uploading, 0.1).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().stage, CaptureStage::Uploading);
        assert_eq!(handle.status().await.percent, 0.1);
    }

    #[test]
    fn test_cancel_token_shared() {
        let handle = CaptureHandle::new(1);
        let token = handle.cancel_token();
        handle.cancel().unwrap();
        handle.cancel().unwrap();
        assert!(token.is_cancelled());
        assert!(!handle.begin_commit());
    }

    #[test]
    fn test_cancel_after_commit_conflicts() {
        let handle = CaptureHandle::new(1);
        assert!(handle.begin_commit());
        assert!(matches!(handle.cancel(), Err(FairwayError::Conflict(_))));
        assert!(!handle.cancel_token().is_cancelled());
    }
}
