use chrono::Utc;
use rusqlite::OptionalExtension;
use crate::errors::FairwayError;
use crate::pipeline::state::{CaptureStage, CaptureState, CaptureStatus, SubmitRequest};
use super::connection::{db_err, parse_timestamp};
use super::Database;

const INTERRUPTED: &str = "Processing interrupted by a server restart";

impl Database {
    /// Reserve a capture id and record the submit request in stage `queued`.
    pub fn create_processing(&self, req: &SubmitRequest) -> Result<i64, FairwayError> {
        let conn = self.lock()?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO processing (user_id, source_uri, club_type, generate_overlays, duration_hint, stage, percent, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, 'queued', 0.0, ?6, ?6)",
            rusqlite::params![req.user_id, req.video_uri, req.club, req.generate_overlays, req.duration_hint, now],
        ).map_err(db_err("Failed to create processing record"))?;
        Ok(conn.last_insert_rowid())
    }

    /// Move to `stage`. Percent never goes backwards and terminal rows are left alone.
    pub fn update_stage(&self, capture_id: i64, stage: CaptureStage, percent: f64) -> Result<(), FairwayError> {
        let conn = self.lock()?;
        let now = Utc::now().to_rfc3339();
        let completed = stage.is_terminal().then(|| now.clone());
        conn.execute(
            "UPDATE processing SET stage = ?2, percent = MAX(percent, ?3), updated_at = ?4, completed_at = COALESCE(completed_at, ?5) WHERE capture_id = ?1 AND stage NOT IN ('done', 'error')",
            rusqlite::params![capture_id, stage.as_str(), percent.clamp(0.0, 1.0), now, completed],
        ).map_err(db_err("Failed to update stage"))?;
        Ok(())
    }

    pub fn fail_processing(&self, capture_id: i64, message: &str) -> Result<(), FairwayError> {
        let conn = self.lock()?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "UPDATE processing SET stage = 'error', error_message = ?2, updated_at = ?3, completed_at = ?3 WHERE capture_id = ?1 AND stage NOT IN ('done', 'error')",
            rusqlite::params![capture_id, message, now],
        ).map_err(db_err("Failed to record processing error"))?;
        Ok(())
    }

    pub fn get_status(&self, capture_id: i64) -> Result<Option<CaptureStatus>, FairwayError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT stage, percent, error_message, updated_at FROM processing WHERE capture_id = ?1",
            rusqlite::params![capture_id],
            |row| {
                let raw: String = row.get(0)?;
                let stage = CaptureStage::parse(&raw).unwrap_or(CaptureStage::Error);
                Ok(CaptureStatus {
                    capture_id,
                    stage,
                    percent: row.get(1)?,
                    state: CaptureState::from(stage),
                    error: row.get(2)?,
                    updated_at: parse_timestamp(&row.get::<_, String>(3)?)?,
                })
            },
        ).optional().map_err(db_err("Status query failed"))
    }

    pub fn get_submit_request(&self, capture_id: i64) -> Result<Option<SubmitRequest>, FairwayError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT user_id, source_uri, club_type, generate_overlays, duration_hint FROM processing WHERE capture_id = ?1",
            rusqlite::params![capture_id],
            |row| Ok(SubmitRequest {
                user_id: row.get(0)?,
                video_uri: row.get(1)?,
                club: row.get(2)?,
                generate_overlays: row.get(3)?,
                duration_hint: row.get(4)?,
            }),
        ).optional().map_err(db_err("Submit request query failed"))
    }

    /// Rows still in flight belong to a previous process. Those that already
    /// stored an analysis are finished as `done`; the rest are marked failed.
    /// Returns the number of captures failed.
    pub fn fail_interrupted(&self) -> Result<usize, FairwayError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(db_err("Failed to begin transaction"))?;
        let now = Utc::now().to_rfc3339();
        tx.execute(
            "UPDATE processing SET stage = 'done', percent = 1.0, updated_at = ?1, completed_at = ?1 WHERE stage NOT IN ('done', 'error') AND capture_id IN (SELECT capture_id FROM analyses)",
            rusqlite::params![now],
        ).map_err(db_err("Failed to finish stored captures"))?;
        let failed = tx.execute(
            "UPDATE processing SET stage = 'error', error_message = ?1, updated_at = ?2, completed_at = ?2 WHERE stage NOT IN ('done', 'error')",
            rusqlite::params![INTERRUPTED, now],
        ).map_err(db_err("Failed to mark interrupted captures"))?;
        tx.commit().map_err(db_err("Failed to commit recovery"))?;
        Ok(failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(user: &str) -> SubmitRequest {
        SubmitRequest {
            user_id: user.to_string(),
            video_uri: "/tmp/swing.mp4".to_string(),
            duration_hint: Some(3.0),
            club: "driver".to_string(),
            generate_overlays: false,
        }
    }

    #[test]
    fn test_create_starts_queued() {
        let db = Database::in_memory().unwrap();
        let id = db.create_processing(&request("u1")).unwrap();
        let status = db.get_status(id).unwrap().unwrap();
        assert_eq!(status.stage, CaptureStage::Queued);
        assert_eq!(status.percent, 0.0);
        assert_eq!(status.state, CaptureState::Processing);
        assert_eq!(db.get_submit_request(id).unwrap().unwrap(), request("u1"));
    }

    #[test]
    fn test_ids_are_distinct() {
        let db = Database::in_memory().unwrap();
        let a = db.create_processing(&request("u1")).unwrap();
        let b = db.create_processing(&request("u1")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_percent_never_decreases() {
        let db = Database::in_memory().unwrap();
        let id = db.create_processing(&request("u1")).unwrap();
        db.update_stage(id, CaptureStage::Segmenting, 0.6).unwrap();
        db.update_stage(id, CaptureStage::Scoring, 0.4).unwrap();
        let status = db.get_status(id).unwrap().unwrap();
        assert_eq!(status.stage, CaptureStage::Scoring);
        assert_eq!(status.percent, 0.6);
    }

    #[test]
    fn test_terminal_rows_are_frozen() {
        let db = Database::in_memory().unwrap();
        let id = db.create_processing(&request("u1")).unwrap();
        db.update_stage(id, CaptureStage::Done, 1.0).unwrap();
        db.fail_processing(id, "late failure").unwrap();
        let status = db.get_status(id).unwrap().unwrap();
        assert_eq!(status.stage, CaptureStage::Done);
        assert_eq!(status.state, CaptureState::Success);
        assert!(status.error.is_none());
    }

    #[test]
    fn test_fail_records_message() {
        let db = Database::in_memory().unwrap();
        let id = db.create_processing(&request("u1")).unwrap();
        db.fail_processing(id, "no pose data").unwrap();
        let status = db.get_status(id).unwrap().unwrap();
        assert_eq!(status.state, CaptureState::Error);
        assert_eq!(status.error.as_deref(), Some("no pose data"));
    }

    #[test]
    fn test_fail_interrupted_only_touches_in_flight() {
        let db = Database::in_memory().unwrap();
        let done = db.create_processing(&request("u1")).unwrap();
        db.update_stage(done, CaptureStage::Done, 1.0).unwrap();
        let running = db.create_processing(&request("u1")).unwrap();
        db.update_stage(running, CaptureStage::ExtractingPose, 0.3).unwrap();

        assert_eq!(db.fail_interrupted().unwrap(), 1);
        assert_eq!(db.get_status(done).unwrap().unwrap().stage, CaptureStage::Done);
        let status = db.get_status(running).unwrap().unwrap();
        assert_eq!(status.stage, CaptureStage::Error);
        assert_eq!(status.error.as_deref(), Some(INTERRUPTED));
    }

    #[test]
    fn test_unknown_status_is_none() {
        let db = Database::in_memory().unwrap();
        assert!(db.get_status(42).unwrap().is_none());
    }
}
