use chrono::Utc;
use rusqlite::OptionalExtension;
use crate::errors::FairwayError;
use crate::models::{Analysis, AnalysisRecord, NewAnalysis};
use super::captures::{capture_from_row, CAPTURE_COLUMNS};
use super::connection::{db_err, is_unique_violation, parse_timestamp};
use super::Database;

const ANALYSIS_COLUMNS: &str = "a.id, a.capture_id, a.overall_confidence, a.issue_scores, a.mechanic_scores, a.phase_scores, a.phases, a.model, a.coach_notes, a.overlay_url, a.created_at";
const ANALYSIS_WIDTH: usize = 11;

fn json_column<T: serde::de::DeserializeOwned>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e)))
}

fn analysis_from_row(row: &rusqlite::Row) -> rusqlite::Result<Analysis> {
    Ok(Analysis {
        id: row.get(0)?,
        capture_id: row.get(1)?,
        overall_confidence: row.get(2)?,
        issue_scores: json_column(row, 3)?,
        mechanic_scores: json_column(row, 4)?,
        phase_scores: json_column(row, 5)?,
        phases: json_column(row, 6)?,
        model: row.get(7)?,
        coach_notes: row.get(8)?,
        overlay_url: row.get(9)?,
        created_at: parse_timestamp(&row.get::<_, String>(10)?)?,
    })
}

fn record_from_row(row: &rusqlite::Row) -> rusqlite::Result<AnalysisRecord> {
    Ok(AnalysisRecord {
        analysis: analysis_from_row(row)?,
        capture: capture_from_row(row, ANALYSIS_WIDTH)?,
    })
}

fn insert_row(conn: &rusqlite::Connection, new: &NewAnalysis) -> Result<Analysis, FairwayError> {
    let created_at = Utc::now();
    conn.execute(
        "INSERT INTO analyses (capture_id, overall_confidence, issue_scores, mechanic_scores, phase_scores, phases, model, coach_notes, overlay_url, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        rusqlite::params![
            new.capture_id,
            new.overall_confidence,
            serde_json::to_string(&new.issue_scores)?,
            serde_json::to_string(&new.mechanic_scores)?,
            serde_json::to_string(&new.phase_scores)?,
            serde_json::to_string(&new.phases)?,
            new.model,
            new.coach_notes,
            new.overlay_url,
            created_at.to_rfc3339(),
        ],
    ).map_err(|e| {
        if is_unique_violation(&e) {
            FairwayError::Conflict(format!("Capture {} already has an analysis", new.capture_id))
        } else {
            FairwayError::Database(format!("Failed to insert analysis: {}", e))
        }
    })?;

    Ok(Analysis {
        id: conn.last_insert_rowid(),
        capture_id: new.capture_id,
        overall_confidence: new.overall_confidence,
        issue_scores: new.issue_scores.clone(),
        mechanic_scores: new.mechanic_scores.clone(),
        phase_scores: new.phase_scores.clone(),
        phases: new.phases.clone(),
        model: new.model.clone(),
        coach_notes: new.coach_notes.clone(),
        overlay_url: new.overlay_url.clone(),
        created_at,
    })
}

impl Database {
    /// Store the analysis and move the capture to `done` in one transaction.
    ///
    /// Only a capture still in flight can complete. A second analysis, or a
    /// capture that already ended, is a `Conflict`.
    pub fn complete_capture(&self, new: &NewAnalysis) -> Result<Analysis, FairwayError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(db_err("Failed to begin transaction"))?;
        let now = Utc::now().to_rfc3339();

        let updated = tx.execute(
            "UPDATE processing SET stage = 'done', percent = 1.0, error_message = NULL, updated_at = ?2, completed_at = ?2 WHERE capture_id = ?1 AND stage NOT IN ('done', 'error')",
            rusqlite::params![new.capture_id, now],
        ).map_err(db_err("Failed to complete capture"))?;
        if updated == 0 {
            let exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM processing WHERE capture_id = ?1)",
                rusqlite::params![new.capture_id],
                |row| row.get(0),
            ).map_err(db_err("Processing lookup failed"))?;
            return Err(if exists {
                FairwayError::Conflict(format!("Capture {} already finished", new.capture_id))
            } else {
                FairwayError::NotFound(format!("Capture {}", new.capture_id))
            });
        }

        let analysis = insert_row(&tx, new)?;
        tx.commit().map_err(db_err("Failed to commit analysis"))?;
        Ok(analysis)
    }

    /// Visible only once the capture is `done`.
    pub fn get_analysis_for_capture(&self, capture_id: i64) -> Result<Option<AnalysisRecord>, FairwayError> {
        let conn = self.lock()?;
        conn.query_row(
            &format!(
                "SELECT {}, {} FROM analyses a JOIN captures c ON c.id = a.capture_id JOIN processing p ON p.capture_id = a.capture_id AND p.stage = 'done' WHERE a.capture_id = ?1",
                ANALYSIS_COLUMNS, CAPTURE_COLUMNS
            ),
            rusqlite::params![capture_id],
            record_from_row,
        ).optional().map_err(db_err("Analysis query failed"))
    }

    /// A user's analyses, newest first.
    pub fn list_analyses_for_user(
        &self,
        user_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<AnalysisRecord>, FairwayError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {}, {} FROM analyses a JOIN captures c ON c.id = a.capture_id JOIN processing p ON p.capture_id = a.capture_id AND p.stage = 'done' WHERE c.user_id = ?1 ORDER BY a.created_at DESC, a.id DESC LIMIT ?2 OFFSET ?3",
            ANALYSIS_COLUMNS, CAPTURE_COLUMNS
        )).map_err(db_err("Query failed"))?;

        let rows = stmt.query_map(
            rusqlite::params![user_id, limit.min(i64::MAX as usize) as i64, offset.min(i64::MAX as usize) as i64],
            record_from_row,
        ).map_err(db_err("Query error"))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(db_err("Row error"))?);
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use crate::models::{NewCapture, PhaseSegment};
    use crate::pipeline::state::{CaptureStage, SubmitRequest};

    fn stored_capture(db: &Database, user: &str) -> i64 {
        let id = db.create_processing(&SubmitRequest {
            user_id: user.to_string(),
            video_uri: "/tmp/a.mp4".to_string(),
            duration_hint: None,
            club: "driver".to_string(),
            generate_overlays: false,
        }).unwrap();
        db.insert_capture(id, &NewCapture {
            user_id: user.to_string(),
            video_url: format!("captures/{}/video.mp4", id),
            club_type: "driver".to_string(),
            generate_overlays: false,
            duration_secs: Some(2.0),
        }).unwrap();
        id
    }

    fn new_analysis(capture_id: i64) -> NewAnalysis {
        NewAnalysis {
            capture_id,
            overall_confidence: 0.82,
            issue_scores: BTreeMap::from([("sway".to_string(), 0.4)]),
            mechanic_scores: BTreeMap::from([("tempo".to_string(), 91.0)]),
            phase_scores: BTreeMap::from([("address".to_string(), 88.5)]),
            phases: vec![PhaseSegment { phase: "address".to_string(), start_secs: 0.0, end_secs: 0.3 }],
            model: "fairway-heuristic-v1".to_string(),
            coach_notes: "Focus on Sway".to_string(),
            overlay_url: None,
        }
    }

    #[test]
    fn test_insert_and_fetch_with_capture() {
        let db = Database::in_memory().unwrap();
        let capture_id = stored_capture(&db, "u1");
        let inserted = db.complete_capture(&new_analysis(capture_id)).unwrap();

        let record = db.get_analysis_for_capture(capture_id).unwrap().unwrap();
        assert_eq!(record.analysis.id, inserted.id);
        assert_eq!(record.analysis.capture_id, capture_id);
        assert_eq!(record.analysis.issue_scores["sway"], 0.4);
        assert_eq!(record.analysis.phases.len(), 1);
        assert_eq!(record.capture.id, capture_id);
        assert_eq!(record.capture.user_id, "u1");
    }

    #[test]
    fn test_second_analysis_conflicts() {
        let db = Database::in_memory().unwrap();
        let capture_id = stored_capture(&db, "u1");
        db.complete_capture(&new_analysis(capture_id)).unwrap();
        let err = db.complete_capture(&new_analysis(capture_id)).unwrap_err();
        assert!(matches!(err, FairwayError::Conflict(_)));
    }

    #[test]
    fn test_analysis_requires_capture() {
        let db = Database::in_memory().unwrap();
        let err = db.complete_capture(&new_analysis(77)).unwrap_err();
        assert!(matches!(err, FairwayError::NotFound(_)));
    }

    #[test]
    fn test_complete_marks_done_atomically() {
        let db = Database::in_memory().unwrap();
        let capture_id = stored_capture(&db, "u1");
        db.update_stage(capture_id, CaptureStage::Scoring, 0.8).unwrap();
        assert!(db.get_analysis_for_capture(capture_id).unwrap().is_none());

        db.complete_capture(&new_analysis(capture_id)).unwrap();
        let status = db.get_status(capture_id).unwrap().unwrap();
        assert_eq!(status.stage, CaptureStage::Done);
        assert_eq!(status.percent, 1.0);
        assert!(db.get_analysis_for_capture(capture_id).unwrap().is_some());

        // Nothing left in flight for a restart to fail
        assert_eq!(db.fail_interrupted().unwrap(), 0);
        assert_eq!(db.get_status(capture_id).unwrap().unwrap().stage, CaptureStage::Done);
    }

    #[test]
    fn test_failed_capture_cannot_complete() {
        let db = Database::in_memory().unwrap();
        let capture_id = stored_capture(&db, "u1");
        db.fail_processing(capture_id, "cancelled").unwrap();
        let err = db.complete_capture(&new_analysis(capture_id)).unwrap_err();
        assert!(matches!(err, FairwayError::Conflict(_)));
        // No analysis row was written
        let conn = db.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM analyses", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_stray_analysis_hidden_until_done() {
        let db = Database::in_memory().unwrap();
        let capture_id = stored_capture(&db, "u1");
        db.update_stage(capture_id, CaptureStage::Scoring, 0.8).unwrap();
        {
            let conn = db.lock().unwrap();
            insert_row(&conn, &new_analysis(capture_id)).unwrap();
        }
        assert!(db.get_analysis_for_capture(capture_id).unwrap().is_none());
        assert!(db.list_analyses_for_user("u1", 10, 0).unwrap().is_empty());

        // Restart recovery keeps the stored result instead of failing it
        assert_eq!(db.fail_interrupted().unwrap(), 0);
        let status = db.get_status(capture_id).unwrap().unwrap();
        assert_eq!(status.stage, CaptureStage::Done);
        assert_eq!(status.percent, 1.0);
        assert!(status.error.is_none());
        assert!(db.get_analysis_for_capture(capture_id).unwrap().is_some());
    }

    #[test]
    fn test_huge_offset_returns_empty_page() {
        let db = Database::in_memory().unwrap();
        let c = stored_capture(&db, "u1");
        db.complete_capture(&new_analysis(c)).unwrap();
        assert!(db.list_analyses_for_user("u1", 10, usize::MAX).unwrap().is_empty());
    }

    #[test]
    fn test_missing_analysis_is_none() {
        let db = Database::in_memory().unwrap();
        let capture_id = stored_capture(&db, "u1");
        assert!(db.get_analysis_for_capture(capture_id).unwrap().is_none());
    }

    #[test]
    fn test_history_newest_first_and_paged() {
        let db = Database::in_memory().unwrap();
        let mut ids = Vec::new();
        for _ in 0..3 {
            let c = stored_capture(&db, "u1");
            db.complete_capture(&new_analysis(c)).unwrap();
            ids.push(c);
        }
        let other = stored_capture(&db, "u2");
        db.complete_capture(&new_analysis(other)).unwrap();

        let all = db.list_analyses_for_user("u1", 10, 0).unwrap();
        let got: Vec<i64> = all.iter().map(|r| r.capture.id).collect();
        assert_eq!(got, vec![ids[2], ids[1], ids[0]]);

        let page = db.list_analyses_for_user("u1", 1, 1).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].capture.id, ids[1]);

        assert!(db.list_analyses_for_user("nobody", 10, 0).unwrap().is_empty());
    }
}
