use chrono::Utc;
use rusqlite::OptionalExtension;
use crate::errors::FairwayError;
use crate::models::{Capture, NewCapture};
use super::connection::{db_err, is_unique_violation, parse_timestamp};
use super::Database;

pub(crate) const CAPTURE_COLUMNS: &str =
    "c.id, c.user_id, c.video_url, c.club_type, c.generate_overlays, c.duration_secs, c.captured_at";

/// Map a row whose first seven columns are `CAPTURE_COLUMNS`, starting at `offset`.
pub(crate) fn capture_from_row(row: &rusqlite::Row, offset: usize) -> rusqlite::Result<Capture> {
    Ok(Capture {
        id: row.get(offset)?,
        user_id: row.get(offset + 1)?,
        video_url: row.get(offset + 2)?,
        club_type: row.get(offset + 3)?,
        generate_overlays: row.get(offset + 4)?,
        duration_secs: row.get(offset + 5)?,
        captured_at: parse_timestamp(&row.get::<_, String>(offset + 6)?)?,
    })
}

impl Database {
    /// Store the capture under the id reserved at submit time.
    pub fn insert_capture(&self, id: i64, capture: &NewCapture) -> Result<Capture, FairwayError> {
        let conn = self.lock()?;
        let captured_at = Utc::now();
        conn.execute(
            "INSERT INTO captures (id, user_id, video_url, club_type, generate_overlays, duration_secs, captured_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                id,
                capture.user_id,
                capture.video_url,
                capture.club_type,
                capture.generate_overlays,
                capture.duration_secs,
                captured_at.to_rfc3339(),
            ],
        ).map_err(|e| {
            if is_unique_violation(&e) {
                FairwayError::Conflict(format!("Capture {} already stored", id))
            } else {
                FairwayError::Database(format!("Failed to insert capture: {}", e))
            }
        })?;

        Ok(Capture {
            id,
            user_id: capture.user_id.clone(),
            video_url: capture.video_url.clone(),
            club_type: capture.club_type.clone(),
            generate_overlays: capture.generate_overlays,
            duration_secs: capture.duration_secs,
            captured_at,
        })
    }

    pub fn get_capture(&self, id: i64) -> Result<Option<Capture>, FairwayError> {
        let conn = self.lock()?;
        conn.query_row(
            &format!("SELECT {} FROM captures c WHERE c.id = ?1", CAPTURE_COLUMNS),
            rusqlite::params![id],
            |row| capture_from_row(row, 0),
        ).optional().map_err(db_err("Capture query failed"))
    }
}
