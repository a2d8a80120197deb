use rusqlite::OptionalExtension;
use crate::errors::FairwayError;
use crate::models::{LeaderboardEntry, ProgressRecord};
use super::connection::{db_err, parse_timestamp};
use super::Database;

// Rank is 1 + the number of users strictly ahead: more xp, or equal xp and a smaller id.
const RANKED: &str = "
SELECT p.user_id, p.display_name, p.xp, p.streak_days, p.challenges_completed, p.updated_at,
       (SELECT COUNT(*) FROM user_progress o
         WHERE o.xp > p.xp OR (o.xp = p.xp AND o.user_id < p.user_id)) + 1 AS rank
FROM user_progress p";

fn entry_from_row(row: &rusqlite::Row) -> rusqlite::Result<LeaderboardEntry> {
    Ok(LeaderboardEntry {
        rank: row.get(6)?,
        progress: ProgressRecord {
            user_id: row.get(0)?,
            display_name: row.get(1)?,
            xp: row.get(2)?,
            streak_days: row.get(3)?,
            challenges_completed: row.get(4)?,
            updated_at: parse_timestamp(&row.get::<_, String>(5)?)?,
        },
    })
}

impl Database {
    /// Replace a user's progress row. Only the import path writes here.
    pub fn upsert_progress(&self, record: &ProgressRecord) -> Result<(), FairwayError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO user_progress (user_id, display_name, xp, streak_days, challenges_completed, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(user_id) DO UPDATE SET display_name = excluded.display_name, xp = excluded.xp, streak_days = excluded.streak_days, challenges_completed = excluded.challenges_completed, updated_at = excluded.updated_at",
            rusqlite::params![
                record.user_id,
                record.display_name,
                record.xp,
                record.streak_days,
                record.challenges_completed,
                record.updated_at.to_rfc3339(),
            ],
        ).map_err(db_err("Failed to upsert progress"))?;
        Ok(())
    }

    pub fn get_progress(&self, user_id: &str) -> Result<Option<LeaderboardEntry>, FairwayError> {
        let conn = self.lock()?;
        conn.query_row(
            &format!("{} WHERE p.user_id = ?1", RANKED),
            rusqlite::params![user_id],
            entry_from_row,
        ).optional().map_err(db_err("Progress query failed"))
    }

    pub fn leaderboard(&self, limit: usize, offset: usize) -> Result<Vec<LeaderboardEntry>, FairwayError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY p.xp DESC, p.user_id ASC LIMIT ?1 OFFSET ?2", RANKED))
            .map_err(db_err("Query failed"))?;
        let rows = stmt.query_map(rusqlite::params![limit.min(i64::MAX as usize) as i64, offset.min(i64::MAX as usize) as i64], entry_from_row)
            .map_err(db_err("Query error"))?;

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
    use chrono::Utc;

    fn record(user: &str, xp: i64) -> ProgressRecord {
        ProgressRecord {
            user_id: user.to_string(),
            display_name: user.to_uppercase(),
            xp,
            streak_days: 2,
            challenges_completed: 1,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_leaderboard_order_and_ties() {
        let db = Database::in_memory().unwrap();
        db.upsert_progress(&record("carol", 300)).unwrap();
        db.upsert_progress(&record("bob", 500)).unwrap();
        db.upsert_progress(&record("alice", 300)).unwrap();

        let board = db.leaderboard(10, 0).unwrap();
        let order: Vec<(&str, i64)> = board.iter()
            .map(|e| (e.progress.user_id.as_str(), e.rank))
            .collect();
        assert_eq!(order, vec![("bob", 1), ("alice", 2), ("carol", 3)]);

        let page = db.leaderboard(1, 2).unwrap();
        assert_eq!(page[0].progress.user_id, "carol");
        assert_eq!(page[0].rank, 3);
    }

    #[test]
    fn test_get_progress_includes_rank() {
        let db = Database::in_memory().unwrap();
        db.upsert_progress(&record("a", 10)).unwrap();
        db.upsert_progress(&record("b", 20)).unwrap();
        let entry = db.get_progress("a").unwrap().unwrap();
        assert_eq!(entry.rank, 2);
        assert_eq!(entry.progress.display_name, "A");
        assert!(db.get_progress("nobody").unwrap().is_none());
    }

    #[test]
    fn test_upsert_replaces() {
        let db = Database::in_memory().unwrap();
        db.upsert_progress(&record("a", 10)).unwrap();
        db.upsert_progress(&record("a", 99)).unwrap();
        assert_eq!(db.get_progress("a").unwrap().unwrap().progress.xp, 99);
        assert_eq!(db.leaderboard(10, 0).unwrap().len(), 1);
    }
}
