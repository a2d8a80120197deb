use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-user aggregate maintained by the progression backend; read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub user_id: String,
    pub display_name: String,
    pub xp: i64,
    pub streak_days: i64,
    #[serde(default)]
    pub challenges_completed: i64,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based, by xp descending then user id.
    pub rank: i64,
    #[serde(flatten)]
    pub progress: ProgressRecord,
}
