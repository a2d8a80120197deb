pub const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS processing (
    capture_id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    source_uri TEXT NOT NULL,
    club_type TEXT NOT NULL,
    generate_overlays INTEGER NOT NULL DEFAULT 0,
    duration_hint REAL,
    stage TEXT NOT NULL DEFAULT 'queued',
    percent REAL NOT NULL DEFAULT 0.0,
    error_message TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    completed_at TEXT
);

CREATE TABLE IF NOT EXISTS captures (
    id INTEGER PRIMARY KEY REFERENCES processing(capture_id) ON DELETE CASCADE,
    user_id TEXT NOT NULL,
    video_url TEXT NOT NULL,
    club_type TEXT NOT NULL,
    generate_overlays INTEGER NOT NULL DEFAULT 0,
    duration_secs REAL,
    captured_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS analyses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    capture_id INTEGER NOT NULL UNIQUE REFERENCES captures(id) ON DELETE CASCADE,
    overall_confidence REAL NOT NULL,
    issue_scores TEXT NOT NULL,
    mechanic_scores TEXT NOT NULL,
    phase_scores TEXT NOT NULL,
    phases TEXT NOT NULL,
    model TEXT NOT NULL,
    coach_notes TEXT NOT NULL,
    overlay_url TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS user_progress (
    user_id TEXT PRIMARY KEY,
    display_name TEXT NOT NULL,
    xp INTEGER NOT NULL DEFAULT 0,
    streak_days INTEGER NOT NULL DEFAULT 0,
    challenges_completed INTEGER NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_processing_stage ON processing(stage);
CREATE INDEX IF NOT EXISTS idx_captures_user ON captures(user_id);
CREATE INDEX IF NOT EXISTS idx_analyses_created ON analyses(created_at);
CREATE INDEX IF NOT EXISTS idx_progress_xp ON user_progress(xp DESC);
";
