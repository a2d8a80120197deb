use std::path::Path;
use crate::cli::commands::{ImportProgressArgs, ProgressArgs};
use crate::cli::{connect, load_global_config, print_json, GlobalArgs};
use crate::db::Database;
use crate::errors::FairwayError;
use crate::models::{LeaderboardEntry, ProgressRecord};
use tracing::info;

const MAX_IMPORT_BYTES: u64 = 10 * 1_048_576;

pub async fn handle_progress(args: ProgressArgs, global: &GlobalArgs) -> Result<(), FairwayError> {
    let client = connect(global)?;

    let entries = match &args.user {
        Some(user) => vec![client.progress(user).await?],
        None => client.leaderboard(args.limit, 0).await?.entries,
    };
    if args.json {
        return print_json(&entries);
    }
    print!("{}", format_leaderboard(&entries));
    Ok(())
}

pub async fn handle_import_progress(args: ImportProgressArgs, global: &GlobalArgs) -> Result<(), FairwayError> {
    let config = load_global_config(global).await?;
    let path = Path::new(&args.file);

    let metadata = tokio::fs::metadata(path).await
        .map_err(|e| FairwayError::Validation(format!("Cannot read {}: {}", path.display(), e)))?;
    if metadata.len() > MAX_IMPORT_BYTES {
        return Err(FairwayError::Validation("Import file exceeds 10MB limit".into()));
    }
    let content = tokio::fs::read_to_string(path).await?;
    let records = parse_records(path, &content)?;

    let db = Database::new(&config.server.db_path)?;
    for record in &records {
        db.upsert_progress(record)?;
    }
    info!(count = records.len(), db = %config.server.db_path, "Imported progress records");
    println!("Imported {} progress records", records.len());
    Ok(())
}

/// `.json` files are read as JSON, anything else as YAML.
fn parse_records(path: &Path, content: &str) -> Result<Vec<ProgressRecord>, FairwayError> {
    let records: Vec<ProgressRecord> = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => serde_json::from_str(content)?,
        _ => serde_yaml::from_str(content)?,
    };
    for r in &records {
        if r.user_id.trim().is_empty() {
            return Err(FairwayError::Validation("Progress record with empty user_id".into()));
        }
    }
    Ok(records)
}

fn format_leaderboard(entries: &[LeaderboardEntry]) -> String {
    if entries.is_empty() {
        return "No progress recorded.\n".to_string();
    }
    let mut out = String::from("| Rank | User | XP | Streak | Challenges |\n|---|---|---|---|---|\n");
    for e in entries {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            e.rank, e.progress.display_name, e.progress.xp, e.progress.streak_days, e.progress.challenges_completed
        ));
    }
    out
}
