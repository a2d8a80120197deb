use console::style;
use serde_json::json;
use crate::cli::commands::TaxonomyArgs;
use crate::cli::{connect, print_json, GlobalArgs};
use crate::errors::FairwayError;
use crate::reporting::format_taxonomy_summary;

pub async fn handle_taxonomy(args: TaxonomyArgs, global: &GlobalArgs) -> Result<(), FairwayError> {
    let client = connect(global)?;

    let Some(key) = args.error else {
        let snapshot = client.taxonomy().await?;
        if args.json {
            return print_json(&snapshot);
        }
        print!("{}", format_taxonomy_summary(&snapshot));
        return Ok(());
    };

    let drills = client.drills_for_error(&key).await?;
    let cues = client.cues_for_error(&key).await?;
    if args.json {
        return print_json(&json!({ "error_key": key, "drills": drills, "cues": cues }));
    }

    println!("{}", style(format!("Error {}", key)).bold());
    println!("\nDrills:");
    if drills.is_empty() {
        println!("  (none)");
    }
    for d in &drills {
        let minutes = d.duration_minutes.map(|m| format!(" [{} min]", m)).unwrap_or_default();
        println!("  - {}{}: {}", d.name, minutes, d.description);
    }
    println!("\nCues:");
    if cues.is_empty() {
        println!("  (none)");
    }
    for c in &cues {
        println!("  - \"{}\"", c.text);
    }
    Ok(())
}
