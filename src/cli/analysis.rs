use crate::cli::commands::{AnalysisArgs, HistoryArgs};
use crate::cli::{connect, print_json, GlobalArgs};
use crate::errors::FairwayError;
use crate::reporting::{format_analysis_text, format_history};

pub async fn handle_analysis(args: AnalysisArgs, global: &GlobalArgs) -> Result<(), FairwayError> {
    let client = connect(global)?;

    if args.view {
        let view = client.analysis_view(args.capture_id).await?;
        if args.json {
            return print_json(&view);
        }
        print!("{}", format_analysis_text(&view));
        return Ok(());
    }

    let record = client.analysis(args.capture_id).await?;
    if args.json {
        return print_json(&record);
    }
    print!("{}", format_history(std::slice::from_ref(&record)));
    println!("\n{}", record.analysis.coach_notes);
    Ok(())
}

pub async fn handle_history(args: HistoryArgs, global: &GlobalArgs) -> Result<(), FairwayError> {
    let client = connect(global)?;
    let page = client.history(&args.user, args.limit, args.offset).await?;
    if args.json {
        return print_json(&page.analyses);
    }
    print!("{}", format_history(&page.analyses));
    if let Some(next) = page.next_offset {
        if !global.quiet {
            println!("\nMore: --offset {}", next);
        }
    }
    Ok(())
}
