use std::time::Duration;
use console::style;
use crate::cli::commands::SubmitArgs;
use crate::cli::status::{follow, print_status};
use crate::cli::{connect, GlobalArgs};
use crate::errors::FairwayError;
use crate::pipeline::{CaptureStage, SubmitRequest};
use tracing::info;

pub async fn handle_submit(args: SubmitArgs, global: &GlobalArgs) -> Result<(), FairwayError> {
    let client = connect(global)?;
    let req = SubmitRequest {
        user_id: args.user,
        video_uri: args.video,
        duration_hint: args.duration,
        club: args.club,
        generate_overlays: args.overlays,
    };

    let capture_id = client.submit(&req).await?;
    info!(capture_id, user_id = %req.user_id, "Capture submitted");
    if global.quiet {
        println!("{}", capture_id);
    } else {
        println!("Submitted capture {}", style(capture_id).bold());
    }

    if !args.wait {
        return Ok(());
    }

    let status = follow(&client, capture_id, Duration::from_secs(args.interval.max(1)), global.quiet).await?;
    print_status(&status);
    if status.stage == CaptureStage::Error {
        return Err(FairwayError::Processing(status.error.unwrap_or_else(|| "capture failed".to_string())));
    }
    if !global.quiet {
        println!("Run `fairway analysis {} --view` to see the result", capture_id);
    }
    Ok(())
}
