use std::time::Duration;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use crate::cli::commands::{CancelArgs, StatusArgs};
use crate::cli::{connect, print_json, GlobalArgs};
use crate::client::FairwayClient;
use crate::errors::FairwayError;
use crate::pipeline::stage::display_name;
use crate::pipeline::{CaptureStage, CaptureStatus};
use crate::reporting::format_status_line;
use tracing::info;

pub async fn handle_status(args: StatusArgs, global: &GlobalArgs) -> Result<(), FairwayError> {
    info!(capture_id = args.capture_id, "Querying capture status");
    let client = connect(global)?;

    let status = if args.follow && !args.json {
        follow(&client, args.capture_id, Duration::from_secs(args.interval), global.quiet).await?
    } else if args.follow {
        client.wait(args.capture_id, Duration::from_secs(args.interval), |_| {}).await?
    } else {
        client.status(args.capture_id).await?
    };

    if args.json {
        print_json(&status)?;
    } else {
        print_status(&status);
    }
    Ok(())
}

pub async fn handle_cancel(args: CancelArgs, global: &GlobalArgs) -> Result<(), FairwayError> {
    let client = connect(global)?;
    client.cancel(args.capture_id).await?;
    println!("Cancelling capture {}", args.capture_id);
    Ok(())
}

/// Poll with a progress bar until the capture reaches `done` or `error`.
pub async fn follow(client: &FairwayClient, capture_id: i64, interval: Duration, quiet: bool) -> Result<CaptureStatus, FairwayError> {
    let bar = if quiet { ProgressBar::hidden() } else { ProgressBar::new(100) };
    bar.set_style(
        ProgressStyle::default_bar()
            .template("  {bar:30.green/dark_gray} {pos:>3}% | {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    bar.enable_steady_tick(Duration::from_millis(200));

    let status = client.wait(capture_id, interval, |s| {
        bar.set_position((s.percent * 100.0).round() as u64);
        bar.set_message(display_name(s.stage).to_string());
    }).await;

    match &status {
        Ok(s) if s.stage == CaptureStage::Done => bar.finish_with_message("Done"),
        _ => bar.abandon(),
    }
    status
}

pub fn print_status(status: &CaptureStatus) {
    let line = format_status_line(status);
    match status.stage {
        CaptureStage::Done => println!("{}", style(line).green()),
        CaptureStage::Error => println!("{}", style(line).red()),
        _ => println!("{}", line),
    }
}
