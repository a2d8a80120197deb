use clap::{Parser, Subcommand, Args};

#[derive(Parser)]
#[command(name = "fairway", version, long_version = crate::cli::LONG_VERSION, about = "Golf swing capture, analysis and coaching service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Args, Clone, Debug, Default)]
pub struct GlobalArgs {
    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// YAML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Base URL of a running fairway server
    #[arg(long, global = true)]
    pub server: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Serve(ServeArgs),
    /// Submit a swing recording for analysis
    Submit(SubmitArgs),
    /// Show a capture's processing status
    Status(StatusArgs),
    /// Cancel a capture that is still processing
    Cancel(CancelArgs),
    /// Show the analysis of a finished capture
    Analysis(AnalysisArgs),
    /// List a user's analyses, newest first
    History(HistoryArgs),
    /// Show the coaching taxonomy or the drills and cues for one error
    Taxonomy(TaxonomyArgs),
    /// Show a user's progress or the leaderboard
    Progress(ProgressArgs),
    /// Load progress records from a JSON or YAML file into the database
    ImportProgress(ImportProgressArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

#[derive(Args, Clone, Debug)]
pub struct ServeArgs {
    /// Listen port (overrides config)
    #[arg(long)]
    pub port: Option<u16>,

    /// Listen address (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// SQLite database path (overrides config)
    #[arg(long)]
    pub db: Option<String>,

    /// Captures processed concurrently (overrides config)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Directory for capture files (overrides config)
    #[arg(long)]
    pub data_dir: Option<String>,
}

#[derive(Args, Clone, Debug)]
pub struct SubmitArgs {
    /// Video path or http(s) URL as seen by the server
    pub video: String,

    /// Owning user
    #[arg(short, long)]
    pub user: String,

    /// Club used for the swing
    #[arg(long, default_value = "7 Iron")]
    pub club: String,

    /// Recording length in seconds when the container has no header
    #[arg(long)]
    pub duration: Option<f64>,

    /// Also render the phase overlay
    #[arg(long)]
    pub overlays: bool,

    /// Block until processing finishes
    #[arg(long)]
    pub wait: bool,

    /// Poll interval in seconds
    #[arg(long, default_value = "2")]
    pub interval: u64,
}

#[derive(Args, Clone, Debug)]
pub struct StatusArgs {
    /// Capture ID to query
    pub capture_id: i64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Continuously poll until done or error
    #[arg(long)]
    pub follow: bool,

    /// Poll interval in seconds
    #[arg(long, default_value = "2")]
    pub interval: u64,
}

#[derive(Args, Clone, Debug)]
pub struct CancelArgs {
    pub capture_id: i64,
}

#[derive(Args, Clone, Debug)]
pub struct AnalysisArgs {
    pub capture_id: i64,

    /// Resolve score keys against the taxonomy
    #[arg(long)]
    pub view: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone, Debug)]
pub struct HistoryArgs {
    pub user: String,

    #[arg(long, default_value = "20")]
    pub limit: usize,

    #[arg(long, default_value = "0")]
    pub offset: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone, Debug)]
pub struct TaxonomyArgs {
    /// Error id or slug to list drills and cues for
    #[arg(long)]
    pub error: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone, Debug)]
pub struct ProgressArgs {
    /// User to show; omit for the leaderboard
    pub user: Option<String>,

    #[arg(long, default_value = "10")]
    pub limit: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone, Debug)]
pub struct ImportProgressArgs {
    /// JSON or YAML list of progress records
    pub file: String,
}

#[derive(Args, Clone, Debug)]
pub struct ValidateArgs {
    /// Config file to validate
    pub config: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_submit() {
        let cli = Cli::try_parse_from([
            "fairway", "-vv", "--server", "http://h:1", "submit", "swing.mp4", "--user", "u1", "--overlays", "--wait",
        ]).unwrap();
        assert_eq!(cli.global.verbose, 2);
        assert_eq!(cli.global.server.as_deref(), Some("http://h:1"));
        match cli.command {
            Commands::Submit(args) => {
                assert_eq!(args.video, "swing.mp4");
                assert_eq!(args.club, "7 Iron");
                assert!(args.overlays && args.wait);
                assert_eq!(args.duration, None);
            }
            _ => panic!("expected submit"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["fairway", "status", "7", "--follow", "--no-color", "-c", "f.yaml"]).unwrap();
        assert!(cli.global.no_color);
        assert_eq!(cli.global.config.as_deref(), Some("f.yaml"));
        assert!(matches!(cli.command, Commands::Status(StatusArgs { capture_id: 7, follow: true, .. })));
    }

    #[test]
    fn test_import_progress_name() {
        let cli = Cli::try_parse_from(["fairway", "import-progress", "users.yaml"]).unwrap();
        assert!(matches!(cli.command, Commands::ImportProgress(_)));
    }
}
