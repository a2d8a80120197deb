use clap::Parser;
use fairway::cli::{self, Commands, GlobalArgs};
use fairway::errors::FairwayError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();
    init_logging(&cli.global);

    if cli.global.no_color {
        console::set_colors_enabled(false);
    }

    let global = cli.global;
    let result = match cli.command {
        Commands::Serve(args) => cli::serve::handle_serve(args, &global).await,
        Commands::Submit(args) => cli::submit::handle_submit(args, &global).await,
        Commands::Status(args) => cli::status::handle_status(args, &global).await,
        Commands::Cancel(args) => cli::status::handle_cancel(args, &global).await,
        Commands::Analysis(args) => cli::analysis::handle_analysis(args, &global).await,
        Commands::History(args) => cli::analysis::handle_history(args, &global).await,
        Commands::Taxonomy(args) => cli::taxonomy::handle_taxonomy(args, &global).await,
        Commands::Progress(args) => cli::progress::handle_progress(args, &global).await,
        Commands::ImportProgress(args) => cli::progress::handle_import_progress(args, &global).await,
        Commands::Validate(args) => handle_validate(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(exit_code(&e));
    }
}

fn init_logging(global: &GlobalArgs) {
    let log_level = match (global.quiet, global.verbose) {
        (true, 0) => "warn",
        (_, 0) => "info",
        (_, 1) => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    if global.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(!global.no_color)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn exit_code(e: &FairwayError) -> i32 {
    match e {
        FairwayError::Config(_) => 2,
        FairwayError::Validation(_) => 3,
        FairwayError::NotFound(_) => 4,
        FairwayError::Upload(_) | FairwayError::Network(_) => 5,
        _ => 1,
    }
}

async fn handle_validate(args: cli::commands::ValidateArgs) -> Result<(), FairwayError> {
    let path = std::path::PathBuf::from(&args.config);
    let config = fairway::config::parse_config(&path).await?;
    println!("Configuration is valid: {}", args.config);
    println!(
        "  server {}:{}, pose backend {}, {} concurrent captures",
        config.server.host, config.server.port, config.pose.backend, config.server.max_concurrent_captures
    );
    Ok(())
}
