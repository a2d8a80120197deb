use crate::cli::commands::ServeArgs;
use crate::cli::{load_global_config, GlobalArgs};
use crate::config::FairwayConfig;
use crate::errors::FairwayError;
use crate::api;
use tracing::info;

pub async fn handle_serve(args: ServeArgs, global: &GlobalArgs) -> Result<(), FairwayError> {
    let mut config = load_global_config(global).await?;
    apply_overrides(&mut config, &args);

    info!(host = %config.server.host, port = config.server.port, "Starting API server");

    let state = api::create_app_state(&config).await?;
    let app = api::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .map_err(|e| FairwayError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}

fn apply_overrides(config: &mut FairwayConfig, args: &ServeArgs) {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(db) = &args.db {
        config.server.db_path = db.clone();
    }
    if let Some(workers) = args.workers {
        config.server.max_concurrent_captures = workers.max(1);
    }
    if let Some(dir) = &args.data_dir {
        config.storage.data_dir = dir.clone();
    }
}
