pub mod auth;
pub mod errors;
pub mod models;
pub mod routes;

use std::path::Path;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use crate::config::FairwayConfig;
use crate::db::Database;
use crate::errors::FairwayError;
use crate::pipeline::CapturePipeline;
use crate::taxonomy::{load_taxonomy, TaxonomyStore};
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub taxonomy: TaxonomyStore,
    pub pipeline: CapturePipeline,
}

impl AppState {
    pub fn new(config: &FairwayConfig, db: Database, taxonomy: TaxonomyStore) -> Result<Self, FairwayError> {
        let extractor = crate::pose::create_extractor(&config.pose)?;
        let pipeline = CapturePipeline::new(config, db.clone(), taxonomy.clone(), extractor)?;
        Ok(Self { db, taxonomy, pipeline })
    }
}

/// Open storage, load the taxonomy and recover from an unclean shutdown.
pub async fn create_app_state(config: &FairwayConfig) -> Result<AppState, FairwayError> {
    tokio::fs::create_dir_all(config.storage.captures_dir()).await?;
    let db = Database::new(&config.server.db_path)?;
    let taxonomy = TaxonomyStore::new(load_taxonomy(config.taxonomy.path.as_deref().map(Path::new))?);
    let state = AppState::new(config, db, taxonomy)?;
    state.pipeline.recover()?;
    info!(
        db = %config.server.db_path,
        captures_dir = %config.storage.captures_dir().display(),
        pose_backend = %config.pose.backend,
        "Application state ready"
    );
    Ok(state)
}

pub fn build_router(state: AppState) -> Router {
    use routes::{analyses, captures, health, progress, taxonomy};

    let protected = Router::new()
        .route("/api/captures", post(captures::submit_capture))
        .route("/api/captures/:id", get(captures::get_capture))
        .route("/api/captures/:id/status", get(captures::get_status))
        .route("/api/captures/:id/events", get(captures::capture_events))
        .route("/api/captures/:id/cancel", post(captures::cancel_capture))
        .route("/api/captures/:id/analysis", get(analyses::get_analysis))
        .route("/api/captures/:id/analysis/view", get(analyses::get_analysis_view))
        .route("/api/users/:user_id/analyses", get(analyses::list_user_analyses))
        .route("/api/users/:user_id/progress", get(progress::get_user_progress))
        .route("/api/leaderboard", get(progress::get_leaderboard))
        .route("/api/taxonomy", get(taxonomy::get_taxonomy))
        .route("/api/taxonomy/errors/:key/drills", get(taxonomy::drills_for_error))
        .route("/api/taxonomy/errors/:key/cues", get(taxonomy::cues_for_error))
        .route_layer(axum::middleware::from_fn(auth::api_auth_middleware));

    Router::new()
        .route("/api/health", get(health::health_check))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
