pub mod commands;
pub mod serve;
pub mod submit;
pub mod status;
pub mod analysis;
pub mod taxonomy;
pub mod progress;

pub use commands::{Cli, Commands, GlobalArgs};

use std::path::Path;
use crate::api::auth::API_TOKEN_ENV;
use crate::client::{FairwayClient, DEFAULT_SERVER};
use crate::config::{load_config, FairwayConfig};
use crate::errors::FairwayError;

pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    ", built ",
    env!("BUILD_TIMESTAMP"),
    ")"
);

/// Client for the server named by `--server`, authenticated from the environment.
pub fn connect(global: &GlobalArgs) -> Result<FairwayClient, FairwayError> {
    let base = global.server.as_deref().unwrap_or(DEFAULT_SERVER);
    FairwayClient::new(base, std::env::var(API_TOKEN_ENV).ok())
}

pub async fn load_global_config(global: &GlobalArgs) -> Result<FairwayConfig, FairwayError> {
    load_config(global.config.as_deref().map(Path::new)).await
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), FairwayError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
