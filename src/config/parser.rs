use std::path::Path;
use crate::errors::FairwayError;
use super::types::{FairwayConfig, PoseBackend};
use super::schema::CONFIG_SCHEMA;
use tracing::{info, warn};

const MAX_CONFIG_BYTES: u64 = 1_048_576;

pub async fn parse_config(path: &Path) -> Result<FairwayConfig, FairwayError> {
    if !path.exists() {
        return Err(FairwayError::Config(format!("Config file not found: {}", path.display())));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > MAX_CONFIG_BYTES {
        return Err(FairwayError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    parse_config_str(&content)
}

/// Parse and validate configuration from YAML text. An empty document yields defaults.
pub fn parse_config_str(content: &str) -> Result<FairwayConfig, FairwayError> {
    if content.trim().is_empty() {
        return Ok(FairwayConfig::default());
    }

    let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;

    // JSON Schema validation
    validate_schema(&yaml)?;

    let config: FairwayConfig = serde_yaml::from_value(yaml)?;

    validate_conflicts(&config)?;

    Ok(config)
}

/// Load the config file when one is given, otherwise fall back to defaults.
pub async fn load_config(path: Option<&Path>) -> Result<FairwayConfig, FairwayError> {
    match path {
        Some(p) => {
            let config = parse_config(p).await?;
            info!(path = %p.display(), "Loaded configuration");
            Ok(config)
        }
        None => Ok(FairwayConfig::default()),
    }
}

/// Validate config against the JSON schema for structural correctness.
fn validate_schema(yaml: &serde_yaml::Value) -> Result<(), FairwayError> {
    let json_value: serde_json::Value = serde_json::to_value(yaml)
        .map_err(|e| FairwayError::Config(format!("Config conversion error: {}", e)))?;

    let compiled = jsonschema::JSONSchema::compile(&CONFIG_SCHEMA)
        .map_err(|e| FairwayError::Config(format!("Schema compilation error: {}", e)))?;

    let result = compiled.validate(&json_value);
    if let Err(errors) = result {
        // Advisory: typed deserialization below is the hard gate.
        for e in errors {
            warn!(validation_error = %format!("{} at {}", e, e.instance_path), "Config schema warning");
        }
    }

    Ok(())
}

/// Detect semantic conflicts in the parsed configuration.
fn validate_conflicts(config: &FairwayConfig) -> Result<(), FairwayError> {
    let p = &config.processing;
    if p.min_duration_secs < 0.0 || p.max_duration_secs <= 0.0 {
        return Err(FairwayError::Config("Duration limits must be positive".into()));
    }
    if p.min_duration_secs > p.max_duration_secs {
        return Err(FairwayError::Config(format!(
            "processing.min_duration_secs ({}) exceeds max_duration_secs ({})",
            p.min_duration_secs, p.max_duration_secs
        )));
    }
    if !(0.0..=1.0).contains(&p.issue_threshold) {
        return Err(FairwayError::Config("processing.issue_threshold must be within [0, 1]".into()));
    }
    if p.allowed_extensions.is_empty() {
        return Err(FairwayError::Config("processing.allowed_extensions must not be empty".into()));
    }

    if config.server.max_concurrent_captures == 0 {
        return Err(FairwayError::Config("server.max_concurrent_captures must be at least 1".into()));
    }

    if config.pose.backend == PoseBackend::Command {
        let has_program = config.pose.command.as_ref()
            .and_then(|c| c.first())
            .map_or(false, |p| !p.trim().is_empty());
        if !has_program {
            return Err(FairwayError::Config("pose.backend is 'command' but pose.command is empty".into()));
        }
    } else if config.pose.command.is_some() {
        warn!("pose.command is set but ignored by the sidecar backend");
    }

    Ok(())
}
