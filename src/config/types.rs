use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FairwayConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub processing: ProcessingConfig,
    pub pose: PoseConfig,
    pub taxonomy: TaxonomyConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: String,
    /// Captures processed at once; the rest wait in `queued`.
    pub max_concurrent_captures: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            db_path: "./data/fairway.db".to_string(),
            max_concurrent_captures: 2,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: "./data".to_string() }
    }
}

impl StorageConfig {
    pub fn captures_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("captures")
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub min_duration_secs: f64,
    pub max_duration_secs: f64,
    pub max_video_bytes: u64,
    pub allowed_extensions: Vec<String>,
    /// Issues below this severity are left out of an analysis.
    pub issue_threshold: f64,
    pub model_id: String,
    pub upload_timeout_secs: u64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            min_duration_secs: 1.0,
            max_duration_secs: 30.0,
            max_video_bytes: 512 * 1024 * 1024,
            allowed_extensions: vec!["mp4".to_string(), "mov".to_string(), "m4v".to_string()],
            issue_threshold: 0.15,
            model_id: "fairway-heuristic-v1".to_string(),
            upload_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PoseBackend {
    #[default]
    Sidecar,
    Command,
}

impl PoseBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sidecar => "sidecar",
            Self::Command => "command",
        }
    }
}

impl std::fmt::Display for PoseBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PoseConfig {
    pub backend: PoseBackend,
    /// Program and arguments; the video path is appended as the last argument.
    pub command: Option<Vec<String>>,
    pub timeout_secs: u64,
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            backend: PoseBackend::Sidecar,
            command: None,
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TaxonomyConfig {
    /// A YAML file or a directory of YAML files. Unset means the built-in taxonomy.
    pub path: Option<String>,
}
