pub mod ingest;
pub mod probe;
pub mod source;

pub use ingest::{IngestedVideo, Ingestor};
pub use probe::{probe_video, VideoInfo};
pub use source::VideoSource;

/// Ingested recordings are stored as `video.<ext>` inside the capture directory.
pub const VIDEO_STEM: &str = "video";
pub const SIDECAR_SUFFIX: &str = ".pose.json";
