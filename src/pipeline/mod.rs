pub mod orchestrator;
pub mod stage;
pub mod state;
pub mod tracker;

pub use orchestrator::CapturePipeline;
pub use state::{CaptureStage, CaptureState, CaptureStatus, SubmitRequest};
pub use tracker::CaptureHandle;
