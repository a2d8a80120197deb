pub mod capture_logger;
pub mod utils;

pub use capture_logger::{CaptureLogger, PROCESSING_LOG};
pub use utils::atomic_write;
