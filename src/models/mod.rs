pub mod analysis;
pub mod capture;
pub mod pose;
pub mod progress;
pub mod taxonomy;

pub use analysis::{Analysis, AnalysisRecord, NewAnalysis, PhaseSegment};
pub use capture::{Capture, NewCapture};
pub use pose::{Handedness, Point, PoseFrame, PoseSequence};
pub use progress::{LeaderboardEntry, ProgressRecord};
pub use taxonomy::{Cue, Drill, Lesson, Mechanic, Phase, SwingError, TaxonomySnapshot};
