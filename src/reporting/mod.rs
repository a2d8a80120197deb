pub mod formatter;
pub mod view;

pub use formatter::{format_analysis_text, format_history, format_status_line, format_taxonomy_summary};
pub use view::{build_view, AnalysisView, IssueView, MechanicView, PhaseView};
