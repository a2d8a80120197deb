use crate::models::{AnalysisRecord, TaxonomySnapshot};
use crate::pipeline::stage::display_name;
use crate::pipeline::CaptureStatus;
use super::view::AnalysisView;

pub fn format_status_line(status: &CaptureStatus) -> String {
    let mut line = format!(
        "capture {}: {} ({:.0}%)",
        status.capture_id,
        display_name(status.stage),
        status.percent * 100.0
    );
    if let Some(err) = &status.error {
        line.push_str(&format!(" - {}", err));
    }
    line
}

pub fn format_analysis_text(view: &AnalysisView) -> String {
    let mut out = format!(
        "## Capture {} ({})\n\nConfidence: {:.0}%  Model: {}\n",
        view.capture_id,
        view.club_type,
        view.overall_confidence * 100.0,
        view.model
    );

    if !view.phases.is_empty() {
        out.push_str("\n| Phase | Score | Window |\n|---|---|---|\n");
        for p in &view.phases {
            let score = p.score.map(|s| format!("{:.1}", s)).unwrap_or_else(|| "-".to_string());
            let window = match (p.start_secs, p.end_secs) {
                (Some(a), Some(b)) => format!("{:.2}s - {:.2}s", a, b),
                _ => "-".to_string(),
            };
            out.push_str(&format!("| {} | {} | {} |\n", p.name, score, window));
        }
    }

    if !view.mechanics.is_empty() {
        out.push_str("\n| Mechanic | Score |\n|---|---|\n");
        for m in &view.mechanics {
            out.push_str(&format!("| {} | {:.1} |\n", m.name, m.score));
        }
    }

    if view.issues.is_empty() {
        out.push_str("\nNo issues detected.\n");
    } else {
        out.push_str("\n### Issues\n\n");
        for issue in &view.issues {
            out.push_str(&format!("- **{}** ({:.0}%)\n", issue.name, issue.severity * 100.0));
            for cue in &issue.cues {
                out.push_str(&format!("  - Cue: \"{}\"\n", cue.text));
            }
            for drill in &issue.drills {
                out.push_str(&format!("  - Drill: {}\n", drill.name));
            }
        }
    }

    out.push_str(&format!("\n### Coach notes\n\n{}\n", view.coach_notes));
    out
}

/// One line per analysis, newest first as given.
pub fn format_history(records: &[AnalysisRecord]) -> String {
    if records.is_empty() {
        return "No analyses yet.\n".to_string();
    }
    let mut out = String::from("| Capture | Club | Captured | Confidence | Top issue |\n|---|---|---|---|---|\n");
    for r in records {
        let top = crate::scoring::issues::ranked(&r.analysis.issue_scores)
            .first()
            .map(|(slug, sev)| format!("{} ({:.0}%)", slug, sev * 100.0))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "| {} | {} | {} | {:.0}% | {} |\n",
            r.capture.id,
            r.capture.club_type,
            r.capture.captured_at.format("%Y-%m-%d %H:%M"),
            r.analysis.overall_confidence * 100.0,
            top
        ));
    }
    out
}

pub fn format_taxonomy_summary(t: &TaxonomySnapshot) -> String {
    let mut out = format!(
        "Taxonomy {}\n\n| Kind | Count |\n|---|---|\n| Phases | {} |\n| Mechanics | {} |\n| Errors | {} |\n| Drills | {} |\n| Lessons | {} |\n| Cues | {} |\n",
        t.version,
        t.phases.len(),
        t.mechanics.len(),
        t.errors.len(),
        t.drills.len(),
        t.lessons.len(),
        t.cues.len()
    );
    out.push_str("\nErrors:\n");
    for e in &t.errors {
        out.push_str(&format!("  {:>3}  {:<20} {}\n", e.id, e.slug, e.name));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::state::{CaptureStage, CaptureState};
    use crate::reporting::view::{build_view, sample_record};
    use crate::taxonomy::load_taxonomy;

    #[test]
    fn test_status_line() {
        let mut s = CaptureStatus::queued(4);
        s.stage = CaptureStage::Error;
        s.state = CaptureState::Error;
        s.percent = 0.3;
        s.error = Some("no pose data".to_string());
        assert_eq!(format_status_line(&s), "capture 4: Error (30%) - no pose data");
    }

    #[test]
    fn test_analysis_text_lists_known_issues() {
        let tax = load_taxonomy(None).unwrap();
        let text = format_analysis_text(&build_view(&sample_record(), &tax));
        assert!(text.contains("## Capture 11 (7 Iron)"));
        assert!(text.contains("**Head Movement** (80%)"));
        assert!(!text.contains("reverse-pivot"));
        assert!(text.contains("Coach notes"));
    }

    #[test]
    fn test_history_table() {
        let text = format_history(&[sample_record()]);
        assert!(text.contains("| 11 | 7 Iron |"));
        assert!(text.contains("reverse-pivot (90%)"));
        assert_eq!(format_history(&[]), "No analyses yet.\n");
    }

    #[test]
    fn test_taxonomy_summary() {
        let tax = load_taxonomy(None).unwrap();
        let text = format_taxonomy_summary(&tax);
        assert!(text.contains("| Errors | 7 |"));
        assert!(text.contains("sway"));
    }
}
