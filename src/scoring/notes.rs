use std::collections::BTreeMap;
use crate::models::TaxonomySnapshot;
use super::issues::ranked;

const MAX_FOCUS_ISSUES: usize = 2;

/// Plain-language coaching notes. Slugs unknown to the taxonomy are left out.
pub fn build_coach_notes(
    issues: &BTreeMap<String, f64>,
    mechanics: &BTreeMap<String, f64>,
    taxonomy: &TaxonomySnapshot,
) -> String {
    if issues.is_empty() {
        let best = mechanics.iter()
            .filter_map(|(slug, score)| taxonomy.mechanic(slug).map(|m| (m.name.as_str(), *score)))
            .max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.cmp(a.0)));
        return match best {
            Some((name, _)) => format!("Solid swing with no major faults. Strongest area: {}. Keep it consistent.", name),
            None => "Solid swing with no major faults. Keep it consistent.".to_string(),
        };
    }

    let mut paragraphs = Vec::new();
    for (slug, severity) in ranked(issues) {
        if paragraphs.len() >= MAX_FOCUS_ISSUES {
            break;
        }
        let Some(error) = taxonomy.error(slug) else {
            continue;
        };
        let mut text = format!("Focus on {} (severity {:.0}%).", error.name, severity * 100.0);
        if let Some(cue) = taxonomy.cues_for_error(error).first() {
            text.push_str(&format!(" Cue: \"{}\".", cue.text));
        }
        if let Some(drill) = taxonomy.drills_for_error(error).first() {
            text.push_str(&format!(" Drill: {}.", drill.name));
        }
        paragraphs.push(text);
    }

    if paragraphs.is_empty() {
        return "Some faults were detected; see the issue scores for details.".to_string();
    }
    paragraphs.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cue, Drill, Mechanic, SwingError};

    fn taxonomy() -> TaxonomySnapshot {
        TaxonomySnapshot {
            version: "test".to_string(),
            mechanics: vec![
                Mechanic { id: 1, slug: "tempo".into(), name: "Tempo".into(), description: String::new() },
                Mechanic { id: 2, slug: "hip-sway".into(), name: "Hip Stability".into(), description: String::new() },
            ],
            errors: vec![SwingError {
                id: 1,
                slug: "sway".into(),
                name: "Sway".into(),
                description: String::new(),
                mechanic: Some("hip-sway".into()),
                drills: vec!["wall-drill".into()],
                cues: vec!["turn-in-a-barrel".into()],
                lesson: None,
            }],
            drills: vec![Drill {
                id: 1,
                slug: "wall-drill".into(),
                name: "Wall Drill".into(),
                description: String::new(),
                duration_minutes: None,
                equipment: vec![],
            }],
            cues: vec![Cue { id: 1, slug: "turn-in-a-barrel".into(), text: "Turn in a barrel".into() }],
            ..Default::default()
        }
    }

    #[test]
    fn test_notes_for_known_issue() {
        let mut issues = BTreeMap::new();
        issues.insert("sway".to_string(), 0.42);
        let notes = build_coach_notes(&issues, &BTreeMap::new(), &taxonomy());
        assert_eq!(notes, "Focus on Sway (severity 42%). Cue: \"Turn in a barrel\". Drill: Wall Drill.");
    }

    #[test]
    fn test_unknown_issue_slug_is_omitted() {
        let mut issues = BTreeMap::new();
        issues.insert("chicken-wing".to_string(), 0.9);
        issues.insert("sway".to_string(), 0.3);
        let notes = build_coach_notes(&issues, &BTreeMap::new(), &taxonomy());
        assert!(!notes.contains("chicken"));
        assert!(notes.starts_with("Focus on Sway"));
    }

    #[test]
    fn test_all_unknown_falls_back() {
        let mut issues = BTreeMap::new();
        issues.insert("chicken-wing".to_string(), 0.9);
        let notes = build_coach_notes(&issues, &BTreeMap::new(), &taxonomy());
        assert!(notes.contains("see the issue scores"));
    }

    #[test]
    fn test_praise_names_best_mechanic() {
        let mut mechanics = BTreeMap::new();
        mechanics.insert("tempo".to_string(), 95.0);
        mechanics.insert("hip-sway".to_string(), 80.0);
        mechanics.insert("unknown-mechanic".to_string(), 100.0);
        let notes = build_coach_notes(&BTreeMap::new(), &mechanics, &taxonomy());
        assert!(notes.contains("Strongest area: Tempo"));
    }
}
