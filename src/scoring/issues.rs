use std::collections::BTreeMap;
use super::mechanics::Measurements;

/// Map `value` linearly from [start, end] onto [0, 1].
fn ramp(value: f64, start: f64, end: f64) -> f64 {
    ((value - start) / (end - start)).clamp(0.0, 1.0)
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Severity for every known issue, before thresholding.
pub fn issue_severities(m: &Measurements) -> BTreeMap<String, f64> {
    let mut issues = BTreeMap::new();
    let mut put = |slug: &str, severity: f64| {
        issues.insert(slug.to_string(), round2(severity));
    };

    // Tempo ratios below 2.5:1 read as rushed, above 4:1 as sluggish.
    put("fast-tempo", ramp(2.5 - m.tempo_ratio, 0.0, 1.5));
    put("slow-tempo", ramp(m.tempo_ratio - 4.0, 0.0, 2.0));
    put("head-movement", ramp(m.head_drift, 0.1, 0.5));
    put("early-extension", ramp(m.spine_loss_deg(), 3.0, 15.0));
    put("sway", ramp(m.hip_sway, 0.1, 0.4));
    if let Some(elbow) = m.lead_elbow_deg {
        put("bent-lead-arm", ramp(180.0 - elbow, 15.0, 60.0));
    }
    if let Some(offset) = m.finish_offset {
        put("off-balance-finish", ramp(offset, 0.2, 0.8));
    }
    issues
}

/// Issues at or above `threshold`, keyed by slug.
pub fn detect_issues(m: &Measurements, threshold: f64) -> BTreeMap<String, f64> {
    issue_severities(m).into_iter()
        .filter(|(_, severity)| *severity > 0.0 && *severity >= threshold)
        .collect()
}

/// Issue slugs ordered by severity, worst first; ties by slug.
pub fn ranked(issues: &BTreeMap<String, f64>) -> Vec<(&str, f64)> {
    let mut v: Vec<(&str, f64)> = issues.iter().map(|(k, s)| (k.as_str(), *s)).collect();
    v.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean() -> Measurements {
        Measurements {
            tempo_ratio: 3.0,
            head_drift: 0.0,
            address_spine_deg: 20.0,
            impact_spine_deg: 20.0,
            hip_sway: 0.0,
            lead_elbow_deg: Some(178.0),
            finish_offset: Some(0.05),
        }
    }

    #[test]
    fn test_clean_swing_has_no_issues() {
        assert!(detect_issues(&clean(), 0.15).is_empty());
    }

    #[test]
    fn test_fast_tempo_detected() {
        let m = Measurements { tempo_ratio: 1.75, ..clean() };
        let issues = detect_issues(&m, 0.15);
        assert_eq!(issues["fast-tempo"], 0.5);
        assert!(!issues.contains_key("slow-tempo"));
    }

    #[test]
    fn test_early_extension_only_on_loss_of_tilt() {
        let standing_up = Measurements { impact_spine_deg: 8.0, ..clean() };
        assert_eq!(detect_issues(&standing_up, 0.15)["early-extension"], 0.75);

        let more_bent = Measurements { impact_spine_deg: 32.0, ..clean() };
        assert!(!detect_issues(&more_bent, 0.15).contains_key("early-extension"));
    }

    #[test]
    fn test_threshold_filters_minor_issues() {
        let m = Measurements { hip_sway: 0.13, ..clean() };
        assert_eq!(issue_severities(&m)["sway"], 0.1);
        assert!(detect_issues(&m, 0.15).is_empty());
        assert!(detect_issues(&m, 0.05).contains_key("sway"));
    }

    #[test]
    fn test_missing_measurements_omit_issues() {
        let m = Measurements { lead_elbow_deg: None, finish_offset: None, ..clean() };
        let all = issue_severities(&m);
        assert!(!all.contains_key("bent-lead-arm"));
        assert!(!all.contains_key("off-balance-finish"));
    }

    #[test]
    fn test_ranked_worst_first() {
        let mut issues = BTreeMap::new();
        issues.insert("sway".to_string(), 0.4);
        issues.insert("head-movement".to_string(), 0.9);
        issues.insert("fast-tempo".to_string(), 0.4);
        let r = ranked(&issues);
        assert_eq!(r[0].0, "head-movement");
        assert_eq!(r[1].0, "fast-tempo");
        assert_eq!(r[2].0, "sway");
    }
}
