use super::state::CaptureStage;

pub struct StageDefinition {
    pub stage: CaptureStage,
    pub display_name: &'static str,
    pub description: &'static str,
    /// Progress reported when the stage begins.
    pub percent: f64,
}

pub static STAGES: &[StageDefinition] = &[
    StageDefinition {
        stage: CaptureStage::Queued,
        display_name: "Queued",
        description: "Waiting for a processing slot",
        percent: 0.0,
    },
    StageDefinition {
        stage: CaptureStage::Uploading,
        display_name: "Uploading",
        description: "Copying the recording into capture storage",
        percent: 0.1,
    },
    StageDefinition {
        stage: CaptureStage::ExtractingPose,
        display_name: "Extracting Pose",
        description: "Detecting body keypoints frame by frame",
        percent: 0.3,
    },
    StageDefinition {
        stage: CaptureStage::Segmenting,
        display_name: "Segmenting Phases",
        description: "Finding takeaway, top, impact and finish",
        percent: 0.6,
    },
    StageDefinition {
        stage: CaptureStage::Scoring,
        display_name: "Scoring",
        description: "Scoring mechanics and diagnosing faults",
        percent: 0.8,
    },
    StageDefinition {
        stage: CaptureStage::Done,
        display_name: "Done",
        description: "Analysis available",
        percent: 1.0,
    },
];

pub fn definition(stage: CaptureStage) -> Option<&'static StageDefinition> {
    STAGES.iter().find(|d| d.stage == stage)
}

pub fn display_name(stage: CaptureStage) -> &'static str {
    match stage {
        CaptureStage::Error => "Error",
        other => definition(other).map(|d| d.display_name).unwrap_or("Unknown"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_percents_increase() {
        for pair in STAGES.windows(2) {
            assert!(pair[0].percent < pair[1].percent, "{} -> {}", pair[0].stage, pair[1].stage);
        }
        assert_eq!(STAGES.last().unwrap().percent, 1.0);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(display_name(CaptureStage::ExtractingPose), "Extracting Pose");
        assert_eq!(display_name(CaptureStage::Error), "Error");
    }
}
