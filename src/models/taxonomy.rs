use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub id: i64,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Position within the swing, address first.
    pub order: u32,
    #[serde(default)]
    pub mechanics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mechanic {
    pub id: i64,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A swing fault. Named `SwingError` to stay clear of `std::error::Error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwingError {
    pub id: i64,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Mechanic this fault degrades.
    pub mechanic: Option<String>,
    #[serde(default)]
    pub drills: Vec<String>,
    #[serde(default)]
    pub cues: Vec<String>,
    pub lesson: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drill {
    pub id: i64,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub equipment: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: i64,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub drills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    pub id: i64,
    pub slug: String,
    pub text: String,
}

/// Full static reference data. `version` is the cache marker clients compare.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TaxonomySnapshot {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub phases: Vec<Phase>,
    #[serde(default)]
    pub mechanics: Vec<Mechanic>,
    #[serde(default)]
    pub errors: Vec<SwingError>,
    #[serde(default)]
    pub drills: Vec<Drill>,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
    #[serde(default)]
    pub cues: Vec<Cue>,
}

impl TaxonomySnapshot {
    pub fn phase(&self, slug: &str) -> Option<&Phase> {
        self.phases.iter().find(|p| p.slug == slug)
    }

    pub fn mechanic(&self, slug: &str) -> Option<&Mechanic> {
        self.mechanics.iter().find(|m| m.slug == slug)
    }

    pub fn error(&self, slug: &str) -> Option<&SwingError> {
        self.errors.iter().find(|e| e.slug == slug)
    }

    /// Look an error up by integer id or by slug.
    pub fn error_by_key(&self, key: &str) -> Option<&SwingError> {
        match key.parse::<i64>() {
            Ok(id) => self.errors.iter().find(|e| e.id == id),
            Err(_) => self.error(key),
        }
    }

    pub fn drill(&self, slug: &str) -> Option<&Drill> {
        self.drills.iter().find(|d| d.slug == slug)
    }

    pub fn lesson(&self, slug: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.slug == slug)
    }

    pub fn cue(&self, slug: &str) -> Option<&Cue> {
        self.cues.iter().find(|c| c.slug == slug)
    }

    /// Drills recommended for an error; references that do not resolve are skipped.
    pub fn drills_for_error(&self, error: &SwingError) -> Vec<&Drill> {
        error.drills.iter().filter_map(|slug| self.drill(slug)).collect()
    }

    pub fn cues_for_error(&self, error: &SwingError) -> Vec<&Cue> {
        error.cues.iter().filter_map(|slug| self.cue(slug)).collect()
    }
}
