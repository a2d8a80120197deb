use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;
use regex::Regex;
use sha2::{Digest, Sha256};
use crate::errors::FairwayError;
use crate::models::TaxonomySnapshot;
use tracing::{info, warn};

pub const BUILTIN_TAXONOMY: &str = include_str!("../../taxonomy/default.yaml");

static SLUG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("slug pattern is valid")
});

/// Load the taxonomy from a file, a directory of YAML files, or the built-in copy.
pub fn load_taxonomy(path: Option<&Path>) -> Result<TaxonomySnapshot, FairwayError> {
    let snapshot = match path {
        None => parse_taxonomy(BUILTIN_TAXONOMY)?,
        Some(p) if p.is_dir() => load_dir(p)?,
        Some(p) if p.is_file() => parse_taxonomy(&std::fs::read_to_string(p)?)?,
        Some(p) => {
            return Err(FairwayError::Config(format!("Taxonomy path not found: {}", p.display())));
        }
    };

    let snapshot = finalize(snapshot)?;
    info!(
        version = %snapshot.version,
        phases = snapshot.phases.len(),
        errors = snapshot.errors.len(),
        drills = snapshot.drills.len(),
        "Loaded taxonomy"
    );
    Ok(snapshot)
}

pub fn parse_taxonomy(content: &str) -> Result<TaxonomySnapshot, FairwayError> {
    Ok(serde_yaml::from_str(content)?)
}

/// Merge every `*.yaml` in a directory, in file name order.
fn load_dir(dir: &Path) -> Result<TaxonomySnapshot, FairwayError> {
    let pattern = dir.join("*.yaml");
    let pattern_str = pattern.to_string_lossy();

    let mut paths = Vec::new();
    for entry in glob::glob(&pattern_str)
        .map_err(|e| FairwayError::Config(format!("Invalid glob pattern: {}", e)))?
    {
        paths.push(entry.map_err(|e| FairwayError::Config(format!("Glob error: {}", e)))?);
    }
    paths.sort();

    let mut merged = TaxonomySnapshot::default();
    for path in &paths {
        let part = parse_taxonomy(&std::fs::read_to_string(path)?)?;
        if merged.version.is_empty() {
            merged.version = part.version;
        }
        merged.phases.extend(part.phases);
        merged.mechanics.extend(part.mechanics);
        merged.errors.extend(part.errors);
        merged.drills.extend(part.drills);
        merged.lessons.extend(part.lessons);
        merged.cues.extend(part.cues);
    }
    if paths.is_empty() {
        return Err(FairwayError::Config(format!("No taxonomy files in {}", dir.display())));
    }
    Ok(merged)
}

/// Validate and stamp the version marker.
pub fn finalize(mut snapshot: TaxonomySnapshot) -> Result<TaxonomySnapshot, FairwayError> {
    validate(&snapshot)?;
    warn_dangling(&snapshot);
    snapshot.phases.sort_by_key(|p| p.order);

    let declared = if snapshot.version.is_empty() { "0".to_string() } else { snapshot.version.clone() };
    snapshot.version = String::new();
    let digest = Sha256::digest(serde_json::to_vec(&snapshot)?);
    let hex = format!("{:x}", digest);
    snapshot.version = format!("{}-{}", declared, &hex[..12]);
    Ok(snapshot)
}

fn check_unique<'a>(
    kind: &str,
    items: impl Iterator<Item = (i64, &'a str)>,
) -> Result<(), FairwayError> {
    let mut ids = HashSet::new();
    let mut slugs = HashSet::new();
    for (id, slug) in items {
        if !SLUG_RE.is_match(slug) {
            return Err(FairwayError::Config(format!("Invalid {} slug '{}'", kind, slug)));
        }
        if !ids.insert(id) {
            return Err(FairwayError::Config(format!("Duplicate {} id {}", kind, id)));
        }
        if !slugs.insert(slug) {
            return Err(FairwayError::Config(format!("Duplicate {} slug '{}'", kind, slug)));
        }
    }
    Ok(())
}

fn validate(s: &TaxonomySnapshot) -> Result<(), FairwayError> {
    check_unique("phase", s.phases.iter().map(|x| (x.id, x.slug.as_str())))?;
    check_unique("mechanic", s.mechanics.iter().map(|x| (x.id, x.slug.as_str())))?;
    check_unique("error", s.errors.iter().map(|x| (x.id, x.slug.as_str())))?;
    check_unique("drill", s.drills.iter().map(|x| (x.id, x.slug.as_str())))?;
    check_unique("lesson", s.lessons.iter().map(|x| (x.id, x.slug.as_str())))?;
    check_unique("cue", s.cues.iter().map(|x| (x.id, x.slug.as_str())))?;
    Ok(())
}

/// Cross references that do not resolve are tolerated at read time; flag them here.
fn warn_dangling(s: &TaxonomySnapshot) {
    for phase in &s.phases {
        for m in phase.mechanics.iter().filter(|m| s.mechanic(m).is_none()) {
            warn!(phase = %phase.slug, mechanic = %m, "Phase references unknown mechanic");
        }
    }
    for error in &s.errors {
        if let Some(m) = error.mechanic.as_deref().filter(|m| s.mechanic(m).is_none()) {
            warn!(error = %error.slug, mechanic = %m, "Error references unknown mechanic");
        }
        for d in error.drills.iter().filter(|d| s.drill(d).is_none()) {
            warn!(error = %error.slug, drill = %d, "Error references unknown drill");
        }
        for c in error.cues.iter().filter(|c| s.cue(c).is_none()) {
            warn!(error = %error.slug, cue = %c, "Error references unknown cue");
        }
        if let Some(l) = error.lesson.as_deref().filter(|l| s.lesson(l).is_none()) {
            warn!(error = %error.slug, lesson = %l, "Error references unknown lesson");
        }
    }
    for lesson in &s.lessons {
        for d in lesson.drills.iter().filter(|d| s.drill(d).is_none()) {
            warn!(lesson = %lesson.slug, drill = %d, "Lesson references unknown drill");
        }
    }
}
