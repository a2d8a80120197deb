use std::sync::Arc;
use crate::errors::FairwayError;
use crate::models::{Cue, Drill, TaxonomySnapshot};

/// Read-only taxonomy shared across handlers and capture workers.
#[derive(Clone)]
pub struct TaxonomyStore {
    snapshot: Arc<TaxonomySnapshot>,
}

impl TaxonomyStore {
    pub fn new(snapshot: TaxonomySnapshot) -> Self {
        Self { snapshot: Arc::new(snapshot) }
    }

    pub fn snapshot(&self) -> Arc<TaxonomySnapshot> {
        self.snapshot.clone()
    }

    pub fn version(&self) -> &str {
        &self.snapshot.version
    }

    /// `key` is an error id or slug.
    pub fn drills_for_error(&self, key: &str) -> Result<Vec<Drill>, FairwayError> {
        let error = self.snapshot.error_by_key(key)
            .ok_or_else(|| FairwayError::NotFound(format!("Swing error '{}'", key)))?;
        Ok(self.snapshot.drills_for_error(error).into_iter().cloned().collect())
    }

    pub fn cues_for_error(&self, key: &str) -> Result<Vec<Cue>, FairwayError> {
        let error = self.snapshot.error_by_key(key)
            .ok_or_else(|| FairwayError::NotFound(format!("Swing error '{}'", key)))?;
        Ok(self.snapshot.cues_for_error(error).into_iter().cloned().collect())
    }
}
