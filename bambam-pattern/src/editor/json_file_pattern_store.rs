use std::path::PathBuf;

use async_trait::async_trait;

use super::{EditError, PatternPersistence};
use crate::model::Pattern;

/// writes each saved pattern to a single JSON file, replacing the previous contents.
#[derive(Clone, Debug)]
pub struct JsonFilePatternStore {
    path: PathBuf,
}

impl JsonFilePatternStore {
    pub fn new(path: impl Into<PathBuf>) -> JsonFilePatternStore {
        JsonFilePatternStore { path: path.into() }
    }
}

#[async_trait]
impl PatternPersistence for JsonFilePatternStore {
    async fn save(&self, pattern: &Pattern) -> Result<(), EditError> {
        let json = serde_json::to_string_pretty(pattern).map_err(|e| {
            EditError::PersistenceFailure(format!(
                "failure encoding pattern {}: {e}",
                pattern.pattern_id
            ))
        })?;
        tokio::fs::write(&self.path, json).await.map_err(|e| {
            EditError::PersistenceFailure(format!(
                "failure writing pattern {} to {}: {e}",
                pattern.pattern_id,
                self.path.display()
            ))
        })?;
        log::debug!(
            "saved pattern {} to {}",
            pattern.pattern_id,
            self.path.display()
        );
        Ok(())
    }
}
