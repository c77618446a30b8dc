use async_trait::async_trait;

use super::EditError;
use crate::model::Pattern;

/// pattern persistence collaborator, invoked once per completed edit.
#[async_trait]
pub trait PatternPersistence: Send + Sync {
    async fn save(&self, pattern: &Pattern) -> Result<(), EditError>;
}
