use async_trait::async_trait;
use geo::Coord;

use super::EditError;
use crate::model::StopEntity;

/// stop entity collaborator: creates stops and looks up existing ones.
#[async_trait]
pub trait StopRepository: Send + Sync {
    /// creates and stores a new stop at `location`.
    async fn create_stop(&self, location: Coord<f64>) -> Result<StopEntity, EditError>;

    fn find_stop(&self, stop_id: &str) -> Option<StopEntity>;
}
