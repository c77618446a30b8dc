use std::sync::Mutex;

use async_trait::async_trait;
use geo::Coord;
use uuid::Uuid;

use super::{EditError, StopRepository};
use crate::model::StopEntity;

/// stop table held in memory. new stops receive a random uuid as their stop id.
#[derive(Debug, Default)]
pub struct InMemoryStopTable {
    stops: Mutex<Vec<StopEntity>>,
}

impl From<Vec<StopEntity>> for InMemoryStopTable {
    fn from(stops: Vec<StopEntity>) -> Self {
        InMemoryStopTable {
            stops: Mutex::new(stops),
        }
    }
}

impl InMemoryStopTable {
    /// a copy of every stop in the table, in creation order.
    pub fn stops(&self) -> Vec<StopEntity> {
        match self.stops.lock() {
            Ok(stops) => stops.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl StopRepository for InMemoryStopTable {
    async fn create_stop(&self, location: Coord<f64>) -> Result<StopEntity, EditError> {
        if !location.x.is_finite() || !location.y.is_finite() {
            return Err(EditError::StopCreationFailure(format!(
                "stop location ({}, {}) is not a valid coordinate",
                location.x, location.y
            )));
        }
        let stop = StopEntity::new(Uuid::new_v4().to_string(), location);
        let mut stops = self.stops.lock().map_err(|e| {
            EditError::StopCreationFailure(format!("stop table is unavailable: {e}"))
        })?;
        stops.push(stop.clone());
        Ok(stop)
    }

    fn find_stop(&self, stop_id: &str) -> Option<StopEntity> {
        let stops = self.stops.lock().ok()?;
        stops.iter().find(|s| s.stop_id == stop_id).cloned()
    }
}
