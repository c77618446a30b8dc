use geo::{coord, Coord};
use serde::{Deserialize, Serialize};

/// a stop row from the stop table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StopEntity {
    pub stop_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_name: Option<String>,
    pub stop_lon: f64,
    pub stop_lat: f64,
}

impl StopEntity {
    pub fn new(stop_id: String, location: Coord<f64>) -> StopEntity {
        StopEntity {
            stop_id,
            stop_name: None,
            stop_lon: location.x,
            stop_lat: location.y,
        }
    }

    pub fn coord(&self) -> Coord<f64> {
        coord! { x: self.stop_lon, y: self.stop_lat }
    }
}
