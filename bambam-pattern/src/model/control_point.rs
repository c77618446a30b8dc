use geo::Coord;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PointType;

/// a vertex on a pattern shape which is either a stop or a free anchor.
///
/// control points are immutable records: edits produce new values via the `with_*`
/// methods, which keep the identifier stable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    id: String,
    point: Coord<f64>,
    point_type: PointType,
    /// cumulative distance in meters from the start of the pattern
    distance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stop_id: Option<String>,
}

impl ControlPoint {
    pub fn new_stop(point: Coord<f64>, distance: f64, stop_id: &str) -> ControlPoint {
        ControlPoint {
            id: Uuid::new_v4().to_string(),
            point,
            point_type: PointType::Stop,
            distance,
            stop_id: Some(stop_id.to_string()),
        }
    }

    pub fn new_anchor(point: Coord<f64>, distance: f64) -> ControlPoint {
        ControlPoint {
            id: Uuid::new_v4().to_string(),
            point,
            point_type: PointType::Anchor,
            distance,
            stop_id: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn point(&self) -> Coord<f64> {
        self.point
    }

    pub fn point_type(&self) -> PointType {
        self.point_type
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// present only for [PointType::Stop] control points
    pub fn stop_id(&self) -> Option<&str> {
        self.stop_id.as_deref()
    }

    pub fn is_stop(&self) -> bool {
        self.point_type == PointType::Stop
    }

    pub fn with_point(&self, point: Coord<f64>) -> ControlPoint {
        ControlPoint {
            point,
            ..self.clone()
        }
    }

    pub fn with_distance(&self, distance: f64) -> ControlPoint {
        ControlPoint {
            distance,
            ..self.clone()
        }
    }

    /// binds this control point to a stop, keeping its id, location and distance.
    pub fn with_stop(&self, stop_id: &str) -> ControlPoint {
        ControlPoint {
            point_type: PointType::Stop,
            stop_id: Some(stop_id.to_string()),
            ..self.clone()
        }
    }
}
