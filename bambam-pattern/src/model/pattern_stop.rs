use serde::{Deserialize, Serialize};

use super::StopEntity;

/// a stop visited by a pattern, in pattern order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatternStop {
    pub stop_id: String,
    /// distance in meters along the pattern shape where the vehicle reaches this stop.
    /// unset until the stop is bound to a control point on the shape.
    #[serde(default)]
    pub shape_dist_traveled: Option<f64>,
}

impl From<&StopEntity> for PatternStop {
    fn from(stop: &StopEntity) -> Self {
        PatternStop {
            stop_id: stop.stop_id.clone(),
            shape_dist_traveled: None,
        }
    }
}
