use geo::Coord;
use serde::{Deserialize, Serialize};

/// result of snapping a point onto a linestring.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineProjection {
    /// distance in meters from the start of the line to `insert_point`
    pub distance_in_meters: f64,
    /// nearest location on the line to the projected point
    pub insert_point: Coord<f64>,
    /// index of the line segment (pair of consecutive coordinates) containing `insert_point`
    pub segment_index: usize,
}
