use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// role of a control point on a pattern shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PointType {
    /// free shape vertex used to pin the geometry between stops
    Anchor,
    /// shape vertex bound to a stop entity
    Stop,
}

impl Display for PointType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PointType::Anchor => write!(f, "ANCHOR"),
            PointType::Stop => write!(f, "STOP"),
        }
    }
}
