use serde::{Deserialize, Serialize};

use crate::config::EditSettings;

/// how a segment between two control points is derived.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteOptions {
    /// route along the street network instead of drawing straight lines
    pub follow_streets: bool,
    pub avoid_motorways: bool,
    /// when routing fails, draw a straight line instead of failing
    pub default_to_straight_line: bool,
}

impl From<&EditSettings> for RouteOptions {
    fn from(settings: &EditSettings) -> Self {
        RouteOptions {
            follow_streets: settings.follow_streets,
            avoid_motorways: settings.avoid_motorways,
            default_to_straight_line: settings.default_to_straight_line,
        }
    }
}
