use serde::{Deserialize, Serialize};
use uom::si::f64::Length;
use uom::si::length::meter;

use crate::app::PatternAppError;

/// shortest distance between stops created by add-stops-at-interval
pub const MIN_SPLIT_INTERVAL_METERS: f64 = 1.0;

/// settings that shape every pattern edit. lengths are read and written in meters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditSettings {
    /// route new segments along the street network instead of drawing straight lines
    pub follow_streets: bool,
    pub avoid_motorways: bool,
    /// only every nth qualifying intersection along the route gets a stop
    pub intersection_step: usize,
    /// how far from the intersection an intersection stop is placed
    pub distance_from_intersection: Length,
    /// place intersection stops on the far side of the intersection
    pub after_intersection: bool,
    /// distance between stops created by add-stops-at-interval
    pub split_interval: Length,
    /// when routing fails, draw a straight line instead of failing the edit
    pub default_to_straight_line: bool,
}

impl Default for EditSettings {
    fn default() -> Self {
        Self {
            follow_streets: true,
            avoid_motorways: false,
            intersection_step: 2,
            distance_from_intersection: Length::new::<meter>(5.0),
            after_intersection: true,
            split_interval: Length::new::<meter>(400.0),
            default_to_straight_line: false,
        }
    }
}

impl EditSettings {
    pub fn distance_from_intersection_meters(&self) -> f64 {
        self.distance_from_intersection.get::<meter>()
    }

    pub fn split_interval_meters(&self) -> f64 {
        self.split_interval.get::<meter>()
    }

    pub fn validate(&self) -> Result<(), PatternAppError> {
        if self.intersection_step == 0 {
            return Err(PatternAppError::ConfigurationError(String::from(
                "intersection_step must be at least 1",
            )));
        }
        let offset = self.distance_from_intersection_meters();
        if !offset.is_finite() || offset < 0.0 {
            return Err(PatternAppError::ConfigurationError(format!(
                "distance_from_intersection must be a non-negative number of meters, found {offset}"
            )));
        }
        let interval = self.split_interval_meters();
        if !interval.is_finite() || interval < MIN_SPLIT_INTERVAL_METERS {
            return Err(PatternAppError::ConfigurationError(format!(
                "split_interval must be at least {MIN_SPLIT_INTERVAL_METERS} meters, found {interval}"
            )));
        }
        Ok(())
    }
}

impl TryFrom<&String> for EditSettings {
    type Error = PatternAppError;

    fn try_from(f: &String) -> Result<Self, Self::Error> {
        let settings: EditSettings = if f.ends_with(".toml") {
            let s = std::fs::read_to_string(f).map_err(|e| {
                PatternAppError::ConfigurationError(format!("failure reading {f}: {e}"))
            })?;
            toml::from_str(&s).map_err(|e| {
                PatternAppError::ConfigurationError(format!("failure decoding {f}: {e}"))
            })?
        } else if f.ends_with(".json") {
            let s = std::fs::read_to_string(f).map_err(|e| {
                PatternAppError::ConfigurationError(format!("failure reading {f}: {e}"))
            })?;
            serde_json::from_str(&s).map_err(|e| {
                PatternAppError::ConfigurationError(format!("failure decoding {f}: {e}"))
            })?
        } else {
            return Err(PatternAppError::ConfigurationError(format!(
                "unsupported file type: {f}"
            )));
        };
        settings.validate()?;
        Ok(settings)
    }
}
