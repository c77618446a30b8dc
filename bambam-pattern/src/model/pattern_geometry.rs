use serde::{Deserialize, Serialize};

use super::{ControlPointStore, PatternError, SegmentStore};

/// control points and the segments between them. every shape edit produces a new value of
/// this type; the previous value is never modified in place.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternGeometry {
    #[serde(default)]
    pub control_points: ControlPointStore,
    #[serde(default)]
    pub segments: SegmentStore,
}

impl PatternGeometry {
    pub fn new(control_points: ControlPointStore, segments: SegmentStore) -> PatternGeometry {
        PatternGeometry {
            control_points,
            segments,
        }
    }

    /// checks that there is exactly one segment between each pair of consecutive control points.
    pub fn check_segment_count(&self) -> Result<(), PatternError> {
        let expected = self.control_points.len().saturating_sub(1);
        if self.segments.len() != expected {
            return Err(PatternError::InvariantViolation(format!(
                "expected {expected} segments for {} control points, found {}",
                self.control_points.len(),
                self.segments.len()
            )));
        }
        Ok(())
    }

    /// sets each control point distance to the cumulative length of the segments before it.
    pub fn recompute_distances(&mut self) -> Result<(), PatternError> {
        self.check_segment_count()?;
        let mut distances = Vec::with_capacity(self.control_points.len());
        let mut travelled = 0.0;
        if !self.control_points.is_empty() {
            distances.push(travelled);
        }
        for length in self.segments.lengths() {
            travelled += length;
            distances.push(travelled);
        }
        self.control_points.set_distances(&distances)
    }
}
