use geo::{Coord, LineString};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::{ControlPointStore, PatternError, PatternGeometry, PatternStop, SegmentStore};

/// an ordered path a transit route follows: a shape made of control points and segments,
/// plus the sequence of stops visited along it.
///
/// a pattern is only mutated by the edit operations in [crate::editor::PatternEditor].
/// serialized patterns carry the materialized `shape` next to the segments it is built from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "PatternDocument", from = "PatternDocument")]
pub struct Pattern {
    pub pattern_id: String,
    #[serde(flatten)]
    geometry: PatternGeometry,
    #[serde(default)]
    pattern_stops: Vec<PatternStop>,
}

/// persisted form of a [Pattern]. `shape` is written on every save and ignored on read, the
/// segments are the source of truth.
#[derive(Serialize, Deserialize)]
struct PatternDocument {
    pattern_id: String,
    #[serde(flatten)]
    geometry: PatternGeometry,
    #[serde(default)]
    pattern_stops: Vec<PatternStop>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    shape: Option<geojson::Geometry>,
}

impl From<Pattern> for PatternDocument {
    fn from(pattern: Pattern) -> Self {
        let shape = pattern.shape_geojson();
        PatternDocument {
            pattern_id: pattern.pattern_id,
            geometry: pattern.geometry,
            pattern_stops: pattern.pattern_stops,
            shape,
        }
    }
}

impl From<PatternDocument> for Pattern {
    fn from(document: PatternDocument) -> Self {
        Pattern {
            pattern_id: document.pattern_id,
            geometry: document.geometry,
            pattern_stops: document.pattern_stops,
        }
    }
}

impl Pattern {
    /// creates an empty pattern with no stops and no shape.
    pub fn new(pattern_id: &str) -> Pattern {
        Pattern {
            pattern_id: pattern_id.to_string(),
            geometry: PatternGeometry::default(),
            pattern_stops: vec![],
        }
    }

    pub fn geometry(&self) -> &PatternGeometry {
        &self.geometry
    }

    pub fn control_points(&self) -> &ControlPointStore {
        &self.geometry.control_points
    }

    pub fn segments(&self) -> &SegmentStore {
        &self.geometry.segments
    }

    pub fn pattern_stops(&self) -> &[PatternStop] {
        &self.pattern_stops
    }

    pub fn has_shape(&self) -> bool {
        !self.geometry.segments.is_empty()
    }

    /// the materialized shape polyline, or None when the pattern has no segments.
    pub fn shape(&self) -> Option<LineString<f64>> {
        if self.has_shape() {
            Some(self.geometry.segments.concatenate_all())
        } else {
            None
        }
    }

    /// the shape as a GeoJSON LineString of `[longitude, latitude]` pairs.
    pub fn shape_geojson(&self) -> Option<geojson::Geometry> {
        self.shape()
            .map(|line| geojson::Geometry::new(geojson::Value::from(&line)))
    }

    /// where an extension of this pattern begins: the last shape coordinate if a shape
    /// exists, otherwise the last control point.
    pub fn end_point(&self) -> Option<Coord<f64>> {
        match self.shape() {
            Some(line) => line.0.last().copied(),
            None => self.geometry.control_points.last().map(|cp| cp.point()),
        }
    }

    /// total length of the shape in meters.
    pub fn total_distance(&self) -> f64 {
        self.geometry.segments.total_distance()
    }

    /// replaces the pattern stop list only; the shape is left untouched.
    pub(crate) fn set_pattern_stops(&mut self, pattern_stops: Vec<PatternStop>) {
        self.pattern_stops = pattern_stops;
    }

    /// commits a new stop list and geometry together. control point distances are recomputed
    /// from the segments and copied onto the matching pattern stops.
    pub(crate) fn apply_edit(
        &mut self,
        pattern_stops: Vec<PatternStop>,
        mut geometry: PatternGeometry,
    ) -> Result<(), PatternError> {
        geometry.recompute_distances()?;
        self.geometry = geometry;
        self.pattern_stops = pattern_stops;
        self.sync_shape_dist_traveled();
        Ok(())
    }

    fn sync_shape_dist_traveled(&mut self) {
        let stop_control_points = self.geometry.control_points.find_stop_control_points();
        for (pattern_stop, scp) in self.pattern_stops.iter_mut().zip(stop_control_points) {
            if scp.control_point.stop_id() == Some(pattern_stop.stop_id.as_str()) {
                pattern_stop.shape_dist_traveled = Some(scp.control_point.distance());
            } else {
                log::debug!(
                    "pattern stop {} does not match control point stop {:?}, leaving shape_dist_traveled unset",
                    pattern_stop.stop_id,
                    scp.control_point.stop_id()
                );
            }
        }
    }

    /// validates the invariants that hold after every successful edit:
    ///   - one segment between each pair of consecutive control points
    ///   - control points sorted by non-decreasing distance
    ///   - STOP control points match the pattern stop list 1:1, in order
    pub fn check_invariants(&self) -> Result<(), PatternError> {
        self.geometry.check_segment_count()?;
        if !self.geometry.control_points.is_sorted_by_distance() {
            return Err(PatternError::InvariantViolation(String::from(
                "control points are not sorted by distance",
            )));
        }
        let cp_stop_ids = self.geometry.control_points.stop_ids();
        let pattern_stop_ids = self
            .pattern_stops
            .iter()
            .map(|ps| ps.stop_id.as_str())
            .collect_vec();
        if cp_stop_ids != pattern_stop_ids {
            return Err(PatternError::InvariantViolation(format!(
                "stop control points [{}] do not match pattern stops [{}]",
                cp_stop_ids.join(", "),
                pattern_stop_ids.join(", ")
            )));
        }
        Ok(())
    }
}
