//! geometry bookkeeping used by the pattern editor. none of these functions route; each takes
//! a geometry by reference and returns the edited copy.
use geo::LineString;

use super::EditError;
use crate::geometry::{geometry_ops, GeometryError};
use crate::model::{ControlPoint, ControlPointStore, PatternError, PatternGeometry};

/// control points closer than this are treated as the same location along the shape
pub const COINCIDENT_METERS: f64 = 1e-6;

/// appends `line` as the last segment and `control_point` as the control point it ends at.
pub fn append_segment(
    geometry: &PatternGeometry,
    line: LineString<f64>,
    control_point: ControlPoint,
) -> Result<PatternGeometry, PatternError> {
    geometry.check_segment_count()?;
    if geometry.control_points.is_empty() {
        return Err(PatternError::InvariantViolation(String::from(
            "cannot append a segment to a shape without control points",
        )));
    }
    let mut result = geometry.clone();
    result.segments.push(line);
    result.control_points.push(control_point);
    Ok(result)
}

/// splits `line` into `floor(length / interval)` consecutive pieces of `interval` meters.
/// whatever remains past the last whole piece is dropped.
pub fn split_at_interval(
    line: &LineString<f64>,
    interval: f64,
) -> Result<Vec<LineString<f64>>, GeometryError> {
    if !interval.is_finite() || interval <= 0.0 {
        return Err(GeometryError::InvalidDistance(format!(
            "split interval must be a positive number of meters, found {interval}"
        )));
    }
    let length = geometry_ops::distance_along(line);
    let count = (length / interval).floor() as usize;
    (1..=count)
        .map(|i| {
            let from = (i - 1) as f64 * interval;
            let to = i as f64 * interval;
            geometry_ops::slice_by_distance(line, from, to)
        })
        .collect()
}

/// binds `stop_id` to the location `distance` meters along the shape.
///
/// an ANCHOR control point already at that distance becomes the stop. otherwise the segment
/// containing the location is split in two around a new STOP control point. when several
/// control points share the distance, the stop is placed after the last of them.
pub fn pin_stop(
    geometry: &PatternGeometry,
    distance: f64,
    stop_id: &str,
) -> Result<PatternGeometry, EditError> {
    let mut result = geometry.clone();
    result.recompute_distances()?;
    let last_index = result.control_points.len().checked_sub(1).ok_or_else(|| {
        PatternError::InvariantViolation(String::from(
            "cannot pin a stop to a shape without control points",
        ))
    })?;
    let index = result
        .control_points
        .iter()
        .enumerate()
        .filter(|(_, cp)| cp.distance() <= distance)
        .map(|(i, _)| i)
        .last()
        .unwrap_or(0);
    let at_index = result.control_points.try_get(index)?.clone();

    if !at_index.is_stop() && (at_index.distance() - distance).abs() <= COINCIDENT_METERS {
        result
            .control_points
            .replace(index, at_index.with_stop(stop_id))?;
        return Ok(result);
    }
    if index == last_index {
        // nothing beyond the last control point, the stop lands on top of it
        let point = at_index.point();
        result
            .segments
            .push(geometry_ops::straight_line(point, point));
        result
            .control_points
            .push(ControlPoint::new_stop(point, at_index.distance(), stop_id));
        return Ok(result);
    }

    let segment = result
        .segments
        .get(index)
        .cloned()
        .ok_or(PatternError::IndexOutOfBounds {
            collection: "segments",
            index,
            length: result.segments.len(),
        })?;
    let local = (distance - at_index.distance()).max(0.0);
    let length = geometry_ops::distance_along(&segment);
    let head = geometry_ops::slice_by_distance(&segment, 0.0, local)?;
    let tail = geometry_ops::slice_by_distance(&segment, local.min(length), length)?;
    let point = geometry_ops::point_at_distance(&segment, local)?;
    result
        .control_points
        .insert(ControlPoint::new_stop(point, distance, stop_id), index + 1)?;
    result.segments.replace_range(index, 1, [head, tail])?;
    Ok(result)
}

/// index at which a control point projected `distance` meters along the shape is inserted
/// between two stop control points. the index is always after `prev_stop_index` and never
/// after `next_stop_index`, so the stop order is kept even when the projection lands outside
/// of the stretch between the two stops.
pub fn splice_index(
    control_points: &ControlPointStore,
    distance: f64,
    prev_stop_index: usize,
    next_stop_index: usize,
) -> usize {
    let mut index = prev_stop_index + 1;
    while index < next_stop_index
        && control_points
            .get(index)
            .map(|cp| cp.distance() < distance)
            .unwrap_or(false)
    {
        index += 1;
    }
    index
}

/// inserts `control_point` at `index` between two existing control points and replaces the
/// segment between them with two straight placeholder segments meeting at the new point.
/// the placeholders are expected to be re-derived by an update edit at `index`.
pub fn insert_placeholder(
    geometry: &PatternGeometry,
    index: usize,
    control_point: ControlPoint,
) -> Result<PatternGeometry, PatternError> {
    geometry.check_segment_count()?;
    if index == 0 || index >= geometry.control_points.len() {
        return Err(PatternError::IndexOutOfBounds {
            collection: "control_points",
            index,
            length: geometry.control_points.len(),
        });
    }
    let prev = geometry.control_points.try_get(index - 1)?.point();
    let next = geometry.control_points.try_get(index)?.point();
    let point = control_point.point();
    let mut result = geometry.clone();
    result.control_points.insert(control_point, index)?;
    result.segments.replace_range(
        index - 1,
        1,
        [
            geometry_ops::straight_line(prev, point),
            geometry_ops::straight_line(point, next),
        ],
    )?;
    Ok(result)
}
