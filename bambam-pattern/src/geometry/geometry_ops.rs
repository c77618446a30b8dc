//! pure functions over [LineString] values used to edit pattern shapes.
//!
//! all distances are haversine distances in meters. coordinates are (x=longitude, y=latitude).
//! interpolation within a single line segment is linear in coordinate space, which is accurate
//! enough for the short segments found in transit shapes.
use geo::{Closest, ClosestPoint, Coord, Distance, Haversine, Length, LineString, Point};

use super::{GeometryError, LineProjection};

/// haversine distance in meters between two coordinates.
pub fn coord_distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    Haversine.distance(Point::from(a), Point::from(b))
}

/// total length of a polyline in meters.
pub fn distance_along(line: &LineString<f64>) -> f64 {
    Haversine.length(line)
}

/// a two-point line between `from` and `to`.
pub fn straight_line(from: Coord<f64>, to: Coord<f64>) -> LineString<f64> {
    LineString::new(vec![from, to])
}

/// interpolated point at a given distance along a line. distances outside of [0, length]
/// are clamped to the line endpoints.
pub fn point_at_distance(line: &LineString<f64>, meters: f64) -> Result<Coord<f64>, GeometryError> {
    let first = line.0.first().ok_or_else(|| {
        GeometryError::EmptyLine(String::from("cannot find point at distance"))
    })?;
    if !meters.is_finite() {
        return Err(GeometryError::InvalidDistance(format!(
            "point at distance {meters} is not finite"
        )));
    }
    if meters <= 0.0 {
        return Ok(*first);
    }
    let mut travelled = 0.0;
    for segment in line.lines() {
        let segment_length = coord_distance(segment.start, segment.end);
        if travelled + segment_length >= meters {
            if segment_length <= 0.0 {
                return Ok(segment.start);
            }
            let ratio = (meters - travelled) / segment_length;
            return Ok(interpolate(segment.start, segment.end, ratio));
        }
        travelled += segment_length;
    }
    // beyond the end of the line
    Ok(line.0.last().copied().unwrap_or(*first))
}

/// nearest point on `line` to `point`, along with the distance from the start of the line to
/// that nearest point.
///
/// when several segments are equally close (a self-intersecting or self-overlapping line),
/// the segment closest to the start of the line wins.
pub fn project_onto_line(
    point: Coord<f64>,
    line: &LineString<f64>,
) -> Result<LineProjection, GeometryError> {
    let first = line.0.first().ok_or_else(|| {
        GeometryError::EmptyLine(String::from("cannot project point onto line"))
    })?;
    if line.0.len() == 1 {
        return Ok(LineProjection {
            distance_in_meters: 0.0,
            insert_point: *first,
            segment_index: 0,
        });
    }

    let target = Point::from(point);
    let mut best: Option<(f64, LineProjection)> = None;
    let mut travelled = 0.0;
    for (segment_index, segment) in line.lines().enumerate() {
        let candidate = match segment.closest_point(&target) {
            Closest::Intersection(p) => p.0,
            Closest::SinglePoint(p) => p.0,
            Closest::Indeterminate => segment.start,
        };
        let offset = Haversine.distance(target, Point::from(candidate));
        let is_closer = match &best {
            None => true,
            Some((best_offset, _)) => offset < *best_offset,
        };
        if is_closer {
            let projection = LineProjection {
                distance_in_meters: travelled + coord_distance(segment.start, candidate),
                insert_point: candidate,
                segment_index,
            };
            best = Some((offset, projection));
        }
        travelled += coord_distance(segment.start, segment.end);
    }

    best.map(|(_, projection)| projection).ok_or_else(|| {
        GeometryError::DegenerateLine(String::from("line has no segments to project onto"))
    })
}

/// sub-line between two distances measured from the start of `line`. distances are clamped to
/// the line extent. when `from_meters == to_meters` the result is a two-point line with
/// identical coordinates.
pub fn slice_by_distance(
    line: &LineString<f64>,
    from_meters: f64,
    to_meters: f64,
) -> Result<LineString<f64>, GeometryError> {
    if line.0.len() < 2 {
        return Err(GeometryError::DegenerateLine(format!(
            "cannot slice line with {} coordinate(s)",
            line.0.len()
        )));
    }
    if !from_meters.is_finite() || !to_meters.is_finite() {
        return Err(GeometryError::InvalidDistance(format!(
            "slice bounds must be finite, found [{from_meters}, {to_meters}]"
        )));
    }
    if from_meters > to_meters {
        return Err(GeometryError::InvalidDistance(format!(
            "slice start {from_meters} exceeds slice end {to_meters}"
        )));
    }
    let total = distance_along(line);
    let from = from_meters.clamp(0.0, total);
    let to = to_meters.clamp(0.0, total);

    let mut coords = vec![point_at_distance(line, from)?];
    let mut travelled = 0.0;
    for segment in line.lines() {
        travelled += coord_distance(segment.start, segment.end);
        if travelled >= to {
            break;
        }
        if travelled > from && coords.last() != Some(&segment.end) {
            coords.push(segment.end);
        }
    }
    coords.push(point_at_distance(line, to)?);
    Ok(LineString::new(coords))
}

/// portion of `line` between the points on it closest to `a` and `b`. the result always runs
/// in the direction of `line`, regardless of the order of `a` and `b`.
///
/// on a self-intersecting line each of `a` and `b` resolves to the first matching location
/// from the start of the line (see [project_onto_line]), so the slice is deterministic but may
/// not be the sub-line a user intended. the line topology is never altered.
pub fn slice_between(
    a: Coord<f64>,
    b: Coord<f64>,
    line: &LineString<f64>,
) -> Result<LineString<f64>, GeometryError> {
    let start = project_onto_line(a, line)?.distance_in_meters;
    let end = project_onto_line(b, line)?.distance_in_meters;
    if start <= end {
        slice_by_distance(line, start, end)
    } else {
        slice_by_distance(line, end, start)
    }
}

fn interpolate(a: Coord<f64>, b: Coord<f64>, ratio: f64) -> Coord<f64> {
    Coord {
        x: a.x + (b.x - a.x) * ratio,
        y: a.y + (b.y - a.y) * ratio,
    }
}
