//! recalculation of a pattern shape after a single control point edit.
//!
//! the input geometry is never modified: every edit works on a copy and a new
//! [PatternGeometry] is returned only once all routing calls have succeeded.
//!
//! control point distances downstream of the edit are NOT recomputed here. the edit
//! orchestrator recomputes them when it commits the returned geometry to a pattern.
use geo::Coord;

use super::{RecalculationError, ShapeEdit};
use crate::model::{ControlPointStore, PatternGeometry};
use crate::routing::{routing_ops, RouteOptions, StreetRouter};

/// applies `edit` to a copy of `geometry`, re-deriving the affected segments by routing (or
/// straight lines, see [routing_ops::route_segment]).
pub async fn recalculate_shape<R>(
    router: &R,
    geometry: &PatternGeometry,
    edit: &ShapeEdit,
    options: &RouteOptions,
) -> Result<PatternGeometry, RecalculationError>
where
    R: StreetRouter + ?Sized,
{
    geometry.check_segment_count()?;
    let mut result = geometry.clone();
    match edit {
        ShapeEdit::Insert {
            index,
            control_point,
        } => {
            let n = result.control_points.len();
            if *index > n {
                return Err(invalid_index(edit, n));
            }
            let new_point = control_point.point();
            result.control_points.insert(control_point.clone(), *index)?;
            if n == 0 {
                // a lone control point has no segments
            } else if *index == 0 {
                let next = point_at(&result.control_points, 1)?;
                let outgoing = routing_ops::route_segment(router, new_point, next, options).await?;
                result.segments.replace_range(0, 0, [outgoing])?;
            } else if *index == n {
                let prev = point_at(&result.control_points, index - 1)?;
                let incoming = routing_ops::route_segment(router, prev, new_point, options).await?;
                result.segments.replace_range(n - 1, 0, [incoming])?;
            } else {
                let prev = point_at(&result.control_points, index - 1)?;
                let next = point_at(&result.control_points, index + 1)?;
                let incoming = routing_ops::route_segment(router, prev, new_point, options).await?;
                let outgoing = routing_ops::route_segment(router, new_point, next, options).await?;
                result
                    .segments
                    .replace_range(index - 1, 1, [incoming, outgoing])?;
            }
        }
        ShapeEdit::Update {
            index,
            point,
            snap_to_route,
        } => {
            let n = result.control_points.len();
            if *index >= n {
                return Err(invalid_index(edit, n));
            }
            let incoming = match index.checked_sub(1) {
                Some(prev_index) => {
                    let prev = point_at(&result.control_points, prev_index)?;
                    Some(routing_ops::route_segment(router, prev, *point, options).await?)
                }
                None => None,
            };
            let outgoing = if index + 1 < n {
                let next = point_at(&result.control_points, index + 1)?;
                Some(routing_ops::route_segment(router, *point, next, options).await?)
            } else {
                None
            };

            let snapped = if *snap_to_route {
                incoming
                    .as_ref()
                    .and_then(|line| line.0.last().copied())
                    .or_else(|| outgoing.as_ref().and_then(|line| line.0.first().copied()))
                    .unwrap_or(*point)
            } else {
                *point
            };
            let moved = result.control_points.try_get(*index)?.with_point(snapped);
            result.control_points.replace(*index, moved)?;
            if let Some(line) = incoming {
                result.segments.replace_range(index - 1, 1, [line])?;
            }
            if let Some(line) = outgoing {
                result.segments.replace_range(*index, 1, [line])?;
            }
        }
        ShapeEdit::Delete { index } => {
            let n = result.control_points.len();
            if *index >= n {
                return Err(invalid_index(edit, n));
            }
            if n == 1 {
                // removing the only control point leaves no segments behind
            } else if *index == 0 {
                result.segments.replace_range(0, 1, std::iter::empty())?;
            } else if *index == n - 1 {
                result.segments.replace_range(n - 2, 1, std::iter::empty())?;
            } else {
                let prev = point_at(&result.control_points, index - 1)?;
                let next = point_at(&result.control_points, index + 1)?;
                let merged = routing_ops::route_segment(router, prev, next, options).await?;
                result.segments.replace_range(index - 1, 2, [merged])?;
            }
            let _ = result.control_points.remove(*index)?;
        }
    }
    log::debug!(
        "recalculated shape for edit at control point {}: {} control points, {} segments",
        edit.index(),
        result.control_points.len(),
        result.segments.len()
    );
    Ok(result)
}

fn point_at(
    control_points: &ControlPointStore,
    index: usize,
) -> Result<Coord<f64>, RecalculationError> {
    Ok(control_points.try_get(index)?.point())
}

fn invalid_index(edit: &ShapeEdit, length: usize) -> RecalculationError {
    RecalculationError::InvalidEdit(format!(
        "edit index {} is out of range for {length} control points",
        edit.index()
    ))
}
