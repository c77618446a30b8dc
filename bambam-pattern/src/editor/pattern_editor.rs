use futures::future::join_all;
use geo::{Coord, LineString};
use itertools::Itertools;

use super::{editor_ops, EditError, PatternPersistence, StopRepository};
use crate::algorithm::{recalculate_ops, ShapeEdit};
use crate::config::EditSettings;
use crate::geometry::geometry_ops;
use crate::model::{ControlPoint, Pattern, PatternGeometry, PatternStop, StopEntity};
use crate::routing::{routing_ops, RouteGraph, RouteOptions, StreetRouter};

/// pattern edit orchestrator. combines stop creation, shape recalculation and persistence
/// into the edit operations offered to a pattern editor.
///
/// edits take the pattern by `&mut` and must be awaited one at a time per pattern. the shape
/// is only replaced once every routing call of an edit has resolved, and each completed edit
/// ends with one call to the persistence collaborator.
pub struct PatternEditor<R, S, P> {
    router: R,
    stops: S,
    persistence: P,
}

/// a place for a new stop near a routed intersection, measured along the extension.
#[derive(Clone, Copy, Debug)]
struct IntersectionCandidate {
    offset: f64,
    location: Coord<f64>,
}

impl<R, S, P> PatternEditor<R, S, P>
where
    R: StreetRouter,
    S: StopRepository,
    P: PatternPersistence,
{
    pub fn new(router: R, stops: S, persistence: P) -> PatternEditor<R, S, P> {
        PatternEditor {
            router,
            stops,
            persistence,
        }
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    pub fn stop_repository(&self) -> &S {
        &self.stops
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    /// creates a stop at `location`. with `add_to_pattern` the stop is also added to the
    /// pattern at stop position `index` (appended when `None`), see [Self::add_stop_to_pattern].
    pub async fn add_stop_at_point(
        &self,
        pattern: &mut Pattern,
        location: Coord<f64>,
        add_to_pattern: bool,
        index: Option<usize>,
        settings: &EditSettings,
    ) -> Result<StopEntity, EditError> {
        let stop = self.stops.create_stop(location).await?;
        log::info!(
            "created stop {} at ({}, {})",
            stop.stop_id,
            stop.stop_lon,
            stop.stop_lat
        );
        if add_to_pattern {
            self.add_stop_to_pattern(pattern, &stop, index, settings)
                .await?;
        }
        Ok(stop)
    }

    /// adds an existing stop to the pattern at stop position `index`, or appends it.
    ///
    /// appending extends the shape to the stop. on a pattern without a shape the first stop
    /// only receives a control point, and the second stop bootstraps the shape from the
    /// previous stop. inserting at the front or in the middle re-derives the segments around
    /// the new stop control point; when that fails the stop list change is kept and
    /// persisted while the shape stays as it was.
    pub async fn add_stop_to_pattern(
        &self,
        pattern: &mut Pattern,
        stop: &StopEntity,
        index: Option<usize>,
        settings: &EditSettings,
    ) -> Result<(), EditError> {
        let count = pattern.pattern_stops().len();
        let index = index.unwrap_or(count);
        if index > count {
            return Err(EditError::StopIndexOutOfRange { index, count });
        }
        let options = RouteOptions::from(settings);
        let mut pattern_stops = pattern.pattern_stops().to_vec();
        pattern_stops.insert(index, PatternStop::from(stop));

        if index == count {
            let geometry = self.append_stop(pattern, stop, settings).await?;
            pattern.apply_edit(pattern_stops, geometry)?;
        } else {
            let recalculated = if index == 0 {
                self.prepend_stop(pattern, stop, &options).await.map(Some)
            } else {
                self.insert_stop_between(pattern, stop, index, &options)
                    .await
            };
            match recalculated {
                Ok(Some(geometry)) => pattern.apply_edit(pattern_stops, geometry)?,
                Ok(None) => pattern.set_pattern_stops(pattern_stops),
                Err(e) => {
                    log::error!(
                        "failure adding stop {} to pattern {} at position {index}, keeping the stop list change: {e}",
                        stop.stop_id,
                        pattern.pattern_id
                    );
                    pattern.set_pattern_stops(pattern_stops);
                    self.persistence.save(pattern).await?;
                    return Err(e);
                }
            }
        }
        log::info!(
            "added stop {} to pattern {} at position {index}",
            stop.stop_id,
            pattern.pattern_id
        );
        self.persistence.save(pattern).await
    }

    /// extends the shape with stops placed near the intersections of a street route from
    /// the pattern end toward `location`.
    ///
    /// every `intersection_step`th routed edge is considered. its end vertex qualifies when
    /// more than two streets meet there, and the stop is placed `distance_from_intersection`
    /// after it (or before it, when `after_intersection` is off). edges whose vertex is
    /// missing from the routing response are skipped.
    pub async fn add_stops_at_intersections(
        &self,
        pattern: &mut Pattern,
        location: Coord<f64>,
        settings: &EditSettings,
    ) -> Result<Vec<StopEntity>, EditError> {
        let end_point = pattern
            .end_point()
            .ok_or_else(|| EditError::EmptyPattern(pattern.pattern_id.clone()))?;
        let options = RouteOptions::from(settings);
        let routed =
            routing_ops::try_route(&self.router, end_point, location, false, &options).await?;
        let (extension, candidates) = match routed {
            Some(graph) => {
                let line = graph.to_line_string()?;
                let last = match graph.features.last() {
                    Some(feature) => feature.last_coord()?,
                    None => location,
                };
                let trimmed = geometry_ops::slice_between(end_point, last, &line)?;
                let candidates = intersection_candidates(&graph, &trimmed, settings)?;
                (trimmed, candidates)
            }
            None => {
                log::info!(
                    "extending pattern {} without a street graph, no intersection stops are created",
                    pattern.pattern_id
                );
                (geometry_ops::straight_line(end_point, location), vec![])
            }
        };

        let initial_distance = pattern.total_distance();
        let end_distance = initial_distance + geometry_ops::distance_along(&extension);
        let end = extension.0.last().copied().unwrap_or(location);
        let mut geometry = editor_ops::append_segment(
            pattern.geometry(),
            extension,
            ControlPoint::new_anchor(end, end_distance),
        )?;

        let locations = candidates.iter().map(|c| c.location).collect_vec();
        let created = self.create_stops(&locations).await?;
        let mut pattern_stops = pattern.pattern_stops().to_vec();
        for (candidate, stop) in candidates.iter().zip(created.iter()) {
            geometry =
                editor_ops::pin_stop(&geometry, initial_distance + candidate.offset, &stop.stop_id)?;
            pattern_stops.push(PatternStop::from(stop));
        }
        pattern.apply_edit(pattern_stops, geometry)?;
        log::info!(
            "added {} intersection stop(s) to pattern {}",
            created.len(),
            pattern.pattern_id
        );
        self.persistence.save(pattern).await?;
        Ok(created)
    }

    /// extends the shape toward `location` and places a stop every `split_interval` meters
    /// along the extension. a pattern without stops instead receives a single stop at
    /// `location`.
    pub async fn add_stops_at_interval(
        &self,
        pattern: &mut Pattern,
        location: Coord<f64>,
        settings: &EditSettings,
    ) -> Result<Vec<StopEntity>, EditError> {
        if pattern.pattern_stops().is_empty() {
            let stop = self
                .add_stop_at_point(pattern, location, true, Some(0), settings)
                .await?;
            return Ok(vec![stop]);
        }
        let first_new = pattern.control_points().len();
        let mut geometry = self
            .extend_pattern_to_point(
                pattern,
                location,
                None,
                Some(settings.split_interval_meters()),
                settings,
            )
            .await?;
        let locations = geometry
            .control_points
            .iter()
            .skip(first_new)
            .map(|cp| cp.point())
            .collect_vec();
        let created = self.create_stops(&locations).await?;

        let mut pattern_stops = pattern.pattern_stops().to_vec();
        for (offset, stop) in created.iter().enumerate() {
            let index = first_new + offset;
            let converted = geometry
                .control_points
                .try_get(index)?
                .with_stop(&stop.stop_id);
            geometry.control_points.replace(index, converted)?;
            pattern_stops.push(PatternStop::from(stop));
        }
        pattern.apply_edit(pattern_stops, geometry)?;
        log::info!(
            "added {} interval stop(s) to pattern {}",
            created.len(),
            pattern.pattern_id
        );
        self.persistence.save(pattern).await?;
        Ok(created)
    }

    /// removes the stop at stop position `index` along with its control point, merging the
    /// segments around it.
    ///
    /// the stop list change is kept and persisted even when the shape cannot be recalculated;
    /// the error is still returned and the shape stays as it was.
    pub async fn remove_stop_from_pattern(
        &self,
        pattern: &mut Pattern,
        index: usize,
        settings: &EditSettings,
    ) -> Result<(), EditError> {
        let count = pattern.pattern_stops().len();
        if index >= count {
            return Err(EditError::StopIndexOutOfRange { index, count });
        }
        let mut pattern_stops = pattern.pattern_stops().to_vec();
        let removed = pattern_stops.remove(index);
        let options = RouteOptions::from(settings);

        let recalculated = match pattern.control_points().index_of_stop(index) {
            Some(cp_index) => {
                log::debug!(
                    "removing control point {cp_index} for stop {} of pattern {}",
                    removed.stop_id,
                    pattern.pattern_id
                );
                let edit = ShapeEdit::Delete { index: cp_index };
                recalculate_ops::recalculate_shape(
                    &self.router,
                    pattern.geometry(),
                    &edit,
                    &options,
                )
                .await
                .map(Some)
                .map_err(EditError::from)
            }
            None => {
                log::warn!(
                    "stop {} of pattern {} has no control point, only the stop list is updated",
                    removed.stop_id,
                    pattern.pattern_id
                );
                Ok(None)
            }
        };
        match recalculated {
            Ok(Some(geometry)) => pattern.apply_edit(pattern_stops, geometry)?,
            Ok(None) => pattern.set_pattern_stops(pattern_stops),
            Err(e) => {
                log::error!(
                    "failure recalculating shape of pattern {} after removing stop {}, keeping the stop list change: {e}",
                    pattern.pattern_id,
                    removed.stop_id
                );
                pattern.set_pattern_stops(pattern_stops);
                self.persistence.save(pattern).await?;
                return Err(e);
            }
        }
        log::info!(
            "removed stop {} from pattern {}",
            removed.stop_id,
            pattern.pattern_id
        );
        self.persistence.save(pattern).await
    }

    /// the pattern geometry extended from its end point toward `destination`. the pattern
    /// itself is not modified.
    ///
    /// with a `stop`, the extension ends at a STOP control point placed on the last routed
    /// coordinate. with a `split_interval`, the extension is cut into whole pieces of that
    /// many meters, each ending at an ANCHOR control point, and the remainder is dropped.
    /// otherwise the extension ends at an ANCHOR control point. `stop` and `split_interval`
    /// cannot be combined.
    pub async fn extend_pattern_to_point(
        &self,
        pattern: &Pattern,
        destination: Coord<f64>,
        stop: Option<&StopEntity>,
        split_interval: Option<f64>,
        settings: &EditSettings,
    ) -> Result<PatternGeometry, EditError> {
        if stop.is_some() && split_interval.is_some() {
            return Err(EditError::InvalidArgumentCombination(String::from(
                "a target stop cannot be combined with a split interval",
            )));
        }
        let end_point = pattern
            .end_point()
            .ok_or_else(|| EditError::EmptyPattern(pattern.pattern_id.clone()))?;
        let options = RouteOptions::from(settings);
        let line = routing_ops::route_segment(&self.router, end_point, destination, &options).await?;
        let initial_distance = pattern.total_distance();
        let end = line.0.last().copied().unwrap_or(destination);

        let geometry = match (stop, split_interval) {
            (Some(stop), _) => {
                let distance = initial_distance + geometry_ops::distance_along(&line);
                let control_point = ControlPoint::new_stop(end, distance, &stop.stop_id);
                editor_ops::append_segment(pattern.geometry(), line, control_point)?
            }
            (None, Some(interval)) => {
                let pieces = editor_ops::split_at_interval(&line, interval)?;
                log::debug!(
                    "split {:.1}m extension of pattern {} into {} piece(s) of {interval}m",
                    geometry_ops::distance_along(&line),
                    pattern.pattern_id,
                    pieces.len()
                );
                let mut geometry = pattern.geometry().clone();
                for (i, piece) in pieces.into_iter().enumerate() {
                    let distance = initial_distance + (i + 1) as f64 * interval;
                    let piece_end = piece.0.last().copied().unwrap_or(end);
                    let anchor = ControlPoint::new_anchor(piece_end, distance);
                    geometry = editor_ops::append_segment(&geometry, piece, anchor)?;
                }
                geometry
            }
            (None, None) => {
                let distance = initial_distance + geometry_ops::distance_along(&line);
                let anchor = ControlPoint::new_anchor(end, distance);
                editor_ops::append_segment(pattern.geometry(), line, anchor)?
            }
        };
        Ok(geometry)
    }

    /// geometry for a stop appended to the end of the pattern.
    async fn append_stop(
        &self,
        pattern: &Pattern,
        stop: &StopEntity,
        settings: &EditSettings,
    ) -> Result<PatternGeometry, EditError> {
        if pattern.has_shape() {
            return self
                .extend_pattern_to_point(pattern, stop.coord(), Some(stop), None, settings)
                .await;
        }
        let last = match pattern.control_points().last() {
            Some(last) => last.point(),
            None => {
                let mut geometry = pattern.geometry().clone();
                geometry
                    .control_points
                    .push(ControlPoint::new_stop(stop.coord(), 0.0, &stop.stop_id));
                return Ok(geometry);
            }
        };

        let options = RouteOptions::from(settings);
        let origin = match pattern.pattern_stops().last() {
            Some(previous) if options.follow_streets => self
                .stops
                .find_stop(&previous.stop_id)
                .ok_or_else(|| EditError::StopNotFound(previous.stop_id.clone()))?
                .coord(),
            _ => last,
        };
        let line: LineString<f64> =
            routing_ops::route_line(&self.router, origin, stop.coord(), true, &options).await?;
        let end = line.0.last().copied().unwrap_or(stop.coord());
        log::debug!(
            "created initial shape for pattern {} with {} coordinate(s)",
            pattern.pattern_id,
            line.0.len()
        );
        let control_point = ControlPoint::new_stop(end, 0.0, &stop.stop_id);
        Ok(editor_ops::append_segment(
            pattern.geometry(),
            line,
            control_point,
        )?)
    }

    /// geometry for a stop inserted in front of the first stop.
    async fn prepend_stop(
        &self,
        pattern: &Pattern,
        stop: &StopEntity,
        options: &RouteOptions,
    ) -> Result<PatternGeometry, EditError> {
        let edit = ShapeEdit::Insert {
            index: 0,
            control_point: ControlPoint::new_stop(stop.coord(), 0.0, &stop.stop_id),
        };
        let geometry =
            recalculate_ops::recalculate_shape(&self.router, pattern.geometry(), &edit, options)
                .await?;
        Ok(geometry)
    }

    /// geometry for a stop inserted before the stop at position `index`, or None when the
    /// pattern has no shape to update.
    async fn insert_stop_between(
        &self,
        pattern: &Pattern,
        stop: &StopEntity,
        index: usize,
        options: &RouteOptions,
    ) -> Result<Option<PatternGeometry>, EditError> {
        let shape = match pattern.shape() {
            Some(shape) if shape.0.len() > 1 => shape,
            _ => return Ok(None),
        };
        let control_points = pattern.control_points();
        let stop_control_points = (
            control_points.index_of_stop(index - 1),
            control_points.index_of_stop(index),
        );
        let (prev, next) = match stop_control_points {
            (Some(prev), Some(next)) => (prev, next),
            _ => {
                return Err(EditError::StopIndexOutOfRange {
                    index,
                    count: control_points.find_stop_control_points().len(),
                })
            }
        };
        let projection = geometry_ops::project_onto_line(stop.coord(), &shape)?;
        let splice_at = editor_ops::splice_index(
            control_points,
            projection.distance_in_meters,
            prev,
            next,
        );
        let control_point = ControlPoint::new_stop(
            projection.insert_point,
            projection.distance_in_meters,
            &stop.stop_id,
        );
        let placeholder =
            editor_ops::insert_placeholder(pattern.geometry(), splice_at, control_point)?;
        let edit = ShapeEdit::Update {
            index: splice_at,
            point: stop.coord(),
            snap_to_route: true,
        };
        let geometry =
            recalculate_ops::recalculate_shape(&self.router, &placeholder, &edit, options).await?;
        Ok(Some(geometry))
    }

    /// creates one stop per location concurrently, returning them in location order once all
    /// have been created.
    async fn create_stops(&self, locations: &[Coord<f64>]) -> Result<Vec<StopEntity>, EditError> {
        let results = join_all(
            locations
                .iter()
                .map(|location| self.stops.create_stop(*location)),
        )
        .await;
        results.into_iter().collect()
    }
}

/// candidate stop locations along `extension` for every `intersection_step`th qualifying
/// intersection in `graph`,
/// ordered by distance along the extension.
fn intersection_candidates(
    graph: &RouteGraph,
    extension: &LineString<f64>,
    settings: &EditSettings,
) -> Result<Vec<IntersectionCandidate>, EditError> {
    let step = settings.intersection_step.max(1);
    let length = geometry_ops::distance_along(extension);
    let offset_from_intersection = settings.distance_from_intersection_meters();
    let qualifying = graph
        .features
        .iter()
        .enumerate()
        .filter(|(index, feature)| {
            let vertex_index = match feature.properties.to_vertex {
                Some(v) => v,
                None => {
                    log::debug!("skipping route edge {index} with no end vertex");
                    return false;
                }
            };
            match graph.vertex(vertex_index) {
                Some(vertex) => vertex.incident_streets.len() > 2,
                None => {
                    log::debug!(
                        "skipping route edge {index}: {}",
                        EditError::MissingVertex(vertex_index)
                    );
                    false
                }
            }
        })
        .map(|(_, feature)| feature)
        .collect_vec();
    let mut candidates = vec![];
    // every step-th intersection, counting only the ones that qualify
    for feature in qualifying.into_iter().step_by(step) {
        let intersection = feature.last_coord()?;
        let at = geometry_ops::project_onto_line(intersection, extension)?.distance_in_meters;
        let offset = if settings.after_intersection {
            at + offset_from_intersection
        } else {
            at - offset_from_intersection
        }
        .clamp(0.0, length);
        let location = geometry_ops::point_at_distance(extension, offset)?;
        candidates.push(IntersectionCandidate { offset, location });
    }
    candidates.sort_by(|a, b| a.offset.total_cmp(&b.offset));
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::InMemoryStopTable;
    use crate::model::{ControlPointStore, PointType, SegmentStore};
    use crate::routing::{
        RouteFeature, RouteFeatureProperties, RouteVertex, StraightLineRouter,
    };
    use crate::test_support::{FailingRouter, RecordingPersistence, ScriptedRouter, SnappingRouter};
    use futures::executor::block_on;
    use geo::coord;
    use uom::si::f64::Length;
    use uom::si::length::meter;

    type TestEditor<R> = PatternEditor<R, InMemoryStopTable, RecordingPersistence>;

    const A: Coord<f64> = Coord { x: -122.41, y: 37.77 };
    const B: Coord<f64> = Coord { x: -122.41, y: 37.78 };
    const C: Coord<f64> = Coord { x: -122.40, y: 37.78 };
    const ORIGIN: Coord<f64> = Coord { x: 0.0, y: 0.0 };
    const METERS_PER_DEGREE: f64 = 111_195.08;

    fn editor<R: StreetRouter>(router: R) -> TestEditor<R> {
        PatternEditor::new(
            router,
            InMemoryStopTable::default(),
            RecordingPersistence::default(),
        )
    }

    fn straight() -> EditSettings {
        EditSettings {
            follow_streets: false,
            ..Default::default()
        }
    }

    fn streets() -> EditSettings {
        EditSettings {
            follow_streets: true,
            default_to_straight_line: false,
            ..Default::default()
        }
    }

    fn build<R: StreetRouter>(editor: &TestEditor<R>, locations: &[Coord<f64>]) -> Pattern {
        let mut pattern = Pattern::new("p1");
        for location in locations {
            block_on(editor.add_stop_at_point(&mut pattern, *location, true, None, &straight()))
                .expect("stop added");
        }
        pattern
    }

    #[test]
    fn test_first_stop_has_no_shape() {
        let editor = editor(StraightLineRouter);
        let mut pattern = Pattern::new("p1");
        let stop = block_on(editor.add_stop_at_point(&mut pattern, A, true, None, &straight()))
            .expect("stop added");
        assert_eq!(pattern.pattern_stops().len(), 1);
        assert_eq!(pattern.pattern_stops()[0].stop_id, stop.stop_id);
        assert!(pattern.segments().is_empty());
        assert!(pattern.shape().is_none());
        pattern.check_invariants().expect("invariants hold");
        assert_eq!(editor.persistence().saved().len(), 1);
    }

    #[test]
    fn test_stop_not_added_when_not_requested() {
        let editor = editor(StraightLineRouter);
        let mut pattern = Pattern::new("p1");
        let stop = block_on(editor.add_stop_at_point(&mut pattern, A, false, None, &straight()))
            .expect("stop created");
        assert!(pattern.pattern_stops().is_empty());
        assert_eq!(editor.stop_repository().find_stop(&stop.stop_id), Some(stop));
        assert!(editor.persistence().saved().is_empty());
    }

    #[test]
    fn test_second_stop_draws_straight_segment() {
        let editor = editor(FailingRouter::default());
        let pattern = build(&editor, &[A, B]);
        pattern.check_invariants().expect("invariants hold");
        assert_eq!(pattern.pattern_stops().len(), 2);
        assert_eq!(pattern.segments().len(), 1);
        assert_eq!(pattern.segments().get(0).map(|l| l.0.clone()), Some(vec![A, B]));
        let distance = pattern.pattern_stops()[1]
            .shape_dist_traveled
            .expect("stop is on the shape");
        assert!((distance - geometry_ops::coord_distance(A, B)).abs() < 1e-6);
        assert_eq!(editor.router().calls(), 0);
    }

    #[test]
    fn test_second_stop_bootstraps_routed_shape() {
        let editor = editor(SnappingRouter::default());
        let mut pattern = build(&editor, &[A]);
        block_on(editor.add_stop_at_point(&mut pattern, B, true, None, &streets()))
            .expect("stop added");
        assert_eq!(editor.router().alternatives(), vec![true]);
        assert_eq!(pattern.segments().get(0).map(|l| l.0.len()), Some(3));
        assert_eq!(
            pattern.control_points().last().map(|cp| cp.point()),
            Some(editor.router().snap(B))
        );

        block_on(editor.add_stop_at_point(&mut pattern, C, true, None, &streets()))
            .expect("stop added");
        assert_eq!(editor.router().alternatives(), vec![true, false]);
        assert_eq!(pattern.segments().len(), 2);
        pattern.check_invariants().expect("invariants hold");
    }

    #[test]
    fn test_bootstrap_requires_previous_stop() {
        let editor = editor(SnappingRouter::default());
        let mut pattern = Pattern::new("p1");
        pattern
            .apply_edit(
                vec![PatternStop {
                    stop_id: String::from("ghost"),
                    shape_dist_traveled: None,
                }],
                PatternGeometry::new(
                    ControlPointStore::from(vec![ControlPoint::new_stop(A, 0.0, "ghost")]),
                    SegmentStore::default(),
                ),
            )
            .expect("consistent pattern");
        let before = pattern.clone();
        let result = block_on(editor.add_stop_at_point(&mut pattern, B, true, None, &streets()));
        assert_eq!(result, Err(EditError::StopNotFound(String::from("ghost"))));
        assert_eq!(pattern, before);
        assert_eq!(editor.router().calls(), 0);
    }

    #[test]
    fn test_append_extends_shape_to_stop() {
        let editor = editor(StraightLineRouter);
        let pattern = build(&editor, &[A, B, C]);
        pattern.check_invariants().expect("invariants hold");
        assert_eq!(pattern.segments().len(), 2);
        assert_eq!(
            pattern.shape().map(|line| line.0),
            Some(vec![A, B, C])
        );
        let saved = editor.persistence().saved();
        assert_eq!(saved.len(), 3);
        let persisted = serde_json::to_value(saved.last().expect("saved")).expect("serializable");
        let shape: LineString<f64> = serde_json::from_value::<geojson::Geometry>(
            persisted["shape"].clone(),
        )
        .ok()
        .and_then(|geometry| LineString::try_from(geometry.value).ok())
        .expect("persisted shape is a line string");
        assert_eq!(shape, pattern.segments().concatenate_all());
    }

    #[test]
    fn test_prepend_stop() {
        let editor = editor(StraightLineRouter);
        let mut pattern = build(&editor, &[A, B]);
        let before_a = coord! { x: -122.42, y: 37.77 };
        let stop = block_on(editor.add_stop_at_point(&mut pattern, before_a, true, Some(0), &straight()))
            .expect("stop added");
        pattern.check_invariants().expect("invariants hold");
        assert_eq!(pattern.pattern_stops()[0].stop_id, stop.stop_id);
        assert_eq!(pattern.segments().len(), 2);
        assert_eq!(pattern.segments().get(0).map(|l| l.0.clone()), Some(vec![before_a, A]));
        let a_distance = pattern.pattern_stops()[1]
            .shape_dist_traveled
            .expect("stop is on the shape");
        assert!((a_distance - geometry_ops::coord_distance(before_a, A)).abs() < 1e-6);
    }

    #[test]
    fn test_insert_in_middle_snaps_to_route() {
        let editor = editor(SnappingRouter::default());
        let mut pattern = build(&editor, &[A, C]);
        let mid = coord! { x: -122.405, y: 37.7751 };
        let stop = block_on(editor.add_stop_at_point(&mut pattern, mid, true, Some(1), &streets()))
            .expect("stop added");
        pattern.check_invariants().expect("invariants hold");
        assert_eq!(editor.router().alternatives(), vec![false, false]);
        let ids = pattern
            .pattern_stops()
            .iter()
            .map(|ps| ps.stop_id.clone())
            .collect_vec();
        assert_eq!(ids[1], stop.stop_id);
        let control_point = pattern
            .control_points()
            .index_of_stop(1)
            .and_then(|i| pattern.control_points().get(i))
            .expect("stop control point");
        assert_eq!(control_point.point(), editor.router().snap(mid));
    }

    #[test]
    fn test_remove_middle_stop_merges_segments() {
        let editor = editor(StraightLineRouter);
        let mut pattern = build(&editor, &[A, B, C]);
        let ids = pattern
            .pattern_stops()
            .iter()
            .map(|ps| ps.stop_id.clone())
            .collect_vec();
        block_on(editor.remove_stop_from_pattern(&mut pattern, 1, &straight())).expect("removed");
        pattern.check_invariants().expect("invariants hold");
        let remaining = pattern
            .pattern_stops()
            .iter()
            .map(|ps| ps.stop_id.clone())
            .collect_vec();
        assert_eq!(remaining, vec![ids[0].clone(), ids[2].clone()]);
        assert_eq!(pattern.control_points().len(), 2);
        assert_eq!(pattern.segments().len(), 1);
        assert_eq!(pattern.segments().get(0).map(|l| l.0.clone()), Some(vec![A, C]));
    }

    #[test]
    fn test_remove_all_stops_empties_pattern() {
        let editor = editor(StraightLineRouter);
        let mut pattern = build(&editor, &[A, B]);
        block_on(editor.remove_stop_from_pattern(&mut pattern, 1, &straight())).expect("removed");
        assert!(pattern.shape().is_none());
        block_on(editor.remove_stop_from_pattern(&mut pattern, 0, &straight())).expect("removed");
        assert!(pattern.control_points().is_empty());
        assert!(pattern.pattern_stops().is_empty());
        pattern.check_invariants().expect("invariants hold");
        let result = block_on(editor.remove_stop_from_pattern(&mut pattern, 0, &straight()));
        assert_eq!(
            result,
            Err(EditError::StopIndexOutOfRange { index: 0, count: 0 })
        );
    }

    #[test]
    fn test_insert_routing_failure_leaves_shape_unchanged() {
        let builder = editor(StraightLineRouter);
        let mut pattern = build(&builder, &[A, B, C]);
        let before = pattern.clone();
        let failing = PatternEditor::new(
            FailingRouter::default(),
            InMemoryStopTable::from(builder.stop_repository().stops()),
            RecordingPersistence::default(),
        );
        let mid = coord! { x: -122.4105, y: 37.775 };
        let error = block_on(failing.add_stop_at_point(&mut pattern, mid, true, Some(1), &streets()))
            .expect_err("routing fails");
        assert!(matches!(error, EditError::RoutingFailure { .. }));
        assert!(error.user_message().contains("street route"));
        assert_eq!(pattern.geometry(), before.geometry());
        assert_eq!(pattern.pattern_stops().len(), 4);

        let error = block_on(failing.add_stop_at_point(&mut pattern, mid, true, None, &streets()))
            .expect_err("routing fails");
        assert!(matches!(error, EditError::RoutingFailure { .. }));
        assert_eq!(pattern.geometry(), before.geometry());
        assert_eq!(pattern.pattern_stops().len(), 4);
    }

    #[test]
    fn test_remove_routing_failure_keeps_stop_list_change() {
        let editor = editor(FailingRouter::default());
        let mut pattern = build(&editor, &[A, B, C]);
        let before = pattern.clone();
        let result = block_on(editor.remove_stop_from_pattern(&mut pattern, 1, &streets()));
        assert!(matches!(result, Err(EditError::RoutingFailure { .. })));
        assert_eq!(pattern.geometry(), before.geometry());
        assert_eq!(pattern.pattern_stops().len(), 2);
        let saved = editor.persistence().saved();
        assert_eq!(saved.len(), 4);
        assert_eq!(saved.last().map(|p| p.pattern_stops().len()), Some(2));
    }

    #[test]
    fn test_routing_failure_falls_back_to_straight_line() {
        let editor = editor(FailingRouter::default());
        let mut pattern = build(&editor, &[A, B, C]);
        let settings = EditSettings {
            follow_streets: true,
            default_to_straight_line: true,
            ..Default::default()
        };
        block_on(editor.remove_stop_from_pattern(&mut pattern, 1, &settings)).expect("removed");
        assert_eq!(pattern.segments().get(0).map(|l| l.0.clone()), Some(vec![A, C]));
        assert_eq!(editor.router().calls(), 1);
    }

    #[test]
    fn test_insert_then_remove_restores_distance() {
        let editor = editor(StraightLineRouter);
        let mut pattern = build(&editor, &[A, C]);
        let original = pattern.total_distance();
        block_on(editor.add_stop_at_point(&mut pattern, B, true, Some(1), &straight()))
            .expect("stop added");
        assert!(pattern.total_distance() > original + 1.0);
        block_on(editor.remove_stop_from_pattern(&mut pattern, 1, &straight())).expect("removed");
        assert!((pattern.total_distance() - original).abs() < 1.0);
        pattern.check_invariants().expect("invariants hold");
    }

    #[test]
    fn test_extend_rejects_stop_with_split_interval() {
        let editor = editor(FailingRouter::default());
        let pattern = build(&editor, &[A, B]);
        let stop = StopEntity::new(String::from("s"), C);
        let result = block_on(editor.extend_pattern_to_point(
            &pattern,
            C,
            Some(&stop),
            Some(500.0),
            &streets(),
        ));
        assert!(matches!(
            result,
            Err(EditError::InvalidArgumentCombination(_))
        ));
        assert_eq!(editor.router().calls(), 0);

        let empty = block_on(editor.extend_pattern_to_point(
            &Pattern::new("p2"),
            C,
            None,
            None,
            &streets(),
        ));
        assert_eq!(empty, Err(EditError::EmptyPattern(String::from("p2"))));
    }

    #[test]
    fn test_extend_at_interval_creates_anchors() {
        let editor = editor(StraightLineRouter);
        let pattern = build(&editor, &[ORIGIN]);
        let destination = coord! { x: 0.0, y: 1200.0 / METERS_PER_DEGREE };
        let geometry = block_on(editor.extend_pattern_to_point(
            &pattern,
            destination,
            None,
            Some(500.0),
            &straight(),
        ))
        .expect("extended");
        let anchors = geometry
            .control_points
            .iter()
            .filter(|cp| cp.point_type() == PointType::Anchor)
            .collect_vec();
        assert_eq!(anchors.len(), 2);
        assert!((anchors[0].distance() - 500.0).abs() < 0.01);
        assert!((anchors[1].distance() - 1000.0).abs() < 0.01);
        assert!(geometry.check_segment_count().is_ok());
        // the pattern is untouched until the caller commits the geometry
        assert!(pattern.segments().is_empty());
    }

    #[test]
    fn test_add_stops_at_interval() {
        let editor = editor(StraightLineRouter);
        let mut pattern = build(&editor, &[ORIGIN]);
        let settings = EditSettings {
            follow_streets: false,
            split_interval: Length::new::<meter>(500.0),
            ..Default::default()
        };
        let destination = coord! { x: 0.0, y: 1200.0 / METERS_PER_DEGREE };
        let created = block_on(editor.add_stops_at_interval(&mut pattern, destination, &settings))
            .expect("stops added");
        assert_eq!(created.len(), 2);
        pattern.check_invariants().expect("invariants hold");
        assert_eq!(pattern.pattern_stops().len(), 3);
        assert_eq!(pattern.segments().len(), 2);
        let distances = pattern
            .pattern_stops()
            .iter()
            .map(|ps| ps.shape_dist_traveled.unwrap_or(f64::NAN))
            .collect_vec();
        assert_eq!(distances[0], 0.0);
        assert!((distances[1] - 500.0).abs() < 0.01);
        assert!((distances[2] - 1000.0).abs() < 0.01);
        assert!((created[1].stop_lat - 1000.0 / METERS_PER_DEGREE).abs() < 1e-6);
    }

    #[test]
    fn test_add_stops_at_interval_along_routed_extension() {
        let editor = editor(SnappingRouter::default());
        let mut pattern = build(&editor, &[ORIGIN]);
        let settings = EditSettings {
            split_interval: Length::new::<meter>(500.0),
            ..streets()
        };
        let destination = coord! { x: 0.0, y: 1200.0 / METERS_PER_DEGREE };
        let created = block_on(editor.add_stops_at_interval(&mut pattern, destination, &settings))
            .expect("stops added");
        assert_eq!(editor.router().calls(), 1);
        assert_eq!(created.len(), 2);
        pattern.check_invariants().expect("invariants hold");
        assert_eq!(pattern.segments().len(), 2);
        assert!(pattern
            .control_points()
            .iter()
            .all(|cp| cp.point_type() == PointType::Stop));
        let distances = pattern
            .pattern_stops()
            .iter()
            .map(|ps| ps.shape_dist_traveled.unwrap_or(f64::NAN))
            .collect_vec();
        assert!((distances[1] - 500.0).abs() < 0.1);
        assert!((distances[2] - 1000.0).abs() < 0.1);
        // the second piece follows the routed bend through the leg midpoint
        let bend = coord! {
            x: SnappingRouter::OFFSET,
            y: 600.0 / METERS_PER_DEGREE,
        };
        let second = pattern.segments().get(1).expect("second segment");
        assert!(second.0.len() > 2);
        assert!(second.0.contains(&bend));
        assert!((created[1].stop_lon - SnappingRouter::OFFSET).abs() < 1e-9);
    }

    #[test]
    fn test_add_stops_at_interval_starts_empty_pattern() {
        let editor = editor(StraightLineRouter);
        let mut pattern = Pattern::new("p1");
        let created = block_on(editor.add_stops_at_interval(&mut pattern, A, &straight()))
            .expect("stop added");
        assert_eq!(created.len(), 1);
        assert_eq!(pattern.pattern_stops().len(), 1);
        assert!(pattern.shape().is_none());
    }

    fn intersection_graph() -> RouteGraph {
        let leg = |from: f64, to: f64, to_vertex: usize| RouteFeature {
            geometry: geojson::Geometry::new(geojson::Value::LineString(vec![
                vec![0.0, from],
                vec![0.0, to],
            ])),
            properties: RouteFeatureProperties {
                from_vertex: None,
                to_vertex: Some(to_vertex),
            },
        };
        let vertex = |index: usize, streets: &[&str]| RouteVertex {
            index,
            incident_streets: streets.iter().map(|s| s.to_string()).collect(),
        };
        RouteGraph {
            features: vec![
                leg(0.0, 0.001, 1),
                leg(0.001, 0.002, 2),
                leg(0.002, 0.003, 3),
                leg(0.003, 0.004, 9),
            ],
            vertices: vec![
                vertex(1, &["Main St", "1st Ave", "Main St"]),
                vertex(2, &["Main St", "2nd Ave", "Main St", "2nd Ave"]),
                vertex(3, &["Main St", "Main St"]),
            ],
        }
    }

    #[test]
    fn test_add_stops_at_intersections_far_side() {
        let editor = editor(ScriptedRouter::new(intersection_graph()));
        let mut pattern = build(&editor, &[ORIGIN]);
        let settings = EditSettings {
            follow_streets: true,
            intersection_step: 1,
            distance_from_intersection: Length::new::<meter>(5.0),
            after_intersection: true,
            ..Default::default()
        };
        let created = block_on(editor.add_stops_at_intersections(
            &mut pattern,
            coord! { x: 0.0, y: 0.004 },
            &settings,
        ))
        .expect("stops added");
        assert_eq!(created.len(), 2);
        assert_eq!(editor.router().calls(), 1);
        pattern.check_invariants().expect("invariants hold");
        assert_eq!(pattern.segments().len(), 3);
        assert_eq!(
            pattern.control_points().last().map(|cp| cp.point_type()),
            Some(PointType::Anchor)
        );
        let distances = pattern
            .pattern_stops()
            .iter()
            .map(|ps| ps.shape_dist_traveled.unwrap_or(f64::NAN))
            .collect_vec();
        let one = 0.001 * METERS_PER_DEGREE;
        assert!((distances[1] - (one + 5.0)).abs() < 0.01);
        assert!((distances[2] - (2.0 * one + 5.0)).abs() < 0.01);
        assert!((pattern.total_distance() - 4.0 * one).abs() < 0.01);
    }

    #[test]
    fn test_add_stops_at_intersections_near_side_with_step() {
        let editor = editor(ScriptedRouter::new(intersection_graph()));
        let mut pattern = build(&editor, &[ORIGIN]);
        let settings = EditSettings {
            follow_streets: true,
            intersection_step: 2,
            distance_from_intersection: Length::new::<meter>(5.0),
            after_intersection: false,
            ..Default::default()
        };
        let created = block_on(editor.add_stops_at_intersections(
            &mut pattern,
            coord! { x: 0.0, y: 0.004 },
            &settings,
        ))
        .expect("stops added");
        assert_eq!(created.len(), 1);
        pattern.check_invariants().expect("invariants hold");
        let distance = pattern.pattern_stops()[1]
            .shape_dist_traveled
            .expect("stop is on the shape");
        assert!((distance - (0.001 * METERS_PER_DEGREE - 5.0)).abs() < 0.01);
    }

    #[test]
    fn test_intersection_step_counts_qualifying_vertices_only() {
        // edges 1 and 3 end at intersections, edges 0 and 2 end mid block
        let mut graph = intersection_graph();
        graph.features[3].properties.to_vertex = Some(4);
        graph.vertices = vec![
            RouteVertex {
                index: 1,
                incident_streets: vec![String::from("Main St"), String::from("Main St")],
            },
            RouteVertex {
                index: 2,
                incident_streets: vec![
                    String::from("Main St"),
                    String::from("2nd Ave"),
                    String::from("Main St"),
                ],
            },
            RouteVertex {
                index: 3,
                incident_streets: vec![String::from("Main St"), String::from("Main St")],
            },
            RouteVertex {
                index: 4,
                incident_streets: vec![
                    String::from("Main St"),
                    String::from("4th Ave"),
                    String::from("Main St"),
                ],
            },
        ];
        let editor = editor(ScriptedRouter::new(graph));
        let mut pattern = build(&editor, &[ORIGIN]);
        let settings = EditSettings {
            follow_streets: true,
            intersection_step: 2,
            distance_from_intersection: Length::new::<meter>(5.0),
            after_intersection: false,
            ..Default::default()
        };
        let created = block_on(editor.add_stops_at_intersections(
            &mut pattern,
            coord! { x: 0.0, y: 0.004 },
            &settings,
        ))
        .expect("stops added");
        assert_eq!(created.len(), 1);
        pattern.check_invariants().expect("invariants hold");
        let distance = pattern.pattern_stops()[1]
            .shape_dist_traveled
            .expect("stop is on the shape");
        assert!((distance - (0.002 * METERS_PER_DEGREE - 5.0)).abs() < 0.01);
    }

    #[test]
    fn test_add_stops_at_intersections_without_streets_only_extends() {
        let editor = editor(FailingRouter::default());
        let mut pattern = build(&editor, &[A]);
        let created = block_on(editor.add_stops_at_intersections(&mut pattern, B, &straight()))
            .expect("extended");
        assert!(created.is_empty());
        assert_eq!(pattern.segments().len(), 1);
        assert_eq!(pattern.control_points().len(), 2);
        pattern.check_invariants().expect("invariants hold");
        assert_eq!(editor.router().calls(), 0);
    }
}
