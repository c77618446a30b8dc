use geo::{Coord, LineString};

use super::{RouteGraph, RouteOptions, RoutingError, StreetRouter};
use crate::geometry::geometry_ops;

/// derives the polyline for one segment between two control points.
///
/// when `follow_streets` is off the segment is a straight line and the router is not called.
/// otherwise the router is asked for a route; a routing failure falls back to a straight line
/// only when `default_to_straight_line` is set, and is returned to the caller otherwise.
pub async fn route_segment<R>(
    router: &R,
    from: Coord<f64>,
    to: Coord<f64>,
    options: &RouteOptions,
) -> Result<LineString<f64>, RoutingError>
where
    R: StreetRouter + ?Sized,
{
    route_line(router, from, to, false, options).await
}

/// same as [route_segment] but lets the caller request alternative routes.
pub async fn route_line<R>(
    router: &R,
    from: Coord<f64>,
    to: Coord<f64>,
    alternatives: bool,
    options: &RouteOptions,
) -> Result<LineString<f64>, RoutingError>
where
    R: StreetRouter + ?Sized,
{
    match try_route(router, from, to, alternatives, options).await? {
        Some(graph) => graph.to_line_string(),
        None => Ok(geometry_ops::straight_line(from, to)),
    }
}

/// asks the router for the street graph between two points.
///
/// returns `None` when a straight line should be drawn instead, either because streets are
/// not followed or because routing failed and the straight line fallback is enabled.
pub async fn try_route<R>(
    router: &R,
    from: Coord<f64>,
    to: Coord<f64>,
    alternatives: bool,
    options: &RouteOptions,
) -> Result<Option<RouteGraph>, RoutingError>
where
    R: StreetRouter + ?Sized,
{
    if !options.follow_streets {
        return Ok(None);
    }
    let routed = router
        .route(&[from, to], alternatives, options.avoid_motorways)
        .await
        .and_then(|graph| graph.to_line_string().map(|_| graph));
    match routed {
        Ok(graph) => Ok(Some(graph)),
        Err(e) if options.default_to_straight_line => {
            log::warn!("routing failed, falling back to a straight line: {e}");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
