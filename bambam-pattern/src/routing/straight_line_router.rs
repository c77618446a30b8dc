use async_trait::async_trait;
use geo::{Coord, LineString};

use super::{RouteFeature, RouteGraph, RoutingError, StreetRouter};

/// offline router which connects the requested points with straight lines, one feature per
/// consecutive pair. the graph carries no vertices, so no location qualifies as an intersection.
#[derive(Clone, Copy, Debug, Default)]
pub struct StraightLineRouter;

#[async_trait]
impl StreetRouter for StraightLineRouter {
    async fn route(
        &self,
        points: &[Coord<f64>],
        _alternatives: bool,
        _avoid_motorways: bool,
    ) -> Result<RouteGraph, RoutingError> {
        if points.len() < 2 {
            return Err(RoutingError::TooFewPoints(points.len()));
        }
        let features = points
            .windows(2)
            .map(|pair| RouteFeature::new(&LineString::new(pair.to_vec()), None))
            .collect();
        Ok(RouteGraph {
            features,
            vertices: vec![],
        })
    }
}
