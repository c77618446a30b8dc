use async_trait::async_trait;
use geo::Coord;

use super::{RouteGraph, RoutingError};

/// street routing collaborator. given an ordered list of at least two coordinates, returns a
/// routed polyline graph or fails.
#[async_trait]
pub trait StreetRouter: Send + Sync {
    async fn route(
        &self,
        points: &[Coord<f64>],
        alternatives: bool,
        avoid_motorways: bool,
    ) -> Result<RouteGraph, RoutingError>;
}

#[async_trait]
impl<T> StreetRouter for Box<T>
where
    T: StreetRouter + ?Sized,
{
    async fn route(
        &self,
        points: &[Coord<f64>],
        alternatives: bool,
        avoid_motorways: bool,
    ) -> Result<RouteGraph, RoutingError> {
        (**self).route(points, alternatives, avoid_motorways).await
    }
}
