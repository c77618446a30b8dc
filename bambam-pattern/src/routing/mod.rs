mod http_street_router;
mod route_graph;
mod route_options;
mod routing_error;
pub mod routing_ops;
mod straight_line_router;
mod street_router;

pub use http_street_router::HttpStreetRouter;
pub use route_graph::{RouteFeature, RouteFeatureProperties, RouteGraph, RouteVertex};
pub use route_options::RouteOptions;
pub use routing_error::RoutingError;
pub use straight_line_router::StraightLineRouter;
pub use street_router::StreetRouter;
