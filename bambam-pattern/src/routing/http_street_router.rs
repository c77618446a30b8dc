use async_trait::async_trait;
use geo::Coord;
use serde::Serialize;

use super::{RouteGraph, RoutingError, StreetRouter};

/// routes over HTTP by POSTing the requested locations as JSON to a routing service which
/// answers with a [RouteGraph] document.
pub struct HttpStreetRouter {
    client: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RouteRequest {
    /// `[longitude, latitude]` pairs
    locations: Vec<[f64; 2]>,
    alternatives: bool,
    avoid_motorways: bool,
}

impl HttpStreetRouter {
    pub fn new(url: &str) -> HttpStreetRouter {
        HttpStreetRouter {
            client: reqwest::Client::new(),
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl StreetRouter for HttpStreetRouter {
    async fn route(
        &self,
        points: &[Coord<f64>],
        alternatives: bool,
        avoid_motorways: bool,
    ) -> Result<RouteGraph, RoutingError> {
        if points.len() < 2 {
            return Err(RoutingError::TooFewPoints(points.len()));
        }
        let request = RouteRequest {
            locations: points.iter().map(|c| [c.x, c.y]).collect(),
            alternatives,
            avoid_motorways,
        };
        log::debug!("requesting route through {} points from {}", points.len(), self.url);
        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RoutingError::RequestFailed(format!("POST {} failed: {e}", self.url)))?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RoutingError::ServiceError {
                status: status.as_u16(),
                message,
            });
        }
        let graph: RouteGraph = response
            .json()
            .await
            .map_err(|e| RoutingError::InvalidResponse(format!("{e}")))?;
        if graph.features.is_empty() {
            return Err(RoutingError::NoRoute(format!(
                "service at {} returned zero features",
                self.url
            )));
        }
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use geo::coord;

    #[test]
    fn test_request_uses_lon_lat_pairs() {
        let request = RouteRequest {
            locations: vec![[-122.41, 37.77], [-122.40, 37.78]],
            alternatives: true,
            avoid_motorways: false,
        };
        let json = serde_json::to_value(&request).expect("serializable");
        assert_eq!(json["locations"][0][0], -122.41);
        assert_eq!(json["avoidMotorways"], false);
        assert_eq!(json["alternatives"], true);
    }

    #[test]
    fn test_single_point_is_rejected_before_request() {
        let router = HttpStreetRouter::new("http://localhost:1");
        let result = block_on(router.route(&[coord! { x: 0.0, y: 0.0 }], false, false));
        assert_eq!(result, Err(RoutingError::TooFewPoints(1)));
    }
}
