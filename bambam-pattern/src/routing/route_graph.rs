use geo::{Coord, LineString};
use serde::{Deserialize, Serialize};

use super::RoutingError;

/// response of the street routing collaborator: the routed path as a list of LineString
/// features, plus the graph vertices the path passes through.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteGraph {
    pub features: Vec<RouteFeature>,
    #[serde(default)]
    pub vertices: Vec<RouteVertex>,
}

/// one routed edge. the geometry is a GeoJSON LineString.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteFeature {
    pub geometry: geojson::Geometry,
    #[serde(default)]
    pub properties: RouteFeatureProperties,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteFeatureProperties {
    #[serde(default)]
    pub from_vertex: Option<usize>,
    #[serde(default)]
    pub to_vertex: Option<usize>,
}

/// a street graph vertex along with the streets that meet there.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteVertex {
    pub index: usize,
    #[serde(default)]
    pub incident_streets: Vec<String>,
}

impl RouteFeature {
    pub fn new(line: &LineString<f64>, to_vertex: Option<usize>) -> RouteFeature {
        RouteFeature {
            geometry: geojson::Geometry::new(geojson::Value::from(line)),
            properties: RouteFeatureProperties {
                from_vertex: None,
                to_vertex,
            },
        }
    }

    /// the feature geometry as a linestring. any non-LineString geometry is rejected.
    pub fn line_string(&self) -> Result<LineString<f64>, RoutingError> {
        geo_types::LineString::<f64>::try_from(self.geometry.value.clone()).map_err(|e| {
            RoutingError::InvalidResponse(format!("route feature is not a LineString: {e}"))
        })
    }

    pub fn last_coord(&self) -> Result<Coord<f64>, RoutingError> {
        self.line_string()?.0.last().copied().ok_or_else(|| {
            RoutingError::InvalidResponse(String::from("route feature has no coordinates"))
        })
    }
}

impl RouteGraph {
    /// finds a vertex by its graph index.
    pub fn vertex(&self, index: usize) -> Option<&RouteVertex> {
        self.vertices.iter().find(|v| v.index == index)
    }

    /// concatenation of all feature coordinates, in order, without repeating shared endpoints.
    /// fails when the route has fewer than two coordinates.
    pub fn to_line_string(&self) -> Result<LineString<f64>, RoutingError> {
        let mut coords: Vec<Coord<f64>> = Vec::new();
        for feature in self.features.iter() {
            for coord in feature.line_string()?.0 {
                if coords.last() != Some(&coord) {
                    coords.push(coord);
                }
            }
        }
        if coords.len() < 2 {
            return Err(RoutingError::NoRoute(format!(
                "route has {} distinct coordinate(s)",
                coords.len()
            )));
        }
        Ok(LineString::new(coords))
    }
}
