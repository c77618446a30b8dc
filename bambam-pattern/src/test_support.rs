//! collaborator doubles shared by the unit tests of this crate.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use geo::{Coord, LineString};

use crate::editor::{EditError, PatternPersistence};
use crate::model::Pattern;
use crate::routing::{RouteFeature, RouteGraph, RoutingError, StreetRouter};

/// router that rejects every request.
#[derive(Debug, Default)]
pub struct FailingRouter {
    calls: AtomicUsize,
}

impl FailingRouter {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StreetRouter for FailingRouter {
    async fn route(
        &self,
        _points: &[Coord<f64>],
        _alternatives: bool,
        _avoid_motorways: bool,
    ) -> Result<RouteGraph, RoutingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(RoutingError::ServiceError {
            status: 503,
            message: String::from("routing service unavailable"),
        })
    }
}

/// router that bends each leg through its midpoint and ends it slightly east of the requested
/// destination, the way a street router snaps a point onto the nearest street.
#[derive(Debug, Default)]
pub struct SnappingRouter {
    calls: AtomicUsize,
    alternatives: Mutex<Vec<bool>>,
}

impl SnappingRouter {
    pub const OFFSET: f64 = 0.0001;

    pub fn snap(&self, coord: Coord<f64>) -> Coord<f64> {
        Coord {
            x: coord.x + Self::OFFSET,
            y: coord.y,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// the `alternatives` flag of every request, in order
    pub fn alternatives(&self) -> Vec<bool> {
        self.alternatives.lock().unwrap().clone()
    }
}

#[async_trait]
impl StreetRouter for SnappingRouter {
    async fn route(
        &self,
        points: &[Coord<f64>],
        alternatives: bool,
        _avoid_motorways: bool,
    ) -> Result<RouteGraph, RoutingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.alternatives.lock().unwrap().push(alternatives);
        if points.len() < 2 {
            return Err(RoutingError::TooFewPoints(points.len()));
        }
        let features = points
            .windows(2)
            .map(|pair| {
                let (from, to) = (pair[0], pair[1]);
                let mid = Coord {
                    x: (from.x + to.x) / 2.0 + Self::OFFSET,
                    y: (from.y + to.y) / 2.0,
                };
                RouteFeature::new(&LineString::new(vec![from, mid, self.snap(to)]), None)
            })
            .collect();
        Ok(RouteGraph {
            features,
            vertices: vec![],
        })
    }
}

/// router that answers every request with the same route graph.
#[derive(Debug)]
pub struct ScriptedRouter {
    graph: RouteGraph,
    calls: AtomicUsize,
}

impl ScriptedRouter {
    pub fn new(graph: RouteGraph) -> ScriptedRouter {
        ScriptedRouter {
            graph,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StreetRouter for ScriptedRouter {
    async fn route(
        &self,
        _points: &[Coord<f64>],
        _alternatives: bool,
        _avoid_motorways: bool,
    ) -> Result<RouteGraph, RoutingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.graph.clone())
    }
}

/// persistence that keeps a copy of every saved pattern.
#[derive(Debug, Default)]
pub struct RecordingPersistence {
    saved: Mutex<Vec<Pattern>>,
}

impl RecordingPersistence {
    pub fn saved(&self) -> Vec<Pattern> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl PatternPersistence for RecordingPersistence {
    async fn save(&self, pattern: &Pattern) -> Result<(), EditError> {
        self.saved.lock().unwrap().push(pattern.clone());
        Ok(())
    }
}
