use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::{ControlPoint, PatternError};

/// ordered sequence of control points on a pattern shape, sorted by non-decreasing distance.
///
/// the stop ordinal of a control point (its position among STOP control points) differs from
/// its control point index whenever anchors are interleaved, so the mapping between the two is
/// always derived on demand via [ControlPointStore::find_stop_control_points].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControlPointStore(Vec<ControlPoint>);

/// a STOP control point along with its index in the full control point list.
#[derive(Clone, Copy, Debug)]
pub struct StopControlPoint<'a> {
    pub cp_index: usize,
    pub control_point: &'a ControlPoint,
}

impl From<Vec<ControlPoint>> for ControlPointStore {
    fn from(value: Vec<ControlPoint>) -> Self {
        ControlPointStore(value)
    }
}

impl ControlPointStore {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ControlPoint> {
        self.0.get(index)
    }

    pub fn first(&self) -> Option<&ControlPoint> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&ControlPoint> {
        self.0.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ControlPoint> {
        self.0.iter()
    }

    /// get a control point by index, failing when the index is out of bounds.
    pub fn try_get(&self, index: usize) -> Result<&ControlPoint, PatternError> {
        self.0.get(index).ok_or(PatternError::IndexOutOfBounds {
            collection: "control points",
            index,
            length: self.0.len(),
        })
    }

    /// inserts a control point at `index`. the caller is responsible for supplying a
    /// distance that keeps the store sorted.
    pub fn insert(&mut self, control_point: ControlPoint, index: usize) -> Result<(), PatternError> {
        if index > self.0.len() {
            return Err(PatternError::IndexOutOfBounds {
                collection: "control points",
                index,
                length: self.0.len(),
            });
        }
        self.0.insert(index, control_point);
        Ok(())
    }

    pub fn push(&mut self, control_point: ControlPoint) {
        self.0.push(control_point);
    }

    /// replaces the control point at `index`, returning the previous value.
    pub fn replace(
        &mut self,
        index: usize,
        control_point: ControlPoint,
    ) -> Result<ControlPoint, PatternError> {
        let length = self.0.len();
        let slot = self.0.get_mut(index).ok_or(PatternError::IndexOutOfBounds {
            collection: "control points",
            index,
            length,
        })?;
        Ok(std::mem::replace(slot, control_point))
    }

    pub fn remove(&mut self, index: usize) -> Result<ControlPoint, PatternError> {
        if index >= self.0.len() {
            return Err(PatternError::IndexOutOfBounds {
                collection: "control points",
                index,
                length: self.0.len(),
            });
        }
        Ok(self.0.remove(index))
    }

    /// the ordered STOP control points, each annotated with its control point index.
    pub fn find_stop_control_points(&self) -> Vec<StopControlPoint<'_>> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, cp)| cp.is_stop())
            .map(|(cp_index, control_point)| StopControlPoint {
                cp_index,
                control_point,
            })
            .collect_vec()
    }

    /// maps a position in the pattern stop sequence to its control point index.
    pub fn index_of_stop(&self, stop_ordinal: usize) -> Option<usize> {
        self.find_stop_control_points()
            .get(stop_ordinal)
            .map(|scp| scp.cp_index)
    }

    /// stop ids of the STOP control points, in order.
    pub fn stop_ids(&self) -> Vec<&str> {
        self.0.iter().filter_map(|cp| cp.stop_id()).collect_vec()
    }

    pub fn is_sorted_by_distance(&self) -> bool {
        self.0
            .iter()
            .tuple_windows()
            .all(|(a, b)| a.distance() <= b.distance())
    }

    /// overwrites each control point distance with the matching cumulative distance.
    pub(crate) fn set_distances(&mut self, distances: &[f64]) -> Result<(), PatternError> {
        if distances.len() != self.0.len() {
            return Err(PatternError::InvariantViolation(format!(
                "{} distances supplied for {} control points",
                distances.len(),
                self.0.len()
            )));
        }
        for (cp, distance) in self.0.iter_mut().zip(distances) {
            *cp = cp.with_distance(*distance);
        }
        Ok(())
    }
}
