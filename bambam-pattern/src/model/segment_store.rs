use geo::{Coord, LineString};
use serde::{Deserialize, Serialize};

use super::PatternError;
use crate::geometry::geometry_ops;

/// ordered polyline pieces of a pattern shape. segment `i` connects control point `i` to
/// control point `i + 1`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentStore(Vec<LineString<f64>>);

impl From<Vec<LineString<f64>>> for SegmentStore {
    fn from(value: Vec<LineString<f64>>) -> Self {
        SegmentStore(value)
    }
}

impl SegmentStore {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LineString<f64>> {
        self.0.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LineString<f64>> {
        self.0.iter()
    }

    pub fn push(&mut self, segment: LineString<f64>) {
        self.0.push(segment);
    }

    /// splice-style replacement of `delete_count` segments starting at `start_index`.
    pub fn replace_range<I>(
        &mut self,
        start_index: usize,
        delete_count: usize,
        new_segments: I,
    ) -> Result<(), PatternError>
    where
        I: IntoIterator<Item = LineString<f64>>,
    {
        let end_index = start_index + delete_count;
        if end_index > self.0.len() {
            return Err(PatternError::IndexOutOfBounds {
                collection: "segments",
                index: end_index,
                length: self.0.len(),
            });
        }
        let _removed = self.0.splice(start_index..end_index, new_segments);
        Ok(())
    }

    /// full pattern shape built from all segments in order. a segment's first coordinate is
    /// dropped when it repeats the previous segment's last coordinate.
    pub fn concatenate_all(&self) -> LineString<f64> {
        let mut coords: Vec<Coord<f64>> = Vec::new();
        for segment in self.0.iter() {
            let mut iter = segment.0.iter().peekable();
            if let (Some(last), Some(first)) = (coords.last(), iter.peek()) {
                if last == *first {
                    let _ = iter.next();
                }
            }
            coords.extend(iter);
        }
        LineString::new(coords)
    }

    /// length in meters of each segment.
    pub fn lengths(&self) -> Vec<f64> {
        self.0.iter().map(geometry_ops::distance_along).collect()
    }

    pub fn total_distance(&self) -> f64 {
        self.lengths().iter().sum()
    }
}
