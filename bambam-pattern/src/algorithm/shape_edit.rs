use geo::Coord;

use crate::model::ControlPoint;

/// a single edit to the control point sequence of a pattern.
#[derive(Clone, Debug, PartialEq)]
pub enum ShapeEdit {
    /// place a new control point at `index`, re-deriving the segment(s) adjoining it.
    Insert {
        index: usize,
        control_point: ControlPoint,
    },
    /// move the control point at `index` to `point`, re-deriving the segment(s) adjoining it.
    /// with `snap_to_route` the control point takes the endpoint of the re-derived line
    /// rather than `point` verbatim.
    Update {
        index: usize,
        point: Coord<f64>,
        snap_to_route: bool,
    },
    /// remove the control point at `index`, merging the segments that bordered it.
    Delete { index: usize },
}

impl ShapeEdit {
    pub fn index(&self) -> usize {
        match self {
            ShapeEdit::Insert { index, .. } => *index,
            ShapeEdit::Update { index, .. } => *index,
            ShapeEdit::Delete { index } => *index,
        }
    }
}
