mod control_point;
mod control_point_store;
mod pattern;
mod pattern_error;
mod pattern_geometry;
mod pattern_stop;
mod point_type;
mod segment_store;
mod stop_entity;

pub use control_point::ControlPoint;
pub use control_point_store::{ControlPointStore, StopControlPoint};
pub use pattern::Pattern;
pub use pattern_error::PatternError;
pub use pattern_geometry::PatternGeometry;
pub use pattern_stop::PatternStop;
pub use point_type::PointType;
pub use segment_store::SegmentStore;
pub use stop_entity::StopEntity;
