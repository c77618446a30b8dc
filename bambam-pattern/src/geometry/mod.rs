mod geometry_error;
pub mod geometry_ops;
mod line_projection;

pub use geometry_error::GeometryError;
pub use line_projection::LineProjection;
