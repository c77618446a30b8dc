use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("linestring has no coordinates: {0}")]
    EmptyLine(String),
    #[error("linestring needs at least two coordinates: {0}")]
    DegenerateLine(String),
    #[error("invalid distance along line: {0}")]
    InvalidDistance(String),
}
