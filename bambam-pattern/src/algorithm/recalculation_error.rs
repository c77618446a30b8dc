use thiserror::Error;

use crate::{geometry::GeometryError, model::PatternError, routing::RoutingError};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecalculationError {
    #[error("failure routing pattern segment: {source}")]
    RoutingFailure {
        #[from]
        source: RoutingError,
    },
    #[error("{0}")]
    InvalidEdit(String),
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}
