use thiserror::Error;

use crate::{
    algorithm::RecalculationError, geometry::GeometryError, model::PatternError,
    routing::RoutingError,
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error("failure routing pattern shape: {source}")]
    RoutingFailure { source: RoutingError },
    #[error("stop '{0}' not found in stop table")]
    StopNotFound(String),
    #[error("route vertex {0} not found in routing response")]
    MissingVertex(usize),
    #[error("invalid argument combination: {0}")]
    InvalidArgumentCombination(String),
    #[error("failure creating stop: {0}")]
    StopCreationFailure(String),
    #[error("stop index {index} out of range for pattern with {count} stops")]
    StopIndexOutOfRange { index: usize, count: usize },
    #[error("pattern '{0}' has no stops or shape to extend")]
    EmptyPattern(String),
    #[error("failure persisting pattern: {0}")]
    PersistenceFailure(String),
    #[error(transparent)]
    Recalculation(RecalculationError),
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

impl From<RoutingError> for EditError {
    fn from(source: RoutingError) -> Self {
        EditError::RoutingFailure { source }
    }
}

impl From<RecalculationError> for EditError {
    fn from(value: RecalculationError) -> Self {
        match value {
            RecalculationError::RoutingFailure { source } => EditError::RoutingFailure { source },
            other => EditError::Recalculation(other),
        }
    }
}

impl EditError {
    /// short message suitable for showing to the person editing the pattern.
    pub fn user_message(&self) -> String {
        match self {
            EditError::RoutingFailure { .. } => String::from(
                "Could not find a street route for the new pattern shape. The shape was not changed.",
            ),
            EditError::StopNotFound(stop_id) => format!("Stop {stop_id} was not found."),
            EditError::MissingVertex(_) => {
                String::from("The routed path is missing an intersection.")
            }
            EditError::InvalidArgumentCombination(msg) => format!("Invalid request: {msg}."),
            EditError::StopCreationFailure(_) => String::from("Could not create the stop."),
            EditError::StopIndexOutOfRange { index, count } => {
                format!("Stop position {index} is not valid for a pattern with {count} stops.")
            }
            EditError::EmptyPattern(_) => {
                String::from("Add a stop to the pattern before extending it.")
            }
            EditError::PersistenceFailure(_) => String::from("Could not save the pattern."),
            EditError::Recalculation(_) | EditError::Pattern(_) | EditError::Geometry(_) => {
                format!("Could not update the pattern shape: {self}")
            }
        }
    }
}
