use thiserror::Error;

/// any of these conditions means the street routing collaborator produced no usable route.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RoutingError {
    #[error("routing request needs at least 2 points, found {0}")]
    TooFewPoints(usize),
    #[error("routing request failed: {0}")]
    RequestFailed(String),
    #[error("routing service responded with status {status}: {message}")]
    ServiceError { status: u16, message: String },
    #[error("routing service returned no route: {0}")]
    NoRoute(String),
    #[error("routing service response is invalid: {0}")]
    InvalidResponse(String),
}
