use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PatternError {
    #[error("index {index} out of bounds for {collection} of length {length}")]
    IndexOutOfBounds {
        collection: &'static str,
        index: usize,
        length: usize,
    },
    #[error("pattern invariant violated: {0}")]
    InvariantViolation(String),
}
