use thiserror::Error;

use crate::editor::EditError;

#[derive(Error, Debug)]
pub enum PatternAppError {
    #[error("failure reading edit settings: {0}")]
    ConfigurationError(String),
    #[error("failure editing pattern: {source}")]
    EditError {
        #[from]
        source: EditError,
    },
    #[error("failure reading or writing file: {source}")]
    StdIoError {
        #[from]
        source: std::io::Error,
    },
    #[error("failure decoding JSON: {source}")]
    SerdeJsonError {
        #[from]
        source: serde_json::Error,
    },
}

impl PatternAppError {
    /// short message for the command line user. edit failures use the editor's wording.
    pub fn user_message(&self) -> String {
        match self {
            PatternAppError::EditError { source } => source.user_message(),
            other => other.to_string(),
        }
    }
}
