mod pattern_app;
mod pattern_app_error;
mod pattern_files;

pub use pattern_app::{PatternApp, PatternOperation};
pub use pattern_app_error::PatternAppError;
pub use pattern_files::PatternFiles;
