mod edit_error;
pub mod editor_ops;
mod in_memory_stop_table;
mod json_file_pattern_store;
mod pattern_editor;
mod pattern_persistence;
mod stop_repository;

pub use edit_error::EditError;
pub use in_memory_stop_table::InMemoryStopTable;
pub use json_file_pattern_store::JsonFilePatternStore;
pub use pattern_editor::PatternEditor;
pub use pattern_persistence::PatternPersistence;
pub use stop_repository::StopRepository;
