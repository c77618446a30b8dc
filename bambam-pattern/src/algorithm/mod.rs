pub mod recalculate_ops;
mod recalculation_error;
mod shape_edit;

pub use recalculation_error::RecalculationError;
pub use shape_edit::ShapeEdit;
