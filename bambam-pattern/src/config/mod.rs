mod edit_settings;

pub use edit_settings::EditSettings;
