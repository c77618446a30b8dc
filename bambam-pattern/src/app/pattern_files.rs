use std::path::Path;

use clap::Args;
use serde::{Deserialize, Serialize};

use super::PatternAppError;
use crate::config::EditSettings;
use crate::model::{Pattern, StopEntity};

/// files and services shared by every editing operation
#[derive(Args, Debug, Clone, Serialize, Deserialize)]
pub struct PatternFiles {
    /// pattern JSON file. created when missing, rewritten after each edit
    #[arg(short, long)]
    pub pattern_file: String,
    /// stop table JSON file holding an array of stops. created when missing
    #[arg(short, long)]
    pub stops_file: String,
    /// edit settings as a .toml or .json file. defaults are used when omitted
    #[arg(long)]
    pub settings_file: Option<String>,
    /// street routing service URL. segments are drawn as straight lines when omitted
    #[arg(long)]
    pub router_url: Option<String>,
}

impl PatternFiles {
    pub fn read_settings(&self) -> Result<EditSettings, PatternAppError> {
        match &self.settings_file {
            Some(f) => EditSettings::try_from(f),
            None => Ok(EditSettings::default()),
        }
    }

    /// the stored pattern, or a new empty pattern named after the file when none exists.
    pub fn read_pattern(&self) -> Result<Pattern, PatternAppError> {
        let path = Path::new(&self.pattern_file);
        if !path.exists() {
            let pattern_id = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| String::from("pattern"));
            log::info!(
                "{} not found, starting new pattern {pattern_id}",
                self.pattern_file
            );
            return Ok(Pattern::new(&pattern_id));
        }
        let contents = std::fs::read_to_string(path)?;
        let pattern = serde_json::from_str(&contents)?;
        Ok(pattern)
    }

    pub fn read_stops(&self) -> Result<Vec<StopEntity>, PatternAppError> {
        let path = Path::new(&self.stops_file);
        if !path.exists() {
            return Ok(vec![]);
        }
        let contents = std::fs::read_to_string(path)?;
        let stops = serde_json::from_str(&contents)?;
        Ok(stops)
    }

    pub fn write_stops(&self, stops: &[StopEntity]) -> Result<(), PatternAppError> {
        let json = serde_json::to_string_pretty(stops)?;
        std::fs::write(&self.stops_file, json)?;
        Ok(())
    }
}
