use clap::{Parser, Subcommand};
use geo::{coord, Coord};
use serde::{Deserialize, Serialize};

use super::{PatternAppError, PatternFiles};
use crate::editor::{InMemoryStopTable, JsonFilePatternStore, PatternEditor};
use crate::model::{Pattern, StopEntity};
use crate::routing::{HttpStreetRouter, StraightLineRouter, StreetRouter};

/// command line tool for editing the stops and shape of a transit pattern
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct PatternApp {
    /// select the pattern operation to run
    #[command(subcommand)]
    pub op: PatternOperation,
}

#[derive(Debug, Clone, Serialize, Deserialize, Subcommand)]
pub enum PatternOperation {
    /// creates a stop at a location and adds it to the pattern
    AddStop {
        #[command(flatten)]
        files: PatternFiles,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        /// position in the stop sequence. the stop is appended when omitted
        #[arg(short, long)]
        index: Option<usize>,
    },
    /// removes the stop at a position in the stop sequence
    RemoveStop {
        #[command(flatten)]
        files: PatternFiles,
        #[arg(short, long)]
        index: usize,
    },
    /// extends the pattern toward a location, adding a stop every split interval
    AddStopsAtInterval {
        #[command(flatten)]
        files: PatternFiles,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
    },
    /// extends the pattern toward a location along the streets, adding stops near intersections
    AddStopsAtIntersections {
        #[command(flatten)]
        files: PatternFiles,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
    },
    /// prints the stops, control points and length of a pattern
    Summary {
        /// pattern JSON file
        #[arg(short, long)]
        pattern_file: String,
        /// optional output file for the pattern shape as GeoJSON
        #[arg(short, long)]
        geojson_file: Option<String>,
    },
}

impl PatternOperation {
    pub fn run(&self) -> Result<(), PatternAppError> {
        match self {
            PatternOperation::Summary {
                pattern_file,
                geojson_file,
            } => run_summary(pattern_file, geojson_file.as_deref()),
            PatternOperation::AddStop { files, .. }
            | PatternOperation::RemoveStop { files, .. }
            | PatternOperation::AddStopsAtInterval { files, .. }
            | PatternOperation::AddStopsAtIntersections { files, .. } => self.run_edit(files),
        }
    }

    fn run_edit(&self, files: &PatternFiles) -> Result<(), PatternAppError> {
        let settings = files.read_settings()?;
        let mut pattern = files.read_pattern()?;
        let router: Box<dyn StreetRouter> = match &files.router_url {
            Some(url) => Box::new(HttpStreetRouter::new(url)),
            None => {
                log::info!("no router url provided, pattern segments are straight lines");
                Box::new(StraightLineRouter)
            }
        };
        let editor = PatternEditor::new(
            router,
            InMemoryStopTable::from(files.read_stops()?),
            JsonFilePatternStore::new(&files.pattern_file),
        );

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let result: Result<Vec<StopEntity>, _> = runtime.block_on(async {
            match self {
                PatternOperation::AddStop {
                    lon, lat, index, ..
                } => editor
                    .add_stop_at_point(&mut pattern, location(*lon, *lat), true, *index, &settings)
                    .await
                    .map(|stop| vec![stop]),
                PatternOperation::RemoveStop { index, .. } => editor
                    .remove_stop_from_pattern(&mut pattern, *index, &settings)
                    .await
                    .map(|_| vec![]),
                PatternOperation::AddStopsAtInterval { lon, lat, .. } => {
                    editor
                        .add_stops_at_interval(&mut pattern, location(*lon, *lat), &settings)
                        .await
                }
                PatternOperation::AddStopsAtIntersections { lon, lat, .. } => {
                    editor
                        .add_stops_at_intersections(&mut pattern, location(*lon, *lat), &settings)
                        .await
                }
                PatternOperation::Summary { .. } => Ok(vec![]),
            }
        });

        // stops created before a failed edit remain in the stop table
        files.write_stops(&editor.stop_repository().stops())?;
        let created = result?;
        for stop in created.iter() {
            println!("created stop {} ({}, {})", stop.stop_id, stop.stop_lon, stop.stop_lat);
        }
        print_summary(&pattern);
        Ok(())
    }
}

fn location(lon: f64, lat: f64) -> Coord<f64> {
    coord! { x: lon, y: lat }
}

fn run_summary(pattern_file: &str, geojson_file: Option<&str>) -> Result<(), PatternAppError> {
    let contents = std::fs::read_to_string(pattern_file)?;
    let pattern: Pattern = serde_json::from_str(&contents)?;
    print_summary(&pattern);
    if let Some(output) = geojson_file {
        match pattern.shape_geojson() {
            Some(geometry) => {
                let feature = geojson::Feature {
                    bbox: None,
                    geometry: Some(geometry),
                    id: None,
                    properties: None,
                    foreign_members: None,
                };
                std::fs::write(output, serde_json::to_string_pretty(&feature)?)?;
                log::info!("wrote shape of pattern {} to {output}", pattern.pattern_id);
            }
            None => log::warn!(
                "pattern {} has no shape, {output} was not written",
                pattern.pattern_id
            ),
        }
    }
    Ok(())
}

fn print_summary(pattern: &Pattern) {
    println!("pattern {}", pattern.pattern_id);
    println!(
        "  {} stop(s), {} control point(s), {} segment(s), {:.1}m",
        pattern.pattern_stops().len(),
        pattern.control_points().len(),
        pattern.segments().len(),
        pattern.total_distance()
    );
    for (index, stop) in pattern.pattern_stops().iter().enumerate() {
        match stop.shape_dist_traveled {
            Some(distance) => println!("  {index:>3} {} at {distance:.1}m", stop.stop_id),
            None => println!("  {index:>3} {}", stop.stop_id),
        }
    }
    if let Err(e) = pattern.check_invariants() {
        println!("  shape is out of date with the stop list: {e}");
    }
}
