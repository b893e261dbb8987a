pub mod config;
pub mod plan;
pub mod resolve;
pub mod rotation;
pub mod topics;

use std::path::Path;

use revcal_core::topic::{default_catalog, parse_catalog};
use revcal_core::{Config, Schedule, Topic};
use serde::Serialize;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Config from an explicit file, or the one in the data directory.
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            Ok(Config::load_from(path)?)
        }
        None => Ok(Config::load()?),
    }
}

/// Topic list from a file, or the built-in catalog.
pub fn load_topics(file: Option<&Path>) -> Result<Vec<Topic>, Box<dyn std::error::Error>> {
    let Some(file) = file else {
        return Ok(default_catalog());
    };
    let text = std::fs::read_to_string(file)?;
    let topics = parse_catalog(&text);
    if topics.is_empty() {
        return Err(format!("no topics found in {}", file.display()).into());
    }
    Ok(topics)
}

pub fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One line per day: date, then the activity or the topics.
pub fn print_schedule(schedule: &Schedule) {
    for entry in schedule.entries() {
        match entry.activity_label() {
            Some(activity) => println!("{}  [{}]", entry.date, activity),
            None => {
                let topics: Vec<&str> = entry.assigned().iter().map(Topic::as_str).collect();
                println!("{}  {}", entry.date, topics.join(", "));
            }
        }
    }
}

/// Gap for display; no repeats prints as "-".
pub fn format_gap(gap: Option<f64>) -> String {
    gap.map_or_else(|| "-".to_string(), |g| format!("{g:.2}"))
}
