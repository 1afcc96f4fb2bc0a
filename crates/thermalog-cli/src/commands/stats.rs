//! Statistics, streak, and summary output.

use chrono::Utc;

use crate::common::open_tracker;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let tracker = open_tracker()?;
    println!("{}", serde_json::to_string_pretty(&tracker.statistics())?);
    Ok(())
}

pub fn run_streak() -> Result<(), Box<dyn std::error::Error>> {
    let tracker = open_tracker()?;
    println!("{}", serde_json::to_string_pretty(tracker.streak())?);
    Ok(())
}

pub fn run_summary() -> Result<(), Box<dyn std::error::Error>> {
    let tracker = open_tracker()?;
    let summary = tracker.current_summary(Utc::now());
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
