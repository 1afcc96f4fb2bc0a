//! Achievement catalog output.

use thermalog_core::Achievement;

use crate::common::open_tracker;

pub fn run(unlocked_only: bool) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = open_tracker()?;
    let entries: Vec<&Achievement> = tracker
        .achievements()
        .iter()
        .filter(|a| !unlocked_only || a.unlocked)
        .collect();
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}
