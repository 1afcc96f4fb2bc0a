//! Log a new session from the command line.

use chrono::Utc;
use clap::Args;
use thermalog_core::{
    Config, CoreEvent, NoBiometrics, SessionType, Temperature, TemperatureUnit, Tracker,
};

use crate::common::open_tracker;

#[derive(Args)]
pub struct LogArgs {
    /// Session type (cold_plunge | sauna)
    pub session_type: SessionType,
    /// Duration in seconds
    #[arg(long, conflicts_with = "minutes")]
    pub seconds: Option<u32>,
    /// Duration in whole minutes
    #[arg(long)]
    pub minutes: Option<u32>,
    /// Recorded temperature value
    #[arg(long)]
    pub temp: Option<f64>,
    /// Temperature unit (f | c), defaults to the configured unit
    #[arg(long)]
    pub unit: Option<String>,
    /// Heart rate in bpm
    #[arg(long)]
    pub heart_rate: Option<u32>,
    /// Free-text note
    #[arg(long)]
    pub note: Option<String>,
    /// Protocol/technique tag
    #[arg(long)]
    pub protocol: Option<String>,
}

fn resolve_duration(seconds: Option<u32>, minutes: Option<u32>) -> Result<u32, String> {
    match (seconds, minutes) {
        (Some(s), _) => Ok(s),
        (None, Some(m)) => m
            .checked_mul(60)
            .ok_or_else(|| format!("--minutes {m} is out of range")),
        (None, None) => Err("provide --seconds or --minutes".to_string()),
    }
}

pub fn run(args: LogArgs) -> Result<(), Box<dyn std::error::Error>> {
    let duration_secs = resolve_duration(args.seconds, args.minutes)?;

    let mut tracker = open_tracker()?;
    let mut session = Tracker::compose_session(
        args.session_type,
        duration_secs,
        &NoBiometrics,
        Utc::now(),
    );
    if let Some(bpm) = args.heart_rate {
        session = session.with_heart_rate(bpm);
    }
    if let Some(value) = args.temp {
        let unit = match args.unit.as_deref() {
            Some("c") | Some("celsius") => TemperatureUnit::Celsius,
            Some("f") | Some("fahrenheit") => TemperatureUnit::Fahrenheit,
            None => Config::load().unwrap_or_default().temperature_unit,
            Some(other) => return Err(format!("unknown unit: {other}").into()),
        };
        session = session.with_temperature(Temperature { value, unit });
    }
    if let Some(note) = args.note {
        session = session.with_note(note);
    }
    if let Some(protocol) = args.protocol {
        session = session.with_protocol(protocol);
    }

    let committed = tracker.add_session(session)?;
    println!("{}", serde_json::to_string_pretty(&committed)?);

    for event in tracker.drain_events() {
        match event {
            CoreEvent::AchievementUnlocked { name, .. } => {
                println!("achievement unlocked: {name}");
            }
            CoreEvent::GoalCompleted { name, .. } => {
                println!("goal completed: {name}");
            }
            CoreEvent::ChallengeCompleted { name, .. } => {
                println!("challenge completed: {name}");
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_duration_prefers_seconds() {
        assert_eq!(resolve_duration(Some(90), Some(5)), Ok(90));
        assert_eq!(resolve_duration(None, Some(5)), Ok(300));
    }

    #[test]
    fn test_resolve_duration_rejects_missing_and_overflow() {
        assert!(resolve_duration(None, None).is_err());
        assert!(resolve_duration(None, Some(u32::MAX)).is_err());
    }
}
