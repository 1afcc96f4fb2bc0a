//! Goal management subcommands.

use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use thermalog_core::{Goal, SessionType, TargetKind};

use crate::common::open_tracker;

#[derive(Subcommand)]
pub enum GoalsAction {
    /// Create a new goal
    Add {
        name: String,
        /// Target kind (sessions_per_week | sessions_per_month |
        /// total_sessions | streak_days | total_minutes | min_duration)
        kind: TargetKind,
        target: u32,
        /// Only count sessions of this type
        #[arg(long = "type")]
        session_type: Option<SessionType>,
        /// Last day the goal accepts progress (YYYY-MM-DD)
        #[arg(long)]
        ends: Option<NaiveDate>,
    },
    /// Edit an existing goal, keeping its progress
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        target: Option<u32>,
        /// Only count sessions of this type
        #[arg(long = "type")]
        session_type: Option<SessionType>,
        /// Last day the goal accepts progress (YYYY-MM-DD)
        #[arg(long)]
        ends: Option<NaiveDate>,
    },
    /// List all goals
    List,
    /// Delete a goal by id
    Delete { id: String },
}

fn end_of_day(day: NaiveDate) -> Result<chrono::DateTime<Utc>, Box<dyn std::error::Error>> {
    Ok(day
        .and_hms_opt(23, 59, 59)
        .ok_or("invalid end date")?
        .and_utc())
}

pub fn run(action: GoalsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut tracker = open_tracker()?;
    match action {
        GoalsAction::Add {
            name,
            kind,
            target,
            session_type,
            ends,
        } => {
            let mut goal = Goal::new(name, kind, target, Utc::now());
            if let Some(t) = session_type {
                goal = goal.with_session_type(t);
            }
            if let Some(day) = ends {
                goal = goal.with_end_date(end_of_day(day)?);
            }
            println!("{}", serde_json::to_string_pretty(&goal)?);
            tracker.add_goal(goal);
        }
        GoalsAction::Edit {
            id,
            name,
            target,
            session_type,
            ends,
        } => {
            let mut edited = tracker
                .goals()
                .iter()
                .find(|g| g.id == id)
                .ok_or_else(|| format!("unknown goal: {id}"))?
                .clone();
            if let Some(name) = name {
                edited.name = name;
            }
            if let Some(target) = target {
                edited.target = target;
            }
            if let Some(t) = session_type {
                edited.session_type = Some(t);
            }
            if let Some(day) = ends {
                edited.ends_at = Some(end_of_day(day)?);
            }
            println!("{}", serde_json::to_string_pretty(&edited)?);
            tracker.update_goal(edited);
        }
        GoalsAction::List => {
            println!("{}", serde_json::to_string_pretty(tracker.goals())?);
        }
        GoalsAction::Delete { id } => {
            tracker.remove_goal(&id);
            println!("removed {id}");
        }
    }
    Ok(())
}
