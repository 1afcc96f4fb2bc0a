//! Session ledger subcommands.

use chrono::Utc;
use clap::Subcommand;
use thermalog_core::{Session, SessionType};

use crate::common::open_tracker;

#[derive(Subcommand)]
pub enum SessionsAction {
    /// List sessions, most recent first
    List {
        /// Only show sessions of this type
        #[arg(long = "type")]
        session_type: Option<SessionType>,
        /// Maximum number of sessions to print
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Delete a session by id
    Delete { id: String },
}

pub fn run(action: SessionsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut tracker = open_tracker()?;
    match action {
        SessionsAction::List {
            session_type,
            limit,
        } => {
            let sessions: Vec<&Session> = tracker
                .sessions()
                .iter()
                .filter(|s| session_type.map_or(true, |t| s.session_type == t))
                .take(limit)
                .collect();
            println!("{}", serde_json::to_string_pretty(&sessions)?);
        }
        SessionsAction::Delete { id } => {
            tracker.delete_session(&id, Utc::now());
            println!("deleted {id}");
        }
    }
    Ok(())
}
