//! Challenge subcommands.

use clap::Subcommand;
use thermalog_core::{Challenge, SessionType, TargetKind};

use crate::common::open_tracker;

#[derive(Subcommand)]
pub enum ChallengesAction {
    /// Register a challenge locally
    Add {
        name: String,
        /// Target kind (same values as goals)
        kind: TargetKind,
        target: u32,
        /// Only count sessions of this type
        #[arg(long = "type")]
        session_type: Option<SessionType>,
        /// Participant count reported by the backend
        #[arg(long, default_value_t = 0)]
        participants: u32,
    },
    /// List all known challenges
    List,
    /// Join a challenge by id
    Join { id: String },
    /// Leave a challenge by id
    Leave { id: String },
}

pub fn run(action: ChallengesAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut tracker = open_tracker()?;
    match action {
        ChallengesAction::Add {
            name,
            kind,
            target,
            session_type,
            participants,
        } => {
            let mut challenge = Challenge::new(name, kind, target).with_participants(participants);
            if let Some(t) = session_type {
                challenge = challenge.with_session_type(t);
            }
            println!("{}", serde_json::to_string_pretty(&challenge)?);
            tracker.upsert_challenge(challenge);
        }
        ChallengesAction::List => {
            println!("{}", serde_json::to_string_pretty(tracker.challenges())?);
        }
        ChallengesAction::Join { id } => {
            if tracker.join_challenge(&id) {
                println!("joined {id}");
            } else {
                return Err(format!("unknown challenge: {id}").into());
            }
        }
        ChallengesAction::Leave { id } => {
            if tracker.leave_challenge(&id) {
                println!("left {id}");
            } else {
                return Err(format!("unknown challenge: {id}").into());
            }
        }
    }
    Ok(())
}
