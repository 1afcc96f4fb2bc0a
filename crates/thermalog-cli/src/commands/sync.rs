//! Companion sync status and outbox control.

use clap::Subcommand;
use serde_json::json;

use crate::common::open_tracker;

#[derive(Subcommand)]
pub enum SyncAction {
    /// Show connectivity state and pending outbox size
    Status,
    /// Attempt to deliver queued session events
    Flush,
}

pub fn run(action: SyncAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut tracker = open_tracker()?;
    match action {
        SyncAction::Status => {
            let sync = tracker.sync();
            let status = json!({
                "device_id": sync.device_id(),
                "state": format!("{:?}", sync.state()),
                "pending_events": sync.pending_events(),
                "peer_context": sync.peer_context(),
            });
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        SyncAction::Flush => {
            let before = tracker.sync().pending_events();
            tracker.sync_mut().flush_outbox();
            let after = tracker.sync().pending_events();
            println!("delivered {} of {} queued events", before - after, before);
        }
    }
    Ok(())
}
