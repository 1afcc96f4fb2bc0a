//! Shared wiring for CLI commands.

use chrono::Utc;
use thermalog_core::sync::Outbox;
use thermalog_core::{Database, InMemorySummary, NullTransport, SyncCoordinator, Tracker};
use tracing::debug;

/// Open the tracker against the default data directory.
///
/// The CLI runs headless: the coordinator stays disconnected, so
/// session events accumulate in the durable outbox until a device with
/// a companion link drains them.
pub fn open_tracker() -> Result<Tracker, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let device_id = db.device_id()?;
    let mut outbox = Outbox::new();
    outbox.load()?;
    if !outbox.is_empty() {
        debug!(pending = outbox.len(), "loaded sync outbox with queued events");
    }
    let sync = SyncCoordinator::new(Box::new(NullTransport), device_id, outbox);
    let tracker = Tracker::open(db, sync, Box::new(InMemorySummary::new()), Utc::now())?;
    Ok(tracker)
}
