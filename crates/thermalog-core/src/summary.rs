//! Read-only summary snapshots for glanceable surfaces.
//!
//! The core writes a fresh [`SummarySnapshot`] after every
//! state-affecting commit; widgets and the companion display only read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::SessionType;

/// The glanceable key/value summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarySnapshot {
    pub current_streak: u32,
    pub today_session_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_session_type: Option<SessionType>,
    pub total_sessions: u64,
    pub last_update: DateTime<Utc>,
}

/// Seam to whatever surface displays the snapshot (widget store,
/// companion display cache). Implementations must not call back into
/// the core.
pub trait SummaryPublisher {
    fn publish(&mut self, snapshot: &SummarySnapshot);
}

/// Default publisher keeping only the latest snapshot in memory.
#[derive(Debug, Default)]
pub struct InMemorySummary {
    latest: Option<SummarySnapshot>,
}

impl InMemorySummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<&SummarySnapshot> {
        self.latest.as_ref()
    }
}

impl SummaryPublisher for InMemorySummary {
    fn publish(&mut self, snapshot: &SummarySnapshot) {
        self.latest = Some(snapshot.clone());
    }
}
