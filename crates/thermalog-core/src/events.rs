//! Typed core events.
//!
//! Every state change in the system produces a [`CoreEvent`]. The UI
//! layer polls and drains the [`EventLog`]; the core never calls back
//! into any UI framework.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::session::SessionType;

/// Where a committed session originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitOrigin {
    Local,
    /// Delivered by the companion device through the sync coordinator.
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CoreEvent {
    SessionCommitted {
        session_id: String,
        session_type: SessionType,
        origin: CommitOrigin,
        at: DateTime<Utc>,
    },
    SessionDeleted {
        session_id: String,
        at: DateTime<Utc>,
    },
    SessionUpdated {
        session_id: String,
        at: DateTime<Utc>,
    },
    StreakChanged {
        current_streak: u32,
        longest_streak: u32,
        at: DateTime<Utc>,
    },
    AchievementUnlocked {
        key: String,
        name: String,
        at: DateTime<Utc>,
    },
    GoalCompleted {
        goal_id: String,
        name: String,
        at: DateTime<Utc>,
    },
    ChallengeCompleted {
        challenge_id: String,
        name: String,
        at: DateTime<Utc>,
    },
    SummaryRefreshed {
        at: DateTime<Utc>,
    },
}

/// Bounded in-memory event buffer, drained by the presentation layer.
#[derive(Debug, Default)]
pub struct EventLog {
    events: VecDeque<CoreEvent>,
}

/// Oldest events are dropped past this point; consumers are expected to
/// drain frequently.
const EVENT_CAP: usize = 256;

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: CoreEvent) {
        if self.events.len() == EVENT_CAP {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    /// Remove and return all buffered events, oldest first.
    pub fn drain(&mut self) -> Vec<CoreEvent> {
        self.events.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_returns_in_order() {
        let mut log = EventLog::new();
        log.push(CoreEvent::SummaryRefreshed { at: Utc::now() });
        log.push(CoreEvent::StreakChanged {
            current_streak: 1,
            longest_streak: 1,
            at: Utc::now(),
        });
        let drained = log.drain();
        assert_eq!(drained.len(), 2);
        assert!(matches!(drained[0], CoreEvent::SummaryRefreshed { .. }));
        assert!(log.is_empty());
    }

    #[test]
    fn test_cap_drops_oldest() {
        let mut log = EventLog::new();
        for _ in 0..(EVENT_CAP + 10) {
            log.push(CoreEvent::SummaryRefreshed { at: Utc::now() });
        }
        assert_eq!(log.len(), EVENT_CAP);
    }
}
