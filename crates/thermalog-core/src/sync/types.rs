//! Core types for device synchronization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::Session;

/// A session-creation event bound for the other device.
///
/// Delivered at-least-once and unordered; receivers deduplicate by
/// `session.id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEnvelope {
    pub session: Session,
    pub origin_device: String,
    pub sent_at: DateTime<Utc>,
}

/// A glanceable-state snapshot broadcast to the other device.
///
/// Replace semantics: only the snapshot with the latest `captured_at`
/// matters, and a stale in-flight snapshot must never regress state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSnapshot {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub today_session_count: u32,
    pub total_sessions: u64,
    pub origin_device: String,
    pub captured_at: DateTime<Utc>,
}

/// Everything that can arrive over the channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyncMessage {
    Event(SessionEnvelope),
    Context(ContextSnapshot),
}

/// Per-device connectivity state machine.
///
/// `Disconnected -> Activating -> Activated { reachable }`. Event
/// messages may be queued in any state; context snapshots are only
/// attempted while `Activated { reachable: true }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConnectivityState {
    Disconnected,
    Activating,
    Activated { reachable: bool },
}

impl ConnectivityState {
    pub fn is_activated(&self) -> bool {
        matches!(self, ConnectivityState::Activated { .. })
    }

    pub fn is_reachable(&self) -> bool {
        matches!(self, ConnectivityState::Activated { reachable: true })
    }
}

/// Sync error types.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
