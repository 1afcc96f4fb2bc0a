//! Durable outbox for session-creation events.
//!
//! Envelopes wait here until the transport accepts them, and the
//! pending set is persisted to a JSON file in the data dir so queued
//! events survive app restarts. Enqueueing the same session id twice
//! keeps the newer envelope.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::sync::types::{SessionEnvelope, SyncError};
use crate::storage::data_dir;

/// Pending event envelopes keyed by session id.
pub struct Outbox {
    pending: HashMap<String, SessionEnvelope>,
    queue_file: PathBuf,
}

impl Outbox {
    /// Create an outbox backed by `sync_outbox.json` in the data dir.
    pub fn new() -> Self {
        let dir = data_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::with_path(dir.join("sync_outbox.json"))
    }

    /// Create an outbox with a specific backing file (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            pending: HashMap::new(),
            queue_file: path,
        }
    }

    /// Queue an envelope for delivery, replacing any pending envelope
    /// for the same session id.
    pub fn enqueue(&mut self, envelope: SessionEnvelope) {
        self.pending.insert(envelope.session.id.clone(), envelope);
    }

    /// Remove and return every pending envelope.
    pub fn drain(&mut self) -> Vec<SessionEnvelope> {
        self.pending.drain().map(|(_, env)| env).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Persist the pending set to disk.
    pub fn persist(&self) -> Result<(), SyncError> {
        let data = serde_json::to_string_pretty(&self.pending)?;
        std::fs::write(&self.queue_file, data)?;
        Ok(())
    }

    /// Load the pending set from disk, if a backing file exists.
    pub fn load(&mut self) -> Result<(), SyncError> {
        if !self.queue_file.exists() {
            return Ok(());
        }
        let content = std::fs::read_to_string(&self.queue_file)?;
        self.pending = serde_json::from_str(&content)?;
        Ok(())
    }
}

impl Default for Outbox {
    fn default() -> Self {
        Self::new()
    }
}
