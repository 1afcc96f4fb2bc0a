//! Sync coordinator: connectivity state machine and message plumbing.
//!
//! The coordinator owns the outbound side (durable event queue,
//! best-effort context broadcast) and an inbound [`Mailbox`] that the
//! transport's delivery thread pushes into. The single-writer context
//! drains the mailbox; transport callbacks never mutate core state
//! directly.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::session::Session;
use crate::sync::outbox::Outbox;
use crate::sync::types::{
    ConnectivityState, ContextSnapshot, SessionEnvelope, SyncError, SyncMessage,
};

/// Seam to the real device-to-device channel.
///
/// `send_event` hands an envelope to the transport's own durable queue;
/// once it returns `Ok` the transport guarantees eventual delivery.
/// `broadcast_context` is fire-and-forget with replace semantics.
pub trait SyncTransport: Send {
    fn send_event(&self, envelope: &SessionEnvelope) -> Result<(), SyncError>;
    fn broadcast_context(&self, snapshot: &ContextSnapshot) -> Result<(), SyncError>;
}

/// Transport for headless use with no companion link. Nothing is ever
/// accepted, so queued events stay in the durable outbox.
pub struct NullTransport;

impl SyncTransport for NullTransport {
    fn send_event(&self, _envelope: &SessionEnvelope) -> Result<(), SyncError> {
        Err(SyncError::Transport("no companion link".to_string()))
    }

    fn broadcast_context(&self, _snapshot: &ContextSnapshot) -> Result<(), SyncError> {
        Err(SyncError::Transport("no companion link".to_string()))
    }
}

/// Thread-safe inbound message buffer.
///
/// Cloned into the transport's receive callbacks; the tracker drains it
/// from the serialized execution context.
#[derive(Clone, Default)]
pub struct Mailbox {
    inner: Arc<Mutex<VecDeque<SyncMessage>>>,
}

impl Mailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a received message. Safe to call from a delivery thread.
    pub fn push(&self, message: SyncMessage) {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        guard.push_back(message);
    }

    /// Remove and return all buffered messages, oldest first.
    pub fn drain(&self) -> Vec<SyncMessage> {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        guard.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outbound coordinator for one device.
pub struct SyncCoordinator {
    transport: Box<dyn SyncTransport>,
    state: ConnectivityState,
    outbox: Outbox,
    device_id: String,
    mailbox: Mailbox,
    /// Latest context snapshot accepted from the peer device.
    peer_context: Option<ContextSnapshot>,
}

impl SyncCoordinator {
    /// Create a coordinator in the `Disconnected` state. The outbox is
    /// expected to have been loaded by the caller if persistence across
    /// restarts is wanted.
    pub fn new(transport: Box<dyn SyncTransport>, device_id: String, outbox: Outbox) -> Self {
        Self {
            transport,
            state: ConnectivityState::Disconnected,
            outbox,
            device_id,
            mailbox: Mailbox::new(),
            peer_context: None,
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn state(&self) -> ConnectivityState {
        self.state
    }

    /// Handle for the transport's receive callbacks.
    pub fn mailbox(&self) -> Mailbox {
        self.mailbox.clone()
    }

    pub fn pending_events(&self) -> usize {
        self.outbox.len()
    }

    /// Latest context snapshot accepted from the peer.
    pub fn peer_context(&self) -> Option<&ContextSnapshot> {
        self.peer_context.as_ref()
    }

    /// `Disconnected -> Activating`. No-op if already past that.
    pub fn begin_activation(&mut self) {
        if self.state == ConnectivityState::Disconnected {
            self.state = ConnectivityState::Activating;
        }
    }

    /// Transport finished activating; locally queued events are flushed
    /// as soon as it is reachable.
    pub fn activation_completed(&mut self, reachable: bool) {
        self.state = ConnectivityState::Activated { reachable };
        if reachable {
            self.flush_outbox();
        }
    }

    /// Reachability signal from the transport's delivery thread, after
    /// hand-off into the serialized context.
    pub fn reachability_changed(&mut self, reachable: bool) {
        if !self.state.is_activated() {
            debug!(reachable, "reachability signal before activation, ignoring");
            return;
        }
        self.state = ConnectivityState::Activated { reachable };
        if reachable {
            self.flush_outbox();
        }
    }

    /// Queue a session-creation event for the peer.
    ///
    /// The envelope lands in the durable outbox first (even before
    /// activation), then a flush is attempted if the transport is up.
    pub fn queue_event(&mut self, session: Session, now: DateTime<Utc>) {
        let envelope = SessionEnvelope {
            session,
            origin_device: self.device_id.clone(),
            sent_at: now,
        };
        self.outbox.enqueue(envelope);
        if let Err(e) = self.outbox.persist() {
            warn!(error = %e, "failed to persist sync outbox");
        }
        if self.state.is_activated() {
            self.flush_outbox();
        }
    }

    /// Hand every pending envelope to the transport. Envelopes the
    /// transport refuses stay queued for the next flush.
    pub fn flush_outbox(&mut self) {
        if self.outbox.is_empty() {
            return;
        }
        let mut retained = Vec::new();
        for envelope in self.outbox.drain() {
            match self.transport.send_event(&envelope) {
                Ok(()) => {
                    debug!(session_id = %envelope.session.id, "event handed to transport");
                }
                Err(e) => {
                    debug!(error = %e, session_id = %envelope.session.id, "transport refused event, keeping queued");
                    retained.push(envelope);
                }
            }
        }
        for envelope in retained {
            self.outbox.enqueue(envelope);
        }
        if let Err(e) = self.outbox.persist() {
            warn!(error = %e, "failed to persist sync outbox");
        }
    }

    /// Broadcast a context snapshot if the peer is reachable.
    ///
    /// Skipped, not queued, when unreachable: a fresher snapshot will
    /// supersede a missed one.
    pub fn broadcast_context(&self, snapshot: &ContextSnapshot) {
        if !self.state.is_reachable() {
            debug!("peer unreachable, skipping context broadcast");
            return;
        }
        if let Err(e) = self.transport.broadcast_context(snapshot) {
            debug!(error = %e, "context broadcast failed, will be superseded");
        }
    }

    /// Accept a context snapshot received from the peer, keeping only
    /// the one with the latest embedded timestamp.
    ///
    /// Returns `true` if the snapshot replaced the held one.
    pub fn accept_context(&mut self, snapshot: ContextSnapshot) -> bool {
        match &self.peer_context {
            Some(held) if held.captured_at >= snapshot.captured_at => {
                debug!("stale context snapshot dropped");
                false
            }
            _ => {
                self.peer_context = Some(snapshot);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionType;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::TempDir;

    /// Test transport capturing everything it accepts, with a
    /// switchable link.
    #[derive(Clone, Default)]
    struct FakeTransport {
        up: Arc<AtomicBool>,
        events: Arc<Mutex<Vec<SessionEnvelope>>>,
        contexts: Arc<Mutex<Vec<ContextSnapshot>>>,
    }

    impl SyncTransport for FakeTransport {
        fn send_event(&self, envelope: &SessionEnvelope) -> Result<(), SyncError> {
            if !self.up.load(Ordering::SeqCst) {
                return Err(SyncError::Transport("link down".to_string()));
            }
            self.events.lock().unwrap().push(envelope.clone());
            Ok(())
        }

        fn broadcast_context(&self, snapshot: &ContextSnapshot) -> Result<(), SyncError> {
            if !self.up.load(Ordering::SeqCst) {
                return Err(SyncError::Transport("link down".to_string()));
            }
            self.contexts.lock().unwrap().push(snapshot.clone());
            Ok(())
        }
    }

    fn coordinator(transport: FakeTransport) -> SyncCoordinator {
        let temp = TempDir::new().unwrap();
        let outbox = Outbox::with_path(temp.path().join("outbox.json"));
        // TempDir dropped here: persist() failures are logged, not raised.
        SyncCoordinator::new(Box::new(transport), "thermalog-test".to_string(), outbox)
    }

    fn snapshot(streak: u32, at: DateTime<Utc>) -> ContextSnapshot {
        ContextSnapshot {
            current_streak: streak,
            longest_streak: streak,
            today_session_count: 1,
            total_sessions: 1,
            origin_device: "thermalog-peer".to_string(),
            captured_at: at,
        }
    }

    #[test]
    fn test_state_machine_transitions() {
        let mut coord = coordinator(FakeTransport::default());
        assert_eq!(coord.state(), ConnectivityState::Disconnected);
        coord.begin_activation();
        assert_eq!(coord.state(), ConnectivityState::Activating);
        coord.activation_completed(false);
        assert_eq!(coord.state(), ConnectivityState::Activated { reachable: false });
        coord.reachability_changed(true);
        assert!(coord.state().is_reachable());
    }

    #[test]
    fn test_events_queued_before_activation_flush_on_activate() {
        let transport = FakeTransport::default();
        transport.up.store(true, Ordering::SeqCst);
        let mut coord = coordinator(transport.clone());

        let session = Session::new(SessionType::ColdPlunge, 180, Utc::now());
        coord.queue_event(session.clone(), Utc::now());
        assert_eq!(coord.pending_events(), 1);
        assert!(transport.events.lock().unwrap().is_empty());

        coord.begin_activation();
        coord.activation_completed(true);
        assert_eq!(coord.pending_events(), 0);
        assert_eq!(transport.events.lock().unwrap()[0].session.id, session.id);
    }

    #[test]
    fn test_refused_events_stay_queued_until_link_returns() {
        let transport = FakeTransport::default();
        let mut coord = coordinator(transport.clone());
        coord.begin_activation();
        coord.activation_completed(false);

        coord.queue_event(Session::new(SessionType::Sauna, 600, Utc::now()), Utc::now());
        assert_eq!(coord.pending_events(), 1);

        transport.up.store(true, Ordering::SeqCst);
        coord.reachability_changed(true);
        assert_eq!(coord.pending_events(), 0);
        assert_eq!(transport.events.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_context_skipped_when_unreachable() {
        let transport = FakeTransport::default();
        transport.up.store(true, Ordering::SeqCst);
        let mut coord = coordinator(transport.clone());
        coord.begin_activation();
        coord.activation_completed(false);

        coord.broadcast_context(&snapshot(3, Utc::now()));
        assert!(transport.contexts.lock().unwrap().is_empty());

        coord.reachability_changed(true);
        coord.broadcast_context(&snapshot(3, Utc::now()));
        assert_eq!(transport.contexts.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_stale_context_never_regresses() {
        let mut coord = coordinator(FakeTransport::default());
        let now = Utc::now();

        assert!(coord.accept_context(snapshot(5, now)));
        // An older in-flight snapshot arrives late.
        assert!(!coord.accept_context(snapshot(2, now - chrono::Duration::minutes(5))));
        assert_eq!(coord.peer_context().unwrap().current_streak, 5);

        assert!(coord.accept_context(snapshot(6, now + chrono::Duration::minutes(1))));
        assert_eq!(coord.peer_context().unwrap().current_streak, 6);
    }

    #[test]
    fn test_mailbox_hand_off() {
        let coord = coordinator(FakeTransport::default());
        let mailbox = coord.mailbox();

        let handle = std::thread::spawn({
            let mailbox = mailbox.clone();
            move || {
                mailbox.push(SyncMessage::Context(snapshot(1, Utc::now())));
            }
        });
        handle.join().unwrap();

        let drained = mailbox.drain();
        assert_eq!(drained.len(), 1);
        assert!(mailbox.is_empty());
    }
}
