//! Two-device synchronization scenarios with an in-process link.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;
use thermalog_core::sync::Outbox;
use thermalog_core::{
    ContextSnapshot, Database, InMemorySummary, Mailbox, Session, SessionEnvelope, SessionType,
    SyncCoordinator, SyncError, SyncMessage, SyncTransport, Tracker,
};

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, day, hour, 0, 0).unwrap()
}

/// In-process link delivering straight into the peer's mailbox while
/// the link is up, and refusing everything while it is down.
#[derive(Clone)]
struct PipeTransport {
    up: Arc<AtomicBool>,
    peer: Arc<Mutex<Option<Mailbox>>>,
}

impl PipeTransport {
    fn new(up: Arc<AtomicBool>) -> Self {
        Self {
            up,
            peer: Arc::new(Mutex::new(None)),
        }
    }

    fn connect(&self, mailbox: Mailbox) {
        *self.peer.lock().unwrap() = Some(mailbox);
    }

    fn deliver(&self, message: SyncMessage) -> Result<(), SyncError> {
        if !self.up.load(Ordering::SeqCst) {
            return Err(SyncError::Transport("link down".to_string()));
        }
        match self.peer.lock().unwrap().as_ref() {
            Some(mailbox) => {
                mailbox.push(message);
                Ok(())
            }
            None => Err(SyncError::Transport("peer not wired".to_string())),
        }
    }
}

impl SyncTransport for PipeTransport {
    fn send_event(&self, envelope: &SessionEnvelope) -> Result<(), SyncError> {
        self.deliver(SyncMessage::Event(envelope.clone()))
    }

    fn broadcast_context(&self, snapshot: &ContextSnapshot) -> Result<(), SyncError> {
        self.deliver(SyncMessage::Context(snapshot.clone()))
    }
}

struct Device {
    tracker: Tracker,
    transport: PipeTransport,
}

fn device(temp: &TempDir, name: &str, link_up: Arc<AtomicBool>, now: DateTime<Utc>) -> Device {
    let transport = PipeTransport::new(link_up);
    let outbox = Outbox::with_path(temp.path().join(format!("{name}-outbox.json")));
    let sync = SyncCoordinator::new(
        Box::new(transport.clone()),
        format!("thermalog-{name}"),
        outbox,
    );
    let tracker = Tracker::open(
        Database::open_memory().unwrap(),
        sync,
        Box::new(InMemorySummary::new()),
        now,
    )
    .unwrap();
    Device { tracker, transport }
}

fn linked_pair(temp: &TempDir, link_up: Arc<AtomicBool>, now: DateTime<Utc>) -> (Device, Device) {
    let primary = device(temp, "primary", link_up.clone(), now);
    let wearable = device(temp, "wearable", link_up, now);
    primary.transport.connect(wearable.tracker.sync().mailbox());
    wearable.transport.connect(primary.tracker.sync().mailbox());
    (primary, wearable)
}

#[test]
fn offline_queues_flush_to_union_on_reconnect() {
    let temp = TempDir::new().unwrap();
    let link_up = Arc::new(AtomicBool::new(false));
    let now = at(10, 7);
    let (mut primary, mut wearable) = linked_pair(&temp, link_up.clone(), now);

    // Both devices log locally while disconnected.
    primary
        .tracker
        .add_session_at(Session::new(SessionType::ColdPlunge, 180, now), now)
        .unwrap();
    wearable
        .tracker
        .add_session_at(Session::new(SessionType::Sauna, 900, at(10, 8)), at(10, 8))
        .unwrap();
    assert_eq!(primary.tracker.sync().pending_events(), 1);
    assert_eq!(wearable.tracker.sync().pending_events(), 1);

    // Link comes up; both sides activate and flush.
    link_up.store(true, Ordering::SeqCst);
    primary.tracker.sync_mut().begin_activation();
    primary.tracker.sync_mut().activation_completed(true);
    wearable.tracker.sync_mut().begin_activation();
    wearable.tracker.sync_mut().activation_completed(true);

    let applied_primary = primary.tracker.process_incoming(at(10, 9));
    let applied_wearable = wearable.tracker.process_incoming(at(10, 9));
    assert_eq!(applied_primary, 1);
    assert_eq!(applied_wearable, 1);

    // Union on both sides, each session counted exactly once.
    assert_eq!(primary.tracker.sessions().len(), 2);
    assert_eq!(wearable.tracker.sessions().len(), 2);
    let stats = primary.tracker.statistics_at(at(10, 9));
    assert_eq!(stats.total_cold_sessions, 1);
    assert_eq!(stats.total_sauna_sessions, 1);
}

#[test]
fn redelivered_event_applies_once() {
    let temp = TempDir::new().unwrap();
    let link_up = Arc::new(AtomicBool::new(true));
    let now = at(10, 7);
    let (mut primary, mut wearable) = linked_pair(&temp, link_up, now);
    primary.tracker.sync_mut().begin_activation();
    primary.tracker.sync_mut().activation_completed(true);
    wearable.tracker.sync_mut().begin_activation();
    wearable.tracker.sync_mut().activation_completed(true);

    let session = wearable
        .tracker
        .add_session_at(Session::new(SessionType::ColdPlunge, 120, now), now)
        .unwrap();
    assert_eq!(primary.tracker.process_incoming(now), 1);

    // The transport redelivers the same envelope (at-least-once).
    primary.tracker.sync().mailbox().push(SyncMessage::Event(SessionEnvelope {
        session,
        origin_device: "thermalog-wearable".to_string(),
        sent_at: now,
    }));
    assert_eq!(primary.tracker.process_incoming(now), 0);
    assert_eq!(primary.tracker.sessions().len(), 1);
}

#[test]
fn remote_apply_rebroadcasts_fresh_context() {
    let temp = TempDir::new().unwrap();
    let link_up = Arc::new(AtomicBool::new(true));
    let now = at(10, 7);
    let (mut primary, mut wearable) = linked_pair(&temp, link_up, now);
    primary.tracker.sync_mut().begin_activation();
    primary.tracker.sync_mut().activation_completed(true);
    wearable.tracker.sync_mut().begin_activation();
    wearable.tracker.sync_mut().activation_completed(true);

    // Wearable logs; primary applies it and re-broadcasts its counters.
    wearable
        .tracker
        .add_session_at(Session::new(SessionType::ColdPlunge, 180, now), now)
        .unwrap();
    primary.tracker.process_incoming(now);
    wearable.tracker.process_incoming(now);

    let ctx = wearable.tracker.sync().peer_context().unwrap();
    assert_eq!(ctx.origin_device, "thermalog-primary");
    assert_eq!(ctx.total_sessions, 1);
    assert_eq!(ctx.current_streak, 1);
}

#[test]
fn stale_context_does_not_regress_peer_view() {
    let temp = TempDir::new().unwrap();
    let link_up = Arc::new(AtomicBool::new(true));
    let now = at(10, 7);
    let (mut primary, _wearable) = linked_pair(&temp, link_up, now);

    let fresh = ContextSnapshot {
        current_streak: 6,
        longest_streak: 9,
        today_session_count: 2,
        total_sessions: 40,
        origin_device: "thermalog-wearable".to_string(),
        captured_at: now,
    };
    let stale = ContextSnapshot {
        current_streak: 5,
        captured_at: now - chrono::Duration::minutes(10),
        ..fresh.clone()
    };

    primary.tracker.sync().mailbox().push(SyncMessage::Context(fresh.clone()));
    primary.tracker.sync().mailbox().push(SyncMessage::Context(stale));
    primary.tracker.process_incoming(now);

    assert_eq!(primary.tracker.sync().peer_context(), Some(&fresh));
}
