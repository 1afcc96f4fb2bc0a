//! The tracker: single-writer owner of all mutable core state.
//!
//! Every mutation (local commits, remote-session callbacks, goal edits)
//! goes through `&mut self` on one [`Tracker`], which is the serialized
//! execution context the concurrency model requires. Transport
//! callbacks never touch the tracker; they push into the coordinator's
//! mailbox and the owner calls [`Tracker::process_incoming`].
//!
//! Commit chain for every accepted session, local or remote:
//! validate, insert, persist, streak, achievements, goals, challenges,
//! summary publish, context broadcast.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::events::{CommitOrigin, CoreEvent, EventLog};
use crate::progress::{Achievement, AchievementBook, Challenge, Goal};
use crate::session::{Session, SessionType};
use crate::stats::Statistics;
use crate::storage::Database;
use crate::streak::StreakState;
use crate::summary::{SummaryPublisher, SummarySnapshot};
use crate::sync::{ContextSnapshot, SessionEnvelope, SyncCoordinator, SyncMessage};

/// Optional heart-rate source attached at session creation.
///
/// Absence of a reading must never block session creation.
pub trait BiometricProvider {
    fn current_heart_rate(&self) -> Option<u32>;
}

/// Provider used when no biometric hardware is present.
pub struct NoBiometrics;

impl BiometricProvider for NoBiometrics {
    fn current_heart_rate(&self) -> Option<u32> {
        None
    }
}

/// The session ledger and progress pipeline for one device.
pub struct Tracker {
    db: Database,
    /// Canonical in-memory collection, most recent first.
    sessions: Vec<Session>,
    streak: StreakState,
    achievements: AchievementBook,
    goals: Vec<Goal>,
    challenges: Vec<Challenge>,
    publisher: Box<dyn SummaryPublisher>,
    events: EventLog,
    sync: SyncCoordinator,
}

impl Tracker {
    /// Hydrate a tracker from persistence.
    ///
    /// Loads the session collection, streak state, achievement progress,
    /// goals, and challenges, applies the streak lapse check once
    /// against `now`, and publishes an initial summary.
    ///
    /// # Errors
    /// Returns an error if persisted state cannot be read.
    pub fn open(
        db: Database,
        sync: SyncCoordinator,
        publisher: Box<dyn SummaryPublisher>,
        now: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        let sessions = db.fetch_sessions()?;
        let mut streak = db.load_streak()?;
        if streak.check_lapse(now.date_naive()) {
            if let Err(e) = db.save_streak(&streak) {
                warn!(error = %e, "failed to persist lapsed streak");
            }
        }
        let achievements = AchievementBook::restore(db.fetch_achievements()?);
        let goals = db.fetch_goals()?;
        let challenges = db.fetch_challenges()?;

        let mut tracker = Self {
            db,
            sessions,
            streak,
            achievements,
            goals,
            challenges,
            publisher,
            events: EventLog::new(),
            sync,
        };
        tracker.refresh_summary(now);
        Ok(tracker)
    }

    // --- session commits ---

    /// Commit a locally created session, stamped with the wall clock.
    ///
    /// # Errors
    /// Returns [`CoreError::Store`] if validation fails; the session is
    /// then never persisted.
    pub fn add_session(&mut self, session: Session) -> Result<Session, CoreError> {
        self.add_session_at(session, Utc::now())
    }

    /// Commit a locally created session against an explicit clock.
    pub fn add_session_at(
        &mut self,
        session: Session,
        now: DateTime<Utc>,
    ) -> Result<Session, CoreError> {
        self.commit(session, now, CommitOrigin::Local)
    }

    /// Build a session draft, attaching a heart rate if the biometric
    /// provider has one.
    pub fn compose_session(
        session_type: SessionType,
        duration_secs: u32,
        biometrics: &dyn BiometricProvider,
        now: DateTime<Utc>,
    ) -> Session {
        let session = Session::new(session_type, duration_secs, now);
        match biometrics.current_heart_rate() {
            Some(bpm) => session.with_heart_rate(bpm),
            None => session,
        }
    }

    fn commit(
        &mut self,
        session: Session,
        now: DateTime<Utc>,
        origin: CommitOrigin,
    ) -> Result<Session, CoreError> {
        session.validate()?;

        // Insert keeping most-recent-first order; a local commit lands
        // at the head.
        let idx = self
            .sessions
            .iter()
            .position(|s| s.timestamp <= session.timestamp)
            .unwrap_or(self.sessions.len());
        self.sessions.insert(idx, session.clone());

        if let Err(e) = self.db.insert_session(&session) {
            // Recoverable: in-memory state may diverge from durable
            // storage until a retry succeeds.
            warn!(error = %e, session_id = %session.id, "failed to persist session");
        }

        let today = now.date_naive();
        if session.day() == today && self.streak.record_active_day(today) {
            if let Err(e) = self.db.save_streak(&self.streak) {
                warn!(error = %e, "failed to persist streak state");
            }
            self.events.push(CoreEvent::StreakChanged {
                current_streak: self.streak.current_streak,
                longest_streak: self.streak.longest_streak,
                at: now,
            });
        }

        let stats = Statistics::compute(&self.sessions, now);

        for unlocked in self.achievements.evaluate(&stats, &self.streak, now) {
            self.events.push(CoreEvent::AchievementUnlocked {
                key: unlocked.key,
                name: unlocked.name,
                at: now,
            });
        }
        for entry in self.achievements.entries() {
            if let Err(e) = self.db.upsert_achievement(entry) {
                warn!(error = %e, key = %entry.key, "failed to persist achievement");
            }
        }

        for goal in self.goals.iter_mut() {
            if goal.apply_session(&session, &self.streak, now) {
                self.events.push(CoreEvent::GoalCompleted {
                    goal_id: goal.id.clone(),
                    name: goal.name.clone(),
                    at: now,
                });
            }
            if let Err(e) = self.db.upsert_goal(goal) {
                warn!(error = %e, goal_id = %goal.id, "failed to persist goal");
            }
        }

        for challenge in self.challenges.iter_mut() {
            if challenge.apply_session(&session, &self.streak, now) {
                self.events.push(CoreEvent::ChallengeCompleted {
                    challenge_id: challenge.id.clone(),
                    name: challenge.name.clone(),
                    at: now,
                });
            }
            if let Err(e) = self.db.upsert_challenge(challenge) {
                warn!(error = %e, challenge_id = %challenge.id, "failed to persist challenge");
            }
        }

        self.refresh_summary(now);

        // Remote-origin sessions are not re-queued; both origins push a
        // fresh context snapshot so the peer's counters stay current.
        if origin == CommitOrigin::Local {
            self.sync.queue_event(session.clone(), now);
        }
        let snapshot = self.context_snapshot(now);
        self.sync.broadcast_context(&snapshot);

        self.events.push(CoreEvent::SessionCommitted {
            session_id: session.id.clone(),
            session_type: session.session_type,
            origin,
            at: now,
        });

        Ok(session)
    }

    /// Apply a session delivered by the peer device.
    ///
    /// Idempotent: a session id already in the ledger is dropped
    /// silently (at-least-once delivery may redeliver). Invalid
    /// payloads are dropped and logged, never committed.
    pub fn apply_remote(
        &mut self,
        envelope: SessionEnvelope,
        now: DateTime<Utc>,
    ) -> Option<Session> {
        if self.sessions.iter().any(|s| s.id == envelope.session.id) {
            debug!(session_id = %envelope.session.id, "duplicate remote session, idempotent no-op");
            return None;
        }
        if let Err(e) = envelope.session.validate() {
            warn!(error = %e, origin = %envelope.origin_device, "dropping malformed remote session");
            return None;
        }
        match self.commit(envelope.session, now, CommitOrigin::Remote) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(error = %e, "remote session commit failed");
                None
            }
        }
    }

    /// Drain the sync mailbox on the single-writer context.
    ///
    /// Returns the number of remote sessions applied.
    pub fn process_incoming(&mut self, now: DateTime<Utc>) -> usize {
        let mut applied = 0;
        for message in self.sync.mailbox().drain() {
            match message {
                SyncMessage::Event(envelope) => {
                    if self.apply_remote(envelope, now).is_some() {
                        applied += 1;
                    }
                }
                SyncMessage::Context(snapshot) => {
                    self.sync.accept_context(snapshot);
                }
            }
        }
        applied
    }

    /// Delete a session by id. Idempotent: an unknown id is logged and
    /// ignored. Already-unlocked achievements and streak state are left
    /// untouched by policy.
    pub fn delete_session(&mut self, id: &str, now: DateTime<Utc>) {
        match self.sessions.iter().position(|s| s.id == id) {
            Some(idx) => {
                self.sessions.remove(idx);
            }
            None => {
                warn!(session_id = %id, "delete for unknown session id, ignoring");
                return;
            }
        }
        if let Err(e) = self.db.delete_session(id) {
            warn!(error = %e, session_id = %id, "failed to delete persisted session");
        }
        self.refresh_summary(now);
        self.events.push(CoreEvent::SessionDeleted {
            session_id: id.to_string(),
            at: now,
        });
    }

    /// Replace a session's metadata by id.
    ///
    /// Deliberately triggers no streak or achievement recomputation:
    /// editing a past session must not retroactively alter unlocked
    /// achievements.
    ///
    /// # Errors
    /// Returns [`CoreError::Store`] if the edited record is invalid.
    pub fn update_session(
        &mut self,
        session: Session,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        session.validate()?;
        let Some(idx) = self.sessions.iter().position(|s| s.id == session.id) else {
            warn!(session_id = %session.id, "update for unknown session id, ignoring");
            return Ok(());
        };
        self.sessions[idx] = session.clone();
        // Timestamp edits may move it in the ordering.
        self.sessions
            .sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        if let Err(e) = self.db.update_session(&session) {
            warn!(error = %e, session_id = %session.id, "failed to persist session update");
        }
        self.events.push(CoreEvent::SessionUpdated {
            session_id: session.id,
            at: now,
        });
        Ok(())
    }

    // --- queries (pure filters over the in-memory collection) ---

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn sessions_for_date(&self, date: NaiveDate) -> Vec<&Session> {
        self.sessions.iter().filter(|s| s.day() == date).collect()
    }

    pub fn sessions_for_week(&self, containing: NaiveDate) -> Vec<&Session> {
        use chrono::Datelike;
        let week = containing.iso_week();
        self.sessions
            .iter()
            .filter(|s| s.day().iso_week() == week)
            .collect()
    }

    pub fn sessions_for_month(&self, containing: NaiveDate) -> Vec<&Session> {
        use chrono::Datelike;
        self.sessions
            .iter()
            .filter(|s| {
                let day = s.day();
                day.year() == containing.year() && day.month() == containing.month()
            })
            .collect()
    }

    pub fn sessions_of_type(&self, session_type: SessionType) -> Vec<&Session> {
        self.sessions
            .iter()
            .filter(|s| s.session_type == session_type)
            .collect()
    }

    /// Recompute statistics from the current collection.
    pub fn statistics_at(&self, now: DateTime<Utc>) -> Statistics {
        Statistics::compute(&self.sessions, now)
    }

    pub fn statistics(&self) -> Statistics {
        self.statistics_at(Utc::now())
    }

    pub fn streak(&self) -> &StreakState {
        &self.streak
    }

    pub fn achievements(&self) -> &[Achievement] {
        self.achievements.entries()
    }

    // --- goals & challenges ---

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn add_goal(&mut self, goal: Goal) {
        if let Err(e) = self.db.upsert_goal(&goal) {
            warn!(error = %e, goal_id = %goal.id, "failed to persist goal");
        }
        self.goals.push(goal);
    }

    /// Replace a goal's definition by id, keeping accumulated progress
    /// and completion state. Unknown ids are logged and ignored.
    pub fn update_goal(&mut self, goal: Goal) {
        match self.goals.iter_mut().find(|g| g.id == goal.id) {
            Some(existing) => {
                existing.name = goal.name;
                existing.kind = goal.kind;
                existing.target = goal.target;
                existing.session_type = goal.session_type;
                existing.ends_at = goal.ends_at;
                if let Err(e) = self.db.upsert_goal(existing) {
                    warn!(error = %e, goal_id = %existing.id, "failed to persist goal");
                }
            }
            None => warn!(goal_id = %goal.id, "update for unknown goal id, ignoring"),
        }
    }

    /// Idempotent: removing an unknown goal id is a logged no-op.
    pub fn remove_goal(&mut self, id: &str) {
        match self.goals.iter().position(|g| g.id == id) {
            Some(idx) => {
                self.goals.remove(idx);
                if let Err(e) = self.db.delete_goal(id) {
                    warn!(error = %e, goal_id = %id, "failed to delete persisted goal");
                }
            }
            None => warn!(goal_id = %id, "remove for unknown goal id, ignoring"),
        }
    }

    pub fn challenges(&self) -> &[Challenge] {
        &self.challenges
    }

    /// Insert or replace a challenge from the social backend, keeping
    /// local join state and progress for a known id.
    pub fn upsert_challenge(&mut self, challenge: Challenge) {
        let idx = match self.challenges.iter().position(|c| c.id == challenge.id) {
            Some(idx) => {
                let existing = &mut self.challenges[idx];
                existing.name = challenge.name;
                existing.participants = challenge.participants;
                existing.ends_at = challenge.ends_at;
                idx
            }
            None => {
                self.challenges.push(challenge);
                self.challenges.len() - 1
            }
        };
        let stored = &self.challenges[idx];
        if let Err(e) = self.db.upsert_challenge(stored) {
            warn!(error = %e, challenge_id = %stored.id, "failed to persist challenge");
        }
    }

    /// Returns `false` if the id is unknown.
    pub fn join_challenge(&mut self, id: &str) -> bool {
        self.set_challenge_joined(id, true)
    }

    pub fn leave_challenge(&mut self, id: &str) -> bool {
        self.set_challenge_joined(id, false)
    }

    fn set_challenge_joined(&mut self, id: &str, joined: bool) -> bool {
        match self.challenges.iter_mut().find(|c| c.id == id) {
            Some(challenge) => {
                if joined {
                    challenge.join();
                } else {
                    challenge.leave();
                }
                if let Err(e) = self.db.upsert_challenge(challenge) {
                    warn!(error = %e, challenge_id = %id, "failed to persist challenge");
                }
                true
            }
            None => false,
        }
    }

    // --- summary & sync ---

    /// The current glanceable snapshot.
    pub fn current_summary(&self, now: DateTime<Utc>) -> SummarySnapshot {
        let today = now.date_naive();
        SummarySnapshot {
            current_streak: self.streak.current_streak,
            today_session_count: self.sessions.iter().filter(|s| s.day() == today).count() as u32,
            last_session_type: self.sessions.first().map(|s| s.session_type),
            total_sessions: self.sessions.len() as u64,
            last_update: now,
        }
    }

    fn refresh_summary(&mut self, now: DateTime<Utc>) {
        let snapshot = self.current_summary(now);
        self.publisher.publish(&snapshot);
        self.events.push(CoreEvent::SummaryRefreshed { at: now });
    }

    fn context_snapshot(&self, now: DateTime<Utc>) -> ContextSnapshot {
        let today = now.date_naive();
        ContextSnapshot {
            current_streak: self.streak.current_streak,
            longest_streak: self.streak.longest_streak,
            today_session_count: self.sessions.iter().filter(|s| s.day() == today).count() as u32,
            total_sessions: self.sessions.len() as u64,
            origin_device: self.sync.device_id().to_string(),
            captured_at: now,
        }
    }

    pub fn sync(&self) -> &SyncCoordinator {
        &self.sync
    }

    pub fn sync_mut(&mut self) -> &mut SyncCoordinator {
        &mut self.sync
    }

    /// Drain buffered core events, oldest first.
    pub fn drain_events(&mut self) -> Vec<CoreEvent> {
        self.events.drain()
    }
}
