//! Shared challenges with a join/leave lifecycle.
//!
//! A challenge carries the same per-kind update rule as a goal but only
//! accrues progress while the user has joined it. The participant count
//! is supplied by the social backend, never computed locally.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::progress::goals::advance_progress;
use crate::progress::TargetKind;
use crate::session::{Session, SessionType};
use crate::streak::StreakState;

/// A social progress target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: String,
    pub name: String,
    pub kind: TargetKind,
    pub target: u32,
    pub progress: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_type: Option<SessionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
    /// Externally supplied by the social backend.
    pub participants: u32,
    pub joined: bool,
    pub is_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Challenge {
    pub fn new(name: impl Into<String>, kind: TargetKind, target: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            kind,
            target,
            progress: 0.0,
            session_type: None,
            ends_at: None,
            participants: 0,
            joined: false,
            is_completed: false,
            completed_at: None,
        }
    }

    pub fn with_session_type(mut self, session_type: SessionType) -> Self {
        self.session_type = Some(session_type);
        self
    }

    pub fn with_participants(mut self, participants: u32) -> Self {
        self.participants = participants;
        self
    }

    pub fn join(&mut self) {
        self.joined = true;
    }

    /// Leaving stops progress accrual; accumulated progress is kept so
    /// re-joining resumes where the user left off.
    pub fn leave(&mut self) {
        self.joined = false;
    }

    fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.joined && !self.is_completed && self.ends_at.map_or(true, |end| now <= end)
    }

    /// Apply a committed session; only joined, unfinished challenges move.
    ///
    /// Returns `true` if the challenge completed in this update.
    pub fn apply_session(
        &mut self,
        session: &Session,
        streak: &StreakState,
        now: DateTime<Utc>,
    ) -> bool {
        if !self.is_active(now) {
            return false;
        }
        self.progress = advance_progress(
            self.kind,
            self.target,
            self.progress,
            self.session_type,
            session,
            streak,
        );
        if self.progress >= f64::from(self.target) {
            self.is_completed = true;
            self.completed_at = Some(now);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unjoined_challenge_ignores_sessions() {
        let now = Utc::now();
        let mut challenge = Challenge::new("group plunge", TargetKind::TotalSessions, 2);
        let session = Session::new(SessionType::ColdPlunge, 180, now);
        assert!(!challenge.apply_session(&session, &StreakState::default(), now));
        assert_eq!(challenge.progress, 0.0);
    }

    #[test]
    fn test_total_minutes_challenge_with_type_filter() {
        let now = Utc::now();
        let mut challenge = Challenge::new("cold hour", TargetKind::TotalMinutes, 60)
            .with_session_type(SessionType::ColdPlunge);
        challenge.join();
        let streak = StreakState::default();

        // An hour of sauna does not move a cold-plunge challenge.
        let hot = Session::new(SessionType::Sauna, 3600, now);
        assert!(!challenge.apply_session(&hot, &streak, now));
        assert_eq!(challenge.progress, 0.0);

        let cold = Session::new(SessionType::ColdPlunge, 3600, now);
        assert!(challenge.apply_session(&cold, &streak, now));
        assert_eq!(challenge.progress, 60.0);
        assert!(challenge.is_completed);
    }

    #[test]
    fn test_leave_freezes_progress() {
        let now = Utc::now();
        let mut challenge = Challenge::new("five", TargetKind::TotalSessions, 5);
        challenge.join();
        let streak = StreakState::default();
        let session = Session::new(SessionType::Sauna, 600, now);

        challenge.apply_session(&session, &streak, now);
        challenge.leave();
        challenge.apply_session(&session, &streak, now);
        assert_eq!(challenge.progress, 1.0);

        challenge.join();
        challenge.apply_session(&session, &streak, now);
        assert_eq!(challenge.progress, 2.0);
    }

    #[test]
    fn test_participants_is_externally_supplied() {
        let challenge = Challenge::new("crowd", TargetKind::TotalSessions, 5).with_participants(42);
        assert_eq!(challenge.participants, 42);
    }
}
