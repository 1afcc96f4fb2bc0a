//! User-defined goals and their per-kind update rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::{Session, SessionType};
use crate::streak::StreakState;

/// What a goal's target value is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    SessionsPerWeek,
    SessionsPerMonth,
    TotalSessions,
    StreakDays,
    TotalMinutes,
    /// A single session of at least `target` minutes completes the goal.
    MinDuration,
}

impl std::str::FromStr for TargetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sessions_per_week" => Ok(TargetKind::SessionsPerWeek),
            "sessions_per_month" => Ok(TargetKind::SessionsPerMonth),
            "total_sessions" => Ok(TargetKind::TotalSessions),
            "streak_days" => Ok(TargetKind::StreakDays),
            "total_minutes" => Ok(TargetKind::TotalMinutes),
            "min_duration" => Ok(TargetKind::MinDuration),
            other => Err(format!("unknown target kind: {other}")),
        }
    }
}

/// A user-defined progress target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub kind: TargetKind,
    pub target: u32,
    /// Fractional for total-minutes goals; compared against `target`.
    pub progress: f64,
    /// Only sessions of this type advance the goal, when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_type: Option<SessionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Goal {
    pub fn new(name: impl Into<String>, kind: TargetKind, target: u32, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            kind,
            target,
            progress: 0.0,
            session_type: None,
            ends_at: None,
            completed: false,
            completed_at: None,
            created_at: now,
        }
    }

    pub fn with_session_type(mut self, session_type: SessionType) -> Self {
        self.session_type = Some(session_type);
        self
    }

    pub fn with_end_date(mut self, ends_at: DateTime<Utc>) -> Self {
        self.ends_at = Some(ends_at);
        self
    }

    /// Active goals accept progress: not completed and not past the
    /// optional end date.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.ends_at.map_or(true, |end| now <= end)
    }

    /// Apply a committed session to this goal.
    ///
    /// Returns `true` if the goal completed in this update. Inactive
    /// goals are left untouched.
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
            self.completed = true;
            self.completed_at = Some(now);
            return true;
        }
        false
    }
}

/// The shared per-kind update rule, used by both goals and challenges.
///
/// A session whose type does not match the optional filter never
/// contributes, regardless of kind (streak-days goals track the streak
/// itself and carry no meaningful filter).
pub fn advance_progress(
    kind: TargetKind,
    target: u32,
    progress: f64,
    filter: Option<SessionType>,
    session: &Session,
    streak: &StreakState,
) -> f64 {
    let matches = filter.map_or(true, |t| t == session.session_type);
    match kind {
        TargetKind::SessionsPerWeek | TargetKind::SessionsPerMonth | TargetKind::TotalSessions => {
            if matches {
                progress + 1.0
            } else {
                progress
            }
        }
        // Overwrite, not increment: the streak is the progress.
        TargetKind::StreakDays => f64::from(streak.current_streak),
        TargetKind::TotalMinutes => {
            if matches {
                progress + session.duration_minutes()
            } else {
                progress
            }
        }
        TargetKind::MinDuration => {
            if matches && session.duration_minutes() >= f64::from(target) {
                f64::from(target)
            } else {
                progress
            }
        }
    }
}
