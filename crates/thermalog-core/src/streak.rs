//! Calendar-day streak state machine.
//!
//! A streak counts consecutive calendar days containing at least one
//! committed session. The machine is event-driven: it is advanced when
//! a session is committed for "today", never by a background timer, and
//! `last_active_day` moves only on committed sessions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-user streak state, persisted in the kv store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_active_day: Option<NaiveDate>,
}

impl StreakState {
    /// Record that a session was committed for `today`.
    ///
    /// Returns `true` if the state changed. The current streak never
    /// grows by more than 1 per distinct calendar day: repeat sessions
    /// on an already-counted day are no-ops.
    pub fn record_active_day(&mut self, today: NaiveDate) -> bool {
        match self.last_active_day {
            None => {
                self.current_streak = 1;
                self.longest_streak = self.longest_streak.max(1);
                self.last_active_day = Some(today);
                true
            }
            Some(last) => {
                let gap = (today - last).num_days();
                match gap {
                    0 => false,
                    1 => {
                        self.current_streak += 1;
                        self.longest_streak = self.longest_streak.max(self.current_streak);
                        self.last_active_day = Some(today);
                        true
                    }
                    _ => {
                        // A missed day breaks the chain; today starts a new one.
                        self.current_streak = 1;
                        self.longest_streak = self.longest_streak.max(1);
                        self.last_active_day = Some(today);
                        true
                    }
                }
            }
        }
    }

    /// Zero the current streak if at least one whole calendar day has
    /// passed without a session.
    ///
    /// With `last_active_day` equal to yesterday the streak is still
    /// extendable and is left alone. `last_active_day` itself is never
    /// touched here; only a committed session moves it.
    ///
    /// Returns `true` if the streak lapsed.
    pub fn check_lapse(&mut self, today: NaiveDate) -> bool {
        if let Some(last) = self.last_active_day {
            if (today - last).num_days() > 1 && self.current_streak > 0 {
                self.current_streak = 0;
                return true;
            }
        }
        false
    }
}
