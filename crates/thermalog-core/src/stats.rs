//! Aggregate statistics over the session ledger.
//!
//! Statistics are derived, never persisted: they are recomputed from
//! the full in-memory collection on every read, so aggregates can never
//! go stale. O(n) in session count, which is acceptable at realistic
//! per-user volumes (low thousands).

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::session::{Session, SessionType};

/// Derived aggregates over the session collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_sessions: u64,
    pub total_cold_sessions: u64,
    pub total_sauna_sessions: u64,
    pub total_duration_secs: u64,
    pub average_duration_secs: f64,
    /// Average over sessions that recorded a temperature, in Fahrenheit.
    pub average_temperature_f: Option<f64>,
    /// Sessions in the ISO week containing `now`.
    pub sessions_this_week: u64,
    /// Sessions in the calendar month containing `now`.
    pub sessions_this_month: u64,
}

impl Statistics {
    /// Total logged minutes across all sessions.
    pub fn total_minutes(&self) -> u64 {
        self.total_duration_secs / 60
    }

    /// Recompute the full structure from the session collection.
    pub fn compute(sessions: &[Session], now: DateTime<Utc>) -> Self {
        let mut stats = Statistics::default();
        let mut temp_sum = 0.0;
        let mut temp_count = 0u64;

        let today = now.date_naive();
        let this_week = today.iso_week();

        for session in sessions {
            stats.total_sessions += 1;
            stats.total_duration_secs += u64::from(session.duration_secs);
            match session.session_type {
                SessionType::ColdPlunge => stats.total_cold_sessions += 1,
                SessionType::Sauna => stats.total_sauna_sessions += 1,
            }

            if let Some(temp) = session.temperature {
                temp_sum += temp.as_fahrenheit();
                temp_count += 1;
            }

            let day = session.day();
            if day.iso_week() == this_week {
                stats.sessions_this_week += 1;
            }
            if day.year() == today.year() && day.month() == today.month() {
                stats.sessions_this_month += 1;
            }
        }

        if stats.total_sessions > 0 {
            stats.average_duration_secs =
                stats.total_duration_secs as f64 / stats.total_sessions as f64;
        }
        if temp_count > 0 {
            stats.average_temperature_f = Some(temp_sum / temp_count as f64);
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Temperature;
    use chrono::TimeZone;

    fn session_at(
        session_type: SessionType,
        duration_secs: u32,
        at: DateTime<Utc>,
    ) -> Session {
        Session::new(session_type, duration_secs, at)
    }

    #[test]
    fn test_empty_collection() {
        let stats = Statistics::compute(&[], Utc::now());
        assert_eq!(stats, Statistics::default());
    }

    #[test]
    fn test_per_type_counts_and_durations() {
        let now = Utc::now();
        let sessions = vec![
            session_at(SessionType::ColdPlunge, 180, now),
            session_at(SessionType::ColdPlunge, 120, now),
            session_at(SessionType::Sauna, 900, now),
        ];
        let stats = Statistics::compute(&sessions, now);
        assert_eq!(stats.total_sessions, 3);
        assert_eq!(stats.total_cold_sessions, 2);
        assert_eq!(stats.total_sauna_sessions, 1);
        assert_eq!(stats.total_duration_secs, 1200);
        assert_eq!(stats.average_duration_secs, 400.0);
        assert_eq!(stats.total_minutes(), 20);
    }

    #[test]
    fn test_average_temperature_skips_sessions_without_one() {
        let now = Utc::now();
        let sessions = vec![
            session_at(SessionType::ColdPlunge, 180, now)
                .with_temperature(Temperature::fahrenheit(50.0)),
            session_at(SessionType::ColdPlunge, 180, now)
                .with_temperature(Temperature::celsius(10.0)),
            session_at(SessionType::Sauna, 900, now),
        ];
        let stats = Statistics::compute(&sessions, now);
        assert_eq!(stats.average_temperature_f, Some(50.0));
    }

    #[test]
    fn test_week_and_month_windows() {
        // Wednesday 2026-08-19; same ISO week spans Mon 17th - Sun 23rd.
        let now = Utc.with_ymd_and_hms(2026, 8, 19, 12, 0, 0).unwrap();
        let sessions = vec![
            session_at(SessionType::ColdPlunge, 60, now),
            session_at(
                SessionType::ColdPlunge,
                60,
                Utc.with_ymd_and_hms(2026, 8, 17, 6, 0, 0).unwrap(),
            ),
            // Same month, previous week
            session_at(
                SessionType::Sauna,
                60,
                Utc.with_ymd_and_hms(2026, 8, 3, 6, 0, 0).unwrap(),
            ),
            // Previous month
            session_at(
                SessionType::Sauna,
                60,
                Utc.with_ymd_and_hms(2026, 7, 30, 6, 0, 0).unwrap(),
            ),
        ];
        let stats = Statistics::compute(&sessions, now);
        assert_eq!(stats.sessions_this_week, 2);
        assert_eq!(stats.sessions_this_month, 3);
        assert_eq!(stats.total_sessions, 4);
    }
}
