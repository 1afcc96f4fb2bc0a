//! End-to-end commit-chain scenarios through the public API.

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use tempfile::TempDir;
use thermalog_core::{
    Challenge, Database, Goal, InMemorySummary, NullTransport, Session, SessionType,
    SyncCoordinator, TargetKind, Temperature, Tracker,
};
use thermalog_core::sync::Outbox;

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, day, hour, 0, 0).unwrap()
}

fn open_tracker(temp: &TempDir, db: Database, now: DateTime<Utc>) -> Tracker {
    let outbox = Outbox::with_path(temp.path().join("outbox.json"));
    let sync = SyncCoordinator::new(
        Box::new(NullTransport),
        "thermalog-primary".to_string(),
        outbox,
    );
    Tracker::open(db, sync, Box::new(InMemorySummary::new()), now).unwrap()
}

fn fresh_tracker(temp: &TempDir, now: DateTime<Utc>) -> Tracker {
    open_tracker(temp, Database::open_memory().unwrap(), now)
}

#[test]
fn first_ever_plunge_unlocks_and_starts_streak() {
    let temp = TempDir::new().unwrap();
    let now = at(10, 7);
    let mut tracker = fresh_tracker(&temp, now);

    let session = Session::new(SessionType::ColdPlunge, 180, now)
        .with_temperature(Temperature::fahrenheit(50.0));
    tracker.add_session_at(session, now).unwrap();

    let stats = tracker.statistics_at(now);
    assert_eq!(stats.total_cold_sessions, 1);
    assert_eq!(stats.average_temperature_f, Some(50.0));

    let first_plunge = tracker
        .achievements()
        .iter()
        .find(|a| a.key == "first_plunge")
        .unwrap();
    assert!(first_plunge.unlocked);
    assert_eq!(first_plunge.requirement, 1);
    assert!(first_plunge.unlocked_at.is_some());

    assert_eq!(tracker.streak().current_streak, 1);
    assert_eq!(tracker.current_summary(now).today_session_count, 1);
}

#[test]
fn gap_day_resets_streak_but_longest_survives() {
    let temp = TempDir::new().unwrap();
    let mut tracker = fresh_tracker(&temp, at(10, 7));

    tracker
        .add_session_at(Session::new(SessionType::ColdPlunge, 120, at(10, 7)), at(10, 7))
        .unwrap();
    tracker
        .add_session_at(Session::new(SessionType::Sauna, 900, at(11, 7)), at(11, 7))
        .unwrap();
    assert_eq!(tracker.streak().current_streak, 2);

    // Nothing on day 12; a session on day 13 starts a fresh chain.
    tracker
        .add_session_at(Session::new(SessionType::ColdPlunge, 120, at(13, 7)), at(13, 7))
        .unwrap();
    assert_eq!(tracker.streak().current_streak, 1);
    assert_eq!(tracker.streak().longest_streak, 2);
}

#[test]
fn typed_minutes_challenge_ignores_other_type() {
    let temp = TempDir::new().unwrap();
    let now = at(10, 7);
    let mut tracker = fresh_tracker(&temp, now);

    let challenge = Challenge::new("cold hour", TargetKind::TotalMinutes, 60)
        .with_session_type(SessionType::ColdPlunge)
        .with_participants(17);
    let id = challenge.id.clone();
    tracker.upsert_challenge(challenge);
    assert!(tracker.join_challenge(&id));

    tracker
        .add_session_at(Session::new(SessionType::Sauna, 3600, now), now)
        .unwrap();
    assert_eq!(tracker.challenges()[0].progress, 0.0);
    assert!(!tracker.challenges()[0].is_completed);

    tracker
        .add_session_at(Session::new(SessionType::ColdPlunge, 3600, at(10, 9)), at(10, 9))
        .unwrap();
    assert_eq!(tracker.challenges()[0].progress, 60.0);
    assert!(tracker.challenges()[0].is_completed);
}

#[test]
fn min_duration_goal_needs_one_qualifying_session() {
    let temp = TempDir::new().unwrap();
    let now = at(10, 7);
    let mut tracker = fresh_tracker(&temp, now);

    tracker.add_goal(Goal::new("long plunge", TargetKind::MinDuration, 5, now));

    // 4 minutes: not enough.
    tracker
        .add_session_at(Session::new(SessionType::ColdPlunge, 240, now), now)
        .unwrap();
    assert!(tracker.goals()[0].progress < 5.0);
    assert!(!tracker.goals()[0].completed);

    // 6 minutes: progress jumps straight to the target.
    tracker
        .add_session_at(Session::new(SessionType::ColdPlunge, 360, at(10, 9)), at(10, 9))
        .unwrap();
    assert_eq!(tracker.goals()[0].progress, 5.0);
    assert!(tracker.goals()[0].completed);
}

#[test]
fn hydration_restores_state_and_applies_lapse() {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("thermalog.db");

    {
        let db = Database::open_at(&db_path).unwrap();
        let mut tracker = open_tracker(&temp, db, at(10, 7));
        tracker
            .add_session_at(Session::new(SessionType::ColdPlunge, 180, at(10, 7)), at(10, 7))
            .unwrap();
        tracker
            .add_session_at(Session::new(SessionType::Sauna, 900, at(11, 7)), at(11, 7))
            .unwrap();
        assert_eq!(tracker.streak().current_streak, 2);
    }

    // Reopen two days later: sessions and unlocks are back, and the
    // streak reads as lapsed without waiting for the next commit.
    let db = Database::open_at(&db_path).unwrap();
    let tracker = open_tracker(&temp, db, at(13, 7));
    assert_eq!(tracker.sessions().len(), 2);
    assert_eq!(tracker.sessions()[0].session_type, SessionType::Sauna);
    assert!(tracker
        .achievements()
        .iter()
        .any(|a| a.key == "first_plunge" && a.unlocked));
    assert_eq!(tracker.streak().current_streak, 0);
    assert_eq!(tracker.streak().longest_streak, 2);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// statistics().total_sessions always equals the number of
    /// non-deleted sessions, across any add/delete sequence.
    #[test]
    fn prop_statistics_counts_live_sessions(ops in prop::collection::vec(any::<(bool, u8)>(), 1..40)) {
        let temp = TempDir::new().unwrap();
        let now = at(10, 7);
        let mut tracker = fresh_tracker(&temp, now);
        let mut live: Vec<String> = Vec::new();

        for (is_add, pick) in ops {
            if is_add || live.is_empty() {
                let duration = 60 + u32::from(pick);
                let session = tracker
                    .add_session_at(Session::new(SessionType::ColdPlunge, duration, now), now)
                    .unwrap();
                live.push(session.id);
            } else {
                let idx = usize::from(pick) % live.len();
                let id = live.remove(idx);
                tracker.delete_session(&id, now);
            }
            prop_assert_eq!(tracker.statistics_at(now).total_sessions, live.len() as u64);
        }
    }

    /// Locked achievement progress never decreases, and an unlocked
    /// achievement never re-locks, across any session sequence.
    #[test]
    fn prop_achievement_progress_is_monotone(durations in prop::collection::vec(60u32..4000, 1..30)) {
        let temp = TempDir::new().unwrap();
        let mut tracker = fresh_tracker(&temp, at(1, 7));
        let mut last: std::collections::HashMap<String, (u32, bool)> = std::collections::HashMap::new();

        for (i, duration) in durations.into_iter().enumerate() {
            let day = 1 + (i as u32 % 28);
            let session_type = if duration % 2 == 0 {
                SessionType::ColdPlunge
            } else {
                SessionType::Sauna
            };
            tracker
                .add_session_at(Session::new(session_type, duration, at(day, 7)), at(day, 7))
                .unwrap();

            for entry in tracker.achievements() {
                if let Some(&(prev_progress, prev_unlocked)) = last.get(&entry.key) {
                    if !entry.unlocked {
                        prop_assert!(entry.progress >= prev_progress);
                    }
                    if prev_unlocked {
                        prop_assert!(entry.unlocked);
                    }
                }
                last.insert(entry.key.clone(), (entry.progress, entry.unlocked));
            }
        }
    }
}
