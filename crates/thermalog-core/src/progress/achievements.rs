//! Fixed achievement catalog and its rule table.
//!
//! Each catalog entry maps to a counter over [`Statistics`] and
//! [`StreakState`]. On every session commit all rules are re-evaluated;
//! rules are independent so evaluation order does not matter. Once an
//! entry unlocks it stays unlocked with its unlock date frozen.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stats::Statistics;
use crate::streak::StreakState;

/// Grouping used by list surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementCategory {
    Milestone,
    ColdExposure,
    Heat,
    Streak,
    Endurance,
}

/// Which counter an achievement's requirement is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementRule {
    TotalSessions,
    ColdSessions,
    SaunaSessions,
    CurrentStreak,
    TotalMinutes,
}

impl AchievementRule {
    fn counter(&self, stats: &Statistics, streak: &StreakState) -> u64 {
        match self {
            AchievementRule::TotalSessions => stats.total_sessions,
            AchievementRule::ColdSessions => stats.total_cold_sessions,
            AchievementRule::SaunaSessions => stats.total_sauna_sessions,
            AchievementRule::CurrentStreak => u64::from(streak.current_streak),
            AchievementRule::TotalMinutes => stats.total_minutes(),
        }
    }
}

struct CatalogEntry {
    key: &'static str,
    name: &'static str,
    category: AchievementCategory,
    rule: AchievementRule,
    requirement: u32,
}

const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        key: "first_plunge",
        name: "First Plunge",
        category: AchievementCategory::ColdExposure,
        rule: AchievementRule::ColdSessions,
        requirement: 1,
    },
    CatalogEntry {
        key: "cold_ten",
        name: "Ice Regular",
        category: AchievementCategory::ColdExposure,
        rule: AchievementRule::ColdSessions,
        requirement: 10,
    },
    CatalogEntry {
        key: "cold_fifty",
        name: "Polar Veteran",
        category: AchievementCategory::ColdExposure,
        rule: AchievementRule::ColdSessions,
        requirement: 50,
    },
    CatalogEntry {
        key: "first_sauna",
        name: "First Sauna",
        category: AchievementCategory::Heat,
        rule: AchievementRule::SaunaSessions,
        requirement: 1,
    },
    CatalogEntry {
        key: "sauna_twenty",
        name: "Heat Seeker",
        category: AchievementCategory::Heat,
        rule: AchievementRule::SaunaSessions,
        requirement: 20,
    },
    CatalogEntry {
        key: "sessions_ten",
        name: "Getting Started",
        category: AchievementCategory::Milestone,
        rule: AchievementRule::TotalSessions,
        requirement: 10,
    },
    CatalogEntry {
        key: "sessions_hundred",
        name: "Centurion",
        category: AchievementCategory::Milestone,
        rule: AchievementRule::TotalSessions,
        requirement: 100,
    },
    CatalogEntry {
        key: "streak_three",
        name: "Warming Up",
        category: AchievementCategory::Streak,
        rule: AchievementRule::CurrentStreak,
        requirement: 3,
    },
    CatalogEntry {
        key: "streak_seven",
        name: "Week of Grit",
        category: AchievementCategory::Streak,
        rule: AchievementRule::CurrentStreak,
        requirement: 7,
    },
    CatalogEntry {
        key: "streak_thirty",
        name: "Iron Month",
        category: AchievementCategory::Streak,
        rule: AchievementRule::CurrentStreak,
        requirement: 30,
    },
    CatalogEntry {
        key: "minutes_sixty",
        name: "First Hour",
        category: AchievementCategory::Endurance,
        rule: AchievementRule::TotalMinutes,
        requirement: 60,
    },
    CatalogEntry {
        key: "minutes_thousand",
        name: "Deep Soak",
        category: AchievementCategory::Endurance,
        rule: AchievementRule::TotalMinutes,
        requirement: 1000,
    },
];

/// A catalog entry with the user's progress against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub key: String,
    pub name: String,
    pub category: AchievementCategory,
    pub rule: AchievementRule,
    pub requirement: u32,
    /// Clamped at `requirement`; never decreases while locked.
    pub progress: u32,
    pub unlocked: bool,
    /// Set once at unlock time, immutable after.
    pub unlocked_at: Option<DateTime<Utc>>,
}

/// The full catalog with per-entry progress.
#[derive(Debug, Clone)]
pub struct AchievementBook {
    entries: Vec<Achievement>,
}

impl AchievementBook {
    /// Fresh book with zero progress everywhere.
    pub fn from_catalog() -> Self {
        let entries = CATALOG
            .iter()
            .map(|def| Achievement {
                key: def.key.to_string(),
                name: def.name.to_string(),
                category: def.category,
                rule: def.rule,
                requirement: def.requirement,
                progress: 0,
                unlocked: false,
                unlocked_at: None,
            })
            .collect();
        Self { entries }
    }

    /// Rebuild the book from persisted entries, merged onto the current
    /// catalog by key. Entries for keys no longer in the catalog are
    /// dropped; new catalog entries start at zero.
    pub fn restore(saved: Vec<Achievement>) -> Self {
        let mut book = Self::from_catalog();
        for entry in book.entries.iter_mut() {
            if let Some(prev) = saved.iter().find(|s| s.key == entry.key) {
                entry.progress = prev.progress.min(entry.requirement);
                entry.unlocked = prev.unlocked;
                entry.unlocked_at = prev.unlocked_at;
            }
        }
        book
    }

    pub fn entries(&self) -> &[Achievement] {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<&Achievement> {
        self.entries.iter().find(|a| a.key == key)
    }

    /// Re-evaluate every rule against the current aggregates.
    ///
    /// Locked entries move their progress to the rule counter (clamped
    /// at the requirement, never downward); entries reaching their
    /// requirement unlock permanently with `now` as the unlock date.
    /// Returns clones of the entries that unlocked in this pass.
    pub fn evaluate(
        &mut self,
        stats: &Statistics,
        streak: &StreakState,
        now: DateTime<Utc>,
    ) -> Vec<Achievement> {
        let mut unlocked = Vec::new();
        for entry in self.entries.iter_mut() {
            if entry.unlocked {
                continue;
            }
            let counter = entry.rule.counter(stats, streak);
            let clamped = counter.min(u64::from(entry.requirement)) as u32;
            entry.progress = entry.progress.max(clamped);
            if entry.progress >= entry.requirement {
                entry.unlocked = true;
                entry.unlocked_at = Some(now);
                unlocked.push(entry.clone());
            }
        }
        unlocked
    }
}
