//! Progress engine: achievements, goals, and challenges.
//!
//! All three are re-evaluated synchronously from the session-commit
//! path. Progress is monotone by policy: it only moves toward the
//! target, and deleting a session never claws anything back.

mod achievements;
mod challenges;
mod goals;

pub use achievements::{
    Achievement, AchievementBook, AchievementCategory, AchievementRule,
};
pub use challenges::Challenge;
pub use goals::{advance_progress, Goal, TargetKind};
