//! # Thermalog Core Library
//!
//! This library provides the core business logic for Thermalog, a cold
//! exposure / heat therapy session tracker. It implements a CLI-first
//! philosophy where all operations are available via a standalone CLI
//! binary, with any GUI being a thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Tracker**: single-writer service object that owns the session
//!   ledger and drives the commit chain (streak, achievements, goals,
//!   challenges, summary, sync broadcast) synchronously
//! - **Storage**: SQLite-based session/progress persistence and
//!   TOML-based configuration
//! - **Sync**: durable event queue plus best-effort context snapshots
//!   between a primary device and a companion wearable
//!
//! ## Key Components
//!
//! - [`Tracker`]: the session ledger and commit pipeline
//! - [`Database`]: session and progress persistence
//! - [`SyncCoordinator`]: device-to-device message plumbing
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod progress;
pub mod session;
pub mod stats;
pub mod storage;
pub mod streak;
pub mod summary;
pub mod sync;
pub mod tracker;

pub use error::{ConfigError, CoreError, DatabaseError, StoreError};
pub use events::{CommitOrigin, CoreEvent, EventLog};
pub use progress::{
    Achievement, AchievementBook, AchievementCategory, Challenge, Goal, TargetKind,
};
pub use session::{Session, SessionType, Temperature, TemperatureUnit};
pub use stats::Statistics;
pub use storage::{Config, Database};
pub use streak::StreakState;
pub use summary::{InMemorySummary, SummaryPublisher, SummarySnapshot};
pub use sync::{
    ConnectivityState, ContextSnapshot, Mailbox, NullTransport, SessionEnvelope,
    SyncCoordinator, SyncError, SyncMessage, SyncTransport,
};
pub use tracker::{BiometricProvider, NoBiometrics, Tracker};
