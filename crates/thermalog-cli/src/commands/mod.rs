pub mod achievements;
pub mod challenges;
pub mod config;
pub mod goals;
pub mod log;
pub mod sessions;
pub mod stats;
pub mod sync;
