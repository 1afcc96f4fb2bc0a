mod config;
pub mod database;

pub use config::Config;
pub use database::Database;

use std::path::PathBuf;

/// Returns `~/.config/thermalog[-dev]/` based on THERMALOG_ENV.
///
/// Set THERMALOG_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("THERMALOG_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("thermalog-dev")
    } else {
        base_dir.join("thermalog")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
