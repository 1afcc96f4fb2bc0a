//! SQLite-backed persistence port.
//!
//! Durable CRUD for sessions, goals, challenges, and achievement
//! progress, plus a key-value store for singleton state (streak,
//! latest summary). Each call is a single transaction from the
//! caller's perspective; no partial records are ever visible.
//!
//! Sessions get real columns since they are queried; goals, challenges,
//! and achievements are stored as JSON documents keyed by id.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::progress::{Achievement, Challenge, Goal};
use crate::session::{Session, SessionType, Temperature, TemperatureUnit};
use crate::streak::StreakState;

use super::data_dir;

const KV_STREAK: &str = "streak_state";
const KV_DEVICE_ID: &str = "device_id";
const DEVICE_ID_PREFIX: &str = "thermalog-";

/// SQLite database holding everything the tracker persists.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/thermalog/thermalog.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, DatabaseError> {
        let path = data_dir()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?
            .join("thermalog.db");
        Self::open_at(&path)
    }

    /// Open a database at an explicit path.
    pub fn open_at(path: &std::path::Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests and dry runs).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS sessions (
                    id            TEXT PRIMARY KEY,
                    session_type  TEXT NOT NULL,
                    timestamp     TEXT NOT NULL,
                    duration_secs INTEGER NOT NULL,
                    temp_value    REAL,
                    temp_unit     TEXT,
                    heart_rate    INTEGER,
                    note          TEXT,
                    protocol      TEXT
                );

                CREATE TABLE IF NOT EXISTS goals (
                    id   TEXT PRIMARY KEY,
                    data TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS challenges (
                    id   TEXT PRIMARY KEY,
                    data TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS achievements (
                    id   TEXT PRIMARY KEY,
                    data TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_sessions_timestamp ON sessions(timestamp);
                CREATE INDEX IF NOT EXISTS idx_sessions_type ON sessions(session_type);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    // --- sessions ---

    /// Insert a session record.
    ///
    /// # Errors
    /// Returns an error if the insert fails (including duplicate id).
    pub fn insert_session(&self, session: &Session) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO sessions (id, session_type, timestamp, duration_secs,
                                   temp_value, temp_unit, heart_rate, note, protocol)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                session.id,
                session.session_type.as_str(),
                session.timestamp.to_rfc3339(),
                session.duration_secs,
                session.temperature.map(|t| t.value),
                session.temperature.map(|t| unit_str(t.unit)),
                session.heart_rate,
                session.note,
                session.protocol,
            ],
        )?;
        Ok(())
    }

    /// Replace a session record by id.
    pub fn update_session(&self, session: &Session) -> Result<(), DatabaseError> {
        self.conn.execute(
            "UPDATE sessions SET session_type = ?2, timestamp = ?3, duration_secs = ?4,
                    temp_value = ?5, temp_unit = ?6, heart_rate = ?7, note = ?8, protocol = ?9
             WHERE id = ?1",
            params![
                session.id,
                session.session_type.as_str(),
                session.timestamp.to_rfc3339(),
                session.duration_secs,
                session.temperature.map(|t| t.value),
                session.temperature.map(|t| unit_str(t.unit)),
                session.heart_rate,
                session.note,
                session.protocol,
            ],
        )?;
        Ok(())
    }

    /// Delete a session; returns whether a row was removed.
    pub fn delete_session(&self, id: &str) -> Result<bool, DatabaseError> {
        let affected = self
            .conn
            .execute("DELETE FROM sessions WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    /// Fetch all sessions, most recent first.
    pub fn fetch_sessions(&self) -> Result<Vec<Session>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_type, timestamp, duration_secs,
                    temp_value, temp_unit, heart_rate, note, protocol
             FROM sessions ORDER BY timestamp DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, u32>(3)?,
                row.get::<_, Option<f64>>(4)?,
                row.get::<_, Option<String>>(5)?,
                row.get::<_, Option<u32>>(6)?,
                row.get::<_, Option<String>>(7)?,
                row.get::<_, Option<String>>(8)?,
            ))
        })?;

        let mut sessions = Vec::new();
        for row in rows {
            let (id, type_str, ts, duration_secs, temp_value, temp_unit, heart_rate, note, protocol) =
                row?;
            let session_type = parse_session_type(&id, &type_str)?;
            let timestamp = DateTime::parse_from_rfc3339(&ts)
                .map_err(|e| DatabaseError::CorruptRecord {
                    key: id.clone(),
                    message: format!("bad timestamp: {e}"),
                })?
                .with_timezone(&Utc);
            let temperature = match (temp_value, temp_unit.as_deref()) {
                (Some(value), Some(unit)) => Some(Temperature {
                    value,
                    unit: parse_unit(&id, unit)?,
                }),
                _ => None,
            };
            sessions.push(Session {
                id,
                session_type,
                timestamp,
                duration_secs,
                temperature,
                heart_rate,
                note,
                protocol,
            });
        }
        Ok(sessions)
    }

    // --- goals / challenges / achievements (JSON documents) ---

    pub fn upsert_goal(&self, goal: &Goal) -> Result<(), DatabaseError> {
        self.upsert_doc("goals", &goal.id, goal)
    }

    pub fn delete_goal(&self, id: &str) -> Result<bool, DatabaseError> {
        let affected = self
            .conn
            .execute("DELETE FROM goals WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    pub fn fetch_goals(&self) -> Result<Vec<Goal>, DatabaseError> {
        self.fetch_docs("goals")
    }

    pub fn upsert_challenge(&self, challenge: &Challenge) -> Result<(), DatabaseError> {
        self.upsert_doc("challenges", &challenge.id, challenge)
    }

    pub fn delete_challenge(&self, id: &str) -> Result<bool, DatabaseError> {
        let affected = self
            .conn
            .execute("DELETE FROM challenges WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    pub fn fetch_challenges(&self) -> Result<Vec<Challenge>, DatabaseError> {
        self.fetch_docs("challenges")
    }

    pub fn upsert_achievement(&self, achievement: &Achievement) -> Result<(), DatabaseError> {
        self.upsert_doc("achievements", &achievement.key, achievement)
    }

    pub fn fetch_achievements(&self) -> Result<Vec<Achievement>, DatabaseError> {
        self.fetch_docs("achievements")
    }

    fn upsert_doc<T: serde::Serialize>(
        &self,
        table: &str,
        id: &str,
        doc: &T,
    ) -> Result<(), DatabaseError> {
        let data = serde_json::to_string(doc).map_err(|e| DatabaseError::CorruptRecord {
            key: id.to_string(),
            message: e.to_string(),
        })?;
        self.conn.execute(
            &format!("INSERT OR REPLACE INTO {table} (id, data) VALUES (?1, ?2)"),
            params![id, data],
        )?;
        Ok(())
    }

    fn fetch_docs<T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
    ) -> Result<Vec<T>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT id, data FROM {table}"))?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut docs = Vec::new();
        for row in rows {
            let (id, data) = row?;
            let doc = serde_json::from_str(&data).map_err(|e| DatabaseError::CorruptRecord {
                key: id,
                message: e.to_string(),
            })?;
            docs.push(doc);
        }
        Ok(docs)
    }

    // --- kv / singleton state ---

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt
            .query_row(params![key], |row| row.get::<_, String>(0))
            .optional()?;
        Ok(result)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn save_streak(&self, streak: &StreakState) -> Result<(), DatabaseError> {
        let data = serde_json::to_string(streak).map_err(|e| DatabaseError::CorruptRecord {
            key: KV_STREAK.to_string(),
            message: e.to_string(),
        })?;
        self.kv_set(KV_STREAK, &data)
    }

    /// Stable per-install device identity, minted on first read and
    /// stored in the kv table. Format: `thermalog-<uuid>`.
    pub fn device_id(&self) -> Result<String, DatabaseError> {
        if let Some(id) = self.kv_get(KV_DEVICE_ID)? {
            if id.starts_with(DEVICE_ID_PREFIX) {
                return Ok(id);
            }
            return Err(DatabaseError::CorruptRecord {
                key: KV_DEVICE_ID.to_string(),
                message: format!("bad device id: {id}"),
            });
        }
        let id = format!("{DEVICE_ID_PREFIX}{}", Uuid::new_v4());
        self.kv_set(KV_DEVICE_ID, &id)?;
        Ok(id)
    }

    pub fn load_streak(&self) -> Result<StreakState, DatabaseError> {
        match self.kv_get(KV_STREAK)? {
            None => Ok(StreakState::default()),
            Some(data) => {
                serde_json::from_str(&data).map_err(|e| DatabaseError::CorruptRecord {
                    key: KV_STREAK.to_string(),
                    message: e.to_string(),
                })
            }
        }
    }
}

fn unit_str(unit: TemperatureUnit) -> &'static str {
    match unit {
        TemperatureUnit::Fahrenheit => "f",
        TemperatureUnit::Celsius => "c",
    }
}

fn parse_unit(id: &str, s: &str) -> Result<TemperatureUnit, DatabaseError> {
    match s {
        "f" => Ok(TemperatureUnit::Fahrenheit),
        "c" => Ok(TemperatureUnit::Celsius),
        other => Err(DatabaseError::CorruptRecord {
            key: id.to_string(),
            message: format!("bad temperature unit: {other}"),
        }),
    }
}

fn parse_session_type(id: &str, s: &str) -> Result<SessionType, DatabaseError> {
    match s {
        "cold_plunge" => Ok(SessionType::ColdPlunge),
        "sauna" => Ok(SessionType::Sauna),
        other => Err(DatabaseError::CorruptRecord {
            key: id.to_string(),
            message: format!("bad session type: {other}"),
        }),
    }
}
