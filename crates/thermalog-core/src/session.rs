//! Session records.
//!
//! A [`Session`] is one logged cold-exposure or heat-therapy occurrence.
//! Sessions are immutable after creation apart from metadata edits, and
//! are owned exclusively by the [`Tracker`](crate::Tracker): they enter
//! either through local logging or through the sync coordinator when the
//! companion device created them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;

/// The two kinds of logged exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    ColdPlunge,
    Sauna,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::ColdPlunge => "cold_plunge",
            SessionType::Sauna => "sauna",
        }
    }
}

impl std::str::FromStr for SessionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cold_plunge" | "cold" | "plunge" => Ok(SessionType::ColdPlunge),
            "sauna" | "heat" => Ok(SessionType::Sauna),
            other => Err(format!("unknown session type: {other}")),
        }
    }
}

impl std::fmt::Display for SessionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Temperature unit for a recorded water/air temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureUnit {
    Fahrenheit,
    Celsius,
}

/// A recorded temperature with its unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    pub value: f64,
    pub unit: TemperatureUnit,
}

impl Temperature {
    pub fn fahrenheit(value: f64) -> Self {
        Self {
            value,
            unit: TemperatureUnit::Fahrenheit,
        }
    }

    pub fn celsius(value: f64) -> Self {
        Self {
            value,
            unit: TemperatureUnit::Celsius,
        }
    }

    /// Value normalized to Fahrenheit, used when averaging across sessions.
    pub fn as_fahrenheit(&self) -> f64 {
        match self.unit {
            TemperatureUnit::Fahrenheit => self.value,
            TemperatureUnit::Celsius => self.value * 9.0 / 5.0 + 32.0,
        }
    }
}

/// One logged wellness session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier, stable across devices.
    pub id: String,
    pub session_type: SessionType,
    pub timestamp: DateTime<Utc>,
    /// Duration in seconds, strictly positive.
    pub duration_secs: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Temperature>,
    /// Heart rate in bpm from the biometric provider, if available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Protocol/technique tag (e.g. "wim_hof", "contrast").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

impl Session {
    /// Create a new session stamped with the given time.
    pub fn new(session_type: SessionType, duration_secs: u32, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_type,
            timestamp,
            duration_secs,
            temperature: None,
            heart_rate: None,
            note: None,
            protocol: None,
        }
    }

    pub fn with_temperature(mut self, temperature: Temperature) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_heart_rate(mut self, bpm: u32) -> Self {
        self.heart_rate = Some(bpm);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    /// Validate the session at the store boundary.
    ///
    /// # Errors
    /// Returns [`StoreError`] if the duration is zero or an attached
    /// heart rate is zero. Invalid sessions are never persisted.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.duration_secs == 0 {
            return Err(StoreError::InvalidDuration {
                duration_secs: self.duration_secs,
            });
        }
        if self.heart_rate == Some(0) {
            return Err(StoreError::InvalidHeartRate);
        }
        Ok(())
    }

    /// Calendar day (UTC) this session belongs to.
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Duration expressed in minutes.
    pub fn duration_minutes(&self) -> f64 {
        f64::from(self.duration_secs) / 60.0
    }
}
