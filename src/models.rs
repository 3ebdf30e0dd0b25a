//! Data models for weather readings, derived insights and user accounts.

use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{FieldViolation, ValidationError};

// ---

pub const TEMPERATURE_RANGE: RangeInclusive<f64> = -50.0..=60.0;
pub const HUMIDITY_RANGE: RangeInclusive<f64> = 0.0..=100.0;
pub const WIND_SPEED_RANGE: RangeInclusive<f64> = 0.0..=200.0;
pub const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;
pub const LONGITUDE_RANGE: RangeInclusive<f64> = -180.0..=180.0;

/// Reading as submitted by a client, before validation.
///
/// Every field is optional here so that a missing value is reported as a
/// field violation rather than a generic parse failure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingCandidate {
    // ---
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub condition: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timestamp: Option<String>,
}

/// Validated reading, ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    // ---
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub condition: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub observed_at: Option<String>,
}

/// Stored weather reading. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReading {
    // ---
    pub id: i64,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub condition: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub observed_at: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ReadingCandidate {
    /// Check the candidate against the reading invariants.
    ///
    /// All violations are collected so the caller sees every bad field at once.
    pub fn validate(self) -> Result<NewReading, ValidationError> {
        // ---
        let mut violations = Vec::new();

        let temperature = required_in_range(
            "temperature",
            self.temperature,
            &TEMPERATURE_RANGE,
            &mut violations,
        );
        let humidity = required_in_range(
            "humidity",
            self.humidity,
            &HUMIDITY_RANGE,
            &mut violations,
        );
        let wind_speed = required_in_range(
            "windSpeed",
            self.wind_speed,
            &WIND_SPEED_RANGE,
            &mut violations,
        );

        if self.condition.is_none() {
            violations.push(FieldViolation::new("condition", "is required"));
        }
        if self.location.is_none() {
            violations.push(FieldViolation::new("location", "is required"));
        }

        optional_in_range("latitude", self.latitude, &LATITUDE_RANGE, &mut violations);
        optional_in_range("longitude", self.longitude, &LONGITUDE_RANGE, &mut violations);

        match (temperature, humidity, wind_speed, self.condition, self.location) {
            (Some(temperature), Some(humidity), Some(wind_speed), Some(condition), Some(location))
                if violations.is_empty() =>
            {
                Ok(NewReading {
                    temperature,
                    humidity,
                    wind_speed,
                    condition,
                    location,
                    latitude: self.latitude,
                    longitude: self.longitude,
                    observed_at: self.timestamp,
                })
            }
            _ => Err(ValidationError { violations }),
        }
    }
}

fn required_in_range(
    field: &'static str,
    value: Option<f64>,
    range: &RangeInclusive<f64>,
    violations: &mut Vec<FieldViolation>,
) -> Option<f64> {
    // ---
    match value {
        None => {
            violations.push(FieldViolation::new(field, "is required"));
            None
        }
        Some(v) => optional_in_range(field, Some(v), range, violations),
    }
}

fn optional_in_range(
    field: &'static str,
    value: Option<f64>,
    range: &RangeInclusive<f64>,
    violations: &mut Vec<FieldViolation>,
) -> Option<f64> {
    // ---
    let v = value?;
    if v.is_finite() && range.contains(&v) {
        Some(v)
    } else {
        violations.push(FieldViolation::new(
            field,
            format!("must be between {} and {}", range.start(), range.end()),
        ));
        None
    }
}

// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Danger,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Danger => "danger",
        }
    }

    /// Parse a stored label. Unknown labels are logged and read as `Info`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "info" => Severity::Info,
            "warning" => Severity::Warning,
            "danger" => Severity::Danger,
            other => {
                tracing::warn!("Unknown insight severity '{}', reading as info", other);
                Severity::Info
            }
        }
    }
}

/// Insight produced by the engine, not yet stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewInsight {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub severity: Severity,
}

/// Stored insight from the latest recomputation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
}

// ---

/// User account. The password hash is never serialized.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct UserChanges {
    pub name: String,
    pub email: String,
    /// Replaces the stored hash only when present.
    pub password_hash: Option<String>,
}
