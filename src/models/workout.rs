// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout model: a logged run or ride pinned to a map location.
//!
//! Workouts are built once from validated inputs and never mutated. The
//! derived metric (pace or speed) and the description are computed at
//! construction and stored alongside the raw fields, so a persisted record
//! carries everything needed to rebuild an identical value.

use crate::time_utils::format_month_day;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A geographic point, serialized as `[lat, lng]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both components are finite and inside the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(c: Coordinates) -> Self {
        [c.lat, c.lng]
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Opaque workout identifier (random UUID, never reused).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutId(Uuid);

impl WorkoutId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for WorkoutId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Workout variant tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutKind {
    Running,
    Cycling,
}

impl WorkoutKind {
    /// Lowercase tag as used in storage and forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutKind::Running => "running",
            WorkoutKind::Cycling => "cycling",
        }
    }

    /// Tag with only its first character upper-cased.
    pub fn capitalized(&self) -> String {
        let tag = self.as_str();
        let mut chars = tag.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            WorkoutKind::Running => "🏃‍♂️",
            WorkoutKind::Cycling => "🚴‍♀️",
        }
    }
}

impl fmt::Display for WorkoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown workout type: {0}")]
pub struct UnknownWorkoutKind(pub String);

impl FromStr for WorkoutKind {
    type Err = UnknownWorkoutKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "running" => Ok(WorkoutKind::Running),
            "cycling" => Ok(WorkoutKind::Cycling),
            other => Err(UnknownWorkoutKind(other.to_string())),
        }
    }
}

/// Variant-specific fields, including the frozen derived metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkoutDetails {
    Running {
        cadence_spm: f64,
        pace_min_per_km: f64,
    },
    Cycling {
        elevation_m: f64,
        speed_kmh: f64,
    },
}

impl WorkoutDetails {
    pub fn kind(&self) -> WorkoutKind {
        match self {
            WorkoutDetails::Running { .. } => WorkoutKind::Running,
            WorkoutDetails::Cycling { .. } => WorkoutKind::Cycling,
        }
    }
}

/// Pace in minutes per kilometre.
pub fn pace_min_per_km(distance_km: f64, duration_min: f64) -> f64 {
    duration_min / distance_km
}

/// Speed in kilometres per hour.
pub fn speed_kmh(distance_km: f64, duration_min: f64) -> f64 {
    distance_km / (duration_min / 60.0)
}

/// A logged workout. All fields are fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    id: WorkoutId,
    created_at: DateTime<Utc>,
    coordinates: Coordinates,
    distance_km: f64,
    duration_min: f64,
    location_name: Option<String>,
    description: String,
    #[serde(flatten)]
    details: WorkoutDetails,
}

/// Build a running workout stamped with the current time.
pub fn make_running(
    coordinates: Coordinates,
    location_name: Option<String>,
    distance_km: f64,
    duration_min: f64,
    cadence_spm: f64,
) -> Workout {
    Workout::running_at(
        Utc::now(),
        coordinates,
        location_name,
        distance_km,
        duration_min,
        cadence_spm,
    )
}

/// Build a cycling workout stamped with the current time.
pub fn make_cycling(
    coordinates: Coordinates,
    location_name: Option<String>,
    distance_km: f64,
    duration_min: f64,
    elevation_m: f64,
) -> Workout {
    Workout::cycling_at(
        Utc::now(),
        coordinates,
        location_name,
        distance_km,
        duration_min,
        elevation_m,
    )
}

impl Workout {
    /// Build a running workout with an explicit creation time.
    ///
    /// Inputs must already be validated (distance and duration positive).
    pub fn running_at(
        created_at: DateTime<Utc>,
        coordinates: Coordinates,
        location_name: Option<String>,
        distance_km: f64,
        duration_min: f64,
        cadence_spm: f64,
    ) -> Self {
        let details = WorkoutDetails::Running {
            cadence_spm,
            pace_min_per_km: pace_min_per_km(distance_km, duration_min),
        };
        Self::build(
            created_at,
            coordinates,
            location_name,
            distance_km,
            duration_min,
            details,
        )
    }

    /// Build a cycling workout with an explicit creation time.
    pub fn cycling_at(
        created_at: DateTime<Utc>,
        coordinates: Coordinates,
        location_name: Option<String>,
        distance_km: f64,
        duration_min: f64,
        elevation_m: f64,
    ) -> Self {
        let details = WorkoutDetails::Cycling {
            elevation_m,
            speed_kmh: speed_kmh(distance_km, duration_min),
        };
        Self::build(
            created_at,
            coordinates,
            location_name,
            distance_km,
            duration_min,
            details,
        )
    }

    fn build(
        created_at: DateTime<Utc>,
        coordinates: Coordinates,
        location_name: Option<String>,
        distance_km: f64,
        duration_min: f64,
        details: WorkoutDetails,
    ) -> Self {
        // An empty name carries no information; treat it as unknown.
        let location_name = location_name.filter(|name| !name.trim().is_empty());
        let description = describe(details.kind(), location_name.as_deref(), created_at);

        Self {
            id: WorkoutId::generate(),
            created_at,
            coordinates,
            distance_km,
            duration_min,
            location_name,
            description,
            details,
        }
    }

    pub fn id(&self) -> WorkoutId {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn duration_min(&self) -> f64 {
        self.duration_min
    }

    pub fn location_name(&self) -> Option<&str> {
        self.location_name.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn details(&self) -> &WorkoutDetails {
        &self.details
    }

    pub fn kind(&self) -> WorkoutKind {
        self.details.kind()
    }

    /// Pace for running workouts.
    pub fn pace_min_per_km(&self) -> Option<f64> {
        match self.details {
            WorkoutDetails::Running {
                pace_min_per_km, ..
            } => Some(pace_min_per_km),
            WorkoutDetails::Cycling { .. } => None,
        }
    }

    /// Speed for cycling workouts.
    pub fn speed_kmh(&self) -> Option<f64> {
        match self.details {
            WorkoutDetails::Cycling { speed_kmh, .. } => Some(speed_kmh),
            WorkoutDetails::Running { .. } => None,
        }
    }

    /// Verify a reconstituted record against the construction invariants.
    ///
    /// Freshly built workouts always pass. Records read back from storage
    /// may have been edited or truncated by hand.
    pub fn check_invariants(&self) -> Result<(), String> {
        if !(self.distance_km.is_finite() && self.distance_km > 0.0) {
            return Err(format!("workout {}: distance must be positive", self.id));
        }
        if !(self.duration_min.is_finite() && self.duration_min > 0.0) {
            return Err(format!("workout {}: duration must be positive", self.id));
        }

        match self.details {
            WorkoutDetails::Running {
                cadence_spm,
                pace_min_per_km: pace,
            } => {
                if !(cadence_spm.is_finite() && cadence_spm > 0.0) {
                    return Err(format!("workout {}: cadence must be positive", self.id));
                }
                if pace != pace_min_per_km(self.distance_km, self.duration_min) {
                    return Err(format!("workout {}: pace does not match", self.id));
                }
            }
            WorkoutDetails::Cycling {
                elevation_m,
                speed_kmh: speed,
            } => {
                if !elevation_m.is_finite() {
                    return Err(format!("workout {}: elevation must be finite", self.id));
                }
                if speed != speed_kmh(self.distance_km, self.duration_min) {
                    return Err(format!("workout {}: speed does not match", self.id));
                }
            }
        }

        Ok(())
    }
}

/// "Running in Paris" when the place is known, else "Cycling on March 5".
fn describe(
    kind: WorkoutKind,
    location_name: Option<&str>,
    created_at: DateTime<Utc>,
) -> String {
    match location_name {
        Some(name) => format!("{} in {}", kind.capitalized(), name),
        None => format!("{} on {}", kind.capitalized(), format_month_day(created_at)),
    }
}
