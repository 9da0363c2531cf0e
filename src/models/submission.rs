// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout form submission and its validation rules.

use crate::models::workout::WorkoutKind;
use std::fmt;

/// Raw numeric form values for a new workout.
///
/// `type_value` is the cadence (spm) for running or the elevation gain (m)
/// for cycling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Submission {
    pub kind: WorkoutKind,
    pub distance_km: f64,
    pub duration_min: f64,
    pub type_value: f64,
}

/// A submission that passed validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatedSubmission {
    pub distance_km: f64,
    pub duration_min: f64,
    pub metric: TypeMetric,
}

/// Variant-specific input after validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeMetric {
    Cadence(f64),
    Elevation(f64),
}

/// Why a field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationReason {
    NotFinite,
    NotPositive,
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationReason::NotFinite => f.write_str("must be a number"),
            ValidationReason::NotPositive => f.write_str("must be positive"),
        }
    }
}

/// Input rejected by form validation. Nothing changes when this is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Inputs have to be positive numbers: {field} {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: ValidationReason,
}

fn finite(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError {
            field,
            reason: ValidationReason::NotFinite,
        })
    }
}

fn positive(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    let value = finite(field, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(ValidationError {
            field,
            reason: ValidationReason::NotPositive,
        })
    }
}

impl Submission {
    /// Check the submission against the form rules.
    ///
    /// Distance, duration and cadence must be finite and positive. Elevation
    /// only has to be finite: a negative gain is accepted as entered.
    pub fn validate(&self) -> Result<ValidatedSubmission, ValidationError> {
        let distance_km = positive("distance", self.distance_km)?;
        let duration_min = positive("duration", self.duration_min)?;

        let metric = match self.kind {
            WorkoutKind::Running => TypeMetric::Cadence(positive("cadence", self.type_value)?),
            WorkoutKind::Cycling => TypeMetric::Elevation(finite("elevation", self.type_value)?),
        };

        Ok(ValidatedSubmission {
            distance_km,
            duration_min,
            metric,
        })
    }
}

/// Convert form text to a number the way a browser numeric coercion does.
///
/// Surrounding whitespace is ignored, empty text is `0` and anything that
/// does not parse is `NaN`, leaving the rejection to [`Submission::validate`].
pub fn parse_form_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(distance: f64, duration: f64, cadence: f64) -> Submission {
        Submission {
            kind: WorkoutKind::Running,
            distance_km: distance,
            duration_min: duration,
            type_value: cadence,
        }
    }

    fn cycling(distance: f64, duration: f64, elevation: f64) -> Submission {
        Submission {
            kind: WorkoutKind::Cycling,
            distance_km: distance,
            duration_min: duration,
            type_value: elevation,
        }
    }

    #[test]
    fn test_valid_running() {
        let validated = running(5.0, 25.0, 178.0).validate().unwrap();
        assert_eq!(validated.distance_km, 5.0);
        assert_eq!(validated.duration_min, 25.0);
        assert_eq!(validated.metric, TypeMetric::Cadence(178.0));
    }

    #[test]
    fn test_negative_distance_rejected_for_both_types() {
        let err = running(-1.0, 25.0, 178.0).validate().unwrap_err();
        assert_eq!(err.field, "distance");
        assert_eq!(err.reason, ValidationReason::NotPositive);

        let err = cycling(-1.0, 25.0, 100.0).validate().unwrap_err();
        assert_eq!(err.field, "distance");
    }

    #[test]
    fn test_zero_duration_rejected() {
        let err = running(5.0, 0.0, 178.0).validate().unwrap_err();
        assert_eq!(err.field, "duration");
        assert_eq!(err.reason, ValidationReason::NotPositive);
    }

    #[test]
    fn test_nan_cadence_rejected() {
        let err = running(5.0, 25.0, f64::NAN).validate().unwrap_err();
        assert_eq!(err.field, "cadence");
        assert_eq!(err.reason, ValidationReason::NotFinite);
    }

    #[test]
    fn test_nan_elevation_rejected() {
        let err = cycling(20.0, 60.0, f64::NAN).validate().unwrap_err();
        assert_eq!(err.field, "elevation");
        assert_eq!(err.reason, ValidationReason::NotFinite);
    }

    #[test]
    fn test_negative_elevation_accepted() {
        let validated = cycling(20.0, 60.0, -5.0).validate().unwrap();
        assert_eq!(validated.metric, TypeMetric::Elevation(-5.0));
    }

    #[test]
    fn test_infinite_distance_rejected() {
        let err = cycling(f64::INFINITY, 60.0, 0.0).validate().unwrap_err();
        assert_eq!(err.reason, ValidationReason::NotFinite);
    }

    #[test]
    fn test_parse_form_number() {
        assert_eq!(parse_form_number("5"), 5.0);
        assert_eq!(parse_form_number(" 2.5 "), 2.5);
        assert_eq!(parse_form_number(""), 0.0);
        assert_eq!(parse_form_number("-5"), -5.0);
        assert!(parse_form_number("abc").is_nan());
    }

    #[test]
    fn test_error_message() {
        let err = running(0.0, 25.0, 178.0).validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Inputs have to be positive numbers: distance must be positive"
        );
    }
}
