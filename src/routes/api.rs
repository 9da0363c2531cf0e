// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes: inbound events for the session controller and read-only views.

use crate::error::{AppError, Result};
use crate::models::submission::parse_form_number;
use crate::models::{Coordinates, Submission, ViewState, Workout, WorkoutId, WorkoutKind};
use crate::services::render::markers_geojson;
use crate::services::{GeolocationError, SessionId};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/position", post(report_position))
        .route("/api/map/click", post(map_click))
        .route(
            "/api/workouts",
            get(list_workouts).post(submit_workout).delete(reset_workouts),
        )
        .route("/api/workouts/{id}/focus", post(focus_workout))
        .route("/api/form/cancel", post(cancel_form))
        .route("/api/form/keydown", post(key_down))
        .route("/api/view", get(get_view))
        .route("/api/markers", get(get_markers))
}

// ─── Map ─────────────────────────────────────────────────────

/// Initial position as reported by the browser.
#[derive(Deserialize)]
#[serde(untagged)]
enum PositionReport {
    Position { lat: f64, lng: f64 },
    Failure { error: String },
}

/// Deliver the one-shot initial position result.
async fn report_position(
    State(state): State<Arc<AppState>>,
    Json(report): Json<PositionReport>,
) -> Result<StatusCode> {
    let result = match report {
        PositionReport::Position { lat, lng } => {
            let position = Coordinates::new(lat, lng);
            if !position.is_valid() {
                return Err(AppError::BadRequest(format!(
                    "Invalid coordinates: {}",
                    position
                )));
            }
            Ok(position)
        }
        PositionReport::Failure { error } if error == "permission_denied" => {
            Err(GeolocationError::PermissionDenied)
        }
        PositionReport::Failure { error } => Err(GeolocationError::Unavailable(error)),
    };

    state.session.report_position(result).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
struct MapClick {
    lat: f64,
    lng: f64,
}

/// Response for a map click.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MapClickResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub session: SessionId,
}

/// Open the workout form at the clicked point.
async fn map_click(
    State(state): State<Arc<AppState>>,
    Json(click): Json<MapClick>,
) -> Result<Json<MapClickResponse>> {
    let session = state
        .session
        .map_click(Coordinates::new(click.lat, click.lng))
        .await?;
    Ok(Json(MapClickResponse { session }))
}

/// Response for a focus request.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FocusResponse {
    pub center: [f64; 2],
    pub zoom: u8,
}

/// Move the map to a logged workout.
async fn focus_workout(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<FocusResponse>> {
    let id: WorkoutId = id
        .parse()
        .map_err(|_| AppError::NotFound(format!("Workout {}", id)))?;
    let center = state.session.focus(id).await?;
    Ok(Json(FocusResponse {
        center: center.into(),
        zoom: state.config.map_zoom,
    }))
}

// ─── Form ────────────────────────────────────────────────────

/// Workout form fields, as text the way an HTML form posts them.
#[derive(Deserialize)]
struct WorkoutForm {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    distance: String,
    #[serde(default)]
    duration: String,
    #[serde(default)]
    cadence: String,
    #[serde(default)]
    elevation: String,
}

impl WorkoutForm {
    fn into_submission(self) -> Result<Submission> {
        let kind: WorkoutKind = self
            .kind
            .parse()
            .map_err(|e: crate::models::workout::UnknownWorkoutKind| {
                AppError::BadRequest(e.to_string())
            })?;

        let type_value = match kind {
            WorkoutKind::Running => parse_form_number(&self.cadence),
            WorkoutKind::Cycling => parse_form_number(&self.elevation),
        };

        Ok(Submission {
            kind,
            distance_km: parse_form_number(&self.distance),
            duration_min: parse_form_number(&self.duration),
            type_value,
        })
    }
}

/// Submit the open workout form.
async fn submit_workout(
    State(state): State<Arc<AppState>>,
    Form(form): Form<WorkoutForm>,
) -> Result<(StatusCode, Json<Workout>)> {
    let submission = form.into_submission()?;
    let workout = state.session.submit(submission).await?;
    Ok((StatusCode::CREATED, Json(workout)))
}

/// Response for closing the form.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CancelResponse {
    pub cancelled: bool,
}

/// Close the form without logging a workout.
async fn cancel_form(State(state): State<Arc<AppState>>) -> Result<Json<CancelResponse>> {
    let cancelled = state.session.cancel().await?;
    Ok(Json(CancelResponse { cancelled }))
}

#[derive(Deserialize)]
struct KeyDown {
    key: String,
}

/// Keyboard input on the open form (Escape closes it).
async fn key_down(
    State(state): State<Arc<AppState>>,
    Json(event): Json<KeyDown>,
) -> Result<Json<CancelResponse>> {
    let cancelled = state.session.key_down(&event.key).await?;
    Ok(Json(CancelResponse { cancelled }))
}

// ─── Workouts ────────────────────────────────────────────────

/// All logged workouts, oldest first.
async fn list_workouts(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Workout>>> {
    Ok(Json(state.session.workouts().await?))
}

/// Response for clearing all workouts.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ResetResponse {
    pub removed: usize,
}

/// Delete every workout.
async fn reset_workouts(State(state): State<Arc<AppState>>) -> Result<Json<ResetResponse>> {
    let removed = state.session.reset().await?;
    tracing::info!(removed, "User cleared all workouts");
    Ok(Json(ResetResponse { removed }))
}

// ─── Views ───────────────────────────────────────────────────

/// Current render state.
async fn get_view(State(state): State<Arc<AppState>>) -> Result<Json<ViewState>> {
    Ok(Json(state.session.view().await?))
}

/// Workout markers as GeoJSON.
async fn get_markers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<geojson::FeatureCollection>> {
    let workouts = state.session.workouts().await?;
    Ok(Json(markers_geojson(&workouts)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(kind: &str, distance: &str, duration: &str, cadence: &str, elevation: &str) -> WorkoutForm {
        WorkoutForm {
            kind: kind.to_string(),
            distance: distance.to_string(),
            duration: duration.to_string(),
            cadence: cadence.to_string(),
            elevation: elevation.to_string(),
        }
    }

    #[test]
    fn test_running_form_uses_cadence() {
        let submission = form("running", "5", "25", "178", "999")
            .into_submission()
            .unwrap();
        assert_eq!(submission.kind, WorkoutKind::Running);
        assert_eq!(submission.type_value, 178.0);
    }

    #[test]
    fn test_cycling_form_uses_elevation() {
        let submission = form("cycling", "20", "60", "", "-5")
            .into_submission()
            .unwrap();
        assert_eq!(submission.kind, WorkoutKind::Cycling);
        assert_eq!(submission.type_value, -5.0);
    }

    #[test]
    fn test_unknown_type_is_bad_request() {
        let result = form("swimming", "1", "1", "1", "1").into_submission();
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_empty_fields_coerce_to_zero() {
        let submission = form("running", "", "25", "abc", "").into_submission().unwrap();
        assert_eq!(submission.distance_km, 0.0);
        assert!(submission.type_value.is_nan());
    }
}
