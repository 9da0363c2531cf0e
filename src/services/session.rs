// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session controller: the workout-entry state machine.
//!
//! The controller owns the workout list and the state of the input form.
//! It is driven by discrete events and never blocks:
//!
//! - `on_position`: the one-shot initial position result (map init)
//! - `on_map_click`: open an input session at a point
//! - `on_location_resolved`: a reverse-geocoding result arrived
//! - `on_submit` / `on_cancel`: close the input session
//! - `on_reset`: drop every workout, in memory and in storage
//!
//! Each input session gets a fresh id. A location result is applied only
//! while the session that asked for it is still open, so late answers from
//! a cancelled or replaced session never leak into a new one.

use crate::db::KeyValueStore;
use crate::error::{AppError, Result};
use crate::models::{
    Coordinates, Submission, TypeMetric, ValidatedSubmission, Workout, WorkoutId,
};
use crate::services::geocoding::GeocodeError;
use crate::services::persistence::{LoadOutcome, WorkoutRepository};
use crate::services::render::Renderer;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Zoom level used when centering the map.
pub const DEFAULT_MAP_ZOOM: u8 = 13;

/// Identifier of one input session (map click to submit/cancel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionId(u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Why the initial position could not be obtained.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GeolocationError {
    #[error("Position permission denied")]
    PermissionDenied,

    #[error("Position unavailable: {0}")]
    Unavailable(String),
}

/// Ask the geocoder to name this point for this session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolveRequest {
    pub session: SessionId,
    pub coordinates: Coordinates,
}

/// Location-name resolution state inside an input session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Pending,
    Resolved(String),
    Unknown,
}

impl Resolution {
    fn name(&self) -> Option<&str> {
        match self {
            Resolution::Resolved(name) => Some(name),
            Resolution::Pending | Resolution::Unknown => None,
        }
    }
}

/// An open input form.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSession {
    pub id: SessionId,
    pub coordinates: Coordinates,
    pub resolution: Resolution,
}

/// Form state.
#[derive(Debug, Clone, PartialEq)]
pub enum FormState {
    Idle,
    AwaitingInput(InputSession),
}

/// Map initialisation state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapState {
    /// Waiting for the initial position.
    Loading,
    Ready,
    /// Initial position failed; stays this way for the session.
    Unavailable,
}

/// The workout-entry state machine.
pub struct SessionController<S, R> {
    repository: WorkoutRepository<S>,
    renderer: R,
    workouts: Vec<Workout>,
    form: FormState,
    map: MapState,
    zoom: u8,
    next_session: u64,
    clock: fn() -> DateTime<Utc>,
}

impl<S: KeyValueStore, R: Renderer> SessionController<S, R> {
    /// Load saved workouts and paint the list.
    ///
    /// A missing or unreadable snapshot starts the session empty.
    pub fn new(repository: WorkoutRepository<S>, renderer: R) -> Self {
        let outcome = repository.load();
        match &outcome {
            LoadOutcome::Loaded(workouts) => {
                tracing::info!(count = workouts.len(), "Loaded saved workouts");
            }
            LoadOutcome::Absent => tracing::info!("No saved workouts"),
            LoadOutcome::Corrupt(reason) => {
                tracing::warn!(reason = %reason, "Saved workouts unreadable, starting empty");
            }
        }
        let workouts = outcome.into_workouts();

        let mut controller = Self {
            repository,
            renderer,
            workouts,
            form: FormState::Idle,
            map: MapState::Loading,
            zoom: DEFAULT_MAP_ZOOM,
            next_session: 0,
            clock: Utc::now,
        };

        for workout in &controller.workouts {
            controller.renderer.render_workout(workout);
        }

        controller
    }

    /// Use a different zoom level when centering the map.
    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = zoom;
        self
    }

    /// Replace the time source used to stamp new workouts.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn map(&self) -> MapState {
        self.map
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn repository(&self) -> &WorkoutRepository<S> {
        &self.repository
    }

    /// Id of the open input session, if any.
    pub fn current_session(&self) -> Option<SessionId> {
        match &self.form {
            FormState::AwaitingInput(session) => Some(session.id),
            FormState::Idle => None,
        }
    }

    /// Handle the one-shot initial position result.
    ///
    /// On success the map is centered there and every loaded workout gets a
    /// marker. On failure map features stay off for the rest of the session.
    pub fn on_position(
        &mut self,
        result: std::result::Result<Coordinates, GeolocationError>,
    ) -> Result<()> {
        if self.map != MapState::Loading {
            return Err(AppError::Conflict(
                "initial position already reported".to_string(),
            ));
        }

        match result {
            Ok(position) => {
                self.map = MapState::Ready;
                self.renderer.set_view(position, self.zoom);
                for workout in &self.workouts {
                    self.renderer.render_marker(workout);
                }
                tracing::info!(
                    lat = position.lat,
                    lng = position.lng,
                    markers = self.workouts.len(),
                    "Map initialised"
                );
            }
            Err(e) => {
                self.map = MapState::Unavailable;
                self.renderer.map_unavailable();
                tracing::warn!(error = %e, "Could not get position, map unavailable");
            }
        }
        Ok(())
    }

    /// Open an input session at a clicked point.
    ///
    /// Replaces any session already open. Returns the lookup the caller
    /// should run; its result comes back through `on_location_resolved`.
    pub fn on_map_click(&mut self, coordinates: Coordinates) -> Result<ResolveRequest> {
        if self.map != MapState::Ready {
            return Err(AppError::MapUnavailable);
        }
        if !coordinates.is_valid() {
            return Err(AppError::BadRequest(format!(
                "Invalid coordinates: {}",
                coordinates
            )));
        }

        self.next_session += 1;
        let id = SessionId(self.next_session);

        if let FormState::AwaitingInput(previous) = &self.form {
            tracing::debug!(previous = %previous.id, session = %id, "Replacing open session");
        }

        self.form = FormState::AwaitingInput(InputSession {
            id,
            coordinates,
            resolution: Resolution::Pending,
        });
        self.renderer.show_form(coordinates);

        tracing::debug!(session = %id, lat = coordinates.lat, lng = coordinates.lng, "Input session opened");

        Ok(ResolveRequest {
            session: id,
            coordinates,
        })
    }

    /// Apply a location lookup result.
    ///
    /// Returns `false` when the result belongs to a session that is no
    /// longer open and was discarded.
    pub fn on_location_resolved(
        &mut self,
        session: SessionId,
        result: std::result::Result<String, GeocodeError>,
    ) -> bool {
        let open = match &mut self.form {
            FormState::AwaitingInput(open) if open.id == session => open,
            _ => {
                tracing::debug!(session = %session, "Discarding stale location result");
                return false;
            }
        };

        open.resolution = match result {
            Ok(name) if !name.trim().is_empty() => Resolution::Resolved(name),
            Ok(_) => Resolution::Unknown,
            Err(e) => {
                tracing::warn!(session = %session, error = %e, "Location lookup failed");
                Resolution::Unknown
            }
        };

        let name = open.resolution.name().map(str::to_string);
        self.renderer.show_location(name.as_deref());
        true
    }

    /// Close the input form without creating a workout.
    ///
    /// Returns `false` when no form was open.
    pub fn on_cancel(&mut self) -> bool {
        match std::mem::replace(&mut self.form, FormState::Idle) {
            FormState::AwaitingInput(session) => {
                self.renderer.hide_form();
                tracing::debug!(session = %session.id, "Input session cancelled");
                true
            }
            FormState::Idle => false,
        }
    }

    /// Validate the form and log the workout.
    ///
    /// On a validation error nothing changes and the form stays open. On
    /// success the workout is appended, painted and the full list saved.
    pub fn on_submit(&mut self, submission: Submission) -> Result<Workout> {
        let session = match &self.form {
            FormState::AwaitingInput(session) => session,
            FormState::Idle => return Err(AppError::NoOpenForm),
        };

        let validated = submission.validate().inspect_err(|e| {
            tracing::info!(session = %session.id, error = %e, "Rejected workout input");
        })?;

        // Whatever the lookup has produced so far; a pending lookup means
        // the workout is logged without a place name.
        let workout = build_workout(
            (self.clock)(),
            session.coordinates,
            session.resolution.name().map(str::to_string),
            validated,
        );
        let session_id = session.id;

        self.workouts.push(workout.clone());
        self.renderer.render_workout(&workout);
        if self.map == MapState::Ready {
            self.renderer.render_marker(&workout);
        }

        if let Err(e) = self.repository.save(&self.workouts) {
            tracing::error!(error = %e, "Failed to save workouts");
        }

        self.form = FormState::Idle;
        self.renderer.hide_form();

        tracing::info!(
            session = %session_id,
            workout_id = %workout.id(),
            kind = %workout.kind(),
            description = %workout.description(),
            "Workout logged"
        );

        Ok(workout)
    }

    /// Delete every workout from storage and memory.
    ///
    /// Also closes any open form, the same as starting a fresh session.
    /// Returns how many workouts were removed.
    pub fn on_reset(&mut self) -> Result<usize> {
        self.repository
            .reset()
            .map_err(|e| AppError::Persistence(e.to_string()))?;

        let removed = self.workouts.len();
        self.workouts.clear();
        self.renderer.clear_workouts();
        self.on_cancel();

        tracing::info!(removed, "Workouts reset");
        Ok(removed)
    }

    /// Center the map on a logged workout.
    pub fn focus(&mut self, id: WorkoutId) -> Result<Coordinates> {
        if self.map != MapState::Ready {
            return Err(AppError::MapUnavailable);
        }

        let coordinates = self
            .workouts
            .iter()
            .find(|w| w.id() == id)
            .map(Workout::coordinates)
            .ok_or_else(|| AppError::NotFound(format!("Workout {}", id)))?;

        self.renderer.set_view(coordinates, self.zoom);
        Ok(coordinates)
    }
}

/// Construct the workout variant selected by the validated form.
fn build_workout(
    created_at: DateTime<Utc>,
    coordinates: Coordinates,
    location_name: Option<String>,
    input: ValidatedSubmission,
) -> Workout {
    match input.metric {
        TypeMetric::Cadence(cadence) => Workout::running_at(
            created_at,
            coordinates,
            location_name,
            input.distance_km,
            input.duration_min,
            cadence,
        ),
        TypeMetric::Elevation(elevation) => Workout::cycling_at(
            created_at,
            coordinates,
            location_name,
            input.distance_km,
            input.duration_min,
            elevation,
        ),
    }
}
