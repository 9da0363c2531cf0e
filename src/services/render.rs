// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Render adapter: paints the form, workout list and map markers.
//!
//! The controller only talks to the [`Renderer`] trait. [`ViewRenderer`]
//! keeps the painted result as a [`ViewState`] that the frontend fetches.

use crate::models::view::{EntryDetail, FormView, MapStatus, MarkerView, WorkoutEntry};
use crate::models::{Coordinates, ViewState, Workout, WorkoutDetails};
use crate::time_utils::format_utc_rfc3339;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};

/// Label shown in the form once resolution has finished without a name.
pub const UNKNOWN_LOCATION_LABEL: &str = "📍 Unknown Location";

/// Output side of the session controller.
pub trait Renderer: Send + 'static {
    /// Reveal the input form for a clicked point.
    fn show_form(&mut self, coordinates: Coordinates);
    /// Show the resolved place for the open form (`None` = unknown).
    fn show_location(&mut self, name: Option<&str>);
    /// Clear and hide the input form.
    fn hide_form(&mut self);
    /// Add a workout to the list.
    fn render_workout(&mut self, workout: &Workout);
    /// Drop a marker with a popup for a workout.
    fn render_marker(&mut self, workout: &Workout);
    /// Center the map.
    fn set_view(&mut self, center: Coordinates, zoom: u8);
    /// The map could not be initialised.
    fn map_unavailable(&mut self);
    /// Remove every list entry and marker.
    fn clear_workouts(&mut self);
}

/// Renderer that records the painted state.
#[derive(Debug, Clone, Default)]
pub struct ViewRenderer {
    state: ViewState,
}

impl ViewRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }
}

impl Renderer for ViewRenderer {
    fn show_form(&mut self, coordinates: Coordinates) {
        self.state.form = FormView {
            visible: true,
            coordinates: Some(coordinates.into()),
            location_label: None,
        };
    }

    fn show_location(&mut self, name: Option<&str>) {
        self.state.form.location_label = Some(location_label(name));
    }

    fn hide_form(&mut self) {
        self.state.form = FormView::default();
    }

    fn render_workout(&mut self, workout: &Workout) {
        // Newest entries go directly under the form.
        self.state.entries.insert(0, list_entry(workout));
    }

    fn render_marker(&mut self, workout: &Workout) {
        self.state.markers.push(marker(workout));
    }

    fn set_view(&mut self, center: Coordinates, zoom: u8) {
        self.state.map.status = MapStatus::Ready;
        self.state.map.center = Some(center.into());
        self.state.map.zoom = Some(zoom);
    }

    fn map_unavailable(&mut self) {
        self.state.map.status = MapStatus::Unavailable;
    }

    fn clear_workouts(&mut self) {
        self.state.entries.clear();
        self.state.markers.clear();
    }
}

/// "📍 Paris, France", or the unknown label.
pub fn location_label(name: Option<&str>) -> String {
    match name {
        Some(name) => format!("📍 {}", name),
        None => UNKNOWN_LOCATION_LABEL.to_string(),
    }
}

/// Popup text for a workout marker.
pub fn popup_content(workout: &Workout) -> String {
    format!("{} {}", workout.kind().icon(), workout.description())
}

fn detail(icon: &str, value: String, unit: &str) -> EntryDetail {
    EntryDetail {
        icon: icon.to_string(),
        value,
        unit: unit.to_string(),
    }
}

/// Build the sidebar entry for a workout.
pub fn list_entry(workout: &Workout) -> WorkoutEntry {
    let mut details = vec![
        detail(
            workout.kind().icon(),
            workout.distance_km().to_string(),
            "km",
        ),
        detail("⏱", workout.duration_min().to_string(), "min"),
    ];

    match workout.details() {
        WorkoutDetails::Running {
            cadence_spm,
            pace_min_per_km,
        } => {
            details.push(detail("⚡️", format!("{:.1}", pace_min_per_km), "min/km"));
            details.push(detail("🦶🏼", cadence_spm.to_string(), "spm"));
        }
        WorkoutDetails::Cycling {
            elevation_m,
            speed_kmh,
        } => {
            details.push(detail("⚡️", format!("{:.1}", speed_kmh), "km/h"));
            details.push(detail("⛰", elevation_m.to_string(), "m"));
        }
    }

    WorkoutEntry {
        id: workout.id().to_string(),
        kind: workout.kind().as_str().to_string(),
        title: workout.description().to_string(),
        created_at: format_utc_rfc3339(workout.created_at()),
        details,
    }
}

/// Build the map marker for a workout.
pub fn marker(workout: &Workout) -> MarkerView {
    MarkerView {
        workout_id: workout.id().to_string(),
        coordinates: workout.coordinates().into(),
        popup_class: format!("{}-popup", workout.kind()),
        popup_content: popup_content(workout),
    }
}

/// Workout markers as a GeoJSON FeatureCollection.
///
/// GeoJSON positions are `[lng, lat]`, the reverse of the marker order.
pub fn markers_geojson(workouts: &[Workout]) -> FeatureCollection {
    let features = workouts
        .iter()
        .map(|workout| {
            let c = workout.coordinates();
            let mut properties = JsonObject::new();
            properties.insert("id".to_string(), workout.id().to_string().into());
            properties.insert("type".to_string(), workout.kind().as_str().into());
            properties.insert(
                "description".to_string(),
                workout.description().to_string().into(),
            );
            properties.insert(
                "popup_class".to_string(),
                format!("{}-popup", workout.kind()).into(),
            );
            properties.insert("popup_content".to_string(), popup_content(workout).into());

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(vec![c.lng, c.lat]))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
