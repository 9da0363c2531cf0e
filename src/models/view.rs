// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Render state served to the map frontend.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Everything the frontend needs to paint the form, list and map.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ViewState {
    pub form: FormView,
    pub map: MapView,
    /// List entries, newest first.
    pub entries: Vec<WorkoutEntry>,
    pub markers: Vec<MarkerView>,
}

/// Input form visibility and the resolved place label.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FormView {
    pub visible: bool,
    /// `[lat, lng]` of the clicked point while the form is open
    pub coordinates: Option<[f64; 2]>,
    /// "📍 Paris, France" once resolution finished, absent while in flight
    pub location_label: Option<String>,
}

/// Map readiness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum MapStatus {
    #[default]
    Loading,
    Ready,
    Unavailable,
}

/// Map status and current view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MapView {
    pub status: MapStatus,
    pub center: Option<[f64; 2]>,
    pub zoom: Option<u8>,
}

/// One workout in the sidebar list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WorkoutEntry {
    pub id: String,
    /// "running" or "cycling"
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub created_at: String,
    pub details: Vec<EntryDetail>,
}

/// A single icon/value/unit cell of a list entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct EntryDetail {
    pub icon: String,
    pub value: String,
    pub unit: String,
}

/// A map marker with its popup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MarkerView {
    pub workout_id: String,
    pub coordinates: [f64; 2],
    pub popup_class: String,
    pub popup_content: String,
}
