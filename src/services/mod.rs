// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod event_loop;
pub mod geocoding;
pub mod persistence;
pub mod render;
pub mod session;

pub use event_loop::SessionHandle;
pub use geocoding::{GeocodeError, Geocoder, GoogleGeocoder};
pub use persistence::{LoadOutcome, PersistenceError, WorkoutRepository};
pub use render::{markers_geojson, Renderer, ViewRenderer};
pub use session::{GeolocationError, SessionController, SessionId};
