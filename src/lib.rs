// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Workout Atlas: log runs and rides on a map.
//!
//! This crate provides the backend for a map-based workout log: a session
//! controller that turns map clicks and form submissions into workouts,
//! best-effort place names via reverse geocoding, and snapshot persistence
//! of the workout list.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::SessionHandle;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub session: SessionHandle,
}
