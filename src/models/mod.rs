// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod submission;
pub mod view;
pub mod workout;

pub use submission::{Submission, TypeMetric, ValidatedSubmission, ValidationError};
pub use view::{MapStatus, ViewState};
pub use workout::{
    make_cycling, make_running, Coordinates, Workout, WorkoutDetails, WorkoutId, WorkoutKind,
};
