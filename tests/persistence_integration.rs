// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Snapshot persistence across controller restarts.

use chrono::{TimeZone, Utc};
use std::path::{Path, PathBuf};
use workout_atlas::db::{keys, FileStore, KeyValueStore};
use workout_atlas::models::{Coordinates, Submission, WorkoutKind};
use workout_atlas::services::{
    LoadOutcome, SessionController, ViewRenderer, WorkoutRepository,
};

fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("workout-atlas-it-{}", uuid::Uuid::new_v4()))
}

fn fixed_clock() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 14, 9, 30, 0).unwrap()
}

fn controller(dir: &Path) -> SessionController<FileStore, ViewRenderer> {
    let store = FileStore::open(dir).unwrap();
    SessionController::new(WorkoutRepository::new(store), ViewRenderer::new())
        .with_clock(fixed_clock)
}

fn log_run(
    controller: &mut SessionController<FileStore, ViewRenderer>,
    at: Coordinates,
    distance_km: f64,
) {
    controller.on_map_click(at).unwrap();
    controller
        .on_submit(Submission {
            kind: WorkoutKind::Running,
            distance_km,
            duration_min: 30.0,
            type_value: 170.0,
        })
        .unwrap();
}

#[test]
fn test_restart_restores_workouts_and_markers() {
    let dir = scratch_dir();

    let saved = {
        let mut first = controller(&dir);
        first.on_position(Ok(Coordinates::new(48.85, 2.35))).unwrap();
        log_run(&mut first, Coordinates::new(48.85, 2.35), 5.0);
        log_run(&mut first, Coordinates::new(48.86, 2.34), 7.5);
        log_run(&mut first, Coordinates::new(48.87, 2.33), 10.0);
        first.workouts().to_vec()
    };

    let mut second = controller(&dir);
    assert_eq!(second.workouts(), saved.as_slice());
    // List entries are painted at load; markers wait for the map.
    assert_eq!(second.renderer().state().entries.len(), 3);
    assert!(second.renderer().state().markers.is_empty());

    second.on_position(Ok(Coordinates::new(48.85, 2.35))).unwrap();
    assert_eq!(second.renderer().state().markers.len(), 3);
    assert_eq!(second.workouts()[1].distance_km(), 7.5);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_reset_then_restart_is_empty() {
    let dir = scratch_dir();

    {
        let mut first = controller(&dir);
        first.on_position(Ok(Coordinates::new(48.85, 2.35))).unwrap();
        log_run(&mut first, Coordinates::new(48.85, 2.35), 5.0);
        assert_eq!(first.on_reset().unwrap(), 1);
    }

    let second = controller(&dir);
    assert!(second.workouts().is_empty());
    assert_eq!(second.repository().load(), LoadOutcome::Absent);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_corrupt_snapshot_starts_empty() {
    let dir = scratch_dir();
    let store = FileStore::open(&dir).unwrap();
    store.set(keys::WORKOUTS, "{ this is not json").unwrap();

    let repository = WorkoutRepository::new(store);
    assert!(matches!(repository.load(), LoadOutcome::Corrupt(_)));

    let mut controller = controller(&dir);
    assert!(controller.workouts().is_empty());

    // The next save replaces the broken snapshot.
    controller.on_position(Ok(Coordinates::new(48.85, 2.35))).unwrap();
    log_run(&mut controller, Coordinates::new(48.85, 2.35), 5.0);
    let reloaded = WorkoutRepository::new(FileStore::open(&dir).unwrap())
        .load()
        .into_workouts();
    assert_eq!(reloaded.len(), 1);

    std::fs::remove_dir_all(&dir).unwrap();
}
