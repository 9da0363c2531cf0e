// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout snapshot persistence.
//!
//! The whole workout list is written as one JSON array under a single key.
//! Every save replaces the previous snapshot; there are no incremental
//! writes. Loading tells apart "nothing stored" from "stored but unusable",
//! although callers that only want the list treat both as empty.

use crate::db::{keys, KeyValueStore, StoreError};
use crate::models::Workout;

/// Errors from saving or clearing the snapshot.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to serialize workouts: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result of reading the stored snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// No snapshot has been saved.
    Absent,
    /// A snapshot exists but could not be turned into workouts.
    Corrupt(String),
    Loaded(Vec<Workout>),
}

impl LoadOutcome {
    /// The stored workouts, or an empty list when absent or corrupt.
    pub fn into_workouts(self) -> Vec<Workout> {
        match self {
            LoadOutcome::Loaded(workouts) => workouts,
            LoadOutcome::Absent | LoadOutcome::Corrupt(_) => Vec::new(),
        }
    }
}

/// Gateway between the workout list and the key-value store.
#[derive(Debug, Clone)]
pub struct WorkoutRepository<S> {
    store: S,
}

impl<S: KeyValueStore> WorkoutRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Replace the stored snapshot with `workouts`.
    pub fn save(&self, workouts: &[Workout]) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(workouts)?;
        self.store.set(keys::WORKOUTS, &json)?;
        tracing::debug!(count = workouts.len(), "Saved workout snapshot");
        Ok(())
    }

    /// Read the stored snapshot.
    pub fn load(&self) -> LoadOutcome {
        let raw = match self.store.get(keys::WORKOUTS) {
            Ok(Some(raw)) => raw,
            Ok(None) => return LoadOutcome::Absent,
            Err(e) => return LoadOutcome::Corrupt(e.to_string()),
        };

        // A literal `null` is what an empty browser store hands back.
        if raw.trim() == "null" {
            return LoadOutcome::Absent;
        }

        let workouts: Vec<Workout> = match serde_json::from_str(&raw) {
            Ok(w) => w,
            Err(e) => return LoadOutcome::Corrupt(e.to_string()),
        };

        if let Some(err) = workouts.iter().find_map(|w| w.check_invariants().err()) {
            return LoadOutcome::Corrupt(err);
        }

        LoadOutcome::Loaded(workouts)
    }

    /// Delete the stored snapshot.
    pub fn reset(&self) -> Result<(), PersistenceError> {
        self.store.remove(keys::WORKOUTS)?;
        tracing::info!("Workout snapshot removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{make_cycling, make_running, Coordinates};

    fn sample_workouts() -> Vec<Workout> {
        vec![
            make_running(
                Coordinates::new(48.85, 2.35),
                Some("Paris, France".to_string()),
                5.0,
                25.0,
                178.0,
            ),
            make_cycling(Coordinates::new(45.76, 4.83), None, 20.3, 61.7, -12.5),
            make_running(Coordinates::new(51.5, -0.12), None, 7.77, 41.3, 165.0),
        ]
    }

    #[test]
    fn test_round_trip_preserves_every_field() {
        let repo = WorkoutRepository::new(MemoryStore::new());
        let workouts = sample_workouts();

        repo.save(&workouts).unwrap();
        assert_eq!(repo.load(), LoadOutcome::Loaded(workouts));
    }

    #[test]
    fn test_save_twice_is_idempotent() {
        let repo = WorkoutRepository::new(MemoryStore::new());
        let workouts = sample_workouts();

        repo.save(&workouts).unwrap();
        let first = repo.store().get(keys::WORKOUTS).unwrap();
        repo.save(&workouts).unwrap();
        let second = repo.store().get(keys::WORKOUTS).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_save_replaces_previous_snapshot() {
        let repo = WorkoutRepository::new(MemoryStore::new());
        let workouts = sample_workouts();

        repo.save(&workouts).unwrap();
        repo.save(&workouts[..1]).unwrap();

        assert_eq!(repo.load().into_workouts().len(), 1);
    }

    #[test]
    fn test_reset_then_load_is_empty() {
        let repo = WorkoutRepository::new(MemoryStore::new());
        repo.save(&sample_workouts()).unwrap();

        repo.reset().unwrap();

        assert_eq!(repo.load(), LoadOutcome::Absent);
        assert!(repo.load().into_workouts().is_empty());
    }

    #[test]
    fn test_missing_snapshot_is_absent() {
        let repo = WorkoutRepository::new(MemoryStore::new());
        assert_eq!(repo.load(), LoadOutcome::Absent);
    }

    #[test]
    fn test_corrupt_snapshot_is_empty() {
        let store = MemoryStore::new();
        store.set(keys::WORKOUTS, "{not json").unwrap();
        let repo = WorkoutRepository::new(store);

        let outcome = repo.load();
        assert!(matches!(outcome, LoadOutcome::Corrupt(_)));
        assert!(outcome.into_workouts().is_empty());
    }

    #[test]
    fn test_untyped_records_are_corrupt() {
        // Records missing the derived fields cannot be reconstituted.
        let store = MemoryStore::new();
        store
            .set(
                keys::WORKOUTS,
                r#"[{"type":"running","distance":5,"duration":25,"cadence":178}]"#,
            )
            .unwrap();
        let repo = WorkoutRepository::new(store);

        assert!(matches!(repo.load(), LoadOutcome::Corrupt(_)));
    }

    #[test]
    fn test_null_snapshot_is_absent() {
        let store = MemoryStore::new();
        store.set(keys::WORKOUTS, "null").unwrap();
        let repo = WorkoutRepository::new(store);

        assert_eq!(repo.load(), LoadOutcome::Absent);
    }
}
