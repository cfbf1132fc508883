//! State store: the single owner of [`AppState`] and its snapshot.
//!
//! Loading merges the persisted snapshot over the default state one
//! top-level key at a time. A persisted key replaces the default value
//! wholesale, so a persisted `habits` object missing a field is not
//! back-filled from defaults; such a snapshot is reported as corrupt.

use crate::{AppState, Error, HabitKind, LogEntry, Mood, Result, SnapshotMedium, SNAPSHOT_KEY};
use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use serde_json::Value;

/// Owns the application state and the medium it is persisted to
pub struct StateStore<M: SnapshotMedium> {
    state: AppState,
    medium: M,
    key: String,
}

impl<M: SnapshotMedium> StateStore<M> {
    /// Create a store holding the default state; nothing is read yet
    pub fn new(medium: M) -> Self {
        Self {
            state: AppState::default(),
            medium,
            key: SNAPSHOT_KEY.to_string(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    pub fn medium(&self) -> &M {
        &self.medium
    }

    /// Load the persisted snapshot, shallow-merged over the defaults
    ///
    /// A missing snapshot leaves the defaults in place. A snapshot that is
    /// not valid JSON, not an object, or does not describe an
    /// [`AppState`] after merging fails with [`Error::PersistenceCorrupt`];
    /// the in-memory state is then left at its defaults.
    pub fn load(&mut self) -> Result<&AppState> {
        self.state = AppState::default();

        let Some(contents) = self.medium.read(&self.key)? else {
            tracing::info!("No snapshot found, using default state");
            return Ok(&self.state);
        };

        let persisted: Value = serde_json::from_str(&contents)
            .map_err(|e| Error::PersistenceCorrupt(format!("invalid JSON: {}", e)))?;
        let Value::Object(mut merged) = persisted else {
            return Err(Error::PersistenceCorrupt(
                "snapshot is not a JSON object".into(),
            ));
        };

        // Persisted keys win; defaults only fill keys that are absent
        if let Value::Object(defaults) = serde_json::to_value(AppState::default())? {
            for (key, value) in defaults {
                merged.entry(key).or_insert(value);
            }
        }

        self.state = serde_json::from_value(Value::Object(merged))
            .map_err(|e| Error::PersistenceCorrupt(e.to_string()))?;

        tracing::debug!(
            "Loaded snapshot: {} log entries, view {}",
            self.state.logs.len(),
            self.state.view
        );
        Ok(&self.state)
    }

    /// Serialize the current state and write it to the medium
    pub fn persist(&mut self) -> Result<()> {
        let contents = serde_json::to_string(&self.state)?;
        self.medium.write(&self.key, &contents)?;
        tracing::debug!("Persisted snapshot ({} bytes)", contents.len());
        Ok(())
    }

    /// Remove the persisted snapshot and return to the default state
    pub fn clear(&mut self) -> Result<()> {
        self.medium.remove(&self.key)?;
        self.state = AppState::default();
        tracing::info!("Cleared snapshot and reset state");
        Ok(())
    }

    /// Apply a habit update without persisting
    ///
    /// Sleep is set outright; water and exercise add `value` truncated
    /// toward zero and never drop below zero.
    pub fn apply_habit(&mut self, kind: HabitKind, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(Error::InvalidInput(format!(
                "{} value must be a finite number, got {}",
                kind, value
            )));
        }

        let habits = &mut self.state.habits;
        match kind {
            HabitKind::Sleep => habits.sleep = value.max(0.0),
            HabitKind::Water => habits.water = add_clamped(habits.water, value),
            HabitKind::Exercise => habits.exercise = add_clamped(habits.exercise, value),
        }

        tracing::debug!("Habit {} is now {}", kind, habits.get(kind));
        Ok(())
    }

    /// Build a journal entry for `now` and insert it at the front
    ///
    /// Fails with [`Error::InvalidInput`] when no id above the newest
    /// entry's id is left.
    pub fn prepend_log(
        &mut self,
        mood: Mood,
        notes: String,
        now: DateTime<Utc>,
    ) -> Result<&LogEntry> {
        let date = now
            .duration_trunc(TimeDelta::milliseconds(1))
            .unwrap_or(now);

        // Ids must stay unique even when two entries share a millisecond
        let mut id = date.timestamp_millis();
        if let Some(newest) = self.state.logs.first() {
            let next = newest.id.checked_add(1).ok_or_else(|| {
                Error::InvalidInput(format!("no journal id left after {}", newest.id))
            })?;
            id = id.max(next);
        }

        self.state.logs.insert(
            0,
            LogEntry {
                id,
                date,
                mood,
                notes,
            },
        );
        Ok(&self.state.logs[0])
    }
}

fn add_clamped(current: i64, delta: f64) -> i64 {
    current.saturating_add(delta.trunc() as i64).max(0)
}
