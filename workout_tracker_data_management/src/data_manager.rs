use std::path::PathBuf;

use tracing::{info, warn};
use workout_tracker_lib::{
    clock::{Clock, SystemClock},
    workout::{Workout, WorkoutId},
};

use crate::{
    codec::{self, LoadWarning},
    storage::{FileSlotStore, SlotStore},
    DataManagerError, NewWorkout, CORRUPT_WORKOUTS_SLOT, WORKOUTS_SLOT,
};

/// Owns the workout collection and keeps its storage slot in step with it.
///
/// Every successful mutation rewrites the whole collection to the slot. A
/// mutation whose write fails is undone, so memory and storage never disagree.
pub struct DataManager<S = FileSlotStore, C = SystemClock> {
    store: S,
    clock: C,
    workouts: Vec<Workout>,
}

impl DataManager<FileSlotStore, SystemClock> {
    /// File-backed manager rooted in `data_dir`. Call
    /// [`DataManager::load_from_persistence`] before use.
    pub fn start(data_dir: impl Into<PathBuf>) -> Result<Self, DataManagerError> {
        let store = FileSlotStore::open(data_dir)?;
        Ok(Self::new(store, SystemClock::new()))
    }
}

impl<S: SlotStore, C: Clock> DataManager<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            workouts: Vec::new(),
        }
    }

    /// Replaces the collection with what the slot holds and returns the records
    /// that had to be skipped. On an unreadable or corrupt slot the collection
    /// is left empty and the error is returned; the manager stays usable.
    ///
    /// Corrupt content is copied to [`CORRUPT_WORKOUTS_SLOT`] first, since the
    /// next mutation overwrites the workout slot.
    pub fn load_from_persistence(&mut self) -> Result<Vec<LoadWarning>, DataManagerError> {
        self.workouts.clear();

        let blob = self
            .store
            .get(WORKOUTS_SLOT)
            .inspect_err(|e| warn!("{}. Starting with no workouts", e))?;

        let decoded = match codec::decode(blob.as_deref(), &mut self.clock) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!("{}. Starting with no workouts", e);
                if let Some(blob) = &blob {
                    match self.store.set(CORRUPT_WORKOUTS_SLOT, blob) {
                        Ok(()) => warn!("Unreadable workouts kept in slot {}", CORRUPT_WORKOUTS_SLOT),
                        Err(backup_error) => warn!("Could not keep unreadable workouts: {}", backup_error),
                    }
                }
                return Err(e);
            }
        };

        info!("Loaded {} workouts, skipped {}", decoded.workouts.len(), decoded.warnings.len());
        self.workouts = decoded.workouts;
        Ok(decoded.warnings)
    }

    /// Validates and records a new workout with a fresh id and the current date.
    pub fn add(&mut self, candidate: NewWorkout) -> Result<&Workout, DataManagerError> {
        let checked = candidate.check()?;
        let id = self.fresh_id();
        let workout = checked.build(Some(id), None, &mut self.clock);

        let index = self.workouts.len();
        self.workouts.push(workout);

        if let Err(e) = self.persist() {
            self.workouts.pop();
            return Err(e);
        }

        let workout = &self.workouts[index];
        info!("Added {} workout {}: {}", workout.workout_type(), workout.id(), workout.description());
        Ok(workout)
    }

    /// Removes the workout and hands it back so the caller can drop whatever
    /// it rendered for it.
    pub fn remove(&mut self, id: &WorkoutId) -> Result<Workout, DataManagerError> {
        let index = self.position(id)?;
        let workout = self.workouts.remove(index);

        if let Err(e) = self.persist() {
            self.workouts.insert(index, workout);
            return Err(e);
        }

        info!("Removed workout {}", id);
        Ok(workout)
    }

    pub fn find_by_id(&self, id: &WorkoutId) -> Result<&Workout, DataManagerError> {
        self.position(id).map(|index| &self.workouts[index])
    }

    /// All workouts in the order they were added.
    pub fn all(&self) -> &[Workout] {
        &self.workouts
    }

    /// Wipes the slot and the collection. The manager can be used again right away.
    pub fn reset_all(&mut self) -> Result<(), DataManagerError> {
        self.store.remove(WORKOUTS_SLOT)?;
        let cleared = self.workouts.len();
        self.workouts.clear();
        info!("Reset: cleared {} workouts", cleared);
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn position(&self, id: &WorkoutId) -> Result<usize, DataManagerError> {
        self.workouts
            .iter()
            .position(|workout| workout.id() == id)
            .ok_or_else(|| DataManagerError::NotFound(id.clone()))
    }

    // Loaded workouts may carry ids the clock would hand out again
    fn fresh_id(&mut self) -> WorkoutId {
        loop {
            let id = self.clock.next_id();
            if self.position(&id).is_err() {
                return id;
            }
        }
    }

    fn persist(&mut self) -> Result<(), DataManagerError> {
        let blob = codec::encode(&self.workouts)?;
        self.store.set(WORKOUTS_SLOT, &blob)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use workout_tracker_lib::{clock::ManualClock, location::LatLng, workout::WorkoutType};

    use super::*;
    use crate::storage::MemorySlotStore;

    fn manager() -> DataManager<MemorySlotStore, ManualClock> {
        DataManager::new(MemorySlotStore::new(), ManualClock::new(Utc.with_ymd_and_hms(2024, 4, 12, 6, 0, 0).unwrap()))
    }

    fn phnom_penh() -> LatLng {
        LatLng::new(11.55, 104.91667)
    }

    /// Accepts reads but refuses every write.
    struct ReadOnlyStore(MemorySlotStore);

    impl SlotStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<String>, DataManagerError> {
            self.0.get(key)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), DataManagerError> {
            Err(DataManagerError::Storage("read only".to_string()))
        }

        fn remove(&mut self, _key: &str) -> Result<(), DataManagerError> {
            Err(DataManagerError::Storage("read only".to_string()))
        }
    }

    #[test]
    fn add_running_example() {
        let mut manager = manager();

        let workout = manager.add(NewWorkout::running(phnom_penh(), 5.0, 30.0, 150.0)).unwrap();

        assert_eq!(workout.pace(), Some(6.0));
        assert_eq!(workout.workout_type(), WorkoutType::Running);
        assert!(workout.description().contains("Running"));
        assert_eq!(manager.all().len(), 1);
        assert!(manager.store().get(WORKOUTS_SLOT).unwrap().is_some());
    }

    #[test]
    fn add_cycling_allows_elevation_loss() {
        let mut manager = manager();

        let workout = manager.add(NewWorkout::cycling(phnom_penh(), 15.0, 45.0, -80.0)).unwrap();

        assert_eq!(workout.speed(), Some(15.0 / (45.0 / 60.0)));
    }

    #[test]
    fn invalid_add_changes_nothing() {
        let mut manager = manager();
        manager.add(NewWorkout::running(phnom_penh(), 5.0, 30.0, 150.0)).unwrap();
        let stored = manager.store().get(WORKOUTS_SLOT).unwrap();

        let result = manager.add(NewWorkout::running(phnom_penh(), -5.0, 30.0, 150.0));

        assert!(matches!(result, Err(DataManagerError::InvalidInput(_))));
        assert_eq!(manager.all().len(), 1);
        assert_eq!(manager.store().get(WORKOUTS_SLOT).unwrap(), stored);
    }

    #[test]
    fn remove_then_remove_again() {
        let mut manager = manager();
        let id = manager.add(NewWorkout::running(phnom_penh(), 5.0, 30.0, 150.0)).unwrap().id().clone();
        manager.add(NewWorkout::cycling(phnom_penh(), 20.0, 60.0, 10.0)).unwrap();

        let removed = manager.remove(&id).unwrap();

        assert_eq!(removed.id(), &id);
        assert_eq!(manager.all().len(), 1);
        assert_eq!(manager.remove(&id), Err(DataManagerError::NotFound(id.clone())));
        assert_eq!(manager.find_by_id(&id), Err(DataManagerError::NotFound(id)));
    }

    #[test]
    fn failed_write_rolls_back() {
        let mut manager = DataManager::new(
            ReadOnlyStore(MemorySlotStore::new()),
            ManualClock::new(Utc.with_ymd_and_hms(2024, 4, 12, 6, 0, 0).unwrap()),
        );

        let result = manager.add(NewWorkout::running(phnom_penh(), 5.0, 30.0, 150.0));

        assert!(matches!(result, Err(DataManagerError::Storage(_))));
        assert!(manager.all().is_empty());
        assert!(matches!(manager.reset_all(), Err(DataManagerError::Storage(_))));
    }

    #[test]
    fn failed_write_keeps_removed_workout() {
        let blob = r#"[{"type":"running","id":"a","latLng":[0,0],"distance":5,"duration":30,"cadence":150},
                       {"type":"running","id":"b","latLng":[0,0],"distance":6,"duration":30,"cadence":150}]"#;
        let mut manager = DataManager::new(
            ReadOnlyStore(MemorySlotStore::with_slot(WORKOUTS_SLOT, blob)),
            ManualClock::new(Utc.with_ymd_and_hms(2024, 4, 12, 6, 0, 0).unwrap()),
        );
        manager.load_from_persistence().unwrap();

        assert!(manager.remove(&WorkoutId::from("a")).is_err());

        let ids: Vec<_> = manager.all().iter().map(|w| w.id().as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn corrupt_slot_loads_empty() {
        let mut manager = DataManager::new(
            MemorySlotStore::with_slot(WORKOUTS_SLOT, "definitely not json"),
            ManualClock::new(Utc.with_ymd_and_hms(2024, 4, 12, 6, 0, 0).unwrap()),
        );

        assert!(matches!(manager.load_from_persistence(), Err(DataManagerError::CorruptStorage(_))));
        assert!(manager.all().is_empty());

        manager.add(NewWorkout::running(phnom_penh(), 5.0, 30.0, 150.0)).unwrap();
        assert_eq!(manager.all().len(), 1);
        assert_eq!(
            manager.store().get(CORRUPT_WORKOUTS_SLOT).unwrap().as_deref(),
            Some("definitely not json")
        );
    }

    #[test]
    fn rejected_add_does_not_use_up_an_id() {
        let mut manager = manager();

        assert!(manager.add(NewWorkout::running(phnom_penh(), 5.0, 30.0, 150.5)).is_err());
        let id = manager.add(NewWorkout::running(phnom_penh(), 5.0, 30.0, 150.0)).unwrap().id().clone();

        assert_eq!(id, WorkoutId::from("1"));
    }

    #[test]
    fn fresh_ids_skip_loaded_ones() {
        let blob = r#"[{"type":"running","id":"1","latLng":[0,0],"distance":5,"duration":30,"cadence":150}]"#;
        let mut manager = DataManager::new(
            MemorySlotStore::with_slot(WORKOUTS_SLOT, blob),
            ManualClock::new(Utc.with_ymd_and_hms(2024, 4, 12, 6, 0, 0).unwrap()),
        );
        manager.load_from_persistence().unwrap();

        let id = manager.add(NewWorkout::running(phnom_penh(), 5.0, 30.0, 150.0)).unwrap().id().clone();

        assert_eq!(id, WorkoutId::from("2"));
        assert_eq!(manager.all().len(), 2);
    }

    #[test]
    fn reset_clears_memory_and_slot() {
        let mut manager = manager();
        manager.add(NewWorkout::running(phnom_penh(), 5.0, 30.0, 150.0)).unwrap();

        manager.reset_all().unwrap();

        assert!(manager.all().is_empty());
        assert_eq!(manager.store().get(WORKOUTS_SLOT).unwrap(), None);
        assert!(manager.load_from_persistence().unwrap().is_empty());
        assert!(manager.all().is_empty());
    }
}
