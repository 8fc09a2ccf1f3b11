//! Workouts written by one manager must come back intact in the next one.

use chrono::{Duration, TimeZone, Utc};
use workout_tracker_data_management::{
    storage::{FileSlotStore, SlotStore},
    DataManager, DataManagerError, NewWorkout, CORRUPT_WORKOUTS_SLOT, WORKOUTS_SLOT,
};
use workout_tracker_lib::{clock::{Clock, ManualClock}, location::LatLng, workout::WorkoutType};

fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2024, 8, 14, 18, 20, 0).unwrap())
}

fn open(dir: &std::path::Path, clock: ManualClock) -> DataManager<FileSlotStore, ManualClock> {
    DataManager::new(FileSlotStore::open(dir).unwrap(), clock)
}

#[test]
fn fresh_install_loads_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = open(dir.path(), clock());

    assert_eq!(manager.load_from_persistence().unwrap(), vec![]);
    assert!(manager.all().is_empty());
}

#[test]
fn workouts_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let mut clock = clock();

    let mut manager = open(dir.path(), clock.clone());
    manager.load_from_persistence().unwrap();
    for n in 0..4 {
        let location = LatLng::new(11.55 + n as f64 * 0.01, 104.91667);
        if n % 2 == 0 {
            manager.add(NewWorkout::running(location, 5.0 + n as f64, 30.0, 150.0)).unwrap();
        } else {
            manager.add(NewWorkout::cycling(location, 20.0 + n as f64, 60.0, -10.0 * n as f64)).unwrap();
        }
    }
    let before = manager.all().to_vec();
    drop(manager);

    // A week later the app is opened again
    clock.advance(Duration::days(7));
    let mut manager = open(dir.path(), clock.clone());
    assert!(manager.load_from_persistence().unwrap().is_empty());

    assert_eq!(manager.all().len(), before.len());
    for (loaded, original) in manager.all().iter().zip(&before) {
        assert_eq!(loaded.id(), original.id());
        assert_eq!(loaded.workout_type(), original.workout_type());
        assert_eq!(loaded.distance(), original.distance());
        assert_eq!(loaded.duration(), original.duration());
        assert_eq!(loaded.date(), original.date());
        assert_eq!(loaded.description(), original.description());
        assert_eq!(loaded.pace(), original.pace());
        assert_eq!(loaded.speed(), original.speed());
    }
    assert_ne!(manager.all()[0].date(), clock.now());
}

#[test]
fn removal_is_persisted() {
    let dir = tempfile::tempdir().unwrap();

    let mut manager = open(dir.path(), clock());
    let kept = manager.add(NewWorkout::running(LatLng::new(0.0, 0.0), 3.0, 20.0, 170.0)).unwrap().id().clone();
    let removed = manager.add(NewWorkout::cycling(LatLng::new(1.0, 1.0), 10.0, 30.0, 5.0)).unwrap().id().clone();
    manager.remove(&removed).unwrap();

    let mut manager = open(dir.path(), clock());
    manager.load_from_persistence().unwrap();

    assert_eq!(manager.all().len(), 1);
    assert_eq!(manager.all()[0].id(), &kept);
    assert_eq!(manager.find_by_id(&removed), Err(DataManagerError::NotFound(removed)));
}

#[test]
fn corrupt_file_is_reported_and_replaced_on_next_add() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileSlotStore::open(dir.path()).unwrap();
    store.set(WORKOUTS_SLOT, "[{\"type\": \"running\",").unwrap();

    let mut manager = DataManager::new(store, clock());
    assert!(matches!(manager.load_from_persistence(), Err(DataManagerError::CorruptStorage(_))));
    assert!(manager.all().is_empty());

    manager.add(NewWorkout::running(LatLng::new(0.0, 0.0), 5.0, 25.0, 160.0)).unwrap();

    let mut manager = open(dir.path(), clock());
    manager.load_from_persistence().unwrap();
    assert_eq!(manager.all().len(), 1);
    assert_eq!(manager.all()[0].workout_type(), WorkoutType::Running);

    // The unreadable content is still on disk for recovery
    let backup = manager.store().slot_path(CORRUPT_WORKOUTS_SLOT);
    assert_eq!(std::fs::read_to_string(backup).unwrap(), "[{\"type\": \"running\",");
}

#[test]
fn unknown_types_are_dropped_on_next_write() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileSlotStore::open(dir.path()).unwrap();
    store
        .set(
            WORKOUTS_SLOT,
            r#"[{"type":"rowing","id":"r1"},{"type":"running","id":"1","date":"2024-08-01T06:00:00.000Z","latLng":[11.55,104.91667],"distance":5,"duration":30,"cadence":150}]"#,
        )
        .unwrap();

    let mut manager = DataManager::new(store, clock());
    assert_eq!(manager.load_from_persistence().unwrap().len(), 1);
    assert_eq!(manager.all().len(), 1);
    assert_eq!(manager.all()[0].pace(), Some(6.0));

    manager.add(NewWorkout::cycling(LatLng::new(11.6, 104.9), 12.0, 40.0, 0.0)).unwrap();
    let blob = manager.store().get(WORKOUTS_SLOT).unwrap().unwrap();
    assert!(!blob.contains("rowing"));
}

#[test]
fn reset_removes_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = open(dir.path(), clock());
    manager.add(NewWorkout::running(LatLng::new(0.0, 0.0), 5.0, 30.0, 150.0)).unwrap();
    assert!(manager.store().slot_path(WORKOUTS_SLOT).exists());

    manager.reset_all().unwrap();

    assert!(!manager.store().slot_path(WORKOUTS_SLOT).exists());
    manager.add(NewWorkout::running(LatLng::new(0.0, 0.0), 4.0, 28.0, 155.0)).unwrap();
    assert_eq!(manager.all().len(), 1);
}
