use std::{collections::HashMap, fmt};

use tracing::info;
use workout_tracker_lib::{
    clock::{Clock, SystemClock},
    location::LatLng,
    workout::{Workout, WorkoutId},
};

use crate::{
    codec::LoadWarning,
    map_view::MapView,
    storage::{FileSlotStore, SlotStore},
    DataManager, DataManagerError, NewWorkout, NewWorkoutKind,
};

pub const DEFAULT_ZOOM: f64 = 16.0;

/// Where the map opens when the user's position is unknown: Phnom Penh, Cambodia.
pub const FALLBACK_POSITION: LatLng = LatLng {
    latitude: 11.55,
    longitude: 104.91667,
};

/// Fields of the new workout form. The location comes from the last map click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkoutForm {
    pub distance: f64,
    pub duration: f64,
    pub kind: NewWorkoutKind,
}

/// Something the user should be told about during startup.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    FallbackPosition(LatLng),
    StorageUnreadable(DataManagerError),
    SkippedRecord(LoadWarning),
    Loaded(usize),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::FallbackPosition(position) => {
                write!(f, "Couldn't get your current location. Default location: Phnom Penh, Cambodia ({position})")
            }
            Notice::StorageUnreadable(e) => write!(f, "{e}. Starting with an empty workout list"),
            Notice::SkippedRecord(warning) => write!(f, "{warning}"),
            Notice::Loaded(count) => write!(f, "App loaded with {count} workouts"),
        }
    }
}

/// The map screen: workout collection, map and the markers drawn on it.
///
/// Markers are stored by workout id, so removing a workout always removes its
/// own marker regardless of insertion order.
pub struct TrackerApp<M: MapView, S = FileSlotStore, C = SystemClock> {
    manager: DataManager<S, C>,
    map: M,
    markers: HashMap<WorkoutId, M::Marker>,
    zoom: f64,
    selected: Option<LatLng>,
}

impl<M: MapView, S: SlotStore, C: Clock> TrackerApp<M, S, C> {
    /// Loads stored workouts, centres the map on `position` (or the fallback)
    /// and draws a marker for every workout.
    pub fn start(mut manager: DataManager<S, C>, mut map: M, position: Option<LatLng>) -> (Self, Vec<Notice>) {
        let mut notices = Vec::new();

        match manager.load_from_persistence() {
            Ok(warnings) => notices.extend(warnings.into_iter().map(Notice::SkippedRecord)),
            Err(e) => notices.push(Notice::StorageUnreadable(e)),
        }

        let position = position.unwrap_or_else(|| {
            notices.push(Notice::FallbackPosition(FALLBACK_POSITION));
            FALLBACK_POSITION
        });

        map.set_view(position, DEFAULT_ZOOM);

        let markers = manager
            .all()
            .iter()
            .map(|workout| (workout.id().clone(), map.add_marker(workout)))
            .collect();

        map.show_position(position);

        notices.push(Notice::Loaded(manager.all().len()));

        let app = Self {
            manager,
            map,
            markers,
            zoom: DEFAULT_ZOOM,
            selected: None,
        };

        (app, notices)
    }

    /// A map click. The next submitted form is placed here.
    pub fn select_location(&mut self, location: LatLng) {
        self.selected = Some(location);
    }

    pub fn selected_location(&self) -> Option<LatLng> {
        self.selected
    }

    /// Records the form at the selected location and draws its marker. The
    /// selection is cleared on success, like closing the form.
    pub fn submit(&mut self, form: WorkoutForm) -> Result<&Workout, DataManagerError> {
        let location = self
            .selected
            .ok_or_else(|| DataManagerError::InvalidInput("Pick a location on the map first".to_string()))?;

        let candidate = NewWorkout {
            location,
            distance: form.distance,
            duration: form.duration,
            kind: form.kind,
        };

        let workout = self.manager.add(candidate)?;
        let marker = self.map.add_marker(workout);
        self.markers.insert(workout.id().clone(), marker);
        self.selected = None;

        Ok(workout)
    }

    pub fn delete(&mut self, id: &WorkoutId) -> Result<Workout, DataManagerError> {
        let workout = self.manager.remove(id)?;
        if let Some(marker) = self.markers.remove(id) {
            self.map.remove_marker(marker);
        }
        Ok(workout)
    }

    /// Pans the map to the workout at the current zoom level.
    pub fn focus(&mut self, id: &WorkoutId) -> Result<LatLng, DataManagerError> {
        let location = self.manager.find_by_id(id)?.location();
        self.map.set_view(location, self.zoom);
        Ok(location)
    }

    /// Follows the user's zoom so that [`TrackerApp::focus`] keeps it.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom;
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn workouts(&self) -> &[Workout] {
        self.manager.all()
    }

    pub fn manager(&self) -> &DataManager<S, C> {
        &self.manager
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn marker(&self, id: &WorkoutId) -> Option<&M::Marker> {
        self.markers.get(id)
    }

    /// Deletes every workout, stored or not, and their markers.
    pub fn reset(&mut self) -> Result<(), DataManagerError> {
        self.manager.reset_all()?;
        for (_, marker) in self.markers.drain() {
            self.map.remove_marker(marker);
        }
        self.selected = None;
        Ok(())
    }

    /// Takes every workout marker off the map and hands the map back.
    pub fn shutdown(mut self) -> M {
        for (_, marker) in self.markers.drain() {
            self.map.remove_marker(marker);
        }
        info!("Tracker closed");
        self.map
    }
}
