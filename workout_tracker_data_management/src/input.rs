use chrono::{DateTime, Utc};
use workout_tracker_lib::{
    clock::Clock,
    location::LatLng,
    workout::{Workout, WorkoutId, WorkoutParams, WorkoutType},
};

use crate::DataManagerError;

/// Type-specific form field, as coerced from the raw input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NewWorkoutKind {
    Running { cadence: f64 },
    Cycling { elevation_gain: f64 },
}

/// Candidate workout fields as they come from a form. Nothing is trusted until
/// [`NewWorkout::validate`] passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewWorkout {
    pub location: LatLng,
    pub distance: f64,
    pub duration: f64,
    pub kind: NewWorkoutKind,
}

impl NewWorkout {
    pub fn running(location: LatLng, distance: f64, duration: f64, cadence: f64) -> Self {
        Self {
            location,
            distance,
            duration,
            kind: NewWorkoutKind::Running { cadence },
        }
    }

    pub fn cycling(location: LatLng, distance: f64, duration: f64, elevation_gain: f64) -> Self {
        Self {
            location,
            distance,
            duration,
            kind: NewWorkoutKind::Cycling { elevation_gain },
        }
    }

    pub fn workout_type(&self) -> WorkoutType {
        match self.kind {
            NewWorkoutKind::Running { .. } => WorkoutType::Running,
            NewWorkoutKind::Cycling { .. } => WorkoutType::Cycling,
        }
    }

    /// Distance and duration must be positive and finite. Cadence must be a
    /// positive whole number, elevation gain only finite.
    pub fn validate(&self) -> Result<(), DataManagerError> {
        self.check().map(|_| ())
    }

    pub(crate) fn check(self) -> Result<CheckedWorkout, DataManagerError> {
        if !self.location.is_valid() {
            return Err(DataManagerError::InvalidInput(format!("Location {} is not on the map", self.location)));
        }
        positive("Distance", self.distance)?;
        positive("Duration", self.duration)?;

        let kind = match self.kind {
            NewWorkoutKind::Running { cadence } => CheckedKind::Running { cadence: whole_cadence(cadence)? },
            NewWorkoutKind::Cycling { elevation_gain } => {
                if !elevation_gain.is_finite() {
                    return Err(DataManagerError::InvalidInput("Elevation gain must be a number".to_string()));
                }
                CheckedKind::Cycling { elevation_gain }
            }
        };

        Ok(CheckedWorkout {
            params: WorkoutParams::new(self.location, self.distance, self.duration),
            kind,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum CheckedKind {
    Running { cadence: u32 },
    Cycling { elevation_gain: f64 },
}

/// A candidate that passed [`NewWorkout::validate`], ready to become a [`Workout`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CheckedWorkout {
    params: WorkoutParams,
    kind: CheckedKind,
}

impl CheckedWorkout {
    /// `id` and `date` are only passed when rebuilding a stored workout.
    pub(crate) fn build(self, id: Option<WorkoutId>, date: Option<DateTime<Utc>>, clock: &mut impl Clock) -> Workout {
        let mut params = self.params;
        params.id = id;
        params.date = date;

        match self.kind {
            CheckedKind::Running { cadence } => Workout::running(params, cadence, clock),
            CheckedKind::Cycling { elevation_gain } => Workout::cycling(params, elevation_gain, clock),
        }
    }
}

fn positive(field: &str, value: f64) -> Result<(), DataManagerError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(DataManagerError::InvalidInput(format!("{field} must be a positive number, got {value}")))
    }
}

fn whole_cadence(cadence: f64) -> Result<u32, DataManagerError> {
    positive("Cadence", cadence)?;
    if cadence.fract() != 0.0 || cadence > u32::MAX as f64 {
        return Err(DataManagerError::InvalidInput(format!("Cadence must be a whole number of steps, got {cadence}")));
    }
    Ok(cadence as u32)
}
