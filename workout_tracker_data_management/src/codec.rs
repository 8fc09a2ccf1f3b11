//! Conversion between the workout collection and the text stored in its slot.
//!
//! The blob is a JSON array of flat records, one per workout, in collection
//! order. Derived fields are written out for readers of the raw blob but are
//! recomputed on load.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use workout_tracker_lib::{
    clock::Clock,
    location::LatLng,
    workout::{Workout, WorkoutId, WorkoutKind, WorkoutType},
};

use crate::{DataManagerError, NewWorkout, NewWorkoutKind};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkoutRecord {
    #[serde(rename = "type")]
    workout_type: WorkoutType,
    id: WorkoutId,
    #[serde(default)]
    date: Option<String>,
    lat_lng: LatLng,
    distance: f64,
    duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, alias = "cadance", skip_serializing_if = "Option::is_none")]
    cadence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pace: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    elevation_gain: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    speed: Option<f64>,
}

impl From<&Workout> for WorkoutRecord {
    fn from(workout: &Workout) -> Self {
        let mut record = WorkoutRecord {
            workout_type: workout.workout_type(),
            id: workout.id().clone(),
            date: Some(workout.date().to_rfc3339_opts(SecondsFormat::Millis, true)),
            lat_lng: workout.location(),
            distance: workout.distance(),
            duration: workout.duration(),
            description: Some(workout.description().to_string()),
            cadence: None,
            pace: None,
            elevation_gain: None,
            speed: None,
        };

        match *workout.kind() {
            WorkoutKind::Running { cadence, pace } => {
                record.cadence = Some(cadence as f64);
                record.pace = Some(pace);
            }
            WorkoutKind::Cycling { elevation_gain, speed } => {
                record.elevation_gain = Some(elevation_gain);
                record.speed = Some(speed);
            }
        }

        record
    }
}

impl WorkoutRecord {
    fn into_workout(self, clock: &mut impl Clock) -> Result<Workout, String> {
        let date = self.date.as_deref().map(parse_date).transpose()?;

        let kind = match self.workout_type {
            WorkoutType::Running => NewWorkoutKind::Running {
                cadence: self.cadence.ok_or("running record without cadence")?,
            },
            WorkoutType::Cycling => NewWorkoutKind::Cycling {
                elevation_gain: self.elevation_gain.ok_or("cycling record without elevationGain")?,
            },
        };

        let candidate = NewWorkout {
            location: self.lat_lng,
            distance: self.distance,
            duration: self.duration,
            kind,
        };

        let checked = candidate.check().map_err(|e| e.to_string())?;
        Ok(checked.build(Some(self.id), date, clock))
    }
}

/// RFC 3339 first, then ISO dates and date-times without an offset, read as UTC.
fn parse_date(date: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(date) {
        return Ok(parsed.with_timezone(&Utc));
    }

    if let Ok(parsed) = NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(parsed.and_utc());
    }

    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| format!("unreadable date {date:?}"))
}

/// A stored record that was left out of the loaded collection.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadWarning {
    UnknownType { index: usize, workout_type: Option<String> },
    InvalidRecord { index: usize, reason: String },
    DuplicateId { index: usize, id: WorkoutId },
}

impl std::fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadWarning::UnknownType { index, workout_type: Some(workout_type) } => {
                write!(f, "Skipped record {index}: unknown workout type {workout_type:?}")
            }
            LoadWarning::UnknownType { index, workout_type: None } => {
                write!(f, "Skipped record {index}: no workout type")
            }
            LoadWarning::InvalidRecord { index, reason } => write!(f, "Skipped record {index}: {reason}"),
            LoadWarning::DuplicateId { index, id } => write!(f, "Skipped record {index}: id {id} already loaded"),
        }
    }
}

#[derive(Debug, Default)]
pub struct Decoded {
    pub workouts: Vec<Workout>,
    pub warnings: Vec<LoadWarning>,
}

pub fn encode(workouts: &[Workout]) -> Result<String, DataManagerError> {
    let records: Vec<WorkoutRecord> = workouts.iter().map(WorkoutRecord::from).collect();
    serde_json::to_string(&records).map_err(|e| DataManagerError::Storage(format!("Failed to serialize workouts: {e}")))
}

/// `None`, or a blank blob, decodes to an empty collection. Anything that is
/// not a JSON array is [`DataManagerError::CorruptStorage`]. Bad records are
/// skipped one by one and reported as warnings.
pub fn decode(blob: Option<&str>, clock: &mut impl Clock) -> Result<Decoded, DataManagerError> {
    let Some(blob) = blob.filter(|blob| !blob.trim().is_empty()) else {
        return Ok(Decoded::default());
    };

    let values: Vec<Value> = serde_json::from_str(blob).map_err(|e| DataManagerError::CorruptStorage(e.to_string()))?;

    let mut decoded = Decoded::default();
    for (index, value) in values.into_iter().enumerate() {
        match decode_record(index, value, &decoded.workouts, clock) {
            Ok(workout) => decoded.workouts.push(workout),
            Err(warning) => {
                warn!("{}", warning);
                decoded.warnings.push(warning);
            }
        }
    }

    Ok(decoded)
}

fn decode_record(index: usize, value: Value, loaded: &[Workout], clock: &mut impl Clock) -> Result<Workout, LoadWarning> {
    // Dispatch on the discriminant before anything else so that unknown types
    // are skipped whatever their other fields look like
    let workout_type = value.get("type").and_then(Value::as_str);
    if workout_type.and_then(|t| t.parse::<WorkoutType>().ok()).is_none() {
        return Err(LoadWarning::UnknownType {
            index,
            workout_type: workout_type.map(str::to_string),
        });
    }

    let record: WorkoutRecord =
        serde_json::from_value(value).map_err(|e| LoadWarning::InvalidRecord { index, reason: e.to_string() })?;

    if loaded.iter().any(|workout| workout.id() == &record.id) {
        return Err(LoadWarning::DuplicateId { index, id: record.id });
    }

    record
        .into_workout(clock)
        .map_err(|reason| LoadWarning::InvalidRecord { index, reason })
}
