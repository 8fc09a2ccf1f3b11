use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{clock::Clock, location::LatLng};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutId(pub String);

impl WorkoutId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkoutId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The discriminant stored alongside every workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutType {
    Running,
    Cycling,
}

impl WorkoutType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutType::Running => "running",
            WorkoutType::Cycling => "cycling",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WorkoutType::Running => "Running",
            WorkoutType::Cycling => "Cycling",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            WorkoutType::Running => "🏃‍♂️",
            WorkoutType::Cycling => "🚴‍♀️",
        }
    }
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkoutType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(WorkoutType::Running),
            "cycling" => Ok(WorkoutType::Cycling),
            other => Err(format!("Unknown workout type: {other}")),
        }
    }
}

/// Per-type payload. `pace` and `speed` are derived once at construction.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkoutKind {
    /// Cadence in steps per minute, pace in minutes per kilometre.
    Running { cadence: u32, pace: f64 },
    /// Elevation gain in metres (negative for a net descent), speed in km/h.
    Cycling { elevation_gain: f64, speed: f64 },
}

impl WorkoutKind {
    pub fn workout_type(&self) -> WorkoutType {
        match self {
            WorkoutKind::Running { .. } => WorkoutType::Running,
            WorkoutKind::Cycling { .. } => WorkoutType::Cycling,
        }
    }
}

/// Shared construction inputs.
///
/// `date` and `id` are only set when rebuilding a stored workout; a new workout
/// leaves them as `None` and gets both from the [`Clock`].
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutParams {
    pub location: LatLng,
    /// Kilometres.
    pub distance: f64,
    /// Minutes.
    pub duration: f64,
    pub date: Option<DateTime<Utc>>,
    pub id: Option<WorkoutId>,
}

impl WorkoutParams {
    pub fn new(location: LatLng, distance: f64, duration: f64) -> Self {
        Self {
            location,
            distance,
            duration,
            date: None,
            id: None,
        }
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_id(mut self, id: WorkoutId) -> Self {
        self.id = Some(id);
        self
    }
}

/// One line of a workout's summary, as shown in the workout list.
#[derive(Debug, Clone, PartialEq)]
pub struct Detail {
    pub icon: &'static str,
    pub value: String,
    pub unit: &'static str,
}

impl Detail {
    fn new(icon: &'static str, value: String, unit: &'static str) -> Self {
        Self { icon, value, unit }
    }
}

/// A recorded running or cycling session.
///
/// Fields are private: nothing changes after construction, so the derived
/// metric and description always agree with the inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    id: WorkoutId,
    location: LatLng,
    distance: f64,
    duration: f64,
    date: DateTime<Utc>,
    description: String,
    kind: WorkoutKind,
}

impl Workout {
    /// Inputs must already be validated: `distance` and `duration` positive
    /// and finite, `cadence` positive.
    pub fn running(params: WorkoutParams, cadence: u32, clock: &mut impl Clock) -> Self {
        Self::build(params, clock, |distance, duration| WorkoutKind::Running {
            cadence,
            pace: duration / distance,
        })
    }

    /// Inputs must already be validated: `distance` and `duration` positive
    /// and finite, `elevation_gain` finite.
    pub fn cycling(params: WorkoutParams, elevation_gain: f64, clock: &mut impl Clock) -> Self {
        Self::build(params, clock, |distance, duration| WorkoutKind::Cycling {
            elevation_gain,
            speed: distance / (duration / 60.0),
        })
    }

    // Order matters: id and date first, then the derived metric, then the
    // description which reads the resolved date.
    fn build(params: WorkoutParams, clock: &mut impl Clock, derive: impl FnOnce(f64, f64) -> WorkoutKind) -> Self {
        let WorkoutParams { location, distance, duration, date, id } = params;

        let id = id.unwrap_or_else(|| clock.next_id());
        let date = date.unwrap_or_else(|| clock.now());
        let kind = derive(distance, duration);
        let description = describe(kind.workout_type(), &date);

        Self {
            id,
            location,
            distance,
            duration,
            date,
            description,
            kind,
        }
    }

    pub fn id(&self) -> &WorkoutId {
        &self.id
    }

    pub fn location(&self) -> LatLng {
        self.location
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> &WorkoutKind {
        &self.kind
    }

    pub fn workout_type(&self) -> WorkoutType {
        self.kind.workout_type()
    }

    pub fn pace(&self) -> Option<f64> {
        match self.kind {
            WorkoutKind::Running { pace, .. } => Some(pace),
            WorkoutKind::Cycling { .. } => None,
        }
    }

    pub fn speed(&self) -> Option<f64> {
        match self.kind {
            WorkoutKind::Cycling { speed, .. } => Some(speed),
            WorkoutKind::Running { .. } => None,
        }
    }

    pub fn icon(&self) -> &'static str {
        self.workout_type().icon()
    }

    /// Text for the workout's map marker popup.
    pub fn popup_content(&self) -> String {
        format!("{} {}", self.icon(), self.description)
    }

    pub fn details(&self) -> Vec<Detail> {
        let mut details = vec![
            Detail::new(self.icon(), self.distance.to_string(), "km"),
            Detail::new("⏱", self.duration.to_string(), "min"),
        ];

        match self.kind {
            WorkoutKind::Running { cadence, pace } => {
                details.push(Detail::new("⚡️", format!("{pace:.1}"), "min/km"));
                details.push(Detail::new("🦶🏼", cadence.to_string(), "spm"));
            }
            WorkoutKind::Cycling { elevation_gain, speed } => {
                details.push(Detail::new("⚡️", format!("{speed:.1}"), "km/h"));
                details.push(Detail::new("⛰", elevation_gain.to_string(), "m"));
            }
        }

        details
    }
}

/// "Running on March 5"
fn describe(workout_type: WorkoutType, date: &DateTime<Utc>) -> String {
    format!("{} on {}", workout_type.label(), date.format("%B %-d"))
}
