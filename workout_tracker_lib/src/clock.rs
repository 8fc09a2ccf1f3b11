use chrono::{DateTime, Duration, Utc};

use crate::workout::WorkoutId;

/// Source of fresh workout ids and of the current time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Every call must return an id never handed out before by this clock.
    fn next_id(&mut self) -> WorkoutId;
}

/// Wall clock. Ids are the current unix time in milliseconds, bumped by one
/// whenever two workouts are created within the same millisecond.
#[derive(Debug, Default)]
pub struct SystemClock {
    last_id: i64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn next_id(&mut self) -> WorkoutId {
        let millis = Utc::now().timestamp_millis();
        self.last_id = millis.max(self.last_id + 1);
        WorkoutId(self.last_id.to_string())
    }
}

/// A clock that only moves when told to. Ids count up from a seed.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: DateTime<Utc>,
    next_id: u64,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now, next_id: 1 }
    }

    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn next_id(&mut self) -> WorkoutId {
        let id = WorkoutId(self.next_id.to_string());
        self.next_id += 1;
        id
    }
}
