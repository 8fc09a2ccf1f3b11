pub mod clock;
pub mod location;
pub mod workout;
