use const_format::concatcp;
use thiserror::Error;
use workout_tracker_lib::workout::WorkoutId;

pub mod codec;
pub mod config;
mod data_manager;
mod input;
pub mod map_view;
pub mod storage;
mod tracker_app;

pub use data_manager::*;
pub use input::*;
pub use tracker_app::*;

pub const DATA_DIR: &str = "data/";
pub const WORKOUTS_SLOT: &str = "workouts";
/// Holds the last slot content that could not be decoded.
pub const CORRUPT_WORKOUTS_SLOT: &str = concatcp!(WORKOUTS_SLOT, "_corrupt");

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataManagerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No workout with id {0}")]
    NotFound(WorkoutId),

    #[error("Stored workouts could not be read: {0}")]
    CorruptStorage(String),

    #[error("Storage error: {0}")]
    Storage(String),
}
