use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use workout_tracker_data_management::{
    config::resolve_data_dir, map_view::MapView, DataManager, DataManagerError, NewWorkoutKind, TrackerApp, WorkoutForm,
};
use workout_tracker_lib::{
    location::LatLng,
    workout::{Workout, WorkoutId},
};

#[derive(Parser)]
#[command(name = "workouts")]
#[command(about = "Record running and cycling workouts on a map", long_about = None)]
struct Cli {
    /// Directory holding the stored workouts
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Your current position as latitude and longitude
    #[arg(long, global = true, num_args = 2, value_names = ["LAT", "LNG"], allow_negative_numbers = true)]
    position: Option<Vec<f64>>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a run at the given location
    AddRunning {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lng: f64,
        /// Kilometres
        distance: f64,
        /// Minutes
        duration: f64,
        /// Steps per minute
        cadence: f64,
    },
    /// Record a ride at the given location
    AddCycling {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lng: f64,
        /// Kilometres
        distance: f64,
        /// Minutes
        duration: f64,
        /// Metres, negative for a net descent
        #[arg(allow_negative_numbers = true)]
        elevation_gain: f64,
    },
    /// List all workouts, newest first
    List,
    /// Show one workout
    Show { id: String },
    /// Delete a workout
    Delete { id: String },
    /// Centre the map on a workout
    Focus {
        id: String,
        #[arg(long)]
        zoom: Option<f64>,
    },
    /// Delete every workout
    Reset,
}

/// Stands in for the map by logging what would be drawn.
#[derive(Default)]
struct ConsoleMap {
    next_marker: usize,
}

impl MapView for ConsoleMap {
    type Marker = usize;

    fn set_view(&mut self, center: LatLng, zoom: f64) {
        tracing::debug!("Map view at {} (zoom {})", center, zoom);
    }

    fn show_position(&mut self, position: LatLng) {
        tracing::debug!("📍 Current location {}", position);
    }

    fn add_marker(&mut self, workout: &Workout) -> usize {
        self.next_marker += 1;
        tracing::debug!("Marker {} at {}: {}", self.next_marker, workout.location(), workout.popup_content());
        self.next_marker
    }

    fn remove_marker(&mut self, marker: usize) {
        tracing::debug!("Marker {} removed", marker);
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), DataManagerError> {
    let data_dir = resolve_data_dir(cli.data_dir);
    let manager = DataManager::start(&data_dir)?;
    let position = cli.position.map(|p| LatLng::new(p[0], p[1]));

    let (mut app, notices) = TrackerApp::start(manager, ConsoleMap::default(), position);
    for notice in notices {
        tracing::info!("{}", notice);
    }

    match &cli.command {
        Commands::AddRunning { lat, lng, distance, duration, cadence } => {
            app.select_location(LatLng::new(*lat, *lng));
            let workout = app.submit(WorkoutForm {
                distance: *distance,
                duration: *duration,
                kind: NewWorkoutKind::Running { cadence: *cadence },
            })?;
            println!("Record added: {} ({})", workout.description(), workout.id());
        }
        Commands::AddCycling { lat, lng, distance, duration, elevation_gain } => {
            app.select_location(LatLng::new(*lat, *lng));
            let workout = app.submit(WorkoutForm {
                distance: *distance,
                duration: *duration,
                kind: NewWorkoutKind::Cycling { elevation_gain: *elevation_gain },
            })?;
            println!("Record added: {} ({})", workout.description(), workout.id());
        }
        Commands::List => {
            // The list shows the latest workout on top
            for workout in app.workouts().iter().rev() {
                print_workout(workout);
            }
        }
        Commands::Show { id } => {
            let workout = app.manager().find_by_id(&WorkoutId(id.clone()))?;
            println!("{}", workout.popup_content());
            print_workout(workout);
        }
        Commands::Delete { id } => {
            let workout = app.delete(&WorkoutId(id.clone()))?;
            println!("Deleted {}", workout.description());
        }
        Commands::Focus { id, zoom } => {
            if let Some(zoom) = zoom {
                app.set_zoom(*zoom);
            }
            let location = app.focus(&WorkoutId(id.clone()))?;
            println!("Map centred on {} (zoom {})", location, app.zoom());
        }
        Commands::Reset => {
            app.reset()?;
            println!("All workouts deleted");
        }
    }

    app.shutdown();
    Ok(())
}

fn print_workout(workout: &Workout) {
    let details = workout
        .details()
        .into_iter()
        .map(|detail| format!("{} {} {}", detail.icon, detail.value, detail.unit))
        .collect::<Vec<_>>()
        .join("   ");

    println!("{}\t{}\t{}", workout.id(), workout.description(), details);
}
