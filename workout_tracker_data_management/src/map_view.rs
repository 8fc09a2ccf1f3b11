use workout_tracker_lib::{location::LatLng, workout::Workout};

/// The map the workouts are drawn on.
///
/// Marker handles are opaque to the tracker; it only keeps them, keyed by
/// workout id, to hand them back to [`MapView::remove_marker`].
pub trait MapView {
    type Marker;

    fn set_view(&mut self, center: LatLng, zoom: f64);

    /// Marks where the user currently is.
    fn show_position(&mut self, position: LatLng);

    /// Adds a marker with the workout's popup.
    fn add_marker(&mut self, workout: &Workout) -> Self::Marker;

    fn remove_marker(&mut self, marker: Self::Marker);
}
