use serde::{Deserialize, Serialize};

/// A map position. Written as a `[latitude, longitude]` pair; also read from
/// the `{"lat": .., "lng": ..}` object a Leaflet `LatLng` serializes to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredLatLng", into = "[f64; 2]")]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLng {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both coordinates are finite and inside the usual WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredLatLng {
    Pair([f64; 2]),
    Leaflet { lat: f64, lng: f64 },
}

impl From<StoredLatLng> for LatLng {
    fn from(value: StoredLatLng) -> Self {
        match value {
            StoredLatLng::Pair(pair) => pair.into(),
            StoredLatLng::Leaflet { lat, lng } => Self::new(lat, lng),
        }
    }
}

impl From<[f64; 2]> for LatLng {
    fn from(value: [f64; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

impl From<LatLng> for [f64; 2] {
    fn from(value: LatLng) -> Self {
        [value.latitude, value.longitude]
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5}, {:.5}", self.latitude, self.longitude)
    }
}
