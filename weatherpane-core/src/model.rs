use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

/// A validated latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    lat: f64,
    lon: f64,
}

impl Coordinates {
    /// Fallback location used when nothing has been cached yet (San Francisco).
    pub const DEFAULT: Coordinates = Coordinates {
        lat: 37.779160,
        lon: -122.415810,
    };

    pub fn new(lat: f64, lon: f64) -> Result<Self, WeatherError> {
        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);

        if valid {
            Ok(Self { lat, lon })
        } else {
            Err(WeatherError::InvalidCoordinates { lat, lon })
        }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// Coarse weather category reported by the provider (`weather[0].main`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Condition {
    Clear,
    Atmosphere,
    Clouds,
    Drizzle,
    Rain,
    Snow,
    Thunderstorm,
    #[default]
    Unknown,
}

impl Condition {
    /// Map a provider category string, ignoring case. Anything unrecognized
    /// becomes [`Condition::Unknown`].
    pub fn from_provider(main: &str) -> Self {
        match main.trim().to_lowercase().as_str() {
            "clear" => Self::Clear,
            "atmosphere" => Self::Atmosphere,
            "clouds" => Self::Clouds,
            "drizzle" => Self::Drizzle,
            "rain" => Self::Rain,
            "snow" => Self::Snow,
            "thunderstorm" => Self::Thunderstorm,
            _ => Self::Unknown,
        }
    }
}

/// The most recent successful reading. Held in memory only.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub city: String,
    /// The coordinates that were requested, not the ones the provider echoes back.
    pub coordinates: Coordinates,
    pub temperature_celsius: f64,
    pub condition: Condition,
    /// Raw provider category, shown verbatim under the temperature.
    pub description: String,
    pub observed_at_epoch_seconds: i64,
}

/// Persisted last-known state, written after every successful fetch and
/// every unit toggle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    pub city: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(alias = "date")]
    pub observed_at_epoch_seconds: i64,
    #[serde(alias = "celsius", default = "default_use_celsius")]
    pub use_celsius: bool,
}

fn default_use_celsius() -> bool {
    true
}

impl LocationRecord {
    pub fn from_snapshot(snapshot: &WeatherSnapshot, use_celsius: bool) -> Self {
        Self {
            city: snapshot.city.clone(),
            lat: snapshot.coordinates.lat(),
            lon: snapshot.coordinates.lon(),
            observed_at_epoch_seconds: snapshot.observed_at_epoch_seconds,
            use_celsius,
        }
    }

    /// Stored coordinates, if they are in range.
    pub fn coordinates(&self) -> Option<Coordinates> {
        Coordinates::new(self.lat, self.lon).ok()
    }
}
