//! Where to ask the weather for.

use std::fmt;

use glimmer_core::{SegmentError, WeatherConfig};

/// A point on the globe, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Returns the pair only if both values are within range.
    pub fn checked(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude);
        valid.then_some(Self {
            latitude,
            longitude,
        })
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// How coordinates will be obtained for this invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinateSource {
    /// Configured coordinates, used as-is.
    Explicit(Coordinates),
    /// A free-text place name that needs a geocoding lookup.
    Geocode(String),
}

impl CoordinateSource {
    /// Explicit coordinates win when both are set and in range; otherwise the
    /// location string is geocoded. With neither there is nothing to ask for.
    pub fn from_config(config: &WeatherConfig) -> Result<Self, SegmentError> {
        if let (Some(lat), Some(lon)) = (config.latitude, config.longitude) {
            match Coordinates::checked(lat, lon) {
                Some(coords) => return Ok(Self::Explicit(coords)),
                None => tracing::debug!("Coordinates {},{} out of range, geocoding instead", lat, lon),
            }
        }

        let location = config.location.trim();
        if location.is_empty() {
            return Err(SegmentError::ContextUnresolved(
                "no weather location or coordinates configured".to_string(),
            ));
        }
        Ok(Self::Geocode(location.to_string()))
    }

    /// Stable description of the query, used to scope cache entries.
    pub fn scope(&self) -> String {
        match self {
            Self::Explicit(coords) => format!("coords={}", coords),
            Self::Geocode(location) => format!("q={}", location),
        }
    }
}
