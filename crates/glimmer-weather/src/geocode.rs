//! Forward geocoding: place name to coordinates.
//! Uses the provider's direct geocoding endpoint, first match only.

use glimmer_core::{http::redact_url, HttpRequest, SegmentError};
use url::Url;

use crate::location::Coordinates;
use crate::provider::OpenWeatherClient;
use crate::types::GeoMatch;

const GEOCODE_PATH: &str = "geo/1.0/direct";

/// Coordinates of the first match in a geocoding response body.
pub fn first_match(location: &str, body: &str) -> Result<Coordinates, SegmentError> {
    let matches: Vec<GeoMatch> = serde_json::from_str(body)
        .map_err(|e| SegmentError::MalformedResponse(format!("geocoding: {}", e)))?;

    let first = matches
        .into_iter()
        .next()
        .ok_or_else(|| SegmentError::NoCoordinatesFound(location.to_string()))?;

    tracing::debug!(
        "Geocoded {:?} to {} ({},{})",
        location,
        first.name,
        first.lat,
        first.lon
    );
    Ok(Coordinates {
        latitude: first.lat,
        longitude: first.lon,
    })
}

impl OpenWeatherClient {
    pub fn geocode_url(&self, location: &str) -> Result<Url, SegmentError> {
        let mut url = self.endpoint(GEOCODE_PATH)?;
        url.query_pairs_mut()
            .append_pair("q", location)
            .append_pair("limit", "1")
            .append_pair("appid", &self.api_key);
        Ok(url)
    }

    /// Looks `location` up. No match is [`SegmentError::NoCoordinatesFound`].
    pub async fn geocode(&self, location: &str) -> Result<Coordinates, SegmentError> {
        let url = self.geocode_url(location)?;
        tracing::debug!("Geocoding via {}", redact_url(&url));

        let body = self.http.get(&HttpRequest::get(url, self.timeout)).await?;
        first_match(location, &body)
    }
}
