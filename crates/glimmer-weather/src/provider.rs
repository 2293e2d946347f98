//! OpenWeatherMap current-weather client.

use std::sync::Arc;
use std::time::Duration;

use glimmer_core::{
    http::redact_url, Environment, FetchError, HttpClient, HttpRequest, SegmentError, UnitSystem,
    WeatherConfig,
};
use url::Url;

use crate::location::Coordinates;

/// Variable consulted when no key is configured.
pub const DEFAULT_API_KEY_ENV: &str = "GLIMMER_OWM_API_KEY";

const CURRENT_WEATHER_PATH: &str = "data/2.5/weather";

/// API key from `api_key`, then the variable named by `api_key_env`, then
/// [`DEFAULT_API_KEY_ENV`].
pub fn resolve_api_key(config: &WeatherConfig, env: &dyn Environment) -> Result<String, SegmentError> {
    if let Some(key) = config.api_key.as_deref().filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }

    config
        .api_key_env
        .as_deref()
        .filter(|name| !name.is_empty())
        .and_then(|name| env.getenv(name))
        .or_else(|| env.getenv(DEFAULT_API_KEY_ENV))
        .ok_or_else(|| {
            SegmentError::AuthConfigMissing(format!(
                "no weather.api_key, weather.api_key_env or ${} set",
                DEFAULT_API_KEY_ENV
            ))
        })
}

#[derive(Clone)]
pub struct OpenWeatherClient {
    pub(crate) http: Arc<dyn HttpClient>,
    pub(crate) base_url: Url,
    pub(crate) api_key: String,
    pub(crate) timeout: Duration,
}

impl OpenWeatherClient {
    pub fn new(http: Arc<dyn HttpClient>, base_url: Url, api_key: String, timeout: Duration) -> Self {
        Self {
            http,
            base_url,
            api_key,
            timeout,
        }
    }

    pub fn from_config(
        http: Arc<dyn HttpClient>,
        config: &WeatherConfig,
        api_key: String,
    ) -> Result<Self, SegmentError> {
        let base_url = config.base_url()?;
        Ok(Self::new(http, base_url, api_key, config.http_timeout()))
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, SegmentError> {
        self.base_url
            .join(path)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", path, e)).into())
    }

    /// Current-weather URL for `coords`, carrying the API key.
    pub fn current_weather_url(
        &self,
        coords: Coordinates,
        units: UnitSystem,
    ) -> Result<Url, SegmentError> {
        let mut url = self.endpoint(CURRENT_WEATHER_PATH)?;
        url.query_pairs_mut()
            .append_pair("lat", &coords.latitude.to_string())
            .append_pair("lon", &coords.longitude.to_string())
            .append_pair("units", units.as_str())
            .append_pair("appid", &self.api_key);
        Ok(url)
    }

    /// Raw current-weather body plus the request URL with the key removed.
    pub async fn current_weather(
        &self,
        coords: Coordinates,
        units: UnitSystem,
    ) -> Result<(String, String), SegmentError> {
        let url = self.current_weather_url(coords, units)?;
        let shown = redact_url(&url);
        tracing::debug!("Fetching current weather from {}", shown);

        let body = self.http.get(&HttpRequest::get(url, self.timeout)).await?;
        Ok((body, shown))
    }
}
