use std::sync::Arc;

use async_trait::async_trait;
use glimmer_core::{
    CacheKeys, CacheStore, CachedFetcher, Environment, Fetched, Fresh, HttpClient, Outcome,
    Rendered, Segment, SegmentError, WeatherConfig,
};

use crate::display::WeatherDisplay;
use crate::location::CoordinateSource;
use crate::provider::{resolve_api_key, OpenWeatherClient};
use crate::types::WeatherResponse;

pub const SEGMENT_ID: &str = "weather";

/// Default template: icon and requested-unit temperature.
pub const TEMPLATE: &str = " {{ .Weather }} ({{ .Temperature }}{{ .UnitIcon }}) ";

const INDEX_PREFIX: &str = "owm_url";
const PAYLOAD_PREFIX: &str = "owm_response";

/// Current weather for the configured place.
pub struct WeatherSegment {
    config: WeatherConfig,
    env: Arc<dyn Environment>,
    cache: Arc<dyn CacheStore>,
    http: Arc<dyn HttpClient>,
}

impl WeatherSegment {
    pub fn new(
        config: WeatherConfig,
        env: Arc<dyn Environment>,
        cache: Arc<dyn CacheStore>,
        http: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            config,
            env,
            cache,
            http,
        }
    }

    /// Serves the current weather from the cache, or geocodes if needed and
    /// fetches it.
    pub async fn evaluate(&self) -> Result<WeatherDisplay, SegmentError> {
        let source = CoordinateSource::from_config(&self.config)?;
        let api_key = resolve_api_key(&self.config, self.env.as_ref())?;
        let ttl = self.config.ttl()?;
        let units = self.config.units;
        let client = OpenWeatherClient::from_config(self.http.clone(), &self.config, api_key)?;

        let scope = format!("{}&units={}", source.scope(), units.as_str());
        let keys = CacheKeys::new(INDEX_PREFIX, &scope, PAYLOAD_PREFIX);
        let client = &client;
        let source = &source;

        let fetched: Fetched<WeatherResponse> = CachedFetcher::new(self.cache.as_ref())
            .fetch_with_cache(&keys, ttl, move || async move {
                let coords = match source {
                    CoordinateSource::Explicit(coords) => *coords,
                    CoordinateSource::Geocode(location) => client.geocode(location).await?,
                };
                let (body, url) = client.current_weather(coords, units).await?;
                check_reportable(&body)?;
                Ok(Fresh { ident: url, body })
            })
            .await?;

        let mut display = WeatherDisplay::interpret(
            &fetched.payload,
            units,
            self.config.with_units,
            fetched.ident,
        )?;
        display.from_cache = fetched.from_cache;
        Ok(display)
    }
}

/// Rejects a body that parses but carries no condition, so it is never cached.
fn check_reportable(body: &str) -> Result<(), SegmentError> {
    let response: WeatherResponse = serde_json::from_str(body)
        .map_err(|e| SegmentError::MalformedResponse(format!("weather response: {}", e)))?;
    if response.weather.is_empty() {
        return Err(SegmentError::NoDataFound("response has no weather entries".into()));
    }
    Ok(())
}

#[async_trait]
impl Segment for WeatherSegment {
    fn id(&self) -> &'static str {
        SEGMENT_ID
    }

    fn template(&self) -> &'static str {
        TEMPLATE
    }

    async fn render(&self) -> Rendered {
        let outcome = Outcome::from_result(SEGMENT_ID, self.evaluate().await);
        Rendered::from_outcome(SEGMENT_ID, TEMPLATE, &outcome)
    }
}
