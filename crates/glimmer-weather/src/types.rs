use serde::{Deserialize, Serialize};

/// One entry of the `weather` array of a current-weather response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherEntry {
    /// Condition code, e.g. 803 for broken clouds
    pub id: u32,

    /// Condition group, e.g. "Clouds"
    pub main: String,

    #[serde(default)]
    pub description: String,

    /// Provider icon code, e.g. "04d"
    #[serde(default)]
    pub icon: String,
}

/// The `main` block: temperatures in the requested unit system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub temp: f64,
    pub feels_like: f64,
}

/// Current-weather response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResponse {
    #[serde(default)]
    pub weather: Vec<WeatherEntry>,

    pub main: Reading,
}

/// One geocoding match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoMatch {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub country: Option<String>,
}

/// Weather condition categories mapped from provider condition groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    #[default]
    Clear,
    FewClouds,
    ScatteredClouds,
    BrokenClouds,
    Overcast,
    Fog,
    Drizzle,
    Rain,
    Snow,
    Thunderstorm,
    Tornado,
}

impl WeatherCondition {
    /// Classify by condition group, refining `Clouds` by condition code.
    /// Anything unrecognised counts as clear sky.
    pub fn classify(main: &str, id: u32) -> Self {
        match main {
            "Thunderstorm" => Self::Thunderstorm,
            "Drizzle" => Self::Drizzle,
            "Rain" => Self::Rain,
            "Snow" => Self::Snow,
            "Tornado" => Self::Tornado,
            "Fog" => Self::Fog,
            "Clouds" => match id {
                801 => Self::FewClouds,
                802 => Self::ScatteredClouds,
                803 => Self::BrokenClouds,
                804 => Self::Overcast,
                _ => Self::Clear,
            },
            _ => Self::Clear,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Clear => "☀️",
            Self::FewClouds => "🌤",
            Self::ScatteredClouds => "⛅️",
            Self::BrokenClouds => "🌥",
            Self::Overcast => "☁️",
            Self::Fog => "💨",
            Self::Drizzle => "🌦",
            Self::Rain => "🌧",
            Self::Snow => "🌨",
            Self::Thunderstorm => "⛈",
            Self::Tornado => "🌪",
        }
    }
}

impl From<&WeatherEntry> for WeatherCondition {
    fn from(entry: &WeatherEntry) -> Self {
        Self::classify(&entry.main, entry.id)
    }
}
