use glimmer_core::{DisplayFields, SegmentError, UnitSystem};
use serde::Serialize;

use crate::types::{WeatherCondition, WeatherResponse};
use crate::units::{
    round_degrees, unit_glyph, Temperatures, CELSIUS_GLYPH, FAHRENHEIT_GLYPH, KELVIN_GLYPH,
};

/// Template fields of the weather segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeatherDisplay {
    /// Requested-unit temperature, whole degrees, no glyph
    pub temperature: i64,
    pub feels_like: String,
    /// Condition icon
    pub weather: String,
    pub standard: String,
    pub imperial: String,
    pub metric: String,
    pub unit_icon: String,
    /// Request URL without credentials
    pub url: String,
    #[serde(skip)]
    pub from_cache: bool,
}

fn degrees(value: f64, glyph: &str, with_units: bool) -> String {
    let rounded = round_degrees(value);
    if with_units {
        format!("{}{}", rounded, glyph)
    } else {
        rounded.to_string()
    }
}

impl WeatherDisplay {
    /// Derives the display from a parsed response. The first `weather` entry
    /// picks the icon; an empty list is [`SegmentError::NoDataFound`].
    pub fn interpret(
        response: &WeatherResponse,
        units: UnitSystem,
        with_units: bool,
        url: String,
    ) -> Result<Self, SegmentError> {
        let primary = response
            .weather
            .first()
            .ok_or_else(|| SegmentError::NoDataFound("response has no weather entries".into()))?;

        let unit_icon = unit_glyph(units);
        let scales = Temperatures::from_reading(response.main.temp, units);

        Ok(Self {
            temperature: round_degrees(response.main.temp),
            feels_like: degrees(response.main.feels_like, unit_icon, with_units),
            weather: WeatherCondition::from(primary).icon().to_string(),
            standard: degrees(scales.kelvin, KELVIN_GLYPH, with_units),
            imperial: degrees(scales.fahrenheit, FAHRENHEIT_GLYPH, with_units),
            metric: degrees(scales.celsius, CELSIUS_GLYPH, with_units),
            unit_icon: unit_icon.to_string(),
            url,
            from_cache: false,
        })
    }
}

impl DisplayFields for WeatherDisplay {
    const FIELD_NAMES: &'static [&'static str] = &[
        "Temperature",
        "FeelsLike",
        "Weather",
        "Standard",
        "Imperial",
        "Metric",
        "UnitIcon",
        "URL",
    ];

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Temperature", self.temperature.to_string()),
            ("FeelsLike", self.feels_like.clone()),
            ("Weather", self.weather.clone()),
            ("Standard", self.standard.clone()),
            ("Imperial", self.imperial.clone()),
            ("Metric", self.metric.clone()),
            ("UnitIcon", self.unit_icon.clone()),
            ("URL", self.url.clone()),
        ]
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::types::{Reading, WeatherEntry};

    fn response(main: &str, id: u32, temp: f64, feels_like: f64) -> WeatherResponse {
        WeatherResponse {
            weather: vec![WeatherEntry {
                id,
                main: main.to_string(),
                description: String::new(),
                icon: String::new(),
            }],
            main: Reading { temp, feels_like },
        }
    }

    #[test]
    fn test_standard_units_with_glyphs() {
        let display = WeatherDisplay::interpret(
            &response("Clouds", 803, 284.4, 283.6),
            UnitSystem::Standard,
            true,
            "u".into(),
        )
        .unwrap();

        assert_eq!(display.temperature, 284);
        assert_eq!(display.feels_like, "284°K");
        assert_eq!(display.weather, "🌥");
        assert_eq!(display.standard, "284°K");
        assert_eq!(display.metric, "11°C");
        assert_eq!(display.imperial, "52°F");
        assert_eq!(display.unit_icon, "°K");
    }

    #[test]
    fn test_metric_without_glyphs() {
        let display = WeatherDisplay::interpret(
            &response("Rain", 500, 20.0, 19.4),
            UnitSystem::Metric,
            false,
            "u".into(),
        )
        .unwrap();

        assert_eq!(display.temperature, 20);
        assert_eq!(display.feels_like, "19");
        assert_eq!(display.metric, "20");
        assert_eq!(display.imperial, "68");
        assert_eq!(display.standard, "293");
        assert_eq!(display.unit_icon, "°C");
        assert_eq!(display.weather, "🌧");
    }

    #[test]
    fn test_imperial_feels_like_uses_requested_glyph() {
        let display = WeatherDisplay::interpret(
            &response("Snow", 600, 32.0, 25.2),
            UnitSystem::Imperial,
            true,
            "u".into(),
        )
        .unwrap();

        assert_eq!(display.feels_like, "25°F");
        assert_eq!(display.metric, "0°C");
        assert_eq!(display.standard, "273°K");
    }

    #[test]
    fn test_empty_weather_list_is_no_data() {
        let empty = WeatherResponse {
            weather: vec![],
            main: Reading {
                temp: 1.0,
                feels_like: 1.0,
            },
        };
        let err = WeatherDisplay::interpret(&empty, UnitSystem::Metric, true, "u".into()).unwrap_err();
        assert!(matches!(err, SegmentError::NoDataFound(_)));
    }

    #[test]
    fn test_fields_follow_field_names() {
        let display = WeatherDisplay::interpret(
            &response("Clear", 800, 300.0, 300.0),
            UnitSystem::Standard,
            true,
            "https://example.test/data/2.5/weather?lat=1&lon=2&units=standard".into(),
        )
        .unwrap();
        let names: Vec<_> = display.fields().into_iter().map(|(k, _)| k).collect();
        assert_eq!(names, WeatherDisplay::FIELD_NAMES);
        assert_eq!(display.weather, "☀️");
    }
}
