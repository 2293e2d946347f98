//! Weather segment
//!
//! Current conditions from OpenWeatherMap, by configured coordinates or a
//! geocoded place name, shown as an icon plus temperatures in every scale.

pub mod display;
pub mod geocode;
pub mod location;
pub mod provider;
pub mod segment;
pub mod types;
pub mod units;

pub use display::WeatherDisplay;
pub use location::{CoordinateSource, Coordinates};
pub use provider::{resolve_api_key, OpenWeatherClient, DEFAULT_API_KEY_ENV};
pub use segment::WeatherSegment;
pub use types::{WeatherCondition, WeatherEntry, WeatherResponse};
