//! Temperature scales and conversions between them.

use glimmer_core::UnitSystem;

pub const KELVIN_GLYPH: &str = "°K";
pub const CELSIUS_GLYPH: &str = "°C";
pub const FAHRENHEIT_GLYPH: &str = "°F";

const ABSOLUTE_ZERO_C: f64 = 273.15;

/// Glyph of the scale a unit system reports temperatures in.
pub fn unit_glyph(units: UnitSystem) -> &'static str {
    match units {
        UnitSystem::Standard => KELVIN_GLYPH,
        UnitSystem::Metric => CELSIUS_GLYPH,
        UnitSystem::Imperial => FAHRENHEIT_GLYPH,
    }
}

pub fn kelvin_to_celsius(k: f64) -> f64 {
    k - ABSOLUTE_ZERO_C
}

pub fn celsius_to_kelvin(c: f64) -> f64 {
    c + ABSOLUTE_ZERO_C
}

pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

pub fn kelvin_to_fahrenheit(k: f64) -> f64 {
    9.0 / 5.0 * (k - ABSOLUTE_ZERO_C) + 32.0
}

pub fn fahrenheit_to_kelvin(f: f64) -> f64 {
    5.0 / 9.0 * (f - 32.0) + ABSOLUTE_ZERO_C
}

/// Nearest whole degree, halves away from zero.
pub fn round_degrees(value: f64) -> i64 {
    value.round() as i64
}

/// One temperature expressed in all three scales, unrounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Temperatures {
    pub kelvin: f64,
    pub celsius: f64,
    pub fahrenheit: f64,
}

impl Temperatures {
    /// Expands a reading taken in `units` to every scale.
    pub fn from_reading(value: f64, units: UnitSystem) -> Self {
        match units {
            UnitSystem::Standard => Self {
                kelvin: value,
                celsius: kelvin_to_celsius(value),
                fahrenheit: kelvin_to_fahrenheit(value),
            },
            UnitSystem::Metric => Self {
                kelvin: celsius_to_kelvin(value),
                celsius: value,
                fahrenheit: celsius_to_fahrenheit(value),
            },
            UnitSystem::Imperial => Self {
                kelvin: fahrenheit_to_kelvin(value),
                celsius: fahrenheit_to_celsius(value),
                fahrenheit: value,
            },
        }
    }
}
