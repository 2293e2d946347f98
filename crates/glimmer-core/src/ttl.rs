//! Cache time-to-live values written as duration strings (`"5m0s"`, `"90s"`, `"1h30m"`).

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// How long a cached payload stays valid.
///
/// Zero and negative durations parse to [`Ttl::Disabled`]: every call is a live fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    Disabled,
    For(Duration),
}

impl Ttl {
    pub fn is_enabled(&self) -> bool {
        matches!(self, Ttl::For(_))
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Ttl::Disabled => None,
            Ttl::For(d) => Some(*d),
        }
    }
}

impl From<Duration> for Ttl {
    fn from(d: Duration) -> Self {
        if d.is_zero() {
            Ttl::Disabled
        } else {
            Ttl::For(d)
        }
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ttl::Disabled => f.write_str("0s"),
            Ttl::For(d) => {
                let secs = d.as_secs();
                let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
                if h > 0 {
                    write!(f, "{}h{}m{}s", h, m, s)
                } else if m > 0 {
                    write!(f, "{}m{}s", m, s)
                } else if d.subsec_millis() > 0 && s == 0 {
                    write!(f, "{}ms", d.subsec_millis())
                } else {
                    write!(f, "{}s", s)
                }
            }
        }
    }
}

impl FromStr for Ttl {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let invalid = || ConfigError::Invalid(format!("invalid duration {:?}", s));

        let (negative, body) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw.strip_prefix('+').unwrap_or(raw)),
        };
        if body.is_empty() {
            return Err(invalid());
        }
        if body == "0" {
            return Ok(Ttl::Disabled);
        }

        let mut total_nanos: f64 = 0.0;
        let mut rest = body;
        while !rest.is_empty() {
            let number_len = rest
                .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                .ok_or_else(invalid)?;
            if number_len == 0 {
                return Err(invalid());
            }
            let value: f64 = rest[..number_len].parse().map_err(|_| invalid())?;
            rest = &rest[number_len..];

            let unit_len = rest
                .find(|c: char| c.is_ascii_digit() || c == '.')
                .unwrap_or(rest.len());
            let scale = match &rest[..unit_len] {
                "ns" => 1.0,
                "us" | "µs" => 1e3,
                "ms" => 1e6,
                "s" => 1e9,
                "m" => 60.0 * 1e9,
                "h" => 3600.0 * 1e9,
                _ => return Err(invalid()),
            };
            total_nanos += value * scale;
            rest = &rest[unit_len..];
        }

        if negative || total_nanos < 1.0 {
            return Ok(Ttl::Disabled);
        }
        Ok(Ttl::For(Duration::from_nanos(total_nanos.round() as u64)))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_parse_compound_duration() {
        assert_eq!("5m0s".parse::<Ttl>().unwrap(), Ttl::For(Duration::from_secs(300)));
        assert_eq!("1h30m".parse::<Ttl>().unwrap(), Ttl::For(Duration::from_secs(5400)));
        assert_eq!("90s".parse::<Ttl>().unwrap(), Ttl::For(Duration::from_secs(90)));
        assert_eq!("1.5s".parse::<Ttl>().unwrap(), Ttl::For(Duration::from_millis(1500)));
        assert_eq!("250ms".parse::<Ttl>().unwrap(), Ttl::For(Duration::from_millis(250)));
    }

    #[test]
    fn test_zero_and_negative_disable_caching() {
        assert_eq!("0".parse::<Ttl>().unwrap(), Ttl::Disabled);
        assert_eq!("0s".parse::<Ttl>().unwrap(), Ttl::Disabled);
        assert_eq!("-5m".parse::<Ttl>().unwrap(), Ttl::Disabled);
        assert!(!Ttl::Disabled.is_enabled());
    }

    #[test]
    fn test_invalid_durations() {
        assert!("".parse::<Ttl>().is_err());
        assert!("5".parse::<Ttl>().is_err());
        assert!("5 minutes".parse::<Ttl>().is_err());
        assert!("m5".parse::<Ttl>().is_err());
        assert!("5d".parse::<Ttl>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Ttl::For(Duration::from_secs(300)).to_string(), "5m0s");
        assert_eq!(Ttl::For(Duration::from_secs(3725)).to_string(), "1h2m5s");
        assert_eq!(Ttl::Disabled.to_string(), "0s");
    }
}
