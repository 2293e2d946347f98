use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;
use crate::ttl::Ttl;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Location of the response cache shared between prompt renders
    pub cache_path: PathBuf,

    /// Merge request segment settings
    pub gitlab: GitLabConfig,

    /// Weather segment settings
    pub weather: WeatherConfig,
}

/// Unit system requested from the weather provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    /// Kelvin
    #[default]
    Standard,
    /// Celsius
    Metric,
    /// Fahrenheit
    Imperial,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Standard => "standard",
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitLabConfig {
    /// GitLab instance host; a value with an explicit http(s) scheme is used verbatim
    pub hostname: String,

    /// REST API version segment
    pub api_version: String,

    /// Personal access token
    pub access_token: Option<String>,

    /// Name of an environment variable holding the access token
    pub token_variable: Option<String>,

    /// Username whose merge requests are counted separately
    pub author_username: Option<String>,

    /// Only list merge requests by `author_username` (filtered server-side)
    pub author_only: bool,

    /// Only show the segment at the repository root
    pub root_only: bool,

    /// Cache time-to-live, e.g. "5m0s"; zero or negative disables caching
    pub cache_timeout: String,

    /// Per-request timeout in milliseconds
    pub http_timeout_ms: u64,
}

impl Default for GitLabConfig {
    fn default() -> Self {
        Self {
            hostname: "gitlab.com".to_string(),
            api_version: "v4".to_string(),
            access_token: None,
            token_variable: None,
            author_username: None,
            author_only: false,
            root_only: true,
            cache_timeout: "5m0s".to_string(),
            http_timeout_ms: default_http_timeout_ms(),
        }
    }
}

impl GitLabConfig {
    pub fn ttl(&self) -> Result<Ttl, ConfigError> {
        self.cache_timeout.parse()
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }

    /// `hostname` with a scheme, `https://` unless one is given.
    fn instance_root(&self) -> String {
        let host = self.hostname.trim().trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        }
    }

    /// Host name used for matching the `origin` remote, without scheme or port.
    pub fn host(&self) -> String {
        match Url::parse(&self.instance_root()) {
            Ok(url) => url.host_str().unwrap_or_default().to_string(),
            Err(_) => self.hostname.trim().trim_end_matches('/').to_string(),
        }
    }

    /// Base URL of the REST API, e.g. `https://gitlab.com/api/v4/`.
    pub fn api_base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&format!(
            "{}/api/{}/",
            self.instance_root(),
            self.api_version.trim_matches('/')
        ))
        .map_err(|e| ConfigError::Invalid(format!("gitlab.hostname: {}", e)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key
    pub api_key: Option<String>,

    /// Name of an environment variable holding the API key
    pub api_key_env: Option<String>,

    /// Free-text location, geocoded when no valid coordinates are configured
    pub location: String,

    pub latitude: Option<f64>,

    pub longitude: Option<f64>,

    pub units: UnitSystem,

    /// Append unit glyphs to the per-scale temperature fields
    pub with_units: bool,

    /// Cache time-to-live, e.g. "10m0s"; zero or negative disables caching
    pub cache_timeout: String,

    /// Per-request timeout in milliseconds
    pub http_timeout_ms: u64,

    /// Provider endpoint root
    pub base_url: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: None,
            location: "De Bilt,NL".to_string(),
            latitude: None,
            longitude: None,
            units: UnitSystem::Standard,
            with_units: true,
            cache_timeout: "10m0s".to_string(),
            http_timeout_ms: default_http_timeout_ms(),
            base_url: "https://api.openweathermap.org".to_string(),
        }
    }
}

impl WeatherConfig {
    pub fn ttl(&self) -> Result<Ttl, ConfigError> {
        self.cache_timeout.parse()
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }

    pub fn base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&format!("{}/", self.base_url.trim_end_matches('/')))
            .map_err(|e| ConfigError::Invalid(format!("weather.base_url: {}", e)))
    }
}

/// Stand-in for a configured credential in printed configuration.
pub const REDACTED: &str = "***";

fn default_http_timeout_ms() -> u64 {
    500
}

fn default_cache_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("glimmer")
        .join("cache.json")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_path: default_cache_path(),
            gitlab: GitLabConfig::default(),
            weather: WeatherConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Self::default();
            if let Err(e) = config.save_to(&config_path) {
                tracing::warn!("Could not write default config to {:?}: {}", config_path, e);
            }
            return Ok(config);
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        // GitLab
        if self.gitlab.hostname.trim().is_empty() {
            result.add_warning("gitlab.hostname", "Empty hostname; the segment will never match");
        } else if let Err(e) = self.gitlab.api_base_url() {
            result.add_error("gitlab.hostname", e.to_string());
        }
        if let Err(e) = self.gitlab.ttl() {
            result.add_error("gitlab.cache_timeout", e.to_string());
        }
        if self.gitlab.http_timeout_ms == 0 {
            result.add_error("gitlab.http_timeout_ms", "Timeout must be greater than 0");
        }
        if self.gitlab.author_only && self.gitlab.author_username.is_none() {
            result.add_warning(
                "gitlab.author_only",
                "author_only without author_username counts every open merge request",
            );
        }

        // Weather
        if let Err(e) = self.weather.ttl() {
            result.add_error("weather.cache_timeout", e.to_string());
        }
        if self.weather.http_timeout_ms == 0 {
            result.add_error("weather.http_timeout_ms", "Timeout must be greater than 0");
        }
        self.validate_url(&self.weather.base_url, "weather.base_url", &mut result);
        if let Some(lat) = self.weather.latitude {
            if !(-90.0..=90.0).contains(&lat) {
                result.add_warning("weather.latitude", "Out of range; location will be geocoded");
            }
        }
        if let Some(lon) = self.weather.longitude {
            if !(-180.0..=180.0).contains(&lon) {
                result.add_warning("weather.longitude", "Out of range; location will be geocoded");
            }
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }
                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Copy safe to print: credentials are replaced by a mask.
    pub fn redacted(&self) -> Config {
        let mask = |secret: &Option<String>| secret.as_ref().map(|_| REDACTED.to_string());
        let mut config = self.clone();
        config.gitlab.access_token = mask(&self.gitlab.access_token);
        config.weather.api_key = mask(&self.weather.api_key);
        config
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("glimmer").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
    }

    #[test]
    fn test_defaults_match_recognized_options() {
        let config = Config::default();
        assert_eq!(config.gitlab.hostname, "gitlab.com");
        assert_eq!(config.gitlab.api_version, "v4");
        assert!(config.gitlab.root_only);
        assert!(!config.gitlab.author_only);
        assert_eq!(config.gitlab.ttl().unwrap(), Ttl::For(Duration::from_secs(300)));
        assert_eq!(config.weather.units, UnitSystem::Standard);
        assert!(config.weather.with_units);
        assert_eq!(config.weather.location, "De Bilt,NL");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [gitlab]
            hostname = "gitlab.example.org"
            author_username = "alice"

            [weather]
            units = "metric"
            latitude = 52.1
            longitude = 5.18
            "#,
        )
        .unwrap();

        assert_eq!(config.gitlab.hostname, "gitlab.example.org");
        assert_eq!(config.gitlab.author_username.as_deref(), Some("alice"));
        assert_eq!(config.gitlab.api_version, "v4");
        assert_eq!(config.weather.units, UnitSystem::Metric);
        assert_eq!(config.weather.latitude, Some(52.1));
        assert!(config.weather.with_units);
    }

    #[test]
    fn test_unknown_units_rejected() {
        let parsed: Result<Config, _> = toml::from_str("[weather]\nunits = \"kelvin\"\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_api_base_url() {
        let mut gitlab = GitLabConfig::default();
        assert_eq!(gitlab.api_base_url().unwrap().as_str(), "https://gitlab.com/api/v4/");
        assert_eq!(gitlab.host(), "gitlab.com");

        gitlab.hostname = "http://127.0.0.1:8080/".to_string();
        assert_eq!(gitlab.api_base_url().unwrap().as_str(), "http://127.0.0.1:8080/api/v4/");
        assert_eq!(gitlab.host(), "127.0.0.1");
    }

    #[test]
    fn test_host_without_scheme_drops_port() {
        let gitlab = GitLabConfig {
            hostname: "gitlab.corp.example:8443".to_string(),
            ..GitLabConfig::default()
        };
        assert_eq!(
            gitlab.api_base_url().unwrap().as_str(),
            "https://gitlab.corp.example:8443/api/v4/"
        );
        assert_eq!(gitlab.host(), "gitlab.corp.example");
    }

    #[test]
    fn test_redacted_masks_credentials() {
        let mut config = Config::default();
        config.gitlab.access_token = Some("glpat-secret".to_string());
        config.weather.api_key = Some("owm-secret".to_string());

        let shown = config.redacted();
        assert_eq!(shown.gitlab.access_token.as_deref(), Some(REDACTED));
        assert_eq!(shown.weather.api_key.as_deref(), Some(REDACTED));
        assert_eq!(shown.gitlab.hostname, config.gitlab.hostname);

        let printed = serde_json::to_string(&shown).unwrap();
        assert!(!printed.contains("glpat-secret"));
        assert!(!printed.contains("owm-secret"));

        assert!(Config::default().redacted().gitlab.access_token.is_none());
    }

    #[test]
    fn test_invalid_ttl_is_error() {
        let mut config = Config::default();
        config.gitlab.cache_timeout = "five minutes".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "gitlab.cache_timeout"));
    }

    #[test]
    fn test_out_of_range_coordinates_are_warnings() {
        let mut config = Config::default();
        config.weather.latitude = Some(95.0);
        config.weather.longitude = Some(5.0);
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "weather.latitude"));
    }

    #[test]
    fn test_invalid_base_url_scheme() {
        let mut config = Config::default();
        config.weather.base_url = "ftp://example.com".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("glimmer").join("config.toml");
        let mut config = Config::default();
        config.gitlab.author_only = true;
        config.weather.units = UnitSystem::Imperial;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert!(loaded.gitlab.author_only);
        assert_eq!(loaded.weather.units, UnitSystem::Imperial);
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }
}
