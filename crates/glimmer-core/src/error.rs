//! Centralized error types for the glimmer segments.
//!
//! This module provides a typed error hierarchy that:
//! - Separates "this segment does not apply here" from visible failures
//! - Provides short messages suitable for a verbose CLI listing
//! - Preserves full error context for debugging/logging

use thiserror::Error;

/// Errors raised while evaluating a segment.
///
/// Every variant is caught at the segment facade and turned into either an
/// inapplicable result or an error display; none of them reach the host.
#[derive(Debug, Clone, Error)]
pub enum SegmentError {
    #[error("Context unresolved: {0}")]
    ContextUnresolved(String),

    #[error("No coordinates found for location {0:?}")]
    NoCoordinatesFound(String),

    #[error("Missing credentials: {0}")]
    AuthConfigMissing(String),

    #[error("Upstream fetch failed: {0}")]
    UpstreamFetchFailed(#[from] FetchError),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("No data found: {0}")]
    NoDataFound(String),

    #[error("Repository metadata unreadable: {0}")]
    RepositoryMetadata(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<ConfigError> for SegmentError {
    fn from(e: ConfigError) -> Self {
        SegmentError::Config(e.to_string())
    }
}

impl SegmentError {
    /// True when the segment should be hidden rather than show an error.
    pub fn is_inapplicable(&self) -> bool {
        matches!(
            self,
            SegmentError::ContextUnresolved(_) | SegmentError::NoCoordinatesFound(_)
        )
    }

    /// Short message suitable for terminal display.
    pub fn user_message(&self) -> &'static str {
        match self {
            SegmentError::ContextUnresolved(_) => "Nothing to show here.",
            SegmentError::NoCoordinatesFound(_) => "Location could not be found.",
            SegmentError::AuthConfigMissing(_) => "No API key or token configured.",
            SegmentError::UpstreamFetchFailed(e) => e.user_message(),
            SegmentError::MalformedResponse(_) => "Received an unexpected response.",
            SegmentError::NoDataFound(_) => "The service returned no data.",
            SegmentError::RepositoryMetadata(_) => "Could not read repository metadata.",
            SegmentError::Cache(_) => "Cached data may be outdated.",
            SegmentError::Config(_) => "Invalid configuration. Check your settings.",
        }
    }
}

/// HTTP transport errors.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::Connection(_) => "Unable to connect. Check your internet connection.",
            FetchError::Timeout => "The request timed out.",
            FetchError::Status { status, .. } if *status == 401 || *status == 403 => {
                "The service rejected the credentials."
            }
            FetchError::Status { status, .. } if *status >= 500 => {
                "The service is experiencing issues."
            }
            FetchError::Status { .. } => "The request failed.",
            FetchError::InvalidUrl(_) => "The request URL is invalid. Check your settings.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory unavailable")]
    NoConfigDir,

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Configuration IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NoConfigDir => "No configuration directory found. Using defaults.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::Io(_) => "Configuration file could not be read or written.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_fetch_error(self) -> FetchError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_fetch_error(self) -> FetchError {
        if self.is_timeout() {
            FetchError::Timeout
        } else if self.is_builder() {
            FetchError::InvalidUrl(self.to_string())
        } else if let Some(status) = self.status() {
            FetchError::Status {
                status: status.as_u16(),
                body: self.to_string(),
            }
        } else {
            FetchError::Connection(self.to_string())
        }
    }
}
