//! Outbound HTTP: a small request type and the client seam segments fetch through.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::error::{FetchError, ReqwestErrorExt};

const USER_AGENT: &str = concat!("glimmer/", env!("CARGO_PKG_VERSION"));

/// A GET request: URL, extra headers and a per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
}

impl HttpRequest {
    pub fn get(url: Url, timeout: Duration) -> Self {
        Self {
            url,
            headers: Vec::new(),
            timeout,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// The URL with credential-bearing query parameters removed, safe for logs and display.
    pub fn redacted_url(&self) -> String {
        redact_url(&self.url)
    }
}

/// Removes `appid`, `api_key`, `private_token` and `access_token` query parameters.
pub fn redact_url(url: &Url) -> String {
    const SECRET_PARAMS: [&str; 4] = ["appid", "api_key", "private_token", "access_token"];

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !SECRET_PARAMS.contains(&k.as_ref()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut redacted = url.clone();
    if kept.is_empty() {
        redacted.set_query(None);
    } else {
        redacted.query_pairs_mut().clear().extend_pairs(kept);
    }
    redacted.to_string()
}

/// Transport used by segment clients. Retries, if any, are the implementation's concern.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Performs the request and returns the body of a 2xx response.
    async fn get(&self, request: &HttpRequest) -> Result<String, FetchError>;
}

/// [`HttpClient`] backed by one shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| e.into_fetch_error())?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, request: &HttpRequest) -> Result<String, FetchError> {
        tracing::debug!("GET {}", request.redacted_url());

        let mut builder = self
            .client
            .get(request.url.clone())
            .timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(|e| e.into_fetch_error())?;
        let status = response.status();
        let body = response.text().await.map_err(|e| e.into_fetch_error())?;

        if !status.is_success() {
            tracing::debug!("{} returned status {}", request.redacted_url(), status);
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        Ok(body)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
