use std::sync::Arc;
use std::time::Duration;

use glimmer_core::{
    Environment, FetchError, GitLabConfig, HttpClient, HttpRequest, SegmentError,
};
use serde::{Deserialize, Serialize};
use url::Url;

/// Merge requests listed per request.
pub const PAGE_SIZE: u32 = 50;

/// GitLab merge request, as much of it as the segment reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeRequest {
    /// Merge request ID
    pub id: u64,

    /// Project-scoped merge request number
    pub iid: u64,

    /// Owning project ID
    pub project_id: u64,

    /// Merge request author
    pub author: Author,
}

/// GitLab user information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: u64,
    pub name: String,
    pub username: String,
}

#[derive(Debug, Deserialize)]
struct Project {
    id: u64,
}

/// Picks the access token: the variable named by `token_variable` wins when it
/// holds a value, otherwise `access_token`.
pub fn resolve_token(config: &GitLabConfig, env: &dyn Environment) -> Result<String, SegmentError> {
    let from_env = config
        .token_variable
        .as_deref()
        .filter(|name| !name.is_empty())
        .and_then(|name| env.getenv(name));

    from_env
        .or_else(|| config.access_token.clone().filter(|t| !t.is_empty()))
        .ok_or_else(|| {
            SegmentError::AuthConfigMissing(match config.token_variable.as_deref() {
                Some(name) if !name.is_empty() => {
                    format!("neither ${} nor gitlab.access_token is set", name)
                }
                _ => "gitlab.access_token is not set".to_string(),
            })
        })
}

/// GitLab REST API client
pub struct GitLabClient {
    http: Arc<dyn HttpClient>,
    base_url: Url,
    access_token: String,
    timeout: Duration,
}

impl GitLabClient {
    /// Create a client against `base_url` (e.g. `https://gitlab.com/api/v4/`).
    pub fn new(
        http: Arc<dyn HttpClient>,
        base_url: Url,
        access_token: String,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            base_url,
            access_token,
            timeout,
        }
    }

    pub fn from_config(
        http: Arc<dyn HttpClient>,
        config: &GitLabConfig,
        access_token: String,
    ) -> Result<Self, SegmentError> {
        let base_url = config.api_base_url()?;
        Ok(Self::new(http, base_url, access_token, config.http_timeout()))
    }

    fn endpoint(&self, path: &str) -> Result<Url, SegmentError> {
        self.base_url
            .join(path)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", path, e)).into())
    }

    fn request(&self, url: Url) -> HttpRequest {
        HttpRequest::get(url, self.timeout).header("PRIVATE-TOKEN", self.access_token.as_str())
    }

    /// Numeric ID of the project addressed by its URL-escaped `namespace/project` path.
    pub async fn project_id(&self, project_ref: &str) -> Result<u64, SegmentError> {
        let url = self.endpoint(&format!("projects/{}", project_ref))?;
        let body = self.http.get(&self.request(url)).await?;

        let project: Project = serde_json::from_str(&body)
            .map_err(|e| SegmentError::MalformedResponse(format!("project: {}", e)))?;
        if project.id == 0 {
            return Err(SegmentError::NoDataFound(format!(
                "project {} has no id",
                project_ref
            )));
        }

        tracing::debug!("Resolved project {} to id {}", project_ref, project.id);
        Ok(project.id)
    }

    /// URL listing open merge requests, optionally filtered by author on the server.
    pub fn merge_requests_url(
        &self,
        project_id: u64,
        author_username: Option<&str>,
    ) -> Result<Url, SegmentError> {
        let mut url = self.endpoint(&format!("projects/{}/merge_requests", project_id))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("state", "opened");
            if let Some(author) = author_username {
                query.append_pair("author_username", author);
            }
            query.append_pair("per_page", &PAGE_SIZE.to_string());
        }
        Ok(url)
    }

    /// Raw JSON body of the open merge request listing.
    pub async fn open_merge_requests(
        &self,
        project_id: u64,
        author_username: Option<&str>,
    ) -> Result<String, SegmentError> {
        let url = self.merge_requests_url(project_id, author_username)?;
        let body = self.http.get(&self.request(url)).await?;
        Ok(body)
    }
}
