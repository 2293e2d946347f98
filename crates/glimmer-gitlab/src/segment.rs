use std::sync::Arc;

use async_trait::async_trait;
use glimmer_core::{
    CacheKeys, CacheStore, CachedFetcher, Environment, Fetched, Fresh, GitLabConfig, HttpClient,
    Outcome, Rendered, Segment, SegmentError,
};

use crate::client::{resolve_token, GitLabClient, MergeRequest};
use crate::merge_requests::{count_merge_requests, MergeRequestDisplay};
use crate::repository::RepositoryReader;
use crate::resolver::ContextResolver;

pub const SEGMENT_ID: &str = "gitlab";

/// Default template: the open merge request count.
pub const TEMPLATE: &str = " {{.Count}} ";

const INDEX_PREFIX: &str = "gitlabmr_project_id";
const PAYLOAD_PREFIX: &str = "gitlabmr_response";

/// Open merge request count for the GitLab project behind `origin`.
pub struct GitLabSegment {
    config: GitLabConfig,
    env: Arc<dyn Environment>,
    reader: Arc<dyn RepositoryReader>,
    cache: Arc<dyn CacheStore>,
    http: Arc<dyn HttpClient>,
}

impl GitLabSegment {
    pub fn new(
        config: GitLabConfig,
        env: Arc<dyn Environment>,
        reader: Arc<dyn RepositoryReader>,
        cache: Arc<dyn CacheStore>,
        http: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            config,
            env,
            reader,
            cache,
            http,
        }
    }

    fn author_filter(&self) -> Option<&str> {
        if !self.config.author_only {
            return None;
        }
        self.config
            .author_username
            .as_deref()
            .filter(|name| !name.is_empty())
    }

    /// Resolves the repository, then serves the merge request list from the
    /// cache or from GitLab.
    pub async fn evaluate(&self) -> Result<MergeRequestDisplay, SegmentError> {
        let ctx = ContextResolver::new(&self.config, self.env.as_ref(), self.reader.as_ref())
            .resolve()?;
        let project_ref = ctx.remote.project_ref().ok_or_else(|| {
            SegmentError::ContextUnresolved(format!("{} names no GitLab project", ctx.remote.path))
        })?;

        let token = resolve_token(&self.config, self.env.as_ref())?;
        let ttl = self.config.ttl()?;
        let client = GitLabClient::from_config(self.http.clone(), &self.config, token)?;

        let author = self.author_filter();
        let keys = cache_keys(&ctx.root.to_string_lossy(), author);
        let client = &client;
        let project_ref = project_ref.as_str();

        let fetched: Fetched<Vec<MergeRequest>> = CachedFetcher::new(self.cache.as_ref())
            .fetch_with_cache(&keys, ttl, move || async move {
                let project_id = client.project_id(project_ref).await?;
                let body = client.open_merge_requests(project_id, author).await?;
                Ok(Fresh {
                    ident: project_id.to_string(),
                    body,
                })
            })
            .await?;

        let counts = count_merge_requests(
            &fetched.payload,
            self.config.author_only,
            self.config.author_username.as_deref(),
        );
        tracing::debug!(
            "{} open merge requests on {} ({} authored)",
            counts.total,
            project_ref,
            counts.authored
        );

        Ok(MergeRequestDisplay::new(
            counts,
            fetched.ident,
            fetched.from_cache,
        ))
    }
}

/// Both keys carry the author filter; a listing fetched under one filter
/// must never answer for another.
fn cache_keys(root: &str, author: Option<&str>) -> CacheKeys {
    let author = author.unwrap_or("");
    CacheKeys::new(
        INDEX_PREFIX,
        &format!("{}&author={}", root, author),
        &format!("{}_author={}", PAYLOAD_PREFIX, author),
    )
}

#[async_trait]
impl Segment for GitLabSegment {
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
