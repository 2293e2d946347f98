//! Parse `origin` remote URLs into a host and a GitLab project path.

use url::Url;

/// A remote URL split into host and repository path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteUrl {
    /// Lower-cased host name, without port
    pub host: String,
    /// Repository path, always starting with `/`
    pub path: String,
}

impl RemoteUrl {
    /// Parses a remote URL.
    ///
    /// Supports:
    /// - `https://host/ns/project(.git)` and `http://...`
    /// - `ssh://[user@]host[:port]/ns/project(.git)`
    /// - `[user@]host:ns/project(.git)` (scp-like)
    ///
    /// Returns `None` for local paths and anything without a host.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if raw.contains("://") {
            let url = Url::parse(raw).ok()?;
            if url.scheme() == "file" {
                return None;
            }
            let host = url.host_str()?.to_ascii_lowercase();
            let path = urlencoding::decode(url.path()).ok()?.into_owned();
            return Some(Self { host, path });
        }

        // user@host:ns/project.git
        let (authority, path) = raw.split_once(':')?;
        let host = authority.rsplit('@').next()?;
        if host.is_empty() || path.is_empty() || host.contains('/') || host.contains('\\') {
            return None;
        }
        // A single letter before the colon is a Windows drive, not a host.
        if host.len() == 1 && !authority.contains('@') {
            return None;
        }
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        Some(Self {
            host: host.to_ascii_lowercase(),
            path,
        })
    }

    pub fn matches_host(&self, host: &str) -> bool {
        self.host.eq_ignore_ascii_case(host.trim())
    }

    /// `namespace/project` with the `.git` suffix and leading slash removed.
    pub fn project_slug(&self) -> Option<String> {
        let path = self.path.trim_end_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);
        let slug = path.trim_start_matches('/');
        if slug.is_empty() || !slug.contains('/') || slug.contains("..") {
            return None;
        }
        Some(slug.to_string())
    }

    /// URL-escaped slug, usable as the `:id` of GitLab's project endpoints.
    pub fn project_ref(&self) -> Option<String> {
        self.project_slug()
            .map(|slug| urlencoding::encode(&slug).into_owned())
    }
}
