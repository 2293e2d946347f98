//! Decides whether the merge request segment applies to the working directory.

use std::path::PathBuf;

use glimmer_core::{Environment, GitLabConfig, SegmentError};

use crate::remote::RemoteUrl;
use crate::repository::{resolve_logical_root, same_directory, RepositoryReader};

const ORIGIN: &str = "origin";

/// A repository whose `origin` lives on the configured GitLab host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryContext {
    /// Logical repository root, after `.git` file indirection
    pub root: PathBuf,
    pub remote: RemoteUrl,
}

pub struct ContextResolver<'a> {
    config: &'a GitLabConfig,
    env: &'a dyn Environment,
    reader: &'a dyn RepositoryReader,
}

impl<'a> ContextResolver<'a> {
    pub fn new(
        config: &'a GitLabConfig,
        env: &'a dyn Environment,
        reader: &'a dyn RepositoryReader,
    ) -> Self {
        Self { config, env, reader }
    }

    /// Returns the context, or [`SegmentError::ContextUnresolved`] when the
    /// segment should stay hidden. An unreadable `.git` file is a visible
    /// [`SegmentError::RepositoryMetadata`] instead.
    pub fn resolve(&self) -> Result<RepositoryContext, SegmentError> {
        let cwd = self
            .env
            .working_directory()
            .map_err(|e| SegmentError::ContextUnresolved(format!("working directory: {}", e)))?;

        let found_root = self.reader.find_repository_root(&cwd).ok_or_else(|| {
            SegmentError::ContextUnresolved(format!("{} is not inside a git repository", cwd.display()))
        })?;

        if self.config.root_only && !same_directory(&cwd, &found_root) {
            return Err(SegmentError::ContextUnresolved(format!(
                "{} is not the repository root",
                cwd.display()
            )));
        }

        let root = resolve_logical_root(&found_root)?;

        let url = self.reader.read_remote_url(&root, ORIGIN).map_err(|e| {
            SegmentError::ContextUnresolved(format!("{}: {:#}", root.display(), e))
        })?;
        let remote = RemoteUrl::parse(&url).ok_or_else(|| {
            SegmentError::ContextUnresolved(format!("unrecognised remote URL {:?}", url))
        })?;

        let host = self.config.host();
        if !remote.matches_host(&host) {
            return Err(SegmentError::ContextUnresolved(format!(
                "origin host {} is not {}",
                remote.host, host
            )));
        }

        Ok(RepositoryContext { root, remote })
    }
}
