//! GitLab open merge request segment.

pub mod client;
pub mod merge_requests;
pub mod remote;
pub mod repository;
pub mod resolver;
pub mod segment;

pub use client::{resolve_token, Author, GitLabClient, MergeRequest};
pub use merge_requests::{count_merge_requests, MergeRequestCounts, MergeRequestDisplay};
pub use remote::RemoteUrl;
pub use repository::{GitReader, RepositoryReader};
pub use resolver::{ContextResolver, RepositoryContext};
pub use segment::GitLabSegment;
