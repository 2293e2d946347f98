use glimmer_core::DisplayFields;
use serde::Serialize;

use crate::client::MergeRequest;

/// Open merge request totals for one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeRequestCounts {
    pub total: usize,
    pub authored: usize,
}

/// Counts `list`, crediting entries authored by exactly `username`.
///
/// In author-only mode the server already filtered the list, so every entry
/// counts toward both totals.
pub fn count_merge_requests(
    list: &[MergeRequest],
    author_only: bool,
    username: Option<&str>,
) -> MergeRequestCounts {
    let total = list.len();
    if author_only {
        return MergeRequestCounts {
            total,
            authored: total,
        };
    }

    let authored = match username {
        Some(name) if !name.is_empty() => list
            .iter()
            .filter(|mr| mr.author.username == name)
            .count(),
        _ => 0,
    };
    MergeRequestCounts { total, authored }
}

/// Template fields of the merge request segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeRequestDisplay {
    pub count: usize,
    pub author_count: usize,
    pub project_id: String,
    pub from_cache: bool,
}

impl MergeRequestDisplay {
    pub fn new(counts: MergeRequestCounts, project_id: String, from_cache: bool) -> Self {
        Self {
            count: counts.total,
            author_count: counts.authored,
            project_id,
            from_cache,
        }
    }
}

impl DisplayFields for MergeRequestDisplay {
    const FIELD_NAMES: &'static [&'static str] = &["Count", "AuthorCount", "ProjectID", "FromCache"];

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Count", self.count.to_string()),
            ("AuthorCount", self.author_count.to_string()),
            ("ProjectID", self.project_id.clone()),
            ("FromCache", if self.from_cache { "*" } else { "" }.to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::client::Author;

    fn mr(iid: u64, username: &str) -> MergeRequest {
        MergeRequest {
            id: 1000 + iid,
            iid,
            project_id: 42,
            author: Author {
                id: iid,
                name: username.to_uppercase(),
                username: username.to_string(),
            },
        }
    }

    fn five_with_two_by_alice() -> Vec<MergeRequest> {
        vec![
            mr(1, "alice"),
            mr(2, "bob"),
            mr(3, "alice"),
            mr(4, "carol"),
            mr(5, "Alice"),
        ]
    }

    #[test]
    fn test_counts_authored_entries() {
        let counts = count_merge_requests(&five_with_two_by_alice(), false, Some("alice"));
        assert_eq!(counts, MergeRequestCounts { total: 5, authored: 2 });
    }

    #[test]
    fn test_author_only_trusts_server_filter() {
        let list = vec![mr(1, "alice"), mr(3, "alice")];
        let counts = count_merge_requests(&list, true, Some("alice"));
        assert_eq!(counts, MergeRequestCounts { total: 2, authored: 2 });
    }

    #[test]
    fn test_without_username_nothing_is_authored() {
        let counts = count_merge_requests(&five_with_two_by_alice(), false, None);
        assert_eq!(counts.authored, 0);
        assert_eq!(count_merge_requests(&[], false, Some("alice")).total, 0);
    }

    #[test]
    fn test_display_fields() {
        let display = MergeRequestDisplay::new(
            MergeRequestCounts { total: 5, authored: 2 },
            "278964".into(),
            true,
        );
        let fields = display.fields();
        assert_eq!(
            fields,
            vec![
                ("Count", "5".to_string()),
                ("AuthorCount", "2".to_string()),
                ("ProjectID", "278964".to_string()),
                ("FromCache", "*".to_string()),
            ]
        );
        assert_eq!(
            fields.iter().map(|(k, _)| *k).collect::<Vec<_>>(),
            MergeRequestDisplay::FIELD_NAMES
        );
    }
}
