use anyhow::{Context, Result};
use git2::Repository as Git2Repository;
use glimmer_core::SegmentError;
use std::path::{Component, Path, PathBuf};

/// Local version-control metadata needed to scope the segment.
pub trait RepositoryReader: Send + Sync {
    /// Work tree containing `start`, or `None` outside any repository.
    fn find_repository_root(&self, start: &Path) -> Option<PathBuf>;

    /// URL of the remote `name` of the repository at `root`.
    fn read_remote_url(&self, root: &Path, name: &str) -> Result<String>;
}

/// [`RepositoryReader`] backed by the filesystem and libgit2.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitReader;

impl RepositoryReader for GitReader {
    fn find_repository_root(&self, start: &Path) -> Option<PathBuf> {
        match Git2Repository::discover(start) {
            Ok(repo) => repo.workdir().map(Path::to_path_buf),
            Err(e) => {
                tracing::debug!("No repository discovered from {:?}: {}", start, e);
                // A `.git` entry libgit2 refuses still marks a work tree;
                // resolve_logical_root reports what is wrong with it.
                start
                    .ancestors()
                    .find(|dir| dir.join(".git").exists())
                    .map(Path::to_path_buf)
            }
        }
    }

    fn read_remote_url(&self, root: &Path, name: &str) -> Result<String> {
        let repo = Git2Repository::open(root).context("Failed to open git repository")?;
        let remote = repo
            .find_remote(name)
            .with_context(|| format!("Failed to find remote '{}'", name))?;
        remote
            .url()
            .map(str::to_string)
            .context("Remote URL is not valid UTF-8")
    }
}

/// Follows `<root>/.git` to the repository that owns the worktree.
///
/// A `.git` directory means `root` is the repository itself. A `.git` file
/// (linked worktree or submodule) holds `gitdir: <path>`; the logical root is
/// the work tree that path lives in.
pub fn resolve_logical_root(root: &Path) -> Result<PathBuf, SegmentError> {
    let dot_git = root.join(".git");
    let metadata = std::fs::metadata(&dot_git)
        .map_err(|e| SegmentError::RepositoryMetadata(format!("{}: {}", dot_git.display(), e)))?;

    if metadata.is_dir() {
        return Ok(root.to_path_buf());
    }

    let contents = std::fs::read_to_string(&dot_git)
        .map_err(|e| SegmentError::RepositoryMetadata(format!("{}: {}", dot_git.display(), e)))?;

    let logical = parse_gitdir_file(&contents, root).ok_or_else(|| {
        SegmentError::RepositoryMetadata(format!("{} has no usable gitdir line", dot_git.display()))
    })?;

    tracing::debug!("Resolved {:?} through .git file to {:?}", root, logical);
    Ok(logical)
}

/// Parses the contents of a `.git` file.
///
/// `gitdir: /path/to/real/.git/worktrees/feature` resolves to `/path/to/real`.
/// Relative gitdirs are taken from `base`. A gitdir inside a bare store such
/// as `/srv/project.git/worktrees/feature` resolves to the store itself.
pub fn parse_gitdir_file(contents: &str, base: &Path) -> Option<PathBuf> {
    let target = contents
        .lines()
        .find_map(|line| line.trim().strip_prefix("gitdir:"))?
        .trim();
    if target.is_empty() {
        return None;
    }

    let target = Path::new(target);
    let absolute = if target.is_absolute() {
        target.to_path_buf()
    } else {
        base.join(target)
    };

    let mut root = PathBuf::new();
    for component in normalize_lexically(&absolute).components() {
        let name = component.as_os_str();
        if name == ".git" {
            return Some(root);
        }
        root.push(name);
        if name.to_string_lossy().ends_with(".git") {
            return Some(root);
        }
    }
    None
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// True when both paths name the same directory.
pub fn same_directory(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use std::fs;

    #[test]
    fn test_parse_worktree_gitdir() {
        let root = parse_gitdir_file(
            "gitdir: /path/to/real/.git/worktrees/feature\n",
            Path::new("/elsewhere/feature"),
        );
        assert_eq!(root, Some(PathBuf::from("/path/to/real")));
    }

    #[test]
    fn test_parse_relative_submodule_gitdir() {
        let root = parse_gitdir_file(
            "gitdir: ../.git/modules/vendor",
            Path::new("/home/me/project/vendor"),
        );
        assert_eq!(root, Some(PathBuf::from("/home/me/project")));
    }

    #[test]
    fn test_parse_bare_store_gitdir() {
        let root = parse_gitdir_file(
            "gitdir: /srv/project.git/worktrees/feature",
            Path::new("/work/feature"),
        );
        assert_eq!(root, Some(PathBuf::from("/srv/project.git")));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_gitdir_file("", Path::new("/x")), None);
        assert_eq!(parse_gitdir_file("gitdir:   ", Path::new("/x")), None);
        assert_eq!(parse_gitdir_file("ref: refs/heads/main", Path::new("/x")), None);
        assert_eq!(parse_gitdir_file("gitdir: /no/marker/here", Path::new("/x")), None);
    }

    #[test]
    fn test_find_repository_root_from_subdirectory() {
        let dir = tempfile::tempdir().expect("temp dir");
        let repo_path = dir.path().join("repo");
        git2::Repository::init(&repo_path).unwrap();
        let nested = repo_path.join("src").join("deep");
        fs::create_dir_all(&nested).unwrap();

        let root = GitReader.find_repository_root(&nested).unwrap();
        assert!(same_directory(&root, &repo_path));
    }

    #[test]
    fn test_find_repository_root_outside_repository() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert_eq!(GitReader.find_repository_root(dir.path()), None);
    }

    #[test]
    fn test_linked_worktree_resolves_to_main_repository() {
        let dir = tempfile::tempdir().expect("temp dir");
        let main_path = dir.path().join("main");
        let repo = git2::Repository::init(&main_path).unwrap();
        let signature = git2::Signature::now("Test", "test@example.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        repo.commit(Some("HEAD"), &signature, &signature, "initial", &tree, &[])
            .unwrap();

        let worktree_path = dir.path().join("feature");
        repo.worktree("feature", &worktree_path, None).unwrap();
        let nested = worktree_path.join("src");
        fs::create_dir_all(&nested).unwrap();

        let root = GitReader.find_repository_root(&nested).unwrap();
        assert!(same_directory(&root, &worktree_path));
        let logical = resolve_logical_root(&root).unwrap();
        assert!(same_directory(&logical, &main_path));
    }

    #[test]
    fn test_broken_git_file_still_marks_root() {
        let dir = tempfile::tempdir().expect("temp dir");
        let nested = dir.path().join("sub");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join(".git"), "gitdir: /does/not/exist/.git/worktrees/x\n").unwrap();

        let root = GitReader.find_repository_root(&nested).unwrap();
        assert!(same_directory(&root, dir.path()));
    }

    #[test]
    fn test_read_remote_url() {
        let dir = tempfile::tempdir().expect("temp dir");
        let repo = git2::Repository::init(dir.path()).unwrap();
        repo.remote("origin", "git@gitlab.com:group/project.git").unwrap();

        let url = GitReader.read_remote_url(dir.path(), "origin").unwrap();
        assert_eq!(url, "git@gitlab.com:group/project.git");
        assert!(GitReader.read_remote_url(dir.path(), "upstream").is_err());
    }

    #[test]
    fn test_resolve_logical_root_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        git2::Repository::init(dir.path()).unwrap();
        assert_eq!(resolve_logical_root(dir.path()).unwrap(), dir.path());
    }

    #[test]
    fn test_resolve_logical_root_through_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let real = dir.path().join("real");
        git2::Repository::init(&real).unwrap();
        let worktree = dir.path().join("feature");
        fs::create_dir_all(&worktree).unwrap();
        fs::write(
            worktree.join(".git"),
            format!("gitdir: {}\n", real.join(".git").join("worktrees").join("feature").display()),
        )
        .unwrap();

        assert_eq!(resolve_logical_root(&worktree).unwrap(), real);
    }

    #[test]
    fn test_resolve_logical_root_unusable_file_is_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join(".git"), "garbage").unwrap();
        let err = resolve_logical_root(dir.path()).unwrap_err();
        assert!(matches!(err, SegmentError::RepositoryMetadata(_)));
    }
}
