//! Process environment accessor.

use std::collections::HashMap;
use std::path::PathBuf;

/// Environment variables and working directory, as seen by a segment.
pub trait Environment: Send + Sync {
    /// Value of `name`, treating unset and empty alike.
    fn getenv(&self, name: &str) -> Option<String>;

    fn working_directory(&self) -> std::io::Result<PathBuf>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn getenv(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.is_empty())
    }

    fn working_directory(&self) -> std::io::Result<PathBuf> {
        std::env::current_dir()
    }
}

/// A fixed environment, for embedding hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticEnvironment {
    vars: HashMap<String, String>,
    cwd: PathBuf,
}

impl StaticEnvironment {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            vars: HashMap::new(),
            cwd: cwd.into(),
        }
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl Environment for StaticEnvironment {
    fn getenv(&self, name: &str) -> Option<String> {
        self.vars.get(name).filter(|v| !v.is_empty()).cloned()
    }

    fn working_directory(&self) -> std::io::Result<PathBuf> {
        Ok(self.cwd.clone())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_static_environment() {
        let env = StaticEnvironment::new("/work")
            .with_var("TOKEN", "abc")
            .with_var("EMPTY", "");
        assert_eq!(env.getenv("TOKEN").as_deref(), Some("abc"));
        assert_eq!(env.getenv("EMPTY"), None);
        assert_eq!(env.getenv("MISSING"), None);
        assert_eq!(env.working_directory().unwrap(), PathBuf::from("/work"));
    }
}
