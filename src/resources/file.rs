//! A file whose entire content is managed.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use super::ResourceState;

/// A file with exact desired content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedFile {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Desired content.
    pub content: String,
}

impl ManagedFile {
    /// Create a managed file at `root` joined with `relative`.
    #[must_use]
    pub fn under(root: &Path, relative: &str, content: String) -> Self {
        Self {
            path: root.join(relative),
            content,
        }
    }

    /// Compare the file on disk with the desired content.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn state(&self) -> Result<ResourceState> {
        if self.path.is_dir() {
            return Ok(ResourceState::Invalid {
                reason: format!("{} is a directory", self.path.display()),
            });
        }
        if !self.path.exists() {
            return Ok(ResourceState::Missing);
        }
        let current = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        if current == self.content {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect { current })
        }
    }

    /// Write the desired content, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created or the file cannot be written.
    pub fn write(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create parent: {}", parent.display()))?;
        }
        std::fs::write(&self.path, &self.content)
            .with_context(|| format!("writing {}", self.path.display()))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_then_correct_after_write() {
        let dir = tempfile::tempdir().unwrap();
        let file = ManagedFile::under(dir.path(), "etc/example.conf", "a=1\n".to_string());
        assert_eq!(file.state().unwrap(), ResourceState::Missing);

        file.write().unwrap();
        assert_eq!(file.state().unwrap(), ResourceState::Correct);
    }

    #[test]
    fn different_content_is_incorrect() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("x.conf"), "old\n").unwrap();
        let file = ManagedFile::under(dir.path(), "x.conf", "new\n".to_string());
        assert_eq!(
            file.state().unwrap(),
            ResourceState::Incorrect {
                current: "old\n".to_string()
            }
        );
    }

    #[test]
    fn directory_in_the_way_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("x.conf")).unwrap();
        let file = ManagedFile::under(dir.path(), "x.conf", String::new());
        assert!(matches!(
            file.state().unwrap(),
            ResourceState::Invalid { .. }
        ));
    }
}
