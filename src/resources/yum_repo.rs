//! Yum repository definition resource.
use anyhow::Result;
use std::path::Path;

use super::error::ResourceError;
use super::file::ManagedFile;
use super::{Resource, ResourceChange, ResourceState};
use crate::plan::RepositoryDescriptor;

/// Directory holding yum repository definitions, relative to the filesystem root.
pub const REPOS_DIR: &str = "etc/yum.repos.d";

/// A `/etc/yum.repos.d/<id>.repo` file.
#[derive(Debug)]
pub struct YumRepoResource {
    id: String,
    file: ManagedFile,
}

impl YumRepoResource {
    /// Create the resource for `repo` under the filesystem `root`.
    #[must_use]
    pub fn new(repo: &RepositoryDescriptor, root: &Path) -> Self {
        Self {
            id: repo.id.clone(),
            file: ManagedFile::under(
                root,
                &format!("{REPOS_DIR}/{}.repo", repo.id),
                render(repo),
            ),
        }
    }

    /// Path of the managed repo file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file.path
    }
}

/// Render the repo file body.
#[must_use]
pub fn render(repo: &RepositoryDescriptor) -> String {
    format!(
        "[{id}]\n\
         name={name}\n\
         baseurl={url}\n\
         gpgcheck=1\n\
         gpgkey={key}\n\
         enabled=1\n",
        id = repo.id,
        name = repo.description,
        url = repo.resolved_url,
        key = repo.gpg_key_url,
    )
}

impl Resource for YumRepoResource {
    fn description(&self) -> String {
        format!("yumrepo {} ({})", self.id, self.file.path.display())
    }

    fn current_state(&self) -> Result<ResourceState> {
        self.file.state()
    }

    fn apply(&self) -> Result<ResourceChange> {
        match self.file.state()? {
            ResourceState::Correct => Ok(ResourceChange::AlreadyCorrect),
            ResourceState::Invalid { reason } => Err(ResourceError::InvalidState {
                resource: self.file.path.display().to_string(),
                reason,
            }
            .into()),
            ResourceState::Missing | ResourceState::Incorrect { .. } => {
                self.file.write()?;
                Ok(ResourceChange::Applied)
            }
        }
    }
}
