//! Apt source list resource, including its signing key.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use super::error::ResourceError;
use super::file::ManagedFile;
use super::{Resource, ResourceChange, ResourceState};
use crate::exec::Executor;
use crate::plan::RepositoryDescriptor;

/// Directory holding apt source lists, relative to the filesystem root.
pub const SOURCES_DIR: &str = "etc/apt/sources.list.d";

/// Directory holding repository signing keys, relative to the filesystem root.
pub const KEYRINGS_DIR: &str = "etc/apt/keyrings";

/// A `/etc/apt/sources.list.d/<id>.list` entry and the key it is signed by.
#[derive(Debug)]
pub struct AptSourceResource<'a> {
    id: String,
    key_url: String,
    keyring: PathBuf,
    list: ManagedFile,
    executor: &'a dyn Executor,
}

impl<'a> AptSourceResource<'a> {
    /// Create the resource for `repo` under the filesystem `root`.
    #[must_use]
    pub fn new(repo: &RepositoryDescriptor, root: &Path, executor: &'a dyn Executor) -> Self {
        let keyring_rel = format!("{KEYRINGS_DIR}/{}.asc", repo.id);
        Self {
            id: repo.id.clone(),
            key_url: repo.gpg_key_url.to_string(),
            keyring: root.join(&keyring_rel),
            list: ManagedFile::under(
                root,
                &format!("{SOURCES_DIR}/{}.list", repo.id),
                render(repo, &format!("/{keyring_rel}")),
            ),
            executor,
        }
    }

    /// Path of the managed list file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.list.path
    }

    /// Path of the signing key file.
    #[must_use]
    pub fn keyring(&self) -> &Path {
        &self.keyring
    }

    /// Where the key is downloaded before it is moved into the keyring.
    fn partial_key_path(&self) -> PathBuf {
        self.keyring.with_extension("asc.part")
    }

    /// Download the signing key next to the keyring, then rename it into
    /// place so an interrupted download never looks like an installed key.
    fn fetch_key(&self) -> Result<()> {
        if let Some(parent) = self.keyring.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create parent: {}", parent.display()))?;
        }
        let partial = self.partial_key_path();
        let dest = partial.to_string_lossy();
        let downloaded = if self.executor.which("curl") {
            self.executor
                .run("curl", &["-fsSL", "-o", &dest, &self.key_url])
        } else if self.executor.which("wget") {
            self.executor.run("wget", &["-qO", &dest, &self.key_url])
        } else {
            return Err(ResourceError::MissingProgram {
                programs: "curl, wget".to_string(),
            }
            .into());
        };
        if let Err(e) = downloaded {
            std::fs::remove_file(&partial).ok();
            return Err(e);
        }
        std::fs::rename(&partial, &self.keyring)
            .with_context(|| format!("installing signing key {}", self.keyring.display()))
    }
}

/// Render the one-line source entry.
#[must_use]
pub fn render(repo: &RepositoryDescriptor, signed_by: &str) -> String {
    let mut line = format!("deb [signed-by={signed_by}] {}", repo.resolved_url);
    if let Some(release) = repo.release {
        line.push(' ');
        line.push_str(release);
    }
    if let Some(component) = repo.component {
        line.push(' ');
        line.push_str(component);
    }
    line.push('\n');
    line
}

impl Resource for AptSourceResource<'_> {
    fn description(&self) -> String {
        format!("apt source {} ({})", self.id, self.list.path.display())
    }

    fn current_state(&self) -> Result<ResourceState> {
        let state = self.list.state()?;
        if state == ResourceState::Correct && !self.keyring.exists() {
            return Ok(ResourceState::Incorrect {
                current: format!("signing key {} missing", self.keyring.display()),
            });
        }
        Ok(state)
    }

    fn apply(&self) -> Result<ResourceChange> {
        let list_state = self.list.state()?;
        if let ResourceState::Invalid { reason } = list_state {
            return Err(ResourceError::InvalidState {
                resource: self.list.path.display().to_string(),
                reason,
            }
            .into());
        }

        let key_missing = !self.keyring.exists();
        if list_state == ResourceState::Correct && !key_missing {
            return Ok(ResourceChange::AlreadyCorrect);
        }

        if key_missing {
            self.fetch_key()
                .with_context(|| format!("fetching signing key {}", self.key_url))?;
        }
        if list_state != ResourceState::Correct {
            self.list.write()?;
        }
        self.executor
            .run("apt-get", &["update", "-q"])
            .context("refreshing apt package lists")?;
        Ok(ResourceChange::Applied)
    }
}
