//! Subcommand orchestration.
pub mod apply;
pub mod facts;
pub mod plan;
pub mod version;

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::Settings;
use crate::config::validation;
use crate::facts::{OsFacts, OsFamily, major_release_of};
use crate::logging::Log;

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates fact detection and settings loading so that each command
/// does not have to repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// Resolved host facts.
    pub facts: OsFacts,
    /// Merged and validated settings.
    pub settings: Settings,
    /// Filesystem root.
    pub root: PathBuf,
}

impl CommandSetup {
    /// Resolve host facts and load settings.
    ///
    /// # Errors
    ///
    /// Returns an error if facts cannot be detected or the settings are
    /// invalid.
    pub fn init(global: &GlobalOpts, log: &dyn Log) -> Result<Self> {
        let facts = resolve_facts(global)?;
        log.debug(&format!(
            "facts: family {}, release {}",
            facts.family,
            facts.major_release.as_deref().unwrap_or("unknown")
        ));

        let settings = Settings::load(global.config.as_deref(), global.settings.layer())
            .context("loading settings")?;
        log.debug(&format!(
            "settings: {} {}, manage_repo {}",
            settings.package_name, settings.ensure, settings.manage_repo
        ));

        let warnings = validation::validate(&settings);
        if !warnings.is_empty() {
            log.warn(&format!(
                "found {} configuration warning(s):",
                warnings.len()
            ));
            for warning in &warnings {
                log.warn(&format!("  [{}]: {}", warning.item, warning.message));
            }
        }

        Ok(Self {
            facts,
            settings,
            root: global.root.clone(),
        })
    }
}

/// Build facts from the CLI overrides, detecting whatever they leave out.
///
/// # Errors
///
/// Returns an error if detection is needed and `<root>/etc/os-release`
/// cannot be read.
pub fn resolve_facts(global: &GlobalOpts) -> Result<OsFacts> {
    let detected = if global.os_family.is_some() {
        None
    } else {
        Some(OsFacts::detect(&global.root).context(
            "cannot detect OS facts; pass --os-family (and --os-release for RedHat)",
        )?)
    };

    let family = match (&global.os_family, &detected) {
        (Some(name), _) => OsFamily::parse(name),
        (None, Some(facts)) => facts.family.clone(),
        (None, None) => OsFamily::Unsupported(String::new()),
    };
    let major_release = match global.os_release.as_deref() {
        Some(release) => major_release_of(release),
        None => detected.and_then(|facts| facts.major_release),
    };

    Ok(OsFacts {
        family,
        major_release,
    })
}
