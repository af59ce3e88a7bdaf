//! Command-line interface definitions.
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::SettingsLayer;

/// Top-level CLI entry point for the curator repository resolver.
#[derive(Parser, Debug)]
#[command(
    name = "curator",
    about = "Install Elasticsearch Curator from its yum or apt repository",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Settings file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Filesystem root that facts are read from and repository files written under
    #[arg(long, global = true, default_value = "/")]
    pub root: PathBuf,

    /// OS family (RedHat, Debian); detected from os-release when omitted
    #[arg(long, global = true)]
    pub os_family: Option<String>,

    /// OS major release, e.g. 7
    #[arg(long, global = true)]
    pub os_release: Option<String>,

    /// Setting overrides.
    #[command(flatten)]
    pub settings: SettingsOpts,
}

/// Setting overrides; each one wins over the settings file.
#[derive(Parser, Debug, Clone, Default)]
pub struct SettingsOpts {
    /// Package version, or present, latest, absent
    #[arg(long, global = true)]
    pub ensure: Option<String>,

    /// Register the curator repository before installing
    #[arg(long, global = true, conflicts_with = "no_manage_repo")]
    pub manage_repo: bool,

    /// Do not register the repository
    #[arg(long, global = true)]
    pub no_manage_repo: bool,

    /// Package to install
    #[arg(long, global = true)]
    pub package_name: Option<String>,

    /// Curator major release line used in the repository URL, e.g. 4
    #[arg(long, global = true)]
    pub repo_version: Option<String>,
}

impl SettingsOpts {
    /// The settings layer these flags describe.
    #[must_use]
    pub fn layer(&self) -> SettingsLayer {
        let manage_repo = if self.manage_repo {
            Some(true)
        } else if self.no_manage_repo {
            Some(false)
        } else {
            None
        };
        SettingsLayer {
            ensure: self.ensure.clone(),
            manage_repo,
            package_name: self.package_name.clone(),
            repo_version: self.repo_version.clone(),
        }
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the resources that would be declared
    Plan(PlanOpts),
    /// Converge the host to the plan
    Apply(ApplyOpts),
    /// Print the detected OS facts
    Facts,
    /// Print version information
    Version,
}

/// Options for the `plan` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct PlanOpts {
    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

/// Options for the `apply` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct ApplyOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long)]
    pub dry_run: bool,
}
