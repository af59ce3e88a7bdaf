//! Domain-specific error types for the curator repository engine.
//!
//! Library modules return typed errors while command handlers at the CLI
//! boundary convert them to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! CuratorError
//! ├── Config(ConfigError)    : settings file, ensure values
//! ├── Resolve(ResolveError)  : OS facts to repository URL
//! └── Plan(PlanError)        : dependency graph problems
//! ```
//!
//! Resource failures stay [`ResourceError`] inside [`anyhow::Error`] so the
//! applier can attach the resource name as context.

use thiserror::Error;

pub use crate::resources::error::ResourceError;

/// Top-level error type for the engine.
#[derive(Error, Debug)]
pub enum CuratorError {
    /// Configuration-related error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Repository resolution error.
    #[error("Resolution error: {0}")]
    Resolve(#[from] ResolveError),

    /// Plan construction or ordering error.
    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),
}

/// Errors raised while loading or interpreting settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The `ensure` value is a version range or otherwise not an exact version.
    #[error("Invalid ensure value '{0}': expected present, latest, absent or an exact version")]
    InvalidEnsure(String),

    /// A setting required by another setting is absent.
    #[error("Missing required setting '{setting}' ({reason})")]
    MissingSetting {
        /// Name of the missing setting.
        setting: &'static str,
        /// Why the setting is required.
        reason: &'static str,
    },

    /// The settings file is not valid TOML or has the wrong shape.
    #[error("Invalid settings file {path}: {message}")]
    InvalidSyntax {
        /// Path to the settings file.
        path: String,
        /// Parser message.
        message: String,
    },

    /// An I/O error occurred while reading the settings file.
    #[error("IO error reading settings file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors raised while resolving OS facts into a repository descriptor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The OS family has no known repository layout.
    #[error("Unsupported platform: OS family '{family}' is not RedHat or Debian")]
    UnsupportedPlatform {
        /// Family name as reported by the facts.
        family: String,
    },

    /// A fact needed for this family was not provided.
    #[error("Missing required fact '{fact}' for OS family {family}")]
    MissingRequiredFact {
        /// Name of the missing fact.
        fact: &'static str,
        /// Family that requires it.
        family: String,
    },
}

/// Errors raised by the dependency graph of a plan.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// The dependency edges form a cycle.
    #[error("Dependency cycle detected among: {0}")]
    DependencyCycle(String),

    /// An edge references a resource that is not part of the plan.
    #[error("Resource '{0}' is required but not declared in the plan")]
    UnknownResource(String),
}
